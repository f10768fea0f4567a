pub mod ast;
pub mod interpreter;
pub mod lexer;
pub mod parser;

use std::io::Write;
use thiserror::Error;

use interpreter::{Interpreter, Value};
use parser::Parser;

/// The three failure categories, kept distinct so hosts can report
/// them without conflating.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Lexical error: {0}")]
    Lex(#[from] lexer::LexError),
    #[error("Syntax error: {0}")]
    Syntax(#[from] parser::ParseError),
    #[error("Runtime error: {0}")]
    Runtime(#[from] interpreter::RuntimeError),
}

/// Tokenize and parse a whole program.
pub fn compile(source: &str) -> Result<ast::Program, Error> {
    let tokens = lexer::tokenize(source)?;
    let mut parser = Parser::new(tokens);
    Ok(parser.parse_program()?)
}

/// Compile and run a program: executes `main`, writing print output
/// to `out`, and returns `main`'s value.
pub fn execute(source: &str, out: &mut dyn Write) -> Result<Value, Error> {
    let program = compile(source)?;
    let mut interpreter = Interpreter::new(out);
    Ok(interpreter.run(&program)?)
}
