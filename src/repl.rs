use minic::interpreter::{ControlFlow, Env, Interpreter, Value};
use minic::lexer::{self, Token};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::fs;
use std::io;

const BANNER: &str = r#"
            _         _
  _ __ ___ (_)_ __  (_) ___
 | '_ ` _ \| | '_ \ | |/ __|
 | | | | | | | | | || | (__
 |_| |_| |_|_|_| |_||_|\___|

"#;

pub fn run_repl() {
    println!("{}", BANNER);
    println!("minic REPL v{}", crate::VERSION);
    println!("Type .help for commands, .exit to quit.");
    println!("Use arrow keys for history.\n");

    if let Err(e) = repl_loop() {
        eprintln!("REPL error: {}", e);
    }
}

fn repl_loop() -> RlResult<()> {
    let mut rl = DefaultEditor::new()?;
    let mut stdout = io::stdout();
    let mut interpreter = Interpreter::new(&mut stdout);
    let mut env = Env::new();
    let mut input_buffer = String::new();
    let mut brace_depth: i32 = 0;
    let mut in_multiline = false;

    // Try to load history
    let history_path = dirs_history_path();
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        let prompt = if in_multiline { "....> " } else { "minic> " };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                // Handle REPL commands (only when not in multiline mode)
                if !in_multiline && trimmed.starts_with('.') {
                    rl.add_history_entry(&line)?;

                    if handle_command(trimmed, &mut interpreter, &mut env) {
                        // Command requested exit
                        break;
                    }
                    continue;
                }

                // Track brace depth for multi-line input
                for c in line.chars() {
                    match c {
                        '{' => brace_depth += 1,
                        '}' => brace_depth = brace_depth.saturating_sub(1),
                        _ => {}
                    }
                }

                input_buffer.push_str(&line);
                input_buffer.push('\n');

                // Check if we need more input
                if brace_depth > 0 {
                    in_multiline = true;
                    continue;
                }

                in_multiline = false;
                let input = input_buffer.trim();

                if !input.is_empty() {
                    rl.add_history_entry(input)?;
                    execute_input(&mut interpreter, &mut env, input);
                }

                input_buffer.clear();
                brace_depth = 0;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C: clear current input
                println!("^C");
                input_buffer.clear();
                brace_depth = 0;
                in_multiline = false;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D: exit
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    // Save history
    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }

    Ok(())
}

fn dirs_history_path() -> Option<String> {
    dirs::home_dir().map(|mut path| {
        path.push(".minic_history");
        path.to_string_lossy().to_string()
    })
}

/// Handle a REPL command. Returns true if the REPL should exit.
fn handle_command(cmd: &str, interpreter: &mut Interpreter, env: &mut Env) -> bool {
    let parts: Vec<&str> = cmd.splitn(2, ' ').collect();
    let command = parts[0];
    let arg = parts.get(1).map(|s| s.trim());

    match command {
        ".exit" | ".quit" | ".q" => {
            println!("Goodbye!");
            return true;
        }
        ".help" | ".h" => {
            print_repl_help();
        }
        ".clear" => {
            interpreter.functions.clear();
            *env = Env::new();
            println!("State cleared.");
        }
        ".vars" => {
            print_session(interpreter, env);
        }
        ".load" => {
            if let Some(filename) = arg {
                load_file(interpreter, filename);
            } else {
                eprintln!("Usage: .load <filename>");
            }
        }
        ".run" => {
            let name = arg.unwrap_or("main");
            run_function(interpreter, name);
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Type .help for available commands.");
        }
    }

    false
}

fn load_file(interpreter: &mut Interpreter, filename: &str) {
    let source = match fs::read_to_string(filename) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", filename, e);
            return;
        }
    };

    match minic::compile(&source) {
        Ok(program) => {
            let names: Vec<_> = program.functions.iter().map(|f| f.name.as_str()).collect();
            if !names.is_empty() {
                println!("Loaded: {}", names.join(", "));
            }
            interpreter.load(&program);

            // Auto-run main() if the file defines one
            if interpreter.functions.contains_key("main") {
                if let Err(e) = interpreter.call("main", Vec::new()) {
                    eprintln!("Runtime error: {}", e);
                }
            }
        }
        Err(e) => {
            eprintln!("{}", e);
        }
    }
}

fn run_function(interpreter: &mut Interpreter, name: &str) {
    if !interpreter.functions.contains_key(name) {
        eprintln!("Function '{}' not defined.", name);
        return;
    }

    match interpreter.call(name, Vec::new()) {
        Ok(Value::Void) => {}
        Ok(value) => println!("=> {}", value),
        Err(e) => eprintln!("Runtime error: {}", e),
    }
}

fn execute_input(interpreter: &mut Interpreter, env: &mut Env, input: &str) {
    // A leading `type name (` means a function definition
    if looks_like_function(input) {
        match minic::compile(input) {
            Ok(program) => {
                for func in &program.functions {
                    println!("Defined function: {}", func.name);
                }
                interpreter.load(&program);
            }
            Err(e) => {
                eprintln!("{}", e);
            }
        }
        return;
    }

    // Otherwise treat the input as statements
    let wrapped = format!("int __repl__() {{ {} }}", input);
    let program = match minic::compile(&wrapped) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    if let Some(func) = program.functions.first() {
        for stmt in &func.body.stmts {
            // Expression statements echo their value
            if let minic::ast::Stmt::Expr(expr) = stmt {
                match interpreter.eval_expr(expr, env) {
                    Ok(Value::Void) => {}
                    Ok(value) => println!("=> {}", value),
                    Err(e) => eprintln!("Runtime error: {}", e),
                }
                continue;
            }

            match interpreter.exec_stmt(stmt, env) {
                Ok(ControlFlow::Return(Value::Void)) => {}
                Ok(ControlFlow::Return(value)) => println!("=> {}", value),
                Ok(_) => {}
                Err(e) => eprintln!("Runtime error: {}", e),
            }
        }
    }
}

fn looks_like_function(input: &str) -> bool {
    // A definition starts with a type, a name, and an opening paren
    let tokens = match lexer::tokenize(input) {
        Ok(tokens) => tokens,
        Err(_) => return false,
    };

    let mut kinds = tokens.iter().map(|t| &t.token);
    let is_type = matches!(
        kinds.next(),
        Some(
            Token::Int
                | Token::Float
                | Token::Double
                | Token::Long
                | Token::Bool
                | Token::Char
                | Token::StringType
        )
    );
    let is_ident = matches!(kinds.next(), Some(Token::Identifier(_)));
    let is_paren = matches!(kinds.next(), Some(Token::LParen));

    is_type && is_ident && is_paren
}

fn print_repl_help() {
    println!(
        r#"
REPL Commands:
    .help, .h          Show this help message
    .exit, .quit, .q   Exit the REPL
    .clear             Clear all variables and functions
    .vars              Show all defined variables and functions
    .load <file>       Load a source file and run its main()
    .run [func]        Run a function (default: main)

Navigation:
    Up/Down arrows     Navigate command history
    Ctrl-C             Cancel current input
    Ctrl-D             Exit REPL

Examples:
    int x = 5;         Declare a variable
    x++;               Increment it
    print(x);          Print its value

    int add(int a, int b) {{ return a + b; }}
                       Define a function
    add(3, 4);         Call it

Tips:
    - Multi-line input: open braces are auto-detected
    - Variables persist across inputs
    - History is saved to ~/.minic_history
    - Use .clear to start fresh
"#
    );
}

fn print_session(interpreter: &Interpreter, env: &Env) {
    let has_vars = !env.is_empty();
    let has_funcs = interpreter.functions.keys().any(|k| k != "__repl__");

    if !has_vars && !has_funcs {
        println!("No variables or functions defined.");
        return;
    }

    if has_vars {
        println!("Variables:");
        for (name, (var_type, value)) in env.iter() {
            println!("  {} {} = {}", var_type, name, value);
        }
    }

    if has_funcs {
        if has_vars {
            println!();
        }
        println!("Functions:");
        for name in interpreter.functions.keys() {
            if name != "__repl__" {
                println!("  {}()", name);
            }
        }
    }
}
