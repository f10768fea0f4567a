mod repl;

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

pub const VERSION: &str = "0.1.0";

fn print_help() {
    println!(
        r#"minic - a tree-walking interpreter for a miniature C-like language v{}

USAGE:
    minic                   Start the REPL (interactive mode)
    minic <file>            Run a program
    minic -e "code"         Execute statements directly
    minic -                 Read and execute a program from stdin
    minic [OPTIONS]

OPTIONS:
    -h, --help          Print this help message
    -v, --version       Print version information
    -i, --repl          Start the REPL (interactive mode)
    -e <code>           Execute statements directly (no main() needed)

EXAMPLE:
    minic -e "int x = 5; x++; print(x);"
    echo "int main() {{ print(42); return 0; }}" | minic -

FEATURES:
    - Entry point: the main() function
    - Types: int, long, float, double, bool, char, string
    - Operators: + - * /, == != < > <= >=, && ||, ++ --
    - Control flow: if/else, while, for, switch/case, break, continue
    - Functions with typed parameters, arrays with fixed dimensions
    - Built-in print()
"#,
        VERSION
    );
}

fn run_program(source: &str) {
    let mut stdout = io::stdout();
    match minic::execute(source, &mut stdout) {
        Ok(_) => {}
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn run_file(filename: &str) {
    let source = match fs::read_to_string(filename) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", filename, e);
            process::exit(1);
        }
    };

    run_program(&source);
}

fn run_statements(code: &str) {
    // Wrap bare statements in a main() and run
    let wrapped = format!("int main() {{ {} }}", code);
    run_program(&wrapped);
}

fn run_stdin() {
    let mut source = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut source) {
        eprintln!("Error reading stdin: {}", e);
        process::exit(1);
    }

    // A full program defines main(); anything else is treated as bare
    // statements.
    if source.contains("main(") || source.contains("main (") {
        run_program(&source);
    } else {
        run_statements(&source);
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // No arguments - start REPL
    if args.len() < 2 {
        repl::run_repl();
        return;
    }

    match args[1].as_str() {
        "-h" | "--help" => {
            print_help();
        }
        "-v" | "--version" => {
            println!("minic {}", VERSION);
        }
        "-i" | "--repl" => {
            repl::run_repl();
        }
        "-e" => {
            if args.len() < 3 {
                eprintln!("Error: -e requires code argument");
                eprintln!("Usage: minic -e \"int x = 5; print(x);\"");
                process::exit(1);
            }
            run_statements(&args[2]);
        }
        "-" => {
            run_stdin();
        }
        filename => {
            run_file(filename);
        }
    }
}
