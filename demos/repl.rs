use lispwalk::builtins::builtin_ops;
use lispwalk::{Config, Environment, RuntimeValue, run_in_env};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::panic;
use std::process;

fn main() {
    let result = panic::catch_unwind(|| {
        run_repl();
    });

    if let Err(panic_info) = result {
        eprintln!("The REPL encountered an unexpected error and must exit.");

        if let Some(msg) = panic_info.downcast_ref::<&str>() {
            eprintln!("Error: {msg}");
        } else if let Some(msg) = panic_info.downcast_ref::<String>() {
            eprintln!("Error: {msg}");
        } else {
            eprintln!("Error: Unknown panic occurred");
        }

        process::exit(1);
    }
}

fn run_repl() {
    println!("lispwalk expression interpreter");
    println!("Enter expressions like: (+ 13 (- 12 1))");
    println!("Type :help for more commands, or Ctrl+C to exit.");
    println!();

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("Could not initialize REPL: {err}");
            process::exit(1);
        }
    };

    // One environment for the whole session, so definitions persist between lines
    let mut env = Environment::root();
    let config = Config::default();

    loop {
        match rl.readline("lispwalk> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                // Add the line to history
                let _ = rl.add_history_entry(line);

                // Handle special commands
                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(&env);
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                match run_in_env(line, &mut env, &config) {
                    Ok(result) => println!("{result}"),
                    Err(e) => println!("Error: {e}"),
                }
            }

            Err(ReadlineError::Eof | ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn print_help() {
    println!("lispwalk REPL:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show current environment bindings");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C     - Exit the interpreter");
    println!();
    println!("Builtins:");
    for op in builtin_ops() {
        println!("  {:<6} ({} operands)", op.name, op.arity);
    }
    println!();
    println!("Examples:");
    println!("  (+ 1 2 3)");
    println!("  (if true 1 (undefined-fn))");
    println!("  (func inc (x) (+ x 1))");
    println!("  (inc 41)");
    println!();
}

fn print_environment(env: &Environment) {
    let bindings = env.bindings();

    if bindings.is_empty() {
        println!("Environment is empty.");
        return;
    }

    println!("Environment bindings ({} total):", bindings.len());
    println!();

    // Separate functions from plain values
    let mut functions = Vec::new();
    let mut values = Vec::new();

    for (name, value) in bindings {
        match value {
            RuntimeValue::Closure(_) => functions.push(value),
            _ => values.push((name, value)),
        }
    }

    if !functions.is_empty() {
        println!("Functions ({}):", functions.len());
        for function in functions {
            println!("  {function}");
        }
        println!();
    }

    if !values.is_empty() {
        println!("Values ({}):", values.len());
        for (name, value) in values {
            println!("  {name} = {value}");
        }
    }
}
