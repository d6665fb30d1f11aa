use std::path::PathBuf;
use std::process;

use clap::Parser;
use lispwalk::config::{MAX_EVAL_DEPTH, MAX_PARSE_DEPTH};
use lispwalk::{Config, Environment, Error, context_snippet, evaluator, lexer, parser};
use tracing_subscriber::EnvFilter;

/// Run a program written in the lispwalk expression language
#[derive(Parser, Debug)]
#[command(name = "lispwalk", version)]
struct Cli {
    /// Source file to run
    file: PathBuf,

    /// Print the token stream before running
    #[arg(long)]
    dump_tokens: bool,

    /// Print the parsed program tree before running
    #[arg(long)]
    dump_ast: bool,

    /// Maximum list nesting accepted by the parser
    #[arg(long, default_value_t = MAX_PARSE_DEPTH)]
    max_parse_depth: usize,

    /// Maximum evaluation depth before a run is aborted
    #[arg(long, default_value_t = MAX_EVAL_DEPTH)]
    max_eval_depth: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = match std::fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", cli.file.display());
            process::exit(1);
        }
    };

    let config = Config {
        max_parse_depth: cli.max_parse_depth,
        max_eval_depth: cli.max_eval_depth,
    };

    match run(&cli, &source, &config) {
        Ok(value) => println!("Result: {value}"),
        Err(e) => {
            report(&cli, &source, &e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli, source: &str, config: &Config) -> Result<lispwalk::RuntimeValue, Error> {
    let tokens = lexer::lex(source);
    if cli.dump_tokens {
        for token in &tokens {
            let kind = format!("{:?}", token.kind);
            println!("{:>6}  {kind:<10}  {}", token.location, token.value);
        }
    }

    let program = parser::parse_program_with_config(&tokens, config)?;
    if cli.dump_ast {
        println!("{program}");
    }

    tracing::info!(file = %cli.file.display(), "running program");
    let mut env = Environment::root();
    evaluator::eval_with_config(&program, &mut env, config)
}

fn report(cli: &Cli, source: &str, error: &Error) {
    eprintln!("error: {error}");
    if let Some(offset) = error.location() {
        let (line, column) = lexer::line_col(source, offset);
        eprintln!("  --> {}:{line}:{column}", cli.file.display());
        for snippet_line in context_snippet(source, offset).lines() {
            eprintln!("   | {snippet_line}");
        }
    }
}
