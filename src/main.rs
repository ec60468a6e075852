use clap::Parser;
use std::path::PathBuf;

use minibasic::eval::Interpreter;
use minibasic::program::LineTable;
use minibasic::repl::run_repl;

#[derive(Parser)]
#[command(name = "minibasic")]
#[command(about = "A line-numbered BASIC interpreter")]
#[command(version)]
struct Cli {
    /// BASIC program file to execute
    source: Option<PathBuf>,

    /// Execute statements directly, separated by ':'
    #[arg(short = 'e', long)]
    eval: Option<String>,

    /// Start interactive mode
    #[arg(short, long)]
    interactive: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Some(statements) = &cli.eval {
        run_program(&split_statements(statements).join("\n"));
    } else if let Some(path) = &cli.source {
        match std::fs::read_to_string(path) {
            Ok(source) => run_program(&source),
            Err(e) => {
                eprintln!("minibasic: cannot read {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    } else {
        run_repl();
    }
}

fn run_program(source: &str) {
    let table = LineTable::from_source(source);
    let mut interpreter = Interpreter::new();
    interpreter.run(table);
}

/// Split `-e` input on `:` outside quoted spans, so one shell argument can
/// carry a whole program.
fn split_statements(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in text.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            current.push(c);
        } else if c == ':' && !in_quotes {
            pieces.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    pieces.push(current);
    pieces
}
