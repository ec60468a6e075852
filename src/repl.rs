//! Interactive mode — a rustyline loop over a persistent session.
//!
//! Each entered line runs as a one-line program against interpreter state
//! (variables, classes, objects, data queue) that survives across entries.
//! `EXIT` or end-of-input quits.

use std::collections::HashMap;

use crate::eval::Interpreter;
use crate::frame::Frame;
use crate::program::LineTable;
use crate::value::Value;

pub fn run_repl() {
    println!("minibasic {} — interactive mode", env!("CARGO_PKG_VERSION"));
    println!("Type BASIC statements. Use EXIT to quit.\n");

    let mut rl = match rustyline::DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("minibasic: cannot initialize line editor: {e}");
            std::process::exit(1);
        }
    };

    let mut interpreter = Interpreter::new();
    let mut vars: HashMap<String, Value> = HashMap::new();

    loop {
        match rl.readline("basic> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);
                if trimmed.eq_ignore_ascii_case("exit") {
                    break;
                }
                let table = LineTable::from_source(trimmed);
                let mut frame = Frame::with_vars(table, std::mem::take(&mut vars));
                interpreter.run_frame(&mut frame);
                vars = frame.vars;
            }
            Err(
                rustyline::error::ReadlineError::Interrupted | rustyline::error::ReadlineError::Eof,
            ) => {
                break;
            }
            Err(e) => {
                eprintln!("minibasic: {e}");
                break;
            }
        }
    }
}
