pub mod error;
pub mod eval;
pub mod expr;
pub mod frame;
pub mod lexer;
pub mod object;
pub mod program;
pub mod repl;
pub mod value;
