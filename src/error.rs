//! Error types and diagnostic formatting.
//!
//! The interpreter distinguishes two tiers of failure. Load errors (missing
//! or unreadable program file) are fatal and handled at the CLI before the
//! engine starts. Statement errors are caught per statement by the dispatch
//! loop, reported with the offending line number, and execution continues at
//! the next sequential line — a single bad statement never aborts the run.

use std::fmt;

/// The kinds of per-statement failure the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicError {
    /// A keyword statement whose arguments don't fit its grammar.
    BadSyntax,
    /// First token is no known keyword and the statement is not an assignment.
    UnknownStatement,
    /// GOTO target that maps to no statement.
    UnknownLine,
    /// A numeric value was required (GOTO target, FOR bounds, loop variable).
    ExpectedNumber,
    /// NEXT with an empty loop stack.
    NextWithoutFor,
    /// NEXT names a variable other than the innermost loop's.
    LoopMismatch,
    /// READ past the end of the data queue.
    DataExhausted,
    /// Comparison between values of different types.
    TypeMismatch,
    /// NEW or CALL referring to a class that was never defined.
    UndefinedClass,
    /// CALL (or init lookup) for a method the class does not define.
    UndefinedMethod,
    /// CALL through a variable that does not hold a live object.
    UndefinedObject,
    /// METHOD or END METHOD outside a class definition.
    MethodOutsideClass,
    /// INPUT could not read from standard input.
    InputFailed,
}

impl BasicError {
    /// Terse message text; specifics go in the diagnostic detail.
    pub fn message(self) -> &'static str {
        match self {
            Self::BadSyntax => "invalid statement syntax",
            Self::UnknownStatement => "unknown statement",
            Self::UnknownLine => "no such line",
            Self::ExpectedNumber => "numeric value expected",
            Self::NextWithoutFor => "NEXT without matching FOR",
            Self::LoopMismatch => "NEXT variable does not match FOR",
            Self::DataExhausted => "out of DATA",
            Self::TypeMismatch => "incompatible types in comparison",
            Self::UndefinedClass => "class not defined",
            Self::UndefinedMethod => "method not defined",
            Self::UndefinedObject => "object not found",
            Self::MethodOutsideClass => "METHOD outside CLASS",
            Self::InputFailed => "cannot read input",
        }
    }
}

/// A statement error with optional line number and detail text.
#[derive(Debug, Clone)]
pub struct BasicDiagnostic {
    pub error: BasicError,
    pub line: Option<u32>,
    pub detail: Option<String>,
}

impl BasicDiagnostic {
    pub fn new(error: BasicError) -> Self {
        Self {
            error,
            line: None,
            detail: None,
        }
    }

    /// Attach the offending line number, unless one is already recorded
    /// (errors from inside a method body keep the body-local line).
    pub fn at_line(mut self, line: u32) -> Self {
        self.line.get_or_insert(line);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for BasicDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(n) => write!(f, "error on line {n}: {}", self.error.message())?,
            None => write!(f, "error: {}", self.error.message())?,
        }
        if let Some(ref detail) = self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BasicDiagnostic {}

/// Convenience alias.
pub type BasicResult<T> = Result<T, BasicDiagnostic>;
