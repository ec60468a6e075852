//! BASIC runtime values — a tagged union of number, text, and boolean.
//!
//! Variables are dynamically typed: a name holds whatever `Value` was last
//! assigned to it. All coercion happens at the token level through
//! [`Value::from_literal`]; comparisons operate strictly within a type and
//! never coerce across types.

use std::cmp::Ordering;
use std::fmt;

/// A runtime value. Numbers are stored as `f64`; integral results display
/// without a fractional part, so `15.0` prints as `15`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Value {
    /// Coerce a literal token to a value:
    /// a double-quoted token becomes text with the quotes stripped,
    /// case-insensitive `TRUE`/`FALSE` become booleans, a finite numeric
    /// parse becomes a number, and anything else passes through as text.
    pub fn from_literal(token: &str) -> Self {
        if let Some(inner) = strip_quotes(token) {
            return Self::Text(inner.to_string());
        }
        if token.eq_ignore_ascii_case("TRUE") {
            return Self::Bool(true);
        }
        if token.eq_ignore_ascii_case("FALSE") {
            return Self::Bool(false);
        }
        let trimmed = token.trim();
        if looks_numeric(trimmed) {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return Self::Number(n);
                }
            }
        }
        Self::Text(token.to_string())
    }

    /// Human-readable type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Bool(_) => "boolean",
        }
    }

    /// Compare two values of the same type. Returns `None` when the types
    /// differ — callers turn that into a statement error rather than
    /// inventing a cross-type ordering.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// The numeric content, if this value is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Text(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// If `token` is a complete double-quoted span, return its interior.
pub fn strip_quotes(token: &str) -> Option<&str> {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        Some(&token[1..token.len() - 1])
    } else {
        None
    }
}

/// A numeric literal starts with a digit, sign, or decimal point. This
/// keeps words that `f64::from_str` accepts ("inf", "nan") out of the
/// number space — they pass through as text instead.
fn looks_numeric(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() || c == '.' => true,
        Some('+' | '-') => matches!(chars.next(), Some(c) if c.is_ascii_digit() || c == '.'),
        _ => false,
    }
}
