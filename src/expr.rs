//! Expression evaluation.
//!
//! Resolution order, first match wins:
//! 1. a complete quoted string → text (quotes stripped)
//! 2. case-insensitive TRUE/FALSE → boolean
//! 3. exact (case-sensitive) match to an existing variable → its value
//! 4. text made only of digits, `+ - * / ( ) .` and spaces → arithmetic,
//!    parsed by an explicit recursive-descent parser over numeric literals
//! 5. anything else passes through unchanged as text
//!
//! The restricted character set in step 4 is the correctness boundary: no
//! variable substitution happens inside compound arithmetic, and nothing
//! outside numeric literals and the four operators is ever evaluated.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{BasicDiagnostic, BasicError, BasicResult};
use crate::value::{strip_quotes, Value};

/// Resolve an expression fragment to a value. Never fails: unresolvable
/// text passes through opaquely, since it may be a class name or object id
/// that only has meaning to another statement.
pub fn evaluate(expr: &str, vars: &HashMap<String, Value>) -> Value {
    let expr = expr.trim();
    if let Some(inner) = strip_quotes(expr) {
        return Value::Text(inner.to_string());
    }
    if expr.eq_ignore_ascii_case("TRUE") {
        return Value::Bool(true);
    }
    if expr.eq_ignore_ascii_case("FALSE") {
        return Value::Bool(false);
    }
    if let Some(value) = vars.get(expr) {
        return value.clone();
    }
    if is_arithmetic(expr) {
        if let Some(n) = parse_arithmetic(expr) {
            return Value::Number(n);
        }
    }
    Value::Text(expr.to_string())
}

/// Comparison operators, longest spelling first so `<=`, `>=`, and `<>`
/// win over their one-character prefixes.
const OPERATORS: [(&str, CmpOp); 6] = [
    ("<>", CmpOp::Ne),
    ("<=", CmpOp::Le),
    (">=", CmpOp::Ge),
    ("=", CmpOp::Eq),
    ("<", CmpOp::Lt),
    (">", CmpOp::Gt),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Evaluate a condition string: split on the first comparison operator
/// outside quotes, evaluate both sides independently, compare within the
/// type. Comparing incompatible types is a statement error. A condition
/// with no operator must evaluate to a boolean.
pub fn evaluate_condition(cond: &str, vars: &HashMap<String, Value>) -> BasicResult<bool> {
    let Some((pos, spelling, op)) = find_operator(cond) else {
        return match evaluate(cond, vars) {
            Value::Bool(b) => Ok(b),
            other => Err(BasicDiagnostic::new(BasicError::BadSyntax)
                .with_detail(format!("expected a comparison, got {}", other.type_name()))),
        };
    };
    let lhs = evaluate(&cond[..pos], vars);
    let rhs = evaluate(&cond[pos + spelling.len()..], vars);
    let Some(ordering) = lhs.compare(&rhs) else {
        return Err(BasicDiagnostic::new(BasicError::TypeMismatch).with_detail(format!(
            "cannot compare {} with {}",
            lhs.type_name(),
            rhs.type_name()
        )));
    };
    Ok(match op {
        CmpOp::Eq => ordering == Ordering::Equal,
        CmpOp::Ne => ordering != Ordering::Equal,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Le => ordering != Ordering::Greater,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Ge => ordering != Ordering::Less,
    })
}

/// Locate the first comparison operator outside quoted spans. At each
/// position the two-character spellings are tried before one-character ones.
fn find_operator(cond: &str) -> Option<(usize, &'static str, CmpOp)> {
    let mut in_quotes = false;
    for (i, c) in cond.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        for (spelling, op) in OPERATORS {
            if cond[i..].starts_with(spelling) {
                return Some((i, spelling, op));
            }
        }
    }
    None
}

fn is_arithmetic(expr: &str) -> bool {
    !expr.is_empty()
        && expr
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.' | ' '))
}

/// Evaluate a numeric arithmetic expression with standard precedence.
/// Any malformed input (including division by zero) yields `None`, which
/// the caller turns into opaque passthrough.
fn parse_arithmetic(expr: &str) -> Option<f64> {
    let mut parser = Arith {
        input: expr.as_bytes(),
        pos: 0,
    };
    let value = parser.expression()?;
    parser.skip_spaces();
    if parser.pos == parser.input.len() {
        Some(value)
    } else {
        None
    }
}

/// Recursive-descent arithmetic over numeric literals:
/// expression := term (('+' | '-') term)*
/// term       := factor (('*' | '/') factor)*
/// factor     := ('+' | '-') factor | number | '(' expression ')'
struct Arith<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Arith<'_> {
    fn expression(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        loop {
            self.skip_spaces();
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Some(value),
            }
        }
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.factor()?;
        loop {
            self.skip_spaces();
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return None;
                    }
                    value /= divisor;
                }
                _ => return Some(value),
            }
        }
    }

    fn factor(&mut self) -> Option<f64> {
        self.skip_spaces();
        match self.peek()? {
            b'+' => {
                self.pos += 1;
                self.factor()
            }
            b'-' => {
                self.pos += 1;
                self.factor().map(|v| -v)
            }
            b'(' => {
                self.pos += 1;
                let value = self.expression()?;
                self.skip_spaces();
                if self.peek() == Some(b')') {
                    self.pos += 1;
                    Some(value)
                } else {
                    None
                }
            }
            _ => self.number(),
        }
    }

    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == b'.' && !seen_dot {
                seen_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return None;
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .ok()?
            .parse()
            .ok()
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_vars() -> HashMap<String, Value> {
        HashMap::new()
    }

    #[test]
    fn quoted_string() {
        assert_eq!(
            evaluate("\"hello\"", &no_vars()),
            Value::Text("hello".into())
        );
    }

    #[test]
    fn booleans() {
        assert_eq!(evaluate("TRUE", &no_vars()), Value::Bool(true));
        assert_eq!(evaluate("false", &no_vars()), Value::Bool(false));
    }

    #[test]
    fn variable_lookup_is_case_sensitive() {
        let mut vars = no_vars();
        vars.insert("Count".into(), Value::Number(7.0));
        assert_eq!(evaluate("Count", &vars), Value::Number(7.0));
        assert_eq!(evaluate("count", &vars), Value::Text("count".into()));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(evaluate("5*3", &no_vars()), Value::Number(15.0));
        assert_eq!(evaluate("2 + 3 * 4", &no_vars()), Value::Number(14.0));
        assert_eq!(evaluate("(2 + 3) * 4", &no_vars()), Value::Number(20.0));
        assert_eq!(evaluate("10 / 4", &no_vars()), Value::Number(2.5));
        assert_eq!(evaluate("-3 + 1", &no_vars()), Value::Number(-2.0));
    }

    #[test]
    fn no_variable_substitution_inside_arithmetic() {
        let mut vars = no_vars();
        vars.insert("a".into(), Value::Number(1.0));
        // "a + 1" fails the character-set guard and passes through
        assert_eq!(evaluate("a + 1", &vars), Value::Text("a + 1".into()));
    }

    #[test]
    fn malformed_arithmetic_passes_through() {
        assert_eq!(evaluate("1 2", &no_vars()), Value::Text("1 2".into()));
        assert_eq!(evaluate("()", &no_vars()), Value::Text("()".into()));
        assert_eq!(evaluate("5..3", &no_vars()), Value::Text("5..3".into()));
    }

    #[test]
    fn division_by_zero_passes_through() {
        assert_eq!(evaluate("1 / 0", &no_vars()), Value::Text("1 / 0".into()));
    }

    #[test]
    fn opaque_passthrough() {
        assert_eq!(
            evaluate("unbound_name", &no_vars()),
            Value::Text("unbound_name".into())
        );
    }

    #[test]
    fn condition_numeric() {
        let vars = no_vars();
        assert!(evaluate_condition("1 < 2", &vars).unwrap());
        assert!(evaluate_condition("2 <= 2", &vars).unwrap());
        assert!(evaluate_condition("3 >= 3", &vars).unwrap());
        assert!(evaluate_condition("1 <> 2", &vars).unwrap());
        assert!(!evaluate_condition("1 = 2", &vars).unwrap());
        assert!(evaluate_condition("5 > 4", &vars).unwrap());
    }

    #[test]
    fn condition_two_char_operator_wins_over_prefix() {
        // "<=" must not parse as "<" followed by "= 2"
        assert!(evaluate_condition("2 <= 2", &no_vars()).unwrap());
        assert!(!evaluate_condition("2 <> 2", &no_vars()).unwrap());
    }

    #[test]
    fn condition_text() {
        let mut vars = no_vars();
        vars.insert("name".into(), Value::Text("alice".into()));
        assert!(evaluate_condition("name = \"alice\"", &vars).unwrap());
        assert!(evaluate_condition("\"abc\" < \"abd\"", &vars).unwrap());
    }

    #[test]
    fn condition_operator_inside_quotes_ignored() {
        let mut vars = no_vars();
        vars.insert("s".into(), Value::Text("a<b".into()));
        assert!(evaluate_condition("s = \"a<b\"", &vars).unwrap());
    }

    #[test]
    fn condition_type_mismatch() {
        let err = evaluate_condition("1 = \"1\"", &no_vars()).unwrap_err();
        assert_eq!(err.error, BasicError::TypeMismatch);
    }

    #[test]
    fn condition_bare_boolean() {
        let mut vars = no_vars();
        vars.insert("done".into(), Value::Bool(true));
        assert!(evaluate_condition("done", &vars).unwrap());
        assert!(evaluate_condition("TRUE", &vars).unwrap());
        assert!(evaluate_condition("nonsense", &vars).is_err());
    }
}
