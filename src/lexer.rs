//! Statement tokenizer and quote-aware splitting helpers.
//!
//! Statements split on whitespace, except that a double-quoted span (quotes
//! included) stays inside a single token. Only quote balance is tracked —
//! `PRINT "a b" x` is three tokens, and an unterminated quote runs to the
//! end of the statement.

/// Tokenize one statement.
pub fn tokenize(statement: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in statement.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            current.push(c);
        } else if c.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Split on a separator at quote depth zero, trimming each piece.
/// Used for DATA values, READ/INPUT variable lists, and argument lists.
pub fn split_outside_quotes(text: &str, sep: char) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in text.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            current.push(c);
        } else if c == sep && !in_quotes {
            pieces.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    pieces.push(current.trim().to_string());
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(tokenize("LET A = 5"), vec!["LET", "A", "=", "5"]);
    }

    #[test]
    fn quoted_span_is_one_token() {
        assert_eq!(
            tokenize("PRINT \"hello world\""),
            vec!["PRINT", "\"hello world\""]
        );
    }

    #[test]
    fn adjacent_quoted_and_bare_tokens() {
        assert_eq!(
            tokenize("PRINT \"a b\" x \"c d\""),
            vec!["PRINT", "\"a b\"", "x", "\"c d\""]
        );
    }

    #[test]
    fn quote_balance_inside_word() {
        // A quote opened mid-word keeps the following space in the token.
        assert_eq!(tokenize("foo\"a b\"bar"), vec!["foo\"a b\"bar"]);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        assert_eq!(tokenize("PRINT \"oops  x"), vec!["PRINT", "\"oops  x"]);
    }

    #[test]
    fn empty_statement() {
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn comma_split_respects_quotes() {
        assert_eq!(
            split_outside_quotes("1, 2, \"a, b\"", ','),
            vec!["1", "2", "\"a, b\""]
        );
    }

    #[test]
    fn comma_split_keeps_empty_pieces() {
        assert_eq!(split_outside_quotes("a,,b", ','), vec!["a", "", "b"]);
    }
}
