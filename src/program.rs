//! Program text loading and the line table.
//!
//! A program is an ordered mapping from positive integer line number to one
//! statement string; ascending numeric order IS the default control-flow
//! order. The loader accepts explicitly numbered lines (`10 PRINT "HI"`) and
//! bare statements, which are auto-numbered in steps of ten. Whole lines
//! starting with `!` are comments, and a `!` outside a quoted span starts a
//! trailing comment.

use std::collections::BTreeMap;

/// Ordered line number → statement mapping. One of these defines each
/// executable frame: the top-level program and every captured method body.
#[derive(Debug, Clone, Default)]
pub struct LineTable {
    lines: BTreeMap<u32, String>,
}

impl LineTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load program text. Duplicate line numbers follow mapping semantics:
    /// the last definition wins. Auto-numbering assigns `count * 10 + 10`
    /// where `count` is the number of lines already loaded.
    pub fn from_source(source: &str) -> Self {
        let mut table = Self::new();
        for raw in source.lines() {
            let line = strip_comment(raw).trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line.starts_with(|c: char| c.is_ascii_digit()) {
                let (digits, rest) = split_line_number(&line);
                if let Ok(num) = digits.parse::<u32>() {
                    table.lines.insert(num, rest.trim().to_string());
                    continue;
                }
            }
            let num = table.lines.len() as u32 * 10 + 10;
            table.lines.insert(num, line);
        }
        table
    }

    /// Build a table from an already-captured statement list, numbering
    /// sequentially 10, 20, 30, ... so the engine's normal sequential
    /// advance rule applies. Used for method bodies.
    pub fn from_statements(statements: &[String]) -> Self {
        let lines = statements
            .iter()
            .enumerate()
            .map(|(i, s)| ((i as u32 + 1) * 10, s.clone()))
            .collect();
        Self { lines }
    }

    pub fn get(&self, line: u32) -> Option<&str> {
        self.lines.get(&line).map(String::as_str)
    }

    pub fn contains(&self, line: u32) -> bool {
        self.lines.contains_key(&line)
    }

    /// Lowest line number, where execution starts.
    pub fn first(&self) -> Option<u32> {
        self.lines.keys().next().copied()
    }

    /// Smallest line number strictly greater than `line` — the sequential
    /// advance rule.
    pub fn next_after(&self, line: u32) -> Option<u32> {
        self.lines
            .range(line.saturating_add(1)..)
            .next()
            .map(|(n, _)| *n)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

/// Peel a leading run of digits off a numbered line.
fn split_line_number(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(line.len());
    (&line[..end], &line[end..])
}

/// Strip a `!` trailing comment, ignoring `!` inside a quoted span.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '!' if !in_quotes => return &line[..i],
            _ => {}
        }
    }
    line
}
