//! Execution frames, the FOR/NEXT loop stack, and the data queue.
//!
//! A frame is one independent execution context: the flat variable store,
//! the line table being executed, the current/next line cursors, the loop
//! stack, and the halted flag. The top-level program runs in one frame and
//! every method invocation constructs a fresh child frame, so nested calls
//! can never corrupt their caller's state.

use std::collections::HashMap;

use crate::program::LineTable;
use crate::value::Value;

/// One active FOR/NEXT loop. Frames stack LIFO; only the innermost is
/// addressed by NEXT.
#[derive(Debug, Clone)]
pub struct LoopFrame {
    /// Loop variable name (case-sensitive).
    pub var: String,
    /// Inclusive bound the continuation condition tests against.
    pub end: f64,
    /// Increment applied by NEXT; negative steps count down.
    pub step: f64,
    /// Line immediately after the FOR — where NEXT branches back to.
    /// `None` when the FOR is the last line of its table.
    pub resume_line: Option<u32>,
}

/// Ordered DATA literals plus the READ cursor. The queue is shared across
/// frames: it belongs to the interpreter, not to any one invocation, and
/// RESTORE rewinds the cursor without discarding the values.
#[derive(Debug, Clone, Default)]
pub struct DataQueue {
    items: Vec<String>,
    cursor: usize,
}

impl DataQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append literal tokens; coercion happens at READ time.
    pub fn push(&mut self, token: String) {
        self.items.push(token);
    }

    /// Consume the next literal, advancing the cursor.
    pub fn read(&mut self) -> Option<&str> {
        let item = self.items.get(self.cursor)?;
        self.cursor += 1;
        Some(item)
    }

    /// RESTORE — rewind the cursor to the start.
    pub fn restore(&mut self) {
        self.cursor = 0;
    }
}

/// One execution context. Ownership is exclusive to one active invocation;
/// frames are never shared or aliased.
#[derive(Debug)]
pub struct Frame {
    pub vars: HashMap<String, Value>,
    pub lines: LineTable,
    pub current: u32,
    pub next: Option<u32>,
    pub loops: Vec<LoopFrame>,
    pub halted: bool,
}

impl Frame {
    /// A frame positioned at the lowest line of its table.
    pub fn new(lines: LineTable) -> Self {
        Self::with_vars(lines, HashMap::new())
    }

    /// A frame with a pre-populated variable store (method invocation,
    /// REPL session continuity).
    pub fn with_vars(lines: LineTable, vars: HashMap<String, Value>) -> Self {
        let next = lines.first();
        Self {
            vars,
            lines,
            current: 0,
            next,
            loops: Vec::new(),
            halted: false,
        }
    }
}
