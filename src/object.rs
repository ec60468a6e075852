//! Class and object definitions for the lightweight object layer.
//!
//! A class is a named collection of methods; a method is an ordered
//! parameter list plus a body captured at definition time into its own
//! pre-numbered line table. Bodies are captured once — calls re-bind the
//! already-built table instead of re-capturing.

use std::collections::HashMap;

use crate::program::LineTable;
use crate::value::Value;

/// A method: declared parameter names in order, and the body as a line
/// table numbered 10, 20, 30, ... so the engine's sequential-advance rule
/// applies unchanged.
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub params: Vec<String>,
    pub body: LineTable,
}

/// A class: a mapping of method name → definition.
#[derive(Debug, Clone, Default)]
pub struct ClassDef {
    pub methods: HashMap<String, MethodDef>,
}

/// A live object instance. Property values persist only here between
/// calls; the flat variable store is a transient merge-in during a call.
#[derive(Debug, Clone)]
pub struct ObjectInstance {
    /// Name of the owning class.
    pub class: String,
    /// Persistent property store, established by `init`.
    pub properties: HashMap<String, Value>,
}

impl ObjectInstance {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            properties: HashMap::new(),
        }
    }
}
