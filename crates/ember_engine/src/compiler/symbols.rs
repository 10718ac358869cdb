//! # Identifier Sanitizer / Symbol Table
//!
//! Maps the opaque variable handles the editor hands us to legal,
//! collision-free C identifiers, and carries the two side maps the walk
//! accumulates along the way: the inferred variable type and, for buffers,
//! the inferred length.
//!
//! Types only ever widen during a pass (`Numeric < Text < Buffer`); the
//! declaration text is read once, after the whole walk completes.

use std::collections::{HashMap, HashSet};

/// Default cell count for a buffer whose length was never marked.
const DEFAULT_BUFFER_LEN: &str = "64";

/// C keywords an identifier must not collide with.
const RESERVED: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do",
    "double", "else", "enum", "extern", "float", "for", "goto", "if", "int",
    "long", "register", "return", "short", "signed", "sizeof", "static",
    "struct", "switch", "typedef", "union", "unsigned", "void", "volatile",
    "while", "main",
];

/// Inferred variable type. Ordering is the widening lattice: a later, wider
/// mark upgrades the entry; a later, narrower mark is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VarType {
    /// The silent default for any variable never marked otherwise.
    Numeric,
    /// A pointer to constant text.
    Text,
    /// A fixed-length character buffer with an associated length expression.
    Buffer,
}

#[derive(Debug)]
pub struct SymbolTable {
    by_handle: HashMap<String, String>,
    taken: HashSet<String>,
    /// Identifiers in first-resolution order; declaration emission follows
    /// this order.
    order: Vec<String>,
    types: HashMap<String, VarType>,
    lengths: HashMap<String, String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            by_handle: HashMap::new(),
            taken: HashSet::new(),
            order: Vec::new(),
            types: HashMap::new(),
            lengths: HashMap::new(),
        }
    }

    /// Resolve an opaque handle to its identifier. The same handle always
    /// resolves to the same identifier within a pass; distinct handles never
    /// collide.
    pub fn resolve(&mut self, handle: &str) -> String {
        if let Some(ident) = self.by_handle.get(handle) {
            return ident.clone();
        }

        let base = sanitize_identifier(handle);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }

        self.by_handle.insert(handle.to_string(), candidate.clone());
        self.taken.insert(candidate.clone());
        self.order.push(candidate.clone());
        candidate
    }

    /// Upgrade an identifier's inferred type. Narrowing writes are ignored.
    pub fn mark_type(&mut self, ident: &str, ty: VarType) {
        let entry = self
            .types
            .entry(ident.to_string())
            .or_insert(VarType::Numeric);
        if ty > *entry {
            *entry = ty;
        }
    }

    /// Record a buffer length expression. Numeric lengths widen to the
    /// maximum seen; a non-numeric expression replaces the stored one.
    pub fn mark_length(&mut self, ident: &str, length: &str) {
        match (
            self.lengths.get(ident).and_then(|l| l.parse::<u64>().ok()),
            length.parse::<u64>().ok(),
        ) {
            (Some(stored), Some(new)) if new <= stored => {}
            _ => {
                self.lengths.insert(ident.to_string(), length.to_string());
            }
        }
    }

    /// The inferred type, defaulting to `Numeric` for unmarked entries.
    pub fn var_type(&self, ident: &str) -> VarType {
        self.types.get(ident).copied().unwrap_or(VarType::Numeric)
    }

    pub fn length(&self, ident: &str) -> Option<&str> {
        self.lengths.get(ident).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Render the variable declarations. Only meaningful once the walk has
    /// completed: marks arriving after this read would be lost.
    pub fn declarations(&self) -> String {
        let mut out = String::new();
        for ident in &self.order {
            match self.var_type(ident) {
                VarType::Numeric => out.push_str(&format!("int {ident};\n")),
                VarType::Text => out.push_str(&format!("char *{ident};\n")),
                VarType::Buffer => {
                    let len = self.length(ident).unwrap_or(DEFAULT_BUFFER_LEN);
                    out.push_str(&format!("char {ident}[{len}];\n"));
                }
            }
        }
        out
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Make an arbitrary editor-side name legal as a C identifier. Illegal
/// characters collapse to underscores; a leading digit or an empty result
/// gets a `v_` prefix; reserved words get a trailing underscore.
pub fn sanitize_identifier(raw: &str) -> String {
    let mut ident: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident = format!("v_{ident}");
    }
    if RESERVED.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_deterministic_per_handle() {
        let mut symbols = SymbolTable::new();
        let first = symbols.resolve("sensor reading");
        let second = symbols.resolve("sensor reading");

        assert_eq!(first, second);
        assert_eq!(first, "sensor_reading");
    }

    #[test]
    fn distinct_handles_never_collide() {
        let mut symbols = SymbolTable::new();
        let a = symbols.resolve("led value");
        let b = symbols.resolve("led_value");
        let c = symbols.resolve("led-value");

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn sanitizer_handles_digits_and_keywords() {
        assert_eq!(sanitize_identifier("2nd value"), "v_2nd_value");
        assert_eq!(sanitize_identifier("while"), "while_");
        assert_eq!(sanitize_identifier(""), "v_");
    }

    #[test]
    fn type_widening_is_monotonic() {
        let mut symbols = SymbolTable::new();
        let ident = symbols.resolve("message");

        symbols.mark_type(&ident, VarType::Buffer);
        symbols.mark_type(&ident, VarType::Numeric);

        assert_eq!(symbols.var_type(&ident), VarType::Buffer);
    }

    #[test]
    fn numeric_lengths_widen_to_the_maximum() {
        let mut symbols = SymbolTable::new();
        let ident = symbols.resolve("buf");

        symbols.mark_length(&ident, "16");
        symbols.mark_length(&ident, "128");
        symbols.mark_length(&ident, "32");

        assert_eq!(symbols.length(&ident), Some("128"));
    }

    #[test]
    fn declarations_follow_resolution_order_and_types() {
        let mut symbols = SymbolTable::new();
        let count = symbols.resolve("count");
        let name = symbols.resolve("name");
        symbols.mark_type(&name, VarType::Buffer);
        symbols.mark_length(&name, "32");

        let decls = symbols.declarations();
        assert_eq!(decls, format!("int {count};\nchar {name}[32];\n"));
    }
}
