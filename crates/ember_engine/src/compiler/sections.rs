//! # Section Aggregation Tables
//!
//! Five key -> fragment tables that any emission function may write into
//! while the walker runs. Keys are the ABI between emission functions: two
//! emitters that want to share one `#include`, declaration, or helper must
//! agree on an identical key string, and in exchange the final output
//! carries the fragment exactly once no matter how many blocks requested it.
//!
//! Writes are idempotent per (table, key). Re-submitting an existing key
//! with *different* content is a contract violation and fails loudly rather
//! than silently overwriting the first caller's fragment. Emission order
//! within a table is first-insertion order; a pass always starts from empty
//! tables.

use std::collections::HashMap;
use tracing::trace;

use super::CompileError;

/// An insertion-ordered, deduplicating key -> fragment mapping backing one
/// output section.
#[derive(Debug)]
pub struct SectionTable {
    name: &'static str,
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl SectionTable {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a fragment under a stable key. A repeat insert with identical
    /// content is a no-op; differing content is a `SectionConflict`.
    pub fn put(&mut self, key: &str, fragment: &str) -> Result<(), CompileError> {
        if let Some(&slot) = self.index.get(key) {
            if self.entries[slot].1 != fragment {
                return Err(CompileError::SectionConflict {
                    table: self.name.to_string(),
                    key: key.to_string(),
                });
            }
            return Ok(());
        }

        trace!(table = self.name, key, "new section entry");
        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push((key.to_string(), fragment.to_string()));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A generated utility function shared between emitters, keyed by name. The
/// forward declaration is derived from the signature at assembly time.
#[derive(Debug, Clone, PartialEq)]
pub struct HelperFn {
    pub signature: String,
    pub body: String,
}

/// Helper bodies and (derived) prototypes, in first-insertion order.
#[derive(Debug)]
pub struct HelperTable {
    entries: Vec<(String, HelperFn)>,
    index: HashMap<String, usize>,
}

impl HelperTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn put(&mut self, name: &str, signature: &str, body: &str) -> Result<(), CompileError> {
        let helper = HelperFn {
            signature: signature.to_string(),
            body: body.to_string(),
        };
        if let Some(&slot) = self.index.get(name) {
            if self.entries[slot].1 != helper {
                return Err(CompileError::SectionConflict {
                    table: "helpers".to_string(),
                    key: name.to_string(),
                });
            }
            return Ok(());
        }

        trace!(helper = name, "new helper");
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), helper));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&HelperFn> {
        self.index.get(name).map(|&slot| &self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HelperFn)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The source region of one concurrently-spawned task: the startup
/// statements relocated into it, plus the statement stream supplied by the
/// emitter that defined the task's procedure.
#[derive(Debug)]
pub struct TaskRegion {
    pub startup: SectionTable,
    pub body: Option<String>,
}

impl TaskRegion {
    fn new() -> Self {
        Self {
            startup: SectionTable::new("task-startup"),
            body: None,
        }
    }
}

/// Per-task regions, in first-touch order.
#[derive(Debug)]
pub struct TaskTable {
    entries: Vec<(String, TaskRegion)>,
    index: HashMap<String, usize>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn region_mut(&mut self, task: &str) -> &mut TaskRegion {
        let slot = match self.index.get(task) {
            Some(&slot) => slot,
            None => {
                self.index.insert(task.to_string(), self.entries.len());
                self.entries.push((task.to_string(), TaskRegion::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot].1
    }

    /// Add a startup statement to a task's region. Same idempotence rules as
    /// the shared startup table.
    pub fn put_startup(&mut self, task: &str, key: &str, stmt: &str) -> Result<(), CompileError> {
        self.region_mut(task).startup.put(key, stmt)
    }

    /// Install the task's own statement stream. Re-installing identical text
    /// is a no-op; differing text is a conflict.
    pub fn set_body(&mut self, task: &str, body: &str) -> Result<(), CompileError> {
        let region = self.region_mut(task);
        match &region.body {
            Some(existing) if existing != body => Err(CompileError::SectionConflict {
                table: "task-body".to_string(),
                key: task.to_string(),
            }),
            _ => {
                region.body = Some(body.to_string());
                Ok(())
            }
        }
    }

    pub fn get(&self, task: &str) -> Option<&TaskRegion> {
        self.index.get(task).map(|&slot| &self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaskRegion)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All aggregation tables for one generation pass.
#[derive(Debug)]
pub struct Sections {
    pub includes: SectionTable,
    pub globals: SectionTable,
    pub startup: SectionTable,
    pub helpers: HelperTable,
    pub tasks: TaskTable,
}

impl Sections {
    pub fn new() -> Self {
        Self {
            includes: SectionTable::new("includes"),
            globals: SectionTable::new("globals"),
            startup: SectionTable::new("startup"),
            helpers: HelperTable::new(),
            tasks: TaskTable::new(),
        }
    }
}

impl Default for Sections {
    fn default() -> Self {
        Self::new()
    }
}
