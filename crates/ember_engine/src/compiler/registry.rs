//! # Block Emitter Registry
//!
//! Maps block type tags to their emission functions. Block libraries
//! register specs at link time through the `BLOCK_REGISTRY` distributed
//! slice; `BlockRegistry::standard()` collects them once at startup. Tests
//! build empty registries and register synthetic emitters explicitly.

use std::collections::HashMap;
use linkme::distributed_slice;
use tracing::warn;

use crate::graph::Block;
use super::context::{Emission, Emitter};
use super::CompileError;

/// An emission function: turns one block into a fragment, writing into the
/// context's tables as a side channel.
pub type EmitFn = fn(&mut Emitter<'_>, &Block) -> Result<Emission, CompileError>;

/// What role a block type plays in the tree. The placement resolver keys
/// off `ProcedureDefinition` and `TaskSpawn`; the walker and the value
/// resolver use the statement/expression split to flag malformed trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Produces an expression fragment; lives in value sockets.
    Expression,
    /// Produces a statement fragment; lives in `next` chains.
    Statement,
    /// A named procedure definition whose body may become a task.
    ProcedureDefinition,
    /// A statement that launches a named procedure as a concurrent task.
    TaskSpawn,
}

/// One registered block type.
#[derive(Debug, Clone, Copy)]
pub struct BlockSpec {
    pub tag: &'static str,
    pub kind: BlockKind,
    pub emit: EmitFn,
}

/// Link-time collection point for block libraries. Every spec annotated
/// with `#[distributed_slice(BLOCK_REGISTRY)]` lands here.
#[distributed_slice]
pub static BLOCK_REGISTRY: [BlockSpec] = [..];

/// The tag -> spec map consulted on every dispatch. Built once per process
/// for the standard library, or assembled by hand in tests.
pub struct BlockRegistry {
    specs: HashMap<&'static str, BlockSpec>,
}

impl BlockRegistry {
    /// An empty registry. Useful for tests that bring their own emitters.
    pub fn new() -> Self {
        Self {
            specs: HashMap::new(),
        }
    }

    /// Collect every spec registered through the distributed slice.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for spec in BLOCK_REGISTRY.iter() {
            registry.register(*spec);
        }
        registry
    }

    pub fn register(&mut self, spec: BlockSpec) {
        if self.specs.insert(spec.tag, spec).is_some() {
            warn!(tag = spec.tag, "duplicate block spec replaces earlier registration");
        }
    }

    pub fn spec(&self, tag: &str) -> Option<&BlockSpec> {
        self.specs.get(tag)
    }

    pub fn kind_of(&self, tag: &str) -> Option<BlockKind> {
        self.specs.get(tag).map(|spec| spec.kind)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
