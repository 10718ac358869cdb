//! # Concurrent-Task Placement Resolver
//!
//! Decides whether an initializer's statements belong in the shared startup
//! sequence or inside the body of a specific concurrently-spawned task. An
//! initializer that only ever runs inside a spawned procedure must not be
//! hoisted into shared startup: that would execute it on the wrong context
//! or race against the spawn.
//!
//! The decision is re-derived on every call. The tree is immutable for the
//! duration of a pass, so a cache would only save recomputation.

use std::collections::HashSet;
use tracing::debug;

use crate::graph::Block;
use super::context::Emitter;
use super::registry::BlockKind;
use super::symbols::sanitize_identifier;
use super::CompileError;

/// Field under which procedure definitions and spawn statements carry the
/// procedure's display name. Part of the editor-side block ABI.
pub const NAME_FIELD: &str = "NAME";

/// Where an initializer's fragment belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The shared startup sequence ahead of the main statement stream.
    Shared,
    /// The body of the named task.
    Task(String),
}

impl<'a> Emitter<'a> {
    /// Resolve the placement for a block: walk its ancestor chain to the
    /// enclosing procedure definition, then look for an enabled spawn of
    /// that procedure anywhere in the tree. No enclosing procedure, or no
    /// spawn, means shared startup.
    pub fn placement_for(&self, block: &Block) -> Result<Placement, CompileError> {
        let program = self.program();
        let registry = self.registry();

        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = block;
        let enclosing = loop {
            if !seen.insert(&current.id) {
                return Err(CompileError::CyclicChain {
                    id: current.id.clone(),
                });
            }
            let Some(parent_id) = current.parent.as_deref() else {
                break None;
            };
            let parent = program
                .block(parent_id)
                .ok_or_else(|| CompileError::UnknownBlock {
                    id: parent_id.to_string(),
                })?;
            if registry.kind_of(&parent.block_type) == Some(BlockKind::ProcedureDefinition) {
                break Some(parent);
            }
            current = parent;
        };

        let Some(procedure) = enclosing else {
            return Ok(Placement::Shared);
        };
        let Some(name) = procedure.field_text(NAME_FIELD) else {
            return Ok(Placement::Shared);
        };

        match self.spawned_task_for(name) {
            Some(task) => {
                debug!(block = %block.id, task, "placed in task region");
                Ok(Placement::Task(task))
            }
            None => Ok(Placement::Shared),
        }
    }

    /// The task name a procedure will run under, if an enabled spawn block
    /// launches it. This is a lookup by scan, not a stored relationship:
    /// neither block points at the other.
    pub fn spawned_task_for(&self, procedure_name: &str) -> Option<String> {
        let registry = self.registry();
        let spawned = self.program().blocks.values().any(|b| {
            !b.disabled
                && registry.kind_of(&b.block_type) == Some(BlockKind::TaskSpawn)
                && b.field_text(NAME_FIELD) == Some(procedure_name)
        });
        spawned.then(|| sanitize_identifier(procedure_name))
    }

    /// Routing sugar used by peripheral initializers: write a startup
    /// statement into the shared table or into the requesting block's task
    /// region, whichever the placement resolver picks.
    pub fn startup_or_task(
        &mut self,
        block: &Block,
        key: &str,
        stmt: &str,
    ) -> Result<(), CompileError> {
        match self.placement_for(block)? {
            Placement::Shared => self.sections.startup.put(key, stmt),
            Placement::Task(task) => self.sections.tasks.put_startup(&task, key, stmt),
        }
    }
}
