//! # The Ember Block Compiler
//!
//! Transforms the editor's block tree into one compilable C source unit.
//!
//! ## Generation Pipeline
//!
//! 1. **Validation**: reject malformed tree shapes before any emission runs
//! 2. **Walk**: drive each top-level chain through the registered emission
//!    functions, which write includes, globals, startup statements, helpers
//!    and task regions into the shared aggregation tables as they go
//! 3. **Assembly**: order the tables and the walked statement text into the
//!    final source unit
//!
//! Generation is best-effort by design: a missing precondition degrades to
//! an inline diagnostic comment at the point of failure and the pass keeps
//! going. Only malformed tree shapes - unknown ids, unregistered type tags,
//! cyclic chains - abort a pass.

use std::fmt;
use tracing::info;

use crate::graph::Program;

pub mod code_generator;
pub mod context;
pub mod placement;
pub mod registry;
pub mod sections;
pub mod symbols;
pub mod validation;
pub mod value_resolver;

#[cfg(test)]
mod tests;

pub use code_generator::{indent_lines, Assembler};
pub use context::{Diagnostic, Emission, Emitter, Fragment, Precedence};
pub use placement::{Placement, NAME_FIELD};
pub use registry::{BlockKind, BlockRegistry, BlockSpec, EmitFn, BLOCK_REGISTRY};
pub use symbols::{sanitize_identifier, SymbolTable, VarType};

/// A fatal generation failure. Everything else degrades inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    EmptyProgram,
    /// A link references a block id that is not in the program.
    UnknownBlock { id: String },
    /// No emission function is registered for a block's type tag.
    UnknownBlockType { id: String, block_type: String },
    /// A `next` or parent chain loops back on itself.
    CyclicChain { id: String },
    /// A statement fragment surfaced in value position, or the reverse.
    KindMismatch { id: String, expected: &'static str },
    /// Two emitters keyed different content under the same table key.
    SectionConflict { table: String, key: String },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::EmptyProgram => write!(f, "program has no blocks"),
            CompileError::UnknownBlock { id } => {
                write!(f, "reference to unknown block '{id}'")
            }
            CompileError::UnknownBlockType { id, block_type } => {
                write!(f, "block '{id}' has unregistered type '{block_type}'")
            }
            CompileError::CyclicChain { id } => {
                write!(f, "cyclic chain through block '{id}'")
            }
            CompileError::KindMismatch { id, expected } => {
                write!(f, "block '{id}' did not produce {expected} output")
            }
            CompileError::SectionConflict { table, key } => {
                write!(
                    f,
                    "conflicting fragments for key '{key}' in the {table} table"
                )
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// The result of a completed generation pass.
#[derive(Debug, Clone)]
pub struct Generated {
    /// The assembled source unit, ready for the remote compile service.
    pub source: String,
    /// Every degraded fragment embedded in `source`, in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Run one full generation pass over a program.
pub fn compile_program(
    program: &Program,
    registry: &BlockRegistry,
) -> Result<Generated, CompileError> {
    info!(program = %program.metadata.name, blocks = program.blocks.len(), "starting generation pass");

    validation::validate_program(program)?;

    let mut emitter = Emitter::new(program, registry);
    let mut body = String::new();
    for root in &program.roots {
        body.push_str(&emitter.walk(root)?);
    }

    let (sections, symbols, diagnostics) = emitter.into_parts();
    let source = Assembler::new(&sections, &symbols).assemble(&body, &program.metadata.name);

    info!(
        bytes = source.len(),
        degraded = diagnostics.len(),
        "generation pass complete"
    );
    Ok(Generated {
        source,
        diagnostics,
    })
}
