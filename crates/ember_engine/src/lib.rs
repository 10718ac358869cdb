//! Ember Engine Library
//!
//! The code generation and aggregation engine behind the Ember Blocks
//! visual editor. The editor builds a typed block tree; every block type's
//! emission function calls back into this engine for precedence-aware
//! expression resolution, identifier sanitization, deduplicating section
//! tables, precondition scanning and concurrent-task placement; the engine
//! assembles the accumulated fragments into one compilable source unit.

pub mod compiler;
pub mod graph;

pub use compiler::{compile_program, BlockRegistry, CompileError, Generated};
pub use graph::{Block, FieldValue, Program};

pub const ENGINE_NAME: &str = env!("CARGO_PKG_NAME");
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
