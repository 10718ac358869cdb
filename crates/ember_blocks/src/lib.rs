//! # Ember Standard Block Library
//!
//! Emission functions for the block types that ship with the editor,
//! registered into the engine's registry at link time. Each module covers
//! one palette category:
//!
//! - [`math`] / [`logic`] / [`text`] - literal and operator expressions
//! - [`variables`] - variable access backed by the engine's symbol table
//! - [`serial`] - the serial bus peripheral (initializer plus consumers)
//! - [`timing`] - delays
//! - [`control`] - branching and loops
//! - [`procedures`] - procedure definitions, calls, and task spawning
//!
//! The full editor palette is far larger; this crate carries the
//! representative core that every other emitter is patterned on.

use ember_engine::compiler::BlockRegistry;

pub mod control;
pub mod logic;
pub mod math;
pub mod procedures;
pub mod serial;
pub mod text;
pub mod timing;
pub mod variables;

/// The registry containing every block type in this library.
pub fn standard_registry() -> BlockRegistry {
    BlockRegistry::standard()
}
