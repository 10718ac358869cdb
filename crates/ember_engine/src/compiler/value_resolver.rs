//! # Precedence-Aware Value Resolver
//!
//! Resolves a block's value socket to expression text, recursing depth-first
//! through whatever subtree is plugged in. The only decision made here is
//! parenthesization: a child whose top-level operator binds looser than the
//! level the parent requested gets wrapped, everything else passes through
//! untouched.

use crate::graph::{Block, FieldValue};
use super::context::{Emitter, Fragment, Precedence};
use super::CompileError;

impl<'a> Emitter<'a> {
    /// Resolve a value socket to expression text at the requested
    /// precedence. An unconnected socket falls back to a same-named shadow
    /// field if the block carries one, then to the empty string; callers
    /// that need a literal fallback of their own use [`Emitter::value_or`].
    pub fn value_of(
        &mut self,
        block: &Block,
        socket: &str,
        requested: Precedence,
    ) -> Result<String, CompileError> {
        let Some(child_id) = block.input(socket) else {
            return Ok(block
                .fields
                .get(socket)
                .map(field_constant)
                .unwrap_or_default());
        };

        let program = self.program();
        let child = program
            .block(child_id)
            .ok_or_else(|| CompileError::UnknownBlock {
                id: child_id.to_string(),
            })?;

        // A disabled subtree contributes nothing, same as an empty socket.
        if child.disabled {
            return Ok(String::new());
        }

        let emission = self.dispatch(child)?;
        match emission.into_fragment() {
            Fragment::Expression { code, precedence } => {
                if precedence > requested {
                    Ok(format!("({code})"))
                } else {
                    Ok(code)
                }
            }
            Fragment::Statement(_) => Err(CompileError::KindMismatch {
                id: child.id.clone(),
                expected: "expression",
            }),
        }
    }

    /// Like [`Emitter::value_of`], substituting a caller-chosen fallback
    /// literal when the socket is unconnected or disabled.
    pub fn value_or(
        &mut self,
        block: &Block,
        socket: &str,
        requested: Precedence,
        fallback: &str,
    ) -> Result<String, CompileError> {
        let code = self.value_of(block, socket, requested)?;
        if code.is_empty() {
            Ok(fallback.to_string())
        } else {
            Ok(code)
        }
    }
}

/// Render a shadow field as a literal constant.
fn field_constant(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => format!("\"{}\"", s.escape_default()),
        FieldValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
        FieldValue::Number(n) => format!("{n}"),
        FieldValue::Flag(b) => if *b { "1" } else { "0" }.to_string(),
    }
}
