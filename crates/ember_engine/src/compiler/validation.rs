//! Upfront shape checks on the incoming tree.
//!
//! Runs before any emission: an empty program, a link to a block id that is
//! not in the map, or a cyclic `next` chain is a fatal precondition failure.
//! Unknown type tags are deliberately not checked here - they surface at
//! dispatch time, which keeps validation independent of any registry.

use std::collections::HashSet;

use crate::graph::Program;
use super::CompileError;

pub fn validate_program(program: &Program) -> Result<(), CompileError> {
    if program.blocks.is_empty() {
        return Err(CompileError::EmptyProgram);
    }

    for root in &program.roots {
        ensure_known(program, root)?;
    }

    for block in program.blocks.values() {
        for target in block
            .next
            .iter()
            .chain(block.parent.iter())
            .chain(block.inputs.values())
            .chain(block.bodies.values())
        {
            ensure_known(program, target)?;
        }
    }

    // Every chain head: the declared roots plus each statement socket.
    let heads = program
        .roots
        .iter()
        .chain(program.blocks.values().flat_map(|b| b.bodies.values()));
    for head in heads {
        check_chain(program, head)?;
    }

    Ok(())
}

fn ensure_known(program: &Program, id: &str) -> Result<(), CompileError> {
    if program.block(id).is_none() {
        return Err(CompileError::UnknownBlock { id: id.to_string() });
    }
    Ok(())
}

fn check_chain(program: &Program, head: &str) -> Result<(), CompileError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut cursor = Some(head);
    while let Some(id) = cursor {
        if !seen.insert(id) {
            return Err(CompileError::CyclicChain { id: id.to_string() });
        }
        cursor = program.block(id).and_then(|b| b.next.as_deref());
    }
    Ok(())
}
