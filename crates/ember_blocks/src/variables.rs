//! # Variable Blocks
//!
//! Variable access on top of the engine's symbol table. The editor hands us
//! opaque handles in the `VAR` field; the table turns them into stable C
//! identifiers and accumulates type marks over the walk. Declarations are
//! rendered by the assembler once the whole pass has finished, so a
//! variable first used numerically and later assigned text still declares
//! as text.

use linkme::distributed_slice;

use ember_engine::compiler::{
    BlockKind, BlockSpec, CompileError, Emission, Emitter, Precedence, VarType, BLOCK_REGISTRY,
};
use ember_engine::graph::Block;

#[distributed_slice(BLOCK_REGISTRY)]
static VARIABLE_GET: BlockSpec = BlockSpec {
    tag: "variable_get",
    kind: BlockKind::Expression,
    emit: emit_variable_get,
};

#[distributed_slice(BLOCK_REGISTRY)]
static VARIABLE_SET: BlockSpec = BlockSpec {
    tag: "variable_set",
    kind: BlockKind::Statement,
    emit: emit_variable_set,
};

fn emit_variable_get(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let handle = block.field_text("VAR").unwrap_or_default().to_string();
    let ident = ctx.symbols.resolve(&handle);
    Ok(Emission::expr(ident, Precedence::Atomic))
}

fn emit_variable_set(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let handle = block.field_text("VAR").unwrap_or_default().to_string();
    let ident = ctx.symbols.resolve(&handle);

    // Assigning a text literal retroactively widens the variable.
    if let Some(child) = block.input("VALUE").and_then(|id| ctx.program().block(id)) {
        if child.block_type == "text_string" {
            ctx.symbols.mark_type(&ident, VarType::Text);
        }
    }

    let value = ctx.value_or(block, "VALUE", Precedence::None, "0")?;
    Ok(Emission::stmt(format!("{ident} = {value};\n")))
}
