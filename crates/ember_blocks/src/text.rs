//! Text literal block.

use linkme::distributed_slice;

use ember_engine::compiler::{
    BlockKind, BlockSpec, CompileError, Emission, Emitter, Precedence, BLOCK_REGISTRY,
};
use ember_engine::graph::Block;

#[distributed_slice(BLOCK_REGISTRY)]
static TEXT_STRING: BlockSpec = BlockSpec {
    tag: "text_string",
    kind: BlockKind::Expression,
    emit: emit_text_string,
};

fn emit_text_string(_ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let text = block.field_text("TEXT").unwrap_or_default();
    Ok(Emission::expr(
        format!("\"{}\"", text.escape_default()),
        Precedence::Atomic,
    ))
}
