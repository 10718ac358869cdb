//! Delay block.

use linkme::distributed_slice;

use ember_engine::compiler::{
    BlockKind, BlockSpec, CompileError, Emission, Emitter, Precedence, BLOCK_REGISTRY,
};
use ember_engine::graph::Block;

#[distributed_slice(BLOCK_REGISTRY)]
static WAIT_MS: BlockSpec = BlockSpec {
    tag: "wait_ms",
    kind: BlockKind::Statement,
    emit: emit_wait_ms,
};

fn emit_wait_ms(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    ctx.sections.includes.put("board", "#include \"board.h\"\n")?;
    let ms = ctx.value_or(block, "MS", Precedence::None, "1000")?;
    Ok(Emission::stmt(format!("wait_ms({ms});\n")))
}
