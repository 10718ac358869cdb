//! # Control Flow Blocks
//!
//! Branching and repetition. These are statement containers: they resolve
//! their condition sockets like any expression consumer, and run the walker
//! over their nested statement sockets to build the enclosed body text.

use linkme::distributed_slice;

use ember_engine::compiler::{
    indent_lines, BlockKind, BlockSpec, CompileError, Emission, Emitter, Precedence,
    BLOCK_REGISTRY,
};
use ember_engine::graph::Block;

#[distributed_slice(BLOCK_REGISTRY)]
static CONTROL_IF: BlockSpec = BlockSpec {
    tag: "control_if",
    kind: BlockKind::Statement,
    emit: emit_control_if,
};

#[distributed_slice(BLOCK_REGISTRY)]
static CONTROL_REPEAT: BlockSpec = BlockSpec {
    tag: "control_repeat",
    kind: BlockKind::Statement,
    emit: emit_control_repeat,
};

fn emit_control_if(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let cond = ctx.value_or(block, "COND", Precedence::None, "0")?;
    let then_body = ctx.statements_of(block, "DO")?;

    let mut code = format!("if ({cond}) {{\n{}}}", indent_lines(&then_body, 1));
    if block.body("ELSE").is_some() {
        let else_body = ctx.statements_of(block, "ELSE")?;
        code.push_str(&format!(" else {{\n{}}}", indent_lines(&else_body, 1)));
    }
    code.push('\n');
    Ok(Emission::stmt(code))
}

fn emit_control_repeat(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let times = ctx.value_or(block, "TIMES", Precedence::None, "10")?;
    let body = ctx.statements_of(block, "DO")?;
    Ok(Emission::stmt(format!(
        "for (int i = 0; i < {times}; i++) {{\n{}}}\n",
        indent_lines(&body, 1)
    )))
}
