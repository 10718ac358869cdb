//! # Logic Blocks
//!
//! Boolean literals, comparisons, and the two binary connectives.

use linkme::distributed_slice;

use ember_engine::compiler::{
    BlockKind, BlockSpec, CompileError, Emission, Emitter, Precedence, BLOCK_REGISTRY,
};
use ember_engine::graph::Block;

#[distributed_slice(BLOCK_REGISTRY)]
static LOGIC_BOOLEAN: BlockSpec = BlockSpec {
    tag: "logic_boolean",
    kind: BlockKind::Expression,
    emit: emit_logic_boolean,
};

#[distributed_slice(BLOCK_REGISTRY)]
static LOGIC_COMPARE: BlockSpec = BlockSpec {
    tag: "logic_compare",
    kind: BlockKind::Expression,
    emit: emit_logic_compare,
};

#[distributed_slice(BLOCK_REGISTRY)]
static LOGIC_OPERATION: BlockSpec = BlockSpec {
    tag: "logic_operation",
    kind: BlockKind::Expression,
    emit: emit_logic_operation,
};

#[distributed_slice(BLOCK_REGISTRY)]
static LOGIC_NEGATE: BlockSpec = BlockSpec {
    tag: "logic_negate",
    kind: BlockKind::Expression,
    emit: emit_logic_negate,
};

fn emit_logic_boolean(_ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let value = block.field_flag("BOOL").unwrap_or(false);
    Ok(Emission::expr(if value { "1" } else { "0" }, Precedence::Atomic))
}

/// Comparison selected by the `OP` dropdown: EQ, NEQ, LT, LTE, GT, GTE.
fn emit_logic_compare(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let op = match block.field_text("OP") {
        Some("NEQ") => "!=",
        Some("LT") => "<",
        Some("LTE") => "<=",
        Some("GT") => ">",
        Some("GTE") => ">=",
        _ => "==",
    };

    let a = ctx.value_or(block, "A", Precedence::Relational, "0")?;
    let b = ctx.value_or(block, "B", Precedence::Relational, "0")?;
    Ok(Emission::expr(format!("{a} {op} {b}"), Precedence::Relational))
}

/// `AND` / `OR` over the two operand sockets.
fn emit_logic_operation(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let op = match block.field_text("OP") {
        Some("OR") => "||",
        _ => "&&",
    };

    let a = ctx.value_or(block, "A", Precedence::Logical, "0")?;
    let b = ctx.value_or(block, "B", Precedence::Logical, "0")?;
    Ok(Emission::expr(format!("{a} {op} {b}"), Precedence::Logical))
}

fn emit_logic_negate(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let value = ctx.value_or(block, "VALUE", Precedence::Unary, "0")?;
    Ok(Emission::expr(format!("!{value}"), Precedence::Unary))
}
