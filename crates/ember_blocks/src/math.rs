//! # Math Blocks
//!
//! Numeric literals and arithmetic operators. All of these are expression
//! blocks: they resolve their own operand sockets recursively and report
//! the precedence of their loosest top-level operator so enclosing blocks
//! can parenthesize correctly.

use linkme::distributed_slice;

use ember_engine::compiler::{
    BlockKind, BlockSpec, CompileError, Emission, Emitter, Precedence, BLOCK_REGISTRY,
};
use ember_engine::graph::Block;

#[distributed_slice(BLOCK_REGISTRY)]
static MATH_NUMBER: BlockSpec = BlockSpec {
    tag: "math_number",
    kind: BlockKind::Expression,
    emit: emit_math_number,
};

#[distributed_slice(BLOCK_REGISTRY)]
static MATH_ARITHMETIC: BlockSpec = BlockSpec {
    tag: "math_arithmetic",
    kind: BlockKind::Expression,
    emit: emit_math_arithmetic,
};

#[distributed_slice(BLOCK_REGISTRY)]
static MATH_NEGATE: BlockSpec = BlockSpec {
    tag: "math_negate",
    kind: BlockKind::Expression,
    emit: emit_math_negate,
};

/// A numeric literal from the block's `NUM` field.
///
/// Whole values print without a fractional part. Negative literals claim
/// unary precedence so `a - -5` style nestings get their parentheses.
fn emit_math_number(_ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let n = block.field_number("NUM").unwrap_or(0.0);
    let code = format_number(n);
    let precedence = if n < 0.0 {
        Precedence::Unary
    } else {
        Precedence::Atomic
    };
    Ok(Emission::expr(code, precedence))
}

/// Binary arithmetic selected by the `OP` dropdown: ADD, SUBTRACT,
/// MULTIPLY, DIVIDE or MODULO. Operands resolve at the operator's own
/// precedence; unconnected sockets fall back to `0`.
fn emit_math_arithmetic(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let (op, precedence) = match block.field_text("OP") {
        Some("ADD") => ("+", Precedence::AddSub),
        Some("SUBTRACT") => ("-", Precedence::AddSub),
        Some("MULTIPLY") => ("*", Precedence::MulDiv),
        Some("MODULO") => ("%", Precedence::MulDiv),
        _ => ("/", Precedence::MulDiv),
    };

    let a = ctx.value_or(block, "A", precedence, "0")?;
    let b = ctx.value_or(block, "B", precedence, "0")?;
    Ok(Emission::expr(format!("{a} {op} {b}"), precedence))
}

/// Arithmetic negation of the `VALUE` socket.
fn emit_math_negate(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let value = ctx.value_or(block, "VALUE", Precedence::Unary, "0")?;
    Ok(Emission::expr(format!("-{value}"), Precedence::Unary))
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
