//! # Serial Bus Blocks
//!
//! The canonical peripheral: one initializer block plus the consumers that
//! depend on it. The initializer contributes the `#include`, the bus
//! handle global, and the `serial_open` call - routed into shared startup
//! or into a task region depending on where the block sits. Consumers scan
//! for the initializer first and degrade to a diagnostic comment when it is
//! missing anywhere in the tree.
//!
//! Resource keys follow the `bus-<rx>-<tx>` convention. Any block that
//! wants to share this bus must use the identical key string.

use linkme::distributed_slice;

use ember_engine::compiler::{
    BlockKind, BlockSpec, CompileError, Emission, Emitter, Precedence, VarType, BLOCK_REGISTRY,
};
use ember_engine::graph::Block;

use crate::math::format_number;

const INIT_TAG: &str = "serial_init";

#[distributed_slice(BLOCK_REGISTRY)]
static SERIAL_INIT: BlockSpec = BlockSpec {
    tag: INIT_TAG,
    kind: BlockKind::Statement,
    emit: emit_serial_init,
};

#[distributed_slice(BLOCK_REGISTRY)]
static SERIAL_WRITE_TEXT: BlockSpec = BlockSpec {
    tag: "serial_write_text",
    kind: BlockKind::Statement,
    emit: emit_serial_write_text,
};

#[distributed_slice(BLOCK_REGISTRY)]
static SERIAL_WRITE_NUMBER: BlockSpec = BlockSpec {
    tag: "serial_write_number",
    kind: BlockKind::Statement,
    emit: emit_serial_write_number,
};

#[distributed_slice(BLOCK_REGISTRY)]
static SERIAL_READ_BUFFER: BlockSpec = BlockSpec {
    tag: "serial_read_buffer",
    kind: BlockKind::Statement,
    emit: emit_serial_read_buffer,
};

/// Pin pair and baud rate of the bus an emitter should talk to: the fields
/// of the first enabled initializer in the tree.
fn bus_config(ctx: &Emitter<'_>) -> Option<(i64, i64, i64)> {
    let init = ctx.program().enabled_blocks_of_type(INIT_TAG).next()?;
    Some(config_of(init))
}

fn config_of(block: &Block) -> (i64, i64, i64) {
    let rx = block.field_number("RX").unwrap_or(31.0) as i64;
    let tx = block.field_number("TX").unwrap_or(30.0) as i64;
    let baud = block.field_number("BAUD").unwrap_or(115200.0) as i64;
    (rx, tx, baud)
}

fn bus_name(rx: i64, tx: i64) -> String {
    format!("bus_{rx}_{tx}")
}

/// Open the serial bus. The statement itself lands in startup - shared or
/// task-local per the placement resolver - so the walked statement stream
/// gets nothing from this block.
fn emit_serial_init(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let (rx, tx, baud) = config_of(block);
    let bus = bus_name(rx, tx);
    let key = format!("bus-{rx}-{tx}");

    ctx.sections.includes.put("serial", "#include \"serial.h\"\n")?;
    ctx.sections
        .globals
        .put(&key, &format!("serial *{bus};\n"))?;
    ctx.startup_or_task(
        block,
        &key,
        &format!("{bus} = serial_open({rx}, {tx}, {baud});\n"),
    )?;
    Ok(Emission::stmt(String::new()))
}

fn emit_serial_write_text(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    if ctx.missing_initializer(INIT_TAG) {
        return Ok(Emission::degraded_stmt("serial bus"));
    }
    let (rx, tx, _) = bus_config(ctx).unwrap_or((31, 30, 115200));
    let bus = bus_name(rx, tx);
    let value = ctx.value_or(block, "VALUE", Precedence::None, "\"\"")?;
    Ok(Emission::stmt(format!("serial_puts({bus}, {value});\n")))
}

/// Numbers go over the wire as decimal text, shared through the `fmt_dec`
/// helper so every writer in the program uses one formatter.
fn emit_serial_write_number(
    ctx: &mut Emitter<'_>,
    block: &Block,
) -> Result<Emission, CompileError> {
    if ctx.missing_initializer(INIT_TAG) {
        return Ok(Emission::degraded_stmt("serial bus"));
    }
    let (rx, tx, _) = bus_config(ctx).unwrap_or((31, 30, 115200));
    let bus = bus_name(rx, tx);

    ctx.sections.includes.put("fmt", "#include \"fmt.h\"\n")?;
    ctx.sections.helpers.put(
        "fmt_dec",
        "char *fmt_dec(int value)",
        "static char buf[16];\nfmt_int(buf, sizeof(buf), value);\nreturn buf;\n",
    )?;

    let value = ctx.value_or(block, "VALUE", Precedence::None, "0")?;
    Ok(Emission::stmt(format!(
        "serial_puts({bus}, fmt_dec({value}));\n"
    )))
}

/// Read up to `LEN` characters into a variable, which this block thereby
/// widens to a fixed-length buffer.
fn emit_serial_read_buffer(
    ctx: &mut Emitter<'_>,
    block: &Block,
) -> Result<Emission, CompileError> {
    if ctx.missing_initializer(INIT_TAG) {
        return Ok(Emission::degraded_stmt("serial bus"));
    }
    let (rx, tx, _) = bus_config(ctx).unwrap_or((31, 30, 115200));
    let bus = bus_name(rx, tx);

    let handle = block.field_text("VAR").unwrap_or_default().to_string();
    let ident = ctx.symbols.resolve(&handle);
    let len = format_number(block.field_number("LEN").unwrap_or(32.0));
    ctx.symbols.mark_type(&ident, VarType::Buffer);
    ctx.symbols.mark_length(&ident, &len);

    Ok(Emission::stmt(format!(
        "serial_read({bus}, {ident}, {len});\n"
    )))
}
