//! # Procedure and Task Blocks
//!
//! A procedure definition is a top-level container whose body chain becomes
//! either a helper function or, when some enabled spawn block launches it,
//! the statement stream of that task's function. The definition block never
//! contributes to the walked text itself; everything it produces flows
//! through the aggregation tables.
//!
//! The definition/spawn relationship is not stored anywhere - the engine
//! re-derives it by scanning, which is also what routes any peripheral
//! initializers inside a spawned body into the task's own startup region.

use linkme::distributed_slice;

use ember_engine::compiler::{
    sanitize_identifier, BlockKind, BlockSpec, CompileError, Emission, Emitter, Fragment,
    BLOCK_REGISTRY, NAME_FIELD,
};
use ember_engine::graph::Block;

const DEFINE_TAG: &str = "procedure_define";

#[distributed_slice(BLOCK_REGISTRY)]
static PROCEDURE_DEFINE: BlockSpec = BlockSpec {
    tag: DEFINE_TAG,
    kind: BlockKind::ProcedureDefinition,
    emit: emit_procedure_define,
};

#[distributed_slice(BLOCK_REGISTRY)]
static PROCEDURE_CALL: BlockSpec = BlockSpec {
    tag: "procedure_call",
    kind: BlockKind::Statement,
    emit: emit_procedure_call,
};

#[distributed_slice(BLOCK_REGISTRY)]
static TASK_SPAWN: BlockSpec = BlockSpec {
    tag: "task_spawn",
    kind: BlockKind::TaskSpawn,
    emit: emit_task_spawn,
};

fn procedure_exists(ctx: &Emitter<'_>, name: &str) -> bool {
    ctx.program()
        .enabled_blocks_of_type(DEFINE_TAG)
        .any(|b| b.field_text(NAME_FIELD) == Some(name))
}

fn degraded_missing_procedure(name: &str) -> Emission {
    let reason = format!("procedure {name} is not defined");
    Emission::degraded(Fragment::Statement(format!("// {reason}\n")), reason)
}

fn emit_procedure_define(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let name = block
        .field_text(NAME_FIELD)
        .unwrap_or("procedure")
        .to_string();
    let ident = sanitize_identifier(&name);
    let body = ctx.statements_of(block, "BODY")?;

    match ctx.spawned_task_for(&name) {
        // The task function itself is assembled by the engine; this block
        // only supplies the statement stream.
        Some(task) => ctx.sections.tasks.set_body(&task, &body)?,
        None => ctx
            .sections
            .helpers
            .put(&ident, &format!("void {ident}(void)"), &body)?,
    }
    Ok(Emission::stmt(String::new()))
}

fn emit_procedure_call(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let name = block.field_text(NAME_FIELD).unwrap_or_default().to_string();
    if !procedure_exists(ctx, &name) {
        return Ok(degraded_missing_procedure(&name));
    }
    Ok(Emission::stmt(format!("{}();\n", sanitize_identifier(&name))))
}

fn emit_task_spawn(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
    let name = block.field_text(NAME_FIELD).unwrap_or_default().to_string();
    if !procedure_exists(ctx, &name) {
        return Ok(degraded_missing_procedure(&name));
    }
    ctx.sections.includes.put("tasks", "#include \"tasks.h\"\n")?;
    Ok(Emission::stmt(format!(
        "task_spawn({});\n",
        sanitize_identifier(&name)
    )))
}
