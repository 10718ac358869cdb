//! Scenario tests for the generation engine, driven by a small synthetic
//! block set that mirrors how the standard library uses the context API.

#[cfg(test)]
mod tests {
    use crate::compiler::*;
    use crate::graph::*;

    fn emit_lit(_ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
        let n = block.field_number("NUM").unwrap_or(0.0);
        let code = if n.fract() == 0.0 {
            format!("{}", n as i64)
        } else {
            format!("{n}")
        };
        Ok(Emission::expr(code, Precedence::Atomic))
    }

    /// Synthetic precedence probe: requests its input at MulDiv and claims
    /// whatever the CLAIM field says about its own result.
    fn emit_wrap(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
        let inner = ctx.value_or(block, "A", Precedence::MulDiv, "1")?;
        match block.field_text("CLAIM") {
            Some("loose") => Ok(Emission::expr(format!("{inner} | 1"), Precedence::Logical)),
            _ => Ok(Emission::expr(format!("~{inner}"), Precedence::Atomic)),
        }
    }

    fn emit_sink(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
        let value = ctx.value_or(block, "A", Precedence::None, "0")?;
        Ok(Emission::stmt(format!("use({value});\n")))
    }

    fn emit_bus_init(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
        ctx.sections
            .includes
            .put("bus-31-30", "#include \"serial.h\"\n")?;
        ctx.sections
            .globals
            .put("bus-31-30", "serial *bus_31_30;\n")?;
        ctx.startup_or_task(block, "bus-31-30", "bus_31_30 = serial_open(31, 30, 115200);\n")?;
        Ok(Emission::stmt(String::new()))
    }

    /// Consumer of the bus resource: re-requests the shared keys, then
    /// emits its call site. Degrades without writes when no initializer
    /// block exists anywhere in the tree.
    fn emit_bus_send(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
        if ctx.missing_initializer("bus_init") {
            return Ok(Emission::degraded_stmt("serial bus"));
        }
        ctx.sections
            .includes
            .put("bus-31-30", "#include \"serial.h\"\n")?;
        ctx.sections
            .globals
            .put("bus-31-30", "serial *bus_31_30;\n")?;
        ctx.startup_or_task(block, "bus-31-30", "bus_31_30 = serial_open(31, 30, 115200);\n")?;
        let value = ctx.value_or(block, "VALUE", Precedence::None, "0")?;
        Ok(Emission::stmt(format!("serial_send(bus_31_30, {value});\n")))
    }

    fn emit_fmt_call(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
        ctx.sections.includes.put("fmt", "#include \"fmt.h\"\n")?;
        ctx.sections.helpers.put(
            "fmt_dec",
            "char *fmt_dec(int value)",
            "static char buf[16];\nsprintf(buf, \"%d\", value);\nreturn buf;\n",
        )?;
        let value = ctx.value_or(block, "A", Precedence::None, "0")?;
        Ok(Emission::stmt(format!("display(fmt_dec({value}));\n")))
    }

    fn emit_proc_def(ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
        let name = block.field_text(NAME_FIELD).unwrap_or("procedure").to_string();
        let ident = sanitize_identifier(&name);
        let body = ctx.statements_of(block, "BODY")?;
        match ctx.spawned_task_for(&name) {
            Some(task) => ctx.sections.tasks.set_body(&task, &body)?,
            None => {
                ctx.sections
                    .helpers
                    .put(&ident, &format!("void {ident}(void)"), &body)?
            }
        }
        Ok(Emission::stmt(String::new()))
    }

    fn emit_spawn(_ctx: &mut Emitter<'_>, block: &Block) -> Result<Emission, CompileError> {
        let name = block.field_text(NAME_FIELD).unwrap_or("procedure");
        Ok(Emission::stmt(format!(
            "task_spawn({});\n",
            sanitize_identifier(name)
        )))
    }

    fn test_registry() -> BlockRegistry {
        let mut registry = BlockRegistry::new();
        for spec in [
            BlockSpec { tag: "lit", kind: BlockKind::Expression, emit: emit_lit },
            BlockSpec { tag: "wrap", kind: BlockKind::Expression, emit: emit_wrap },
            BlockSpec { tag: "sink", kind: BlockKind::Statement, emit: emit_sink },
            BlockSpec { tag: "bus_init", kind: BlockKind::Statement, emit: emit_bus_init },
            BlockSpec { tag: "bus_send", kind: BlockKind::Statement, emit: emit_bus_send },
            BlockSpec { tag: "fmt_call", kind: BlockKind::Statement, emit: emit_fmt_call },
            BlockSpec { tag: "proc_def", kind: BlockKind::ProcedureDefinition, emit: emit_proc_def },
            BlockSpec { tag: "spawn", kind: BlockKind::TaskSpawn, emit: emit_spawn },
        ] {
            registry.register(spec);
        }
        registry
    }

    fn lit_block(id: &str, n: f64) -> Block {
        let mut block = Block::new(id, "lit");
        block.set_field("NUM", FieldValue::Number(n));
        block
    }

    fn wrap_block(id: &str, claim: &str) -> Block {
        let mut block = Block::new(id, "wrap");
        block.set_field("CLAIM", FieldValue::Text(claim.to_string()));
        block
    }

    /// Build a sink -> wrap -> wrap -> wrap -> lit chain with a uniform
    /// precedence claim.
    fn precedence_program(claim: &str) -> Program {
        let mut program = Program::new("precedence");
        program.add_root(Block::new("sink", "sink"));
        program.add_block(wrap_block("w1", claim));
        program.add_block(wrap_block("w2", claim));
        program.add_block(wrap_block("w3", claim));
        program.add_block(lit_block("n", 7.0));
        program.connect_input("sink", "A", "w1");
        program.connect_input("w1", "A", "w2");
        program.connect_input("w2", "A", "w3");
        program.connect_input("w3", "A", "n");
        program
    }

    #[test]
    fn looser_children_are_parenthesized_at_every_level() {
        let program = precedence_program("loose");
        let generated = compile_program(&program, &test_registry()).unwrap();

        assert!(
            generated.source.contains("use(((7 | 1) | 1) | 1);"),
            "unexpected body in:\n{}",
            generated.source
        );
    }

    #[test]
    fn tighter_children_are_never_parenthesized() {
        let program = precedence_program("tight");
        let generated = compile_program(&program, &test_registry()).unwrap();

        assert!(
            generated.source.contains("use(~~~7);"),
            "unexpected body in:\n{}",
            generated.source
        );
        assert!(!generated.source.contains("(~"));
    }

    #[test]
    fn unconnected_socket_resolves_to_fallback() {
        let mut program = Program::new("unconnected");
        program.add_root(Block::new("sink", "sink"));

        let generated = compile_program(&program, &test_registry()).unwrap();
        assert!(generated.source.contains("use(0);"));
    }

    #[test]
    fn sections_are_assembled_in_fixed_order() {
        let mut program = Program::new("ordering");
        program.add_root(Block::new("init", "bus_init"));
        let mut send = Block::new("send", "bus_send");
        send.set_field("VALUE", FieldValue::Number(0.0));
        program.add_block(send);
        program.add_block(Block::new("fmt", "fmt_call"));
        program.connect_next("init", "send");
        program.connect_next("send", "fmt");

        let generated = compile_program(&program, &test_registry()).unwrap();
        let source = &generated.source;

        let include_at = source.find("#include \"serial.h\"").unwrap();
        let global_at = source.find("serial *bus_31_30;").unwrap();
        let proto_at = source.find("char *fmt_dec(int value);").unwrap();
        let helper_at = source.find("char *fmt_dec(int value) {").unwrap();
        let main_at = source.find("int main() {").unwrap();
        let open_at = source.find("bus_31_30 = serial_open").unwrap();
        let send_at = source.find("serial_send(bus_31_30").unwrap();

        assert!(include_at < global_at);
        assert!(global_at < proto_at);
        assert!(proto_at < helper_at);
        assert!(helper_at < main_at);
        assert!(main_at < open_at, "startup must live inside main");
        assert!(open_at < send_at, "startup must precede walked statements");
    }

    #[test]
    fn missing_initializer_short_circuits_without_table_writes() {
        let mut program = Program::new("degraded");
        program.add_root(Block::new("send", "bus_send"));

        let registry = test_registry();
        let mut emitter = Emitter::new(&program, &registry);
        let body = emitter.walk("send").unwrap();

        assert_eq!(body, "// serial bus is not initialized\n");
        assert!(emitter.sections.includes.is_empty());
        assert!(emitter.sections.globals.is_empty());
        assert!(emitter.sections.startup.is_empty());
        assert_eq!(emitter.diagnostics().len(), 1);
        assert_eq!(emitter.diagnostics()[0].block_id, "send");
    }

    #[test]
    fn degraded_fragments_are_enumerable_from_the_result() {
        let mut program = Program::new("degraded");
        program.add_root(Block::new("send", "bus_send"));

        let generated = compile_program(&program, &test_registry()).unwrap();
        assert!(generated.source.contains("// serial bus is not initialized"));
        assert_eq!(generated.diagnostics.len(), 1);
        assert_eq!(generated.diagnostics[0].reason, "serial bus is not initialized");
    }

    /// A disabled initializer must not satisfy the precondition scan.
    #[test]
    fn disabled_initializer_does_not_satisfy_the_scan() {
        let mut program = Program::new("disabled");
        let mut init = Block::new("init", "bus_init");
        init.disabled = true;
        program.add_root(init);
        program.add_block(Block::new("send", "bus_send"));
        program.connect_next("init", "send");

        let generated = compile_program(&program, &test_registry()).unwrap();
        assert!(generated.source.contains("// serial bus is not initialized"));
        assert!(!generated.source.contains("serial_open"));
    }

    #[test]
    fn shared_resource_is_emitted_once_with_two_call_sites() {
        let mut program = Program::new("dedup");
        program.add_root(Block::new("init", "bus_init"));
        let mut send_a = Block::new("send_a", "bus_send");
        send_a.set_field("VALUE", FieldValue::Number(1.0));
        let mut send_b = Block::new("send_b", "bus_send");
        send_b.set_field("VALUE", FieldValue::Number(2.0));
        program.add_block(send_a);
        program.add_block(send_b);
        program.connect_next("init", "send_a");
        program.connect_next("send_a", "send_b");

        let generated = compile_program(&program, &test_registry()).unwrap();
        let source = &generated.source;

        assert_eq!(source.matches("#include \"serial.h\"").count(), 1);
        assert_eq!(source.matches("serial *bus_31_30;").count(), 1);
        assert_eq!(source.matches("bus_31_30 = serial_open").count(), 1);
        assert_eq!(source.matches("serial_send(bus_31_30").count(), 2);
    }

    fn task_program(with_spawn: bool) -> Program {
        let mut program = Program::new("tasks");
        let mut proc_def = Block::new("proc", "proc_def");
        proc_def.set_field(NAME_FIELD, FieldValue::Text("blink".to_string()));
        program.add_root(proc_def);
        program.add_block(Block::new("init", "bus_init"));
        program.connect_body("proc", "BODY", "init");

        if with_spawn {
            let mut spawn = Block::new("spawn", "spawn");
            spawn.set_field(NAME_FIELD, FieldValue::Text("blink".to_string()));
            program.add_root(spawn);
        }
        program
    }

    #[test]
    fn initializer_inside_spawned_procedure_lands_in_the_task_region() {
        let program = task_program(true);
        let registry = test_registry();
        let mut emitter = Emitter::new(&program, &registry);
        for root in program.roots.clone() {
            emitter.walk(&root).unwrap();
        }

        let region = emitter.sections.tasks.get("blink").expect("task region");
        assert!(region.startup.contains_key("bus-31-30"));
        assert!(!emitter.sections.startup.contains_key("bus-31-30"));
    }

    #[test]
    fn removing_the_spawn_moves_the_initializer_back_to_shared_startup() {
        let program = task_program(false);
        let registry = test_registry();
        let mut emitter = Emitter::new(&program, &registry);
        for root in program.roots.clone() {
            emitter.walk(&root).unwrap();
        }

        assert!(emitter.sections.startup.contains_key("bus-31-30"));
        assert!(emitter.sections.tasks.get("blink").is_none());
    }

    #[test]
    fn spawned_task_is_assembled_before_main_with_its_startup_first() {
        let program = task_program(true);
        let generated = compile_program(&program, &test_registry()).unwrap();
        let source = &generated.source;

        let proto_at = source.find("void blink(void);").unwrap();
        let task_at = source.find("void blink(void) {").unwrap();
        let open_at = source.find("bus_31_30 = serial_open").unwrap();
        let main_at = source.find("int main() {").unwrap();

        assert!(proto_at < task_at);
        assert!(task_at < open_at && open_at < main_at, "task startup belongs to the task body");
        assert!(source.contains("task_spawn(blink);"));
    }

    #[test]
    fn unknown_block_type_is_fatal() {
        let mut program = Program::new("unknown");
        program.add_root(Block::new("x", "mystery"));

        let err = compile_program(&program, &test_registry()).unwrap_err();
        assert!(matches!(err, CompileError::UnknownBlockType { .. }));
    }

    #[test]
    fn expression_block_in_statement_position_is_fatal() {
        let mut program = Program::new("mismatch");
        program.add_root(lit_block("n", 1.0));

        let err = compile_program(&program, &test_registry()).unwrap_err();
        assert!(matches!(err, CompileError::KindMismatch { .. }));
    }
}
