//! # Tree Walker and Final Assembler
//!
//! The walker drives emission: it iterates a statement chain in document
//! order, dispatches each block's emission function once, and concatenates
//! the returned statement fragments. Value sockets are never walked here;
//! they are reached transitively when an emission function resolves its own
//! inputs.
//!
//! The assembler runs after the walk completes and concatenates the
//! aggregation tables and the walked text into one source unit. The section
//! order is load-bearing: declarations must precede use, and every
//! initializer must run before any statement that depends on it.

use std::collections::HashSet;
use itertools::Itertools;
use tracing::debug;

use super::context::{Emitter, Fragment};
use super::sections::Sections;
use super::symbols::SymbolTable;
use super::CompileError;

impl<'a> Emitter<'a> {
    /// Walk the `next` chain from `head_id`, emitting each enabled block
    /// once and concatenating the statement fragments with no separators.
    pub fn walk(&mut self, head_id: &str) -> Result<String, CompileError> {
        let mut out = String::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut cursor = Some(head_id.to_string());

        while let Some(id) = cursor {
            if !seen.insert(id.clone()) {
                return Err(CompileError::CyclicChain { id });
            }

            let program = self.program();
            let block = program
                .block(&id)
                .ok_or_else(|| CompileError::UnknownBlock { id: id.clone() })?;

            if block.disabled {
                cursor = block.next.clone();
                continue;
            }

            let emission = self.dispatch(block)?;
            match emission.into_fragment() {
                Fragment::Statement(text) => out.push_str(&text),
                Fragment::Expression { .. } => {
                    return Err(CompileError::KindMismatch {
                        id: block.id.clone(),
                        expected: "statement",
                    });
                }
            }

            cursor = block.next.clone();
        }

        Ok(out)
    }

    /// Walk the nested chain inside one of a block's statement sockets.
    /// Used by container emitters; an empty socket yields empty text.
    pub fn statements_of(
        &mut self,
        block: &crate::graph::Block,
        socket: &str,
    ) -> Result<String, CompileError> {
        match block.body(socket) {
            Some(head) => {
                let head = head.to_string();
                self.walk(&head)
            }
            None => Ok(String::new()),
        }
    }
}

/// Indent every non-empty line by `level` steps of four spaces.
pub fn indent_lines(text: &str, level: usize) -> String {
    let pad = "    ".repeat(level);
    let mut out = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            out.push_str(&pad);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Orders and concatenates the aggregation tables and the walked statement
/// text into one compilable source unit.
pub struct Assembler<'a> {
    sections: &'a Sections,
    symbols: &'a SymbolTable,
}

impl<'a> Assembler<'a> {
    pub fn new(sections: &'a Sections, symbols: &'a SymbolTable) -> Self {
        Self { sections, symbols }
    }

    pub fn assemble(&self, body: &str, program_name: &str) -> String {
        let mut parts: Vec<String> = Vec::new();

        parts.push(format!(
            "// Auto-generated from the Ember Blocks program \"{program_name}\"\n\
             // DO NOT EDIT - changes will be overwritten\n"
        ));

        if !self.sections.includes.is_empty() {
            parts.push(self.sections.includes.fragments().join(""));
        }

        let globals = self.globals_section();
        if !globals.is_empty() {
            parts.push(globals);
        }

        let prototypes = self.prototypes_section();
        if !prototypes.is_empty() {
            parts.push(prototypes);
        }

        for (name, helper) in self.sections.helpers.iter() {
            debug!(helper = name, "emitting helper body");
            parts.push(format!(
                "{} {{\n{}}}\n",
                helper.signature,
                indent_lines(&helper.body, 1)
            ));
        }

        for (task, region) in self.sections.tasks.iter() {
            let mut text = format!("void {task}(void) {{\n");
            for stmt in region.startup.fragments() {
                text.push_str(&indent_lines(stmt, 1));
            }
            if let Some(stream) = &region.body {
                text.push_str(&indent_lines(stream, 1));
            }
            text.push_str("}\n");
            parts.push(text);
        }

        let mut main = String::from("int main() {\n");
        for stmt in self.sections.startup.fragments() {
            main.push_str(&indent_lines(stmt, 1));
        }
        main.push_str(&indent_lines(body, 1));
        main.push_str("}\n");
        parts.push(main);

        parts.iter().join("\n")
    }

    /// Keyed global declarations first, then the variable declarations the
    /// symbol table accumulated over the walk.
    fn globals_section(&self) -> String {
        let mut out: String = self.sections.globals.fragments().collect();
        out.push_str(&self.symbols.declarations());
        out
    }

    /// Forward declarations: helpers first, then the task functions, so
    /// spawn call sites inside other tasks stay ahead of the definitions
    /// they reference.
    fn prototypes_section(&self) -> String {
        let mut out = String::new();
        for (_, helper) in self.sections.helpers.iter() {
            out.push_str(&format!("{};\n", helper.signature));
        }
        for (task, _) in self.sections.tasks.iter() {
            out.push_str(&format!("void {task}(void);\n"));
        }
        out
    }
}
