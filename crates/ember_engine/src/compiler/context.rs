//! # Generation Context
//!
//! The per-pass context object handed by reference to every emission
//! function. It bundles the read-only tree and registry with all mutable
//! pass state: the symbol table, the section aggregation tables, and the
//! list of degraded fragments collected along the way.
//!
//! There are no process-wide tables; a fresh `Emitter` per pass is what
//! keeps generation re-entrant and the test suite honest.

use tracing::warn;

use crate::graph::{Block, Program};
use super::registry::BlockRegistry;
use super::sections::Sections;
use super::symbols::SymbolTable;
use super::CompileError;

/// Expression binding strength, ordered tightest to loosest. Used only to
/// decide parenthesization when an expression fragment lands in a value
/// socket that requested a tighter level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Atomic,
    Unary,
    MulDiv,
    AddSub,
    Relational,
    Logical,
    None,
}

/// Text produced by one emission call.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Zero or more complete, self-terminated statements.
    Statement(String),
    /// An expression and the precedence of its loosest top-level operator.
    /// Never carries a trailing terminator.
    Expression { code: String, precedence: Precedence },
}

/// The typed result of one emission call. Degraded results still carry a
/// compilable fragment - a diagnostic comment in statement position, a
/// fallback literal in value position - so generation stays total.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    Emitted(Fragment),
    Degraded { fragment: Fragment, reason: String },
}

/// One degraded emission, recorded so callers can enumerate every
/// best-effort substitution in a pass without string-matching the output.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub block_id: String,
    pub reason: String,
}

impl Emission {
    pub fn stmt(text: impl Into<String>) -> Self {
        Emission::Emitted(Fragment::Statement(text.into()))
    }

    pub fn expr(code: impl Into<String>, precedence: Precedence) -> Self {
        Emission::Emitted(Fragment::Expression {
            code: code.into(),
            precedence,
        })
    }

    pub fn degraded(fragment: Fragment, reason: impl Into<String>) -> Self {
        Emission::Degraded {
            fragment,
            reason: reason.into(),
        }
    }

    /// The standard degraded statement for a missing initializer: a single
    /// comment line at the point of failure.
    pub fn degraded_stmt(resource: &str) -> Self {
        Emission::Degraded {
            fragment: Fragment::Statement(format!("// {resource} is not initialized\n")),
            reason: format!("{resource} is not initialized"),
        }
    }

    /// The standard degraded expression: a compilable fallback literal with
    /// the diagnostic attached as a block comment.
    pub fn degraded_value(resource: &str) -> Self {
        Emission::Degraded {
            fragment: Fragment::Expression {
                code: format!("0 /* {resource} is not initialized */"),
                precedence: Precedence::Atomic,
            },
            reason: format!("{resource} is not initialized"),
        }
    }

    pub fn fragment(&self) -> &Fragment {
        match self {
            Emission::Emitted(fragment) => fragment,
            Emission::Degraded { fragment, .. } => fragment,
        }
    }

    pub fn into_fragment(self) -> Fragment {
        match self {
            Emission::Emitted(fragment) => fragment,
            Emission::Degraded { fragment, .. } => fragment,
        }
    }
}

/// The generation context. One per pass; never shared across passes.
pub struct Emitter<'a> {
    program: &'a Program,
    registry: &'a BlockRegistry,
    pub symbols: SymbolTable,
    pub sections: Sections,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Emitter<'a> {
    pub fn new(program: &'a Program, registry: &'a BlockRegistry) -> Self {
        Self {
            program,
            registry,
            symbols: SymbolTable::new(),
            sections: Sections::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    pub fn registry(&self) -> &'a BlockRegistry {
        self.registry
    }

    /// Invoke the emission function registered for a block's type tag.
    /// Degraded results are recorded here, in the one place every emission
    /// passes through.
    pub fn dispatch(&mut self, block: &Block) -> Result<Emission, CompileError> {
        let registry = self.registry;
        let spec = registry.spec(&block.block_type).ok_or_else(|| {
            CompileError::UnknownBlockType {
                id: block.id.clone(),
                block_type: block.block_type.clone(),
            }
        })?;

        let emission = (spec.emit)(self, block)?;
        if let Emission::Degraded { reason, .. } = &emission {
            warn!(block = %block.id, %reason, "emission degraded");
            self.diagnostics.push(Diagnostic {
                block_id: block.id.clone(),
                reason: reason.clone(),
            });
        }
        Ok(emission)
    }

    /// Precondition scan: true when no enabled block of the given
    /// initializer tag exists anywhere in the tree. Emission functions call
    /// this first and return a degraded fragment - with no table writes -
    /// when it fires.
    pub fn missing_initializer(&self, initializer_tag: &str) -> bool {
        !self.program.contains_enabled(initializer_tag)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(super) fn into_parts(self) -> (Sections, SymbolTable, Vec<Diagnostic>) {
        (self.sections, self.symbols, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_orders_tightest_to_loosest() {
        assert!(Precedence::Atomic < Precedence::Unary);
        assert!(Precedence::MulDiv < Precedence::AddSub);
        assert!(Precedence::AddSub < Precedence::Relational);
        assert!(Precedence::Logical < Precedence::None);
    }

    #[test]
    fn degraded_statement_is_a_comment_line() {
        let emission = Emission::degraded_stmt("serial bus");
        match emission.fragment() {
            Fragment::Statement(text) => {
                assert_eq!(text, "// serial bus is not initialized\n");
            }
            other => panic!("unexpected fragment: {other:?}"),
        }
    }

    #[test]
    fn degraded_value_stays_compilable() {
        let emission = Emission::degraded_value("serial bus");
        match emission.fragment() {
            Fragment::Expression { code, precedence } => {
                assert!(code.starts_with('0'));
                assert_eq!(*precedence, Precedence::Atomic);
            }
            other => panic!("unexpected fragment: {other:?}"),
        }
    }
}
