//! Compiled script fragments

use rhai::AST;
use tracing::trace;

/// How a fragment was compiled.
///
/// Expression fragments evaluate to a value and have their argument
/// bindings cleared after every evaluation. Statement fragments may
/// define variables and functions that outlive the evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    Expression,
    Statements,
}

impl CompileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expression => "expression",
            Self::Statements => "statements",
        }
    }
}

/// An opaque compiled script.
///
/// A fragment owns its compiled form and is released when dropped or
/// passed to `destroy`. It is intentionally not `Clone`.
#[derive(Debug)]
pub struct Fragment {
    ast: AST,
    mode: CompileMode,
}

impl Fragment {
    pub(crate) fn new(ast: AST, mode: CompileMode) -> Self {
        Self { ast, mode }
    }

    pub fn mode(&self) -> CompileMode {
        self.mode
    }

    /// Whether names bound for an evaluation are removed afterwards.
    pub fn clears_bindings(&self) -> bool {
        self.mode == CompileMode::Expression
    }

    pub(crate) fn ast(&self) -> &AST {
        &self.ast
    }

    /// Release the compiled form.
    pub fn release(self) {
        trace!(mode = self.mode.as_str(), "Releasing fragment");
    }
}
