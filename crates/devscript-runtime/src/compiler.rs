//! Two-stage compilation of script source

use crate::context::EngineContext;
use crate::fragment::{CompileMode, Fragment};
use devscript_core::{ScriptError, ScriptResult};
use rhai::ParseError;
use tracing::{trace, warn};

impl EngineContext {
    /// Compile `source` into a fragment.
    ///
    /// The source is first tried as a single expression. If that fails it is
    /// compiled again, with a trailing newline, as a statement sequence. Only
    /// the statement-mode failure is reported.
    pub fn compile(&self, source: &str, debug: bool) -> ScriptResult<Fragment> {
        let _guard = self.lock();

        match self.engine().compile_expression(source) {
            Ok(ast) => return Ok(Fragment::new(ast, CompileMode::Expression)),
            Err(err) => trace!(error = %err, "Not an expression, compiling as statements"),
        }

        let mut text = String::with_capacity(source.len() + 1);
        text.push_str(source);
        text.push('\n');

        match self.engine().compile(&text) {
            Ok(ast) => Ok(Fragment::new(ast, CompileMode::Statements)),
            Err(err) => {
                if debug {
                    warn!(error = %err, source, "Script failed to compile");
                }
                Err(syntax_error(&err))
            }
        }
    }
}

fn syntax_error(err: &ParseError) -> ScriptError {
    let pos = err.1;
    ScriptError::syntax_error_at(
        err.0.to_string(),
        pos.line().map(|l| l as u32),
        pos.position().map(|c| c as u32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_mode() {
        let ctx = EngineContext::new().unwrap();
        let fragment = ctx.compile("x + 1", false).unwrap();
        assert_eq!(fragment.mode(), CompileMode::Expression);
        assert!(fragment.clears_bindings());
    }

    #[test]
    fn test_statement_fallback() {
        let ctx = EngineContext::new().unwrap();
        let fragment = ctx.compile("let y = 10;", false).unwrap();
        assert_eq!(fragment.mode(), CompileMode::Statements);
        assert!(!fragment.clears_bindings());

        let fragment = ctx.compile("fn twice(v) { v * 2 }", false).unwrap();
        assert_eq!(fragment.mode(), CompileMode::Statements);
    }

    #[test]
    fn test_syntax_error_has_location() {
        let ctx = EngineContext::new().unwrap();
        let err = ctx.compile("let = ;", true).unwrap_err();
        assert_eq!(err.error_type(), "SyntaxError");
        let (line, _) = err.location().unwrap();
        assert_eq!(line, Some(1));
    }
}
