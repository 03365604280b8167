//! Fragment evaluation with argument binding
//!
//! Arguments are converted before anything is bound, so a bad argument never
//! leaves a partial binding behind. Bound names are released when the
//! evaluation ends on every path, including a panic inside a host callback.

use crate::context::{EngineContext, Namespaces};
use crate::fragment::{CompileMode, Fragment};
use devscript_core::{NativeValue, ScriptError, ScriptResult, from_engine, to_engine};
use rhai::{Dynamic, Engine, EvalAltResult, Position};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Named arguments bound into the local namespace for one evaluation.
pub type Arguments = BTreeMap<String, NativeValue>;

impl EngineContext {
    /// Evaluate a compiled fragment with `args` bound as local names.
    ///
    /// An unsupported result value is not an error: it is reported (when
    /// `debug` is set) and returned as [`NativeValue::None`].
    pub fn eval(&self, fragment: &Fragment, args: &Arguments, debug: bool) -> ScriptResult<NativeValue> {
        let mut bindings = Vec::with_capacity(args.len());
        for (name, value) in args {
            let item = to_engine(value).map_err(|source| {
                if debug {
                    warn!(arg = %name, error = %source, "Argument cannot be passed to script");
                }
                ScriptError::argument_error(name, source)
            })?;
            bindings.push((name.as_str(), item));
        }
        let names: Vec<&str> = bindings.iter().map(|(name, _)| *name).collect();

        let mut namespaces = self.lock();
        for (name, item) in bindings {
            namespaces.bind(name, item);
        }

        let mode = fragment.mode();
        let mut namespaces = scopeguard::guard(namespaces, |mut namespaces| {
            namespaces.release(&names, mode)
        });

        let value = namespaces.run(self.engine(), fragment).map_err(|err| {
            if debug {
                warn!(error = %err, "Script raised an error");
            }
            eval_error(&err)
        })?;

        match from_engine(&value) {
            Ok(native) => Ok(native),
            Err(err) => {
                if debug {
                    warn!(error = %err, "Script result has no native form, returning none");
                }
                Ok(NativeValue::None)
            }
        }
    }

    /// Compile, evaluate and release `source` in one call.
    pub fn exec(&self, source: &str, args: &Arguments, debug: bool) -> ScriptResult<NativeValue> {
        let fragment = self.compile(source, debug)?;
        let result = self.eval(&fragment, args, debug);
        self.destroy(fragment);
        result
    }

    /// Release a compiled fragment.
    pub fn destroy(&self, fragment: Fragment) {
        fragment.release();
    }
}

impl Namespaces {
    /// Bind `name` in the local namespace.
    ///
    /// A `let` variable of the same name from an earlier statement fragment
    /// is overwritten, so an expression fragment's cleanup deletes it. A
    /// `const` cannot be overwritten; it is shadowed and reappears once the
    /// binding is removed.
    fn bind(&mut self, name: &str, value: Dynamic) {
        if self.locals.is_constant(name).unwrap_or(false) {
            self.locals.push_dynamic(name, value);
        } else {
            self.locals.set_or_push(name, value);
        }
    }

    fn run(&mut self, engine: &Engine, fragment: &Fragment) -> Result<Dynamic, Box<EvalAltResult>> {
        let value = if self.globals.iter_functions().next().is_none() {
            engine.eval_ast_with_scope::<Dynamic>(&mut self.locals, fragment.ast())?
        } else {
            let program = self.globals.merge(fragment.ast());
            engine.eval_ast_with_scope::<Dynamic>(&mut self.locals, &program)?
        };

        if fragment.mode() == CompileMode::Statements {
            let functions = fragment.ast().clone_functions_only();
            if functions.iter_functions().next().is_some() {
                self.globals.combine(functions);
            }
        }
        Ok(value)
    }

    fn release(&mut self, names: &[&str], mode: CompileMode) {
        if names.is_empty() {
            return;
        }
        if mode == CompileMode::Statements {
            debug!(?names, "Keeping names bound for statement fragment");
            return;
        }
        for name in names {
            // Argument binding only touches locals; the global namespace
            // holds script functions, not variables.
            if self.locals.remove::<Dynamic>(name).is_none() {
                warn!(name, "Bound name missing from local and global namespace");
            }
        }
    }
}

/// Error kind reported for an engine error.
fn error_kind(err: &EvalAltResult) -> &'static str {
    match err {
        EvalAltResult::ErrorArithmetic(..) => "ArithmeticError",
        EvalAltResult::ErrorVariableNotFound(..) | EvalAltResult::ErrorPropertyNotFound(..) => {
            "NameError"
        }
        EvalAltResult::ErrorFunctionNotFound(..) => "FunctionNotFound",
        EvalAltResult::ErrorMismatchDataType(..)
        | EvalAltResult::ErrorMismatchOutputType(..)
        | EvalAltResult::ErrorIndexingType(..) => "TypeError",
        EvalAltResult::ErrorArrayBounds(..)
        | EvalAltResult::ErrorStringBounds(..)
        | EvalAltResult::ErrorIndexNotFound(..) => "IndexError",
        EvalAltResult::ErrorModuleNotFound(..) => "ImportError",
        EvalAltResult::ErrorParsing(..) => "SyntaxError",
        EvalAltResult::ErrorRuntime(..) => "RuntimeError",
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _)
        | EvalAltResult::ErrorInModule(_, inner, _) => error_kind(inner),
        _ => "EvalError",
    }
}

fn eval_error(err: &EvalAltResult) -> ScriptError {
    let (line, column) = location(err.position());
    ScriptError::eval_error_at(error_kind(err), err.to_string(), line, column)
}

fn location(pos: Position) -> (Option<u32>, Option<u32>) {
    (
        pos.line().map(|l| l as u32),
        pos.position().map(|c| c as u32),
    )
}
