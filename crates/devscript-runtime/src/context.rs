//! Engine context: the interpreter, its namespaces and the execution lock
//!
//! One `EngineContext` owns a Rhai engine, the parameter registry module and
//! the two namespaces every fragment sees:
//!
//! - the global namespace, a library of script functions published by
//!   statement fragments
//! - the local namespace, a `Scope` holding argument bindings and variables
//!   declared by statement fragments
//!
//! All compile and evaluate work is serialized through a single mutex.

use crate::config::EngineConfig;
use crate::registry::ParamRegistry;
use devscript_core::{ScriptError, ScriptResult};
use parking_lot::{Mutex, MutexGuard};
use rhai::{AST, Engine, Scope};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared state guarded by the execution lock.
pub(crate) struct Namespaces {
    pub(crate) globals: AST,
    pub(crate) locals: Scope<'static>,
}

impl Namespaces {
    fn new() -> Self {
        Self {
            globals: AST::empty(),
            locals: Scope::new(),
        }
    }
}

/// A script engine with its namespaces and parameter registry.
pub struct EngineContext {
    engine: Engine,
    namespaces: Mutex<Namespaces>,
    registry: Arc<ParamRegistry>,
    config: EngineConfig,
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl EngineContext {
    /// Create a context with default configuration.
    pub fn new() -> ScriptResult<Self> {
        Self::init(EngineConfig::default())
    }

    /// Create a context with a fresh parameter registry.
    pub fn init(config: EngineConfig) -> ScriptResult<Self> {
        Self::with_registry(config, Arc::new(ParamRegistry::new()))
    }

    /// Create a context exposing an existing parameter registry.
    pub fn with_registry(config: EngineConfig, registry: Arc<ParamRegistry>) -> ScriptResult<Self> {
        if !is_identifier(&config.module_name) {
            return Err(ScriptError::Init(format!(
                "invalid module name '{}'",
                config.module_name
            )));
        }

        let mut engine = Engine::new();
        engine.set_optimization_level(config.optimization);

        engine.on_print(|text| info!(target: "devscript::script", "{}", text));
        engine.on_debug(|text, source, pos| {
            debug!(
                target: "devscript::script",
                source = source.unwrap_or_default(),
                line = pos.line(),
                "{}",
                text
            );
        });

        let module = Arc::new(registry.module());
        engine.register_global_module(module.clone());
        engine.register_static_module(config.module_name.as_str(), module);

        info!(
            module = %config.module_name,
            optimization = ?config.optimization,
            "Script engine initialized"
        );

        Ok(Self {
            engine,
            namespaces: Mutex::new(Namespaces::new()),
            registry,
            config,
        })
    }

    /// Release the engine.
    ///
    /// Waits for any in-flight evaluation to finish first.
    pub fn shutdown(self) {
        let Self {
            engine, namespaces, ..
        } = self;

        let mut namespaces = namespaces.lock();
        let released = namespaces.locals.len();
        *namespaces = Namespaces::new();
        drop(namespaces);
        drop(engine);

        info!(released, "Script engine shut down");
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ParamRegistry> {
        &self.registry
    }

    /// Register a parameter reachable from scripts through `iointr`.
    pub fn register_io_intr(
        &self,
        name: impl Into<String>,
        callback: impl Fn() + Send + Sync + 'static,
    ) {
        self.registry.register(name, callback);
    }

    /// Names currently bound in the local namespace, in binding order.
    pub fn bound_names(&self) -> Vec<String> {
        self.lock()
            .locals
            .iter_raw()
            .map(|(name, _, _)| name.to_string())
            .collect()
    }

    /// Names of script functions published to the global namespace.
    pub fn global_functions(&self) -> Vec<String> {
        let namespaces = self.lock();
        let mut names: Vec<String> = namespaces
            .globals
            .iter_functions()
            .map(|f| f.name.to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Namespaces> {
        self.namespaces.lock()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_context() {
        let ctx = EngineContext::new().unwrap();
        assert_eq!(ctx.config().module_name, "dev");
        assert!(ctx.bound_names().is_empty());
        assert!(ctx.global_functions().is_empty());
        ctx.shutdown();
    }

    #[test]
    fn test_invalid_module_name() {
        let err = EngineContext::init(EngineConfig::new().module_name("not a name")).unwrap_err();
        assert_eq!(err.error_type(), "InitError");
    }

    #[test]
    fn test_shared_registry() {
        let registry = Arc::new(ParamRegistry::new());
        let ctx = EngineContext::with_registry(EngineConfig::default(), registry.clone()).unwrap();
        ctx.register_io_intr("P1", || {});
        assert!(registry.contains("P1"));
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_identifier("dev"));
        assert!(is_identifier("_pv2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2pv"));
        assert!(!is_identifier("a-b"));
    }
}
