//! Parameter exchange between scripts and the host
//!
//! The registry maps a parameter name to a host callback and the last value a
//! script published for it. Scripts reach it through a single native function:
//!
//! ```text
//! iointr(name)          -> cached value, or () when absent
//! iointr(name, value)   -> true; stores and notifies only for registered names
//! ```
//!
//! Any other number of arguments has no matching overload and fails the
//! evaluation with a `FunctionNotFound` error rather than returning `false`.
//!
//! Callbacks run synchronously on the script's thread while the caller holds
//! the engine execution lock. They must be short and must not compile or
//! evaluate scripts themselves.

use devscript_core::{NativeValue, from_engine};
use parking_lot::RwLock;
use rhai::{Dynamic, EvalAltResult, FuncRegistration, ImmutableString, Module, Position};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Name of the script-facing function.
pub const IOINTR_FN: &str = "iointr";

/// Host notifier invoked when a script publishes a new parameter value.
pub type IoIntrCallback = Arc<dyn Fn() + Send + Sync + 'static>;

struct ParamEntry {
    callback: IoIntrCallback,
    cached: Option<Dynamic>,
}

/// Process-wide name → (callback, cached value) map.
#[derive(Default)]
pub struct ParamRegistry {
    entries: RwLock<HashMap<String, ParamEntry>>,
}

impl fmt::Debug for ParamRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl ParamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, replacing any existing entry and clearing its cached value.
    pub fn register(&self, name: impl Into<String>, callback: impl Fn() + Send + Sync + 'static) {
        let name = name.into();
        debug!(param = %name, "Registering parameter");
        self.entries.write().insert(
            name,
            ParamEntry {
                callback: Arc::new(callback),
                cached: None,
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// The cached value of `name` as a native value.
    ///
    /// `None` when the name is unknown, nothing was published yet, or the
    /// published value has no native form.
    pub fn cached(&self, name: &str) -> Option<NativeValue> {
        let entries = self.entries.read();
        let value = entries.get(name)?.cached.as_ref()?;
        from_engine(value).ok()
    }

    /// The cached engine value of `name`, or `()` when there is none.
    pub fn read(&self, name: &str) -> Dynamic {
        self.entries
            .read()
            .get(name)
            .and_then(|entry| entry.cached.clone())
            .unwrap_or(Dynamic::UNIT)
    }

    /// Publish `value` for `name` and notify the host.
    ///
    /// Writes to unregistered names are dropped without error. Always
    /// returns `true`.
    pub fn write(&self, name: &str, value: Dynamic) -> bool {
        // The map lock is released before the callback runs so the host can
        // read the value back from inside its notifier.
        let callback = {
            let mut entries = self.entries.write();
            entries.get_mut(name).map(|entry| {
                entry.cached = Some(value.flatten());
                entry.callback.clone()
            })
        };

        match callback {
            Some(callback) => {
                trace!(param = name, "Parameter updated, notifying host");
                callback();
            }
            None => debug!(param = name, "Dropping write to unregistered parameter"),
        }
        true
    }

    /// Build the native module exposing `iointr` to scripts.
    ///
    /// Both arities are volatile so the optimizer never evaluates them while
    /// compiling, even when every argument is a constant.
    pub(crate) fn module(self: &Arc<Self>) -> Module {
        let mut module = Module::new();

        let registry = Arc::clone(self);
        FuncRegistration::new(IOINTR_FN)
            .with_volatility(true)
            .set_into_module(
                &mut module,
                move |name: Dynamic| -> Result<Dynamic, Box<EvalAltResult>> {
                    let name = param_name(name)?;
                    Ok(registry.read(&name))
                },
            );

        let registry = Arc::clone(self);
        FuncRegistration::new(IOINTR_FN)
            .with_volatility(true)
            .set_into_module(
                &mut module,
                move |name: Dynamic, value: Dynamic| -> Result<bool, Box<EvalAltResult>> {
                    let name = param_name(name)?;
                    Ok(registry.write(&name, value))
                },
            );

        module
    }
}

fn param_name(name: Dynamic) -> Result<ImmutableString, Box<EvalAltResult>> {
    name.into_immutable_string().map_err(|actual| {
        EvalAltResult::ErrorMismatchDataType(
            "string".to_string(),
            actual.to_string(),
            Position::NONE,
        )
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_register_and_write() {
        let registry = ParamRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        registry.register("P1", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(registry.contains("P1"));
        assert!(registry.read("P1").is_unit());
        assert!(registry.write("P1", Dynamic::from(42_i64)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(registry.cached("P1"), Some(NativeValue::Long(42)));
        assert_eq!(registry.read("P1").as_int(), Ok(42));
    }

    #[test]
    fn test_unknown_name_write_is_dropped() {
        let registry = ParamRegistry::new();
        assert!(registry.write("UNKNOWN", Dynamic::from(5_i64)));
        assert!(!registry.contains("UNKNOWN"));
        assert!(registry.read("UNKNOWN").is_unit());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reregister_clears_cached_value() {
        let registry = ParamRegistry::new();
        registry.register("P1", || {});
        registry.write("P1", Dynamic::from(1.5_f64));
        assert_eq!(registry.cached("P1"), Some(NativeValue::Double(1.5)));

        registry.register("P1", || {});
        assert_eq!(registry.cached("P1"), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_callback_can_read_back() {
        let registry = Arc::new(ParamRegistry::new());
        let seen = Arc::new(RwLock::new(None));
        let (reader, sink) = (registry.clone(), seen.clone());
        registry.register("P2", move || {
            *sink.write() = reader.cached("P2");
        });

        registry.write("P2", Dynamic::from(7_i64));
        assert_eq!(*seen.read(), Some(NativeValue::Long(7)));
    }

    #[test]
    fn test_names_sorted() {
        let registry = ParamRegistry::new();
        registry.register("B", || {});
        registry.register("A", || {});
        assert_eq!(registry.names(), vec!["A".to_string(), "B".to_string()]);
    }
}
