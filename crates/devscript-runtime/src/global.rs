//! Process-wide engine
//!
//! Hosts that embed a single interpreter per process use these free
//! functions instead of holding an [`EngineContext`] themselves. The state
//! machine is one-shot:
//!
//! ```text
//! Uninitialized --init--> Ready --shutdown--> Finalized
//! ```
//!
//! Calling an execution function outside `Ready` is a programming error and
//! panics.

use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::evaluator::Arguments;
use crate::fragment::Fragment;
use devscript_core::{NativeValue, ScriptResult, rhai::Dynamic};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{error, warn};

enum ProcessState {
    Uninitialized,
    Ready(Arc<EngineContext>),
    Finalized,
}

/// Observable lifecycle of the process-wide engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Ready,
    Finalized,
}

static STATE: RwLock<ProcessState> = RwLock::new(ProcessState::Uninitialized);

/// Initialize the process-wide engine from `DEVSCRIPT_*` environment variables.
pub fn init() -> bool {
    init_with(EngineConfig::from_env())
}

/// Initialize the process-wide engine. Returns `false` if it was already
/// initialized or the engine could not be created.
pub fn init_with(config: EngineConfig) -> bool {
    let mut state = STATE.write();
    if !matches!(*state, ProcessState::Uninitialized) {
        error!("Script engine initialized more than once");
        return false;
    }

    match EngineContext::init(config) {
        Ok(ctx) => {
            *state = ProcessState::Ready(Arc::new(ctx));
            true
        }
        Err(err) => {
            error!(error = %err, "Failed to initialize script engine");
            false
        }
    }
}

/// Shut the process-wide engine down. Further use panics.
pub fn shutdown() {
    let previous = std::mem::replace(&mut *STATE.write(), ProcessState::Finalized);
    match previous {
        ProcessState::Ready(ctx) => match Arc::try_unwrap(ctx) {
            Ok(ctx) => ctx.shutdown(),
            Err(_) => warn!("Script engine still in use at shutdown, released by last user"),
        },
        ProcessState::Uninitialized => error!("Script engine shut down before init"),
        ProcessState::Finalized => error!("Script engine shut down twice"),
    }
}

pub fn state() -> EngineState {
    match &*STATE.read() {
        ProcessState::Uninitialized => EngineState::Uninitialized,
        ProcessState::Ready(_) => EngineState::Ready,
        ProcessState::Finalized => EngineState::Finalized,
    }
}

/// The process-wide context.
///
/// # Panics
///
/// Panics unless the engine is `Ready`.
pub fn context() -> Arc<EngineContext> {
    match &*STATE.read() {
        ProcessState::Ready(ctx) => Arc::clone(ctx),
        ProcessState::Uninitialized => panic!("script engine used before init()"),
        ProcessState::Finalized => panic!("script engine used after shutdown()"),
    }
}

pub fn register_io_intr(name: impl Into<String>, callback: impl Fn() + Send + Sync + 'static) {
    context().register_io_intr(name, callback);
}

pub fn compile(source: &str, debug: bool) -> ScriptResult<Fragment> {
    context().compile(source, debug)
}

pub fn eval(fragment: &Fragment, args: &Arguments, debug: bool) -> ScriptResult<NativeValue> {
    context().eval(fragment, args, debug)
}

/// Compile, evaluate and release `source`.
///
/// Diagnostics are emitted when either `debug` or the configured
/// `EngineConfig::debug` is set.
pub fn exec(source: &str, args: &Arguments, debug: bool) -> ScriptResult<NativeValue> {
    let ctx = context();
    let debug = debug || ctx.config().debug;
    ctx.exec(source, args, debug)
}

pub fn destroy(fragment: Fragment) {
    fragment.release();
}

/// Convert an engine value, reporting success as a flag.
pub fn convert(value: &Dynamic) -> (NativeValue, bool) {
    devscript_core::convert(value)
}
