//! devscript-runtime - embedded Rhai scripting for record processing.
//!
//! This crate lets a host record-processing framework compile and evaluate
//! short user scripts with named native arguments, and exchange parameter
//! values with those scripts through a callback registry.
//!
//! # Features
//!
//! - **Two-stage compile**: sources are tried as an expression, then as a
//!   statement sequence
//! - **Scoped bindings**: expression arguments are removed after every run
//! - **Persistent definitions**: statement fragments keep variables and
//!   publish functions for later fragments
//! - **Parameter exchange**: `iointr(name)` / `iointr(name, value)` backed by
//!   host callbacks
//!
//! # Example
//!
//! ```
//! use devscript_runtime::{Arguments, EngineContext, NativeValue};
//!
//! let ctx = EngineContext::new().unwrap();
//!
//! let mut args = Arguments::new();
//! args.insert("x".to_string(), NativeValue::Long(5));
//!
//! let result = ctx.exec("x + 1", &args, false).unwrap();
//! assert_eq!(result, NativeValue::Long(6));
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  global (optional process-wide facade)                       │
//! └─────────────────────────────────────────────────────────────┘
//!                           ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  EngineContext                                               │
//! │  - Mutex<Namespaces>: function library + local Scope         │
//! │  - compile / eval / exec / destroy                           │
//! └─────────────────────────────────────────────────────────────┘
//!            ↓                                   ↓
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │  devscript-core          │   │  ParamRegistry               │
//! │  NativeValue <-> Dynamic │   │  iointr, host callbacks      │
//! └──────────────────────────┘   └──────────────────────────────┘
//! ```

mod compiler;
pub mod config;
pub mod context;
pub mod evaluator;
pub mod fragment;
pub mod global;
pub mod macros;
pub mod registry;

pub use config::{EngineConfig, env_config};
pub use context::EngineContext;
pub use evaluator::Arguments;
pub use fragment::{CompileMode, Fragment};
pub use registry::{IOINTR_FN, IoIntrCallback, ParamRegistry};

pub use devscript_core::{
    ConversionError, NativeValue, ScriptError, ScriptResult, ValueType, convert, from_engine,
    rhai, to_engine,
};

pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::context::EngineContext;
    pub use crate::evaluator::Arguments;
    pub use crate::fragment::{CompileMode, Fragment};
    pub use crate::registry::ParamRegistry;
    pub use devscript_core::{NativeValue, ScriptError, ScriptResult, ValueType};
}
