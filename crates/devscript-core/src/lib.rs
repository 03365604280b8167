//! Native value model for devscript.
//!
//! This crate defines the tagged [`NativeValue`] exchanged between a host
//! record-processing framework and Rhai scripts, the ordered converter between
//! `NativeValue` and Rhai's `Dynamic`, and the error taxonomy shared by the
//! runtime.
//!
//! # Example
//!
//! ```
//! use devscript_core::{NativeValue, from_engine, to_engine};
//!
//! let engine_value = to_engine(&NativeValue::VectorLong(vec![1, 2])).unwrap();
//! assert!(engine_value.is_array());
//! assert_eq!(
//!     from_engine(&engine_value).unwrap(),
//!     NativeValue::VectorLong(vec![1, 2])
//! );
//! ```

mod convert;
mod error;
mod value;

pub use convert::{convert, from_engine, to_engine};
pub use error::{ConversionError, ScriptError, ScriptResult};
pub use value::{NativeValue, ValueType};

// Re-export rhai so hosts can name engine values without a direct dependency
pub use rhai;
