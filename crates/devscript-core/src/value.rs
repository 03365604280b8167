//! Host-side tagged value exchanged with scripts
//!
//! A `NativeValue` owns its data and carries no engine state, so it can be
//! cloned, moved between threads and stored freely by the host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag of a [`NativeValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    None,
    Bool,
    Long,
    Unsigned,
    Double,
    String,
    VectorLong,
    VectorUnsigned,
    VectorDouble,
    VectorString,
}

impl ValueType {
    /// Check if the tag denotes one of the homogeneous vector variants
    pub fn is_vector(self) -> bool {
        matches!(
            self,
            Self::VectorLong | Self::VectorUnsigned | Self::VectorDouble | Self::VectorString
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool => "bool",
            Self::Long => "long",
            Self::Unsigned => "unsigned",
            Self::Double => "double",
            Self::String => "string",
            Self::VectorLong => "vector<long>",
            Self::VectorUnsigned => "vector<unsigned>",
            Self::VectorDouble => "vector<double>",
            Self::VectorString => "vector<string>",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar or homogeneous vector crossing the scripting boundary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NativeValue {
    #[default]
    None,
    Bool(bool),
    Long(i64),
    Unsigned(u64),
    Double(f64),
    String(String),
    VectorLong(Vec<i64>),
    VectorUnsigned(Vec<u64>),
    VectorDouble(Vec<f64>),
    VectorString(Vec<String>),
}

impl NativeValue {
    /// Get the tag of the active representation
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::None => ValueType::None,
            Self::Bool(_) => ValueType::Bool,
            Self::Long(_) => ValueType::Long,
            Self::Unsigned(_) => ValueType::Unsigned,
            Self::Double(_) => ValueType::Double,
            Self::String(_) => ValueType::String,
            Self::VectorLong(_) => ValueType::VectorLong,
            Self::VectorUnsigned(_) => ValueType::VectorUnsigned,
            Self::VectorDouble(_) => ValueType::VectorDouble,
            Self::VectorString(_) => ValueType::VectorString,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            Self::Unsigned(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_long_slice(&self) -> Option<&[i64]> {
        match self {
            Self::VectorLong(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_unsigned_slice(&self) -> Option<&[u64]> {
        match self {
            Self::VectorUnsigned(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_double_slice(&self) -> Option<&[f64]> {
        match self {
            Self::VectorDouble(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_string_slice(&self) -> Option<&[String]> {
        match self {
            Self::VectorString(v) => Some(v),
            _ => None,
        }
    }

    /// Number of elements for vectors, 1 for scalars and 0 for `None`
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::VectorLong(v) => v.len(),
            Self::VectorUnsigned(v) => v.len(),
            Self::VectorDouble(v) => v.len(),
            Self::VectorString(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<bool> for NativeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for NativeValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<i32> for NativeValue {
    fn from(value: i32) -> Self {
        Self::Long(i64::from(value))
    }
}

impl From<u64> for NativeValue {
    fn from(value: u64) -> Self {
        Self::Unsigned(value)
    }
}

impl From<f64> for NativeValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<String> for NativeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for NativeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<i64>> for NativeValue {
    fn from(value: Vec<i64>) -> Self {
        Self::VectorLong(value)
    }
}

impl From<Vec<u64>> for NativeValue {
    fn from(value: Vec<u64>) -> Self {
        Self::VectorUnsigned(value)
    }
}

impl From<Vec<f64>> for NativeValue {
    fn from(value: Vec<f64>) -> Self {
        Self::VectorDouble(value)
    }
}

impl From<Vec<String>> for NativeValue {
    fn from(value: Vec<String>) -> Self {
        Self::VectorString(value)
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Long(n) => write!(f, "{}", n),
            Self::Unsigned(n) => write!(f, "{}", n),
            Self::Double(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{:?}", s),
            Self::VectorLong(v) => write_list(f, v),
            Self::VectorUnsigned(v) => write_list(f, v),
            Self::VectorDouble(v) => write_list(f, v),
            Self::VectorString(v) => {
                let quoted: Vec<String> = v.iter().map(|s| format!("{:?}", s)).collect();
                write_list(f, &quoted)
            }
        }
    }
}
