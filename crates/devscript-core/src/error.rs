//! Error types for script compilation, evaluation and value conversion
//!
//! `ScriptError` is what the host sees from `compile`/`eval`/`exec`.
//! `ConversionError` describes why a value could not cross the boundary; it is
//! fatal only while binding arguments and degrades everywhere else.

use thiserror::Error;

/// Result type alias for script operations
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Structured error types for script operations
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Source failed both expression-mode and statement-mode compilation
    #[error("Syntax error{}: {message}", format_location(line, column))]
    Syntax {
        message: String,
        line: Option<u32>,
        column: Option<u32>,
    },

    /// An argument could not be converted into an engine value
    #[error("Argument error: cannot bind '{name}': {source}")]
    Argument {
        name: String,
        #[source]
        source: ConversionError,
    },

    /// The engine raised an exception while running a fragment
    #[error("{kind}{}: {message}", format_location(line, column))]
    Eval {
        kind: String,
        message: String,
        line: Option<u32>,
        column: Option<u32>,
    },

    /// The engine could not be brought up
    #[error("Engine initialization failed: {0}")]
    Init(String),
}

/// Why a value could not be converted across the boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The native value has no engine representation (the `None` tag)
    #[error("value has no engine representation")]
    Unrepresentable,

    /// The engine value is of a type the converter does not handle
    #[error("unsupported engine type '{type_name}'")]
    Unsupported { type_name: String },

    /// A numeric value does not fit the target representation
    #[error("{value} does not fit in {target}")]
    Overflow { value: String, target: &'static str },
}

/// Format location for error display
fn format_location(line: &Option<u32>, column: &Option<u32>) -> String {
    match (line, column) {
        (Some(l), Some(c)) => format!(" at line {}:{}", l, c),
        (Some(l), None) => format!(" at line {}", l),
        _ => String::new(),
    }
}

impl ScriptError {
    /// Create a syntax error
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Create a syntax error with location
    pub fn syntax_error_at(message: impl Into<String>, line: Option<u32>, column: Option<u32>) -> Self {
        Self::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create an evaluation error from error kind and message
    pub fn eval_error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Eval {
            kind: kind.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Create an evaluation error with location
    pub fn eval_error_at(
        kind: impl Into<String>,
        message: impl Into<String>,
        line: Option<u32>,
        column: Option<u32>,
    ) -> Self {
        Self::Eval {
            kind: kind.into(),
            message: message.into(),
            line,
            column,
        }
    }

    /// Create an argument binding error
    pub fn argument_error(name: impl Into<String>, source: ConversionError) -> Self {
        Self::Argument {
            name: name.into(),
            source,
        }
    }

    /// Check if this error was caused by the script itself
    pub fn is_script_error(&self) -> bool {
        matches!(self, Self::Syntax { .. } | Self::Eval { .. })
    }

    /// Get source location if available
    pub fn location(&self) -> Option<(Option<u32>, Option<u32>)> {
        match self {
            Self::Syntax { line, column, .. } | Self::Eval { line, column, .. } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }

    /// Get the error type name (e.g., "SyntaxError", "ArithmeticError")
    pub fn error_type(&self) -> &str {
        match self {
            Self::Syntax { .. } => "SyntaxError",
            Self::Argument { .. } => "ArgumentError",
            Self::Eval { kind, .. } => kind,
            Self::Init(_) => "InitError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = ScriptError::syntax_error_at("Expecting ')'", Some(1), Some(6));
        assert_eq!(err.to_string(), "Syntax error at line 1:6: Expecting ')'");
        assert!(err.is_script_error());
        assert_eq!(err.error_type(), "SyntaxError");
    }

    #[test]
    fn test_eval_error_with_location() {
        let err = ScriptError::eval_error_at("ArithmeticError", "Division by zero", Some(3), None);

        assert!(err.is_script_error());
        assert_eq!(err.error_type(), "ArithmeticError");
        assert_eq!(err.to_string(), "ArithmeticError at line 3: Division by zero");
        assert_eq!(err.location(), Some((Some(3), None)));
    }

    #[test]
    fn test_argument_error() {
        let err = ScriptError::argument_error("VAL", ConversionError::Unrepresentable);
        assert!(!err.is_script_error());
        assert_eq!(err.error_type(), "ArgumentError");
        assert!(err.to_string().contains("'VAL'"));
        assert!(err.to_string().contains("no engine representation"));
        assert!(err.location().is_none());
    }

    #[test]
    fn test_conversion_error_display() {
        let err = ConversionError::Overflow {
            value: "18446744073709551615".into(),
            target: "i64",
        };
        assert_eq!(err.to_string(), "18446744073709551615 does not fit in i64");

        let err = ConversionError::Unsupported {
            type_name: "map".into(),
        };
        assert!(err.to_string().contains("'map'"));
    }

    #[test]
    fn test_init_error() {
        let err = ScriptError::Init("module name is empty".into());
        assert_eq!(
            err.to_string(),
            "Engine initialization failed: module name is empty"
        );
        assert_eq!(err.error_type(), "InitError");
    }
}
