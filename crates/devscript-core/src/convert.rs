//! Conversion between [`NativeValue`] and Rhai's [`Dynamic`]
//!
//! Outbound conversion is a plain match on the tag. Inbound conversion walks
//! an ordered rule table and the first rule whose predicate accepts the value
//! decides the result:
//!
//! | # | Engine value                                | Native value           |
//! |---|---------------------------------------------|------------------------|
//! | 1 | string, char                                | `String`               |
//! | 2 | bool                                        | `Bool`                 |
//! | 3 | u64                                         | `Unsigned`             |
//! | 4 | i64, i32, i16, i8, u32, u16, u8, i128, u128 | `Long` (range-checked) |
//! | 5 | f64, f32                                    | `Double`               |
//! | 6 | array                                       | vector, see below      |
//!
//! Arrays are scanned element by element. The first element that converts
//! fixes the vector tag; every later element of another kind, or one that
//! fails to convert, is skipped. An array in which no element converts
//! becomes an empty `VectorDouble`.

use rhai::{Array, Dynamic, ImmutableString};

use crate::error::ConversionError;
use crate::value::NativeValue;

/// Convert a native value into an engine value.
///
/// Booleans map onto the canonical `Dynamic::TRUE`/`Dynamic::FALSE`.
/// `NativeValue::None` has no engine form and fails.
pub fn to_engine(value: &NativeValue) -> Result<Dynamic, ConversionError> {
    let dynamic = match value {
        NativeValue::None => return Err(ConversionError::Unrepresentable),
        NativeValue::Bool(true) => Dynamic::TRUE,
        NativeValue::Bool(false) => Dynamic::FALSE,
        NativeValue::Long(n) => Dynamic::from(*n),
        NativeValue::Unsigned(n) => Dynamic::from(*n),
        NativeValue::Double(n) => Dynamic::from(*n),
        NativeValue::String(s) => Dynamic::from(ImmutableString::from(s.as_str())),
        NativeValue::VectorLong(v) => array_of(v.iter().map(|n| Dynamic::from(*n))),
        NativeValue::VectorUnsigned(v) => array_of(v.iter().map(|n| Dynamic::from(*n))),
        NativeValue::VectorDouble(v) => array_of(v.iter().map(|n| Dynamic::from(*n))),
        NativeValue::VectorString(v) => array_of(
            v.iter()
                .map(|s| Dynamic::from(ImmutableString::from(s.as_str()))),
        ),
    };
    Ok(dynamic)
}

fn array_of(items: impl Iterator<Item = Dynamic>) -> Dynamic {
    let mut array = Array::new();
    for item in items {
        array.push(item);
    }
    Dynamic::from_array(array)
}

/// Convert an engine value into a native value.
pub fn from_engine(value: &Dynamic) -> Result<NativeValue, ConversionError> {
    let value = value.flatten_clone();
    for rule in INBOUND_RULES {
        if (rule.accepts)(&value) {
            return (rule.extract)(value);
        }
    }
    Err(ConversionError::Unsupported {
        type_name: value.type_name().to_string(),
    })
}

/// Inbound conversion reporting success as a flag.
///
/// On failure the returned value is `NativeValue::None`.
pub fn convert(value: &Dynamic) -> (NativeValue, bool) {
    match from_engine(value) {
        Ok(native) => (native, true),
        Err(_) => (NativeValue::None, false),
    }
}

struct Rule {
    accepts: fn(&Dynamic) -> bool,
    extract: fn(Dynamic) -> Result<NativeValue, ConversionError>,
}

// Order matters: the first accepting rule wins.
const INBOUND_RULES: &[Rule] = &[
    Rule {
        accepts: is_text,
        extract: extract_text,
    },
    Rule {
        accepts: Dynamic::is_bool,
        extract: extract_bool,
    },
    Rule {
        accepts: is_unsigned,
        extract: extract_unsigned,
    },
    Rule {
        accepts: is_integer,
        extract: extract_integer,
    },
    Rule {
        accepts: is_float,
        extract: extract_float,
    },
    Rule {
        accepts: Dynamic::is_array,
        extract: vector,
    },
];

fn extract_text(v: Dynamic) -> Result<NativeValue, ConversionError> {
    text(v).map(NativeValue::String)
}

fn extract_bool(v: Dynamic) -> Result<NativeValue, ConversionError> {
    v.as_bool()
        .map(NativeValue::Bool)
        .map_err(|_| unsupported(&v))
}

fn extract_unsigned(v: Dynamic) -> Result<NativeValue, ConversionError> {
    unsigned(v).map(NativeValue::Unsigned)
}

fn extract_integer(v: Dynamic) -> Result<NativeValue, ConversionError> {
    integer(v).map(NativeValue::Long)
}

fn extract_float(v: Dynamic) -> Result<NativeValue, ConversionError> {
    float(v).map(NativeValue::Double)
}

fn is_text(v: &Dynamic) -> bool {
    v.is_string() || v.is_char()
}

fn is_unsigned(v: &Dynamic) -> bool {
    v.is::<u64>()
}

fn is_integer(v: &Dynamic) -> bool {
    v.is_int()
        || v.is::<i32>()
        || v.is::<i16>()
        || v.is::<i8>()
        || v.is::<u32>()
        || v.is::<u16>()
        || v.is::<u8>()
        || v.is::<i128>()
        || v.is::<u128>()
}

fn is_float(v: &Dynamic) -> bool {
    v.is_float() || v.is::<f32>()
}

fn unsupported(v: &Dynamic) -> ConversionError {
    ConversionError::Unsupported {
        type_name: v.type_name().to_string(),
    }
}

fn text(v: Dynamic) -> Result<String, ConversionError> {
    if let Ok(c) = v.as_char() {
        return Ok(c.to_string());
    }
    match v.clone().try_cast::<ImmutableString>() {
        Some(s) => Ok(s.to_string()),
        None => Err(unsupported(&v)),
    }
}

fn unsigned(v: Dynamic) -> Result<u64, ConversionError> {
    v.clone().try_cast::<u64>().ok_or_else(|| unsupported(&v))
}

fn integer(v: Dynamic) -> Result<i64, ConversionError> {
    if let Ok(n) = v.as_int() {
        return Ok(n);
    }
    let wide: i128 = if let Some(n) = v.clone().try_cast::<i32>() {
        n.into()
    } else if let Some(n) = v.clone().try_cast::<i16>() {
        n.into()
    } else if let Some(n) = v.clone().try_cast::<i8>() {
        n.into()
    } else if let Some(n) = v.clone().try_cast::<u32>() {
        n.into()
    } else if let Some(n) = v.clone().try_cast::<u16>() {
        n.into()
    } else if let Some(n) = v.clone().try_cast::<u8>() {
        n.into()
    } else if let Some(n) = v.clone().try_cast::<i128>() {
        n
    } else if let Some(n) = v.clone().try_cast::<u128>() {
        return i64::try_from(n).map_err(|_| ConversionError::Overflow {
            value: n.to_string(),
            target: "i64",
        });
    } else {
        return Err(unsupported(&v));
    };
    i64::try_from(wide).map_err(|_| ConversionError::Overflow {
        value: wide.to_string(),
        target: "i64",
    })
}

fn float(v: Dynamic) -> Result<f64, ConversionError> {
    if let Ok(n) = v.as_float() {
        return Ok(n);
    }
    match v.clone().try_cast::<f32>() {
        Some(n) => Ok(n.into()),
        None => Err(unsupported(&v)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Long,
    Unsigned,
    Double,
    String,
}

/// Classify an array element in the same precedence as the scalar rules.
fn element_kind(v: &Dynamic) -> Option<ElementKind> {
    if is_text(v) {
        Some(ElementKind::String)
    } else if v.is_bool() {
        Some(ElementKind::Long)
    } else if is_unsigned(v) {
        Some(ElementKind::Unsigned)
    } else if is_integer(v) {
        Some(ElementKind::Long)
    } else if is_float(v) {
        Some(ElementKind::Double)
    } else {
        None
    }
}

#[derive(Default)]
struct VectorBuilder {
    kind: Option<ElementKind>,
    longs: Vec<i64>,
    unsigned: Vec<u64>,
    doubles: Vec<f64>,
    strings: Vec<String>,
}

impl VectorBuilder {
    fn push(&mut self, element: Dynamic) {
        let Some(kind) = element_kind(&element) else {
            return;
        };
        if self.kind.is_some_and(|fixed| fixed != kind) {
            return;
        }
        let pushed = match kind {
            ElementKind::Long => long_element(element).map(|n| self.longs.push(n)),
            ElementKind::Unsigned => unsigned(element).map(|n| self.unsigned.push(n)),
            ElementKind::Double => float(element).map(|n| self.doubles.push(n)),
            ElementKind::String => text(element).map(|s| self.strings.push(s)),
        };
        if pushed.is_ok() {
            self.kind = Some(kind);
        }
    }

    fn finish(self) -> NativeValue {
        match self.kind {
            Some(ElementKind::Long) => NativeValue::VectorLong(self.longs),
            Some(ElementKind::Unsigned) => NativeValue::VectorUnsigned(self.unsigned),
            Some(ElementKind::String) => NativeValue::VectorString(self.strings),
            Some(ElementKind::Double) | None => NativeValue::VectorDouble(self.doubles),
        }
    }
}

fn long_element(v: Dynamic) -> Result<i64, ConversionError> {
    match v.as_bool() {
        Ok(b) => Ok(i64::from(b)),
        Err(_) => integer(v),
    }
}

fn vector(v: Dynamic) -> Result<NativeValue, ConversionError> {
    let array = v.clone().try_cast::<Array>().ok_or_else(|| unsupported(&v))?;
    let mut builder = VectorBuilder::default();
    for element in array {
        builder.push(element.flatten());
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(items: Vec<Dynamic>) -> Dynamic {
        Dynamic::from_array(items)
    }

    fn text(s: &str) -> Dynamic {
        Dynamic::from(ImmutableString::from(s))
    }

    #[test]
    fn test_none_is_unrepresentable() {
        assert_eq!(
            to_engine(&NativeValue::None).unwrap_err(),
            ConversionError::Unrepresentable
        );
    }

    #[test]
    fn test_bool_uses_canonical_values() {
        let t = to_engine(&NativeValue::Bool(true)).unwrap();
        assert!(t.is_bool());
        assert!(t.as_bool().unwrap());
        let f = to_engine(&NativeValue::Bool(false)).unwrap();
        assert!(!f.as_bool().unwrap());
    }

    #[test]
    fn test_rule_order_text_before_everything() {
        assert_eq!(
            from_engine(&Dynamic::from('x')).unwrap(),
            NativeValue::String("x".into())
        );
        assert_eq!(
            from_engine(&text("12")).unwrap(),
            NativeValue::String("12".into())
        );
    }

    #[test]
    fn test_small_integer_types_widen_to_long() {
        assert_eq!(from_engine(&Dynamic::from(7u8)).unwrap(), NativeValue::Long(7));
        assert_eq!(
            from_engine(&Dynamic::from(-7i32)).unwrap(),
            NativeValue::Long(-7)
        );
        assert_eq!(
            from_engine(&Dynamic::from(u32::MAX)).unwrap(),
            NativeValue::Long(u32::MAX as i64)
        );
    }

    #[test]
    fn test_integer_overflow_fails_instead_of_clamping() {
        let big = Dynamic::from(i128::from(i64::MAX) + 1);
        assert!(matches!(
            from_engine(&big),
            Err(ConversionError::Overflow { target: "i64", .. })
        ));
        let (value, ok) = convert(&big);
        assert!(!ok);
        assert!(value.is_none());
    }

    #[test]
    fn test_f32_widens_to_double() {
        assert_eq!(
            from_engine(&Dynamic::from(0.5f32)).unwrap(),
            NativeValue::Double(0.5)
        );
    }

    #[test]
    fn test_unsupported_types() {
        assert!(matches!(
            from_engine(&Dynamic::UNIT),
            Err(ConversionError::Unsupported { .. })
        ));
        assert!(from_engine(&Dynamic::from_map(rhai::Map::new())).is_err());
    }

    #[test]
    fn test_mixed_array_keeps_first_kind() {
        let value = array(vec![Dynamic::from(1i64), text("a")]);
        assert_eq!(from_engine(&value).unwrap(), NativeValue::VectorLong(vec![1]));

        let value = array(vec![
            text("a"),
            Dynamic::from(2i64),
            text("b"),
        ]);
        assert_eq!(
            from_engine(&value).unwrap(),
            NativeValue::VectorString(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_unsupported_first_element_does_not_fix_kind() {
        let value = array(vec![Dynamic::UNIT, Dynamic::from(2.5f64)]);
        assert_eq!(
            from_engine(&value).unwrap(),
            NativeValue::VectorDouble(vec![2.5])
        );

        let value = array(vec![Dynamic::UNIT]);
        assert_eq!(
            from_engine(&value).unwrap(),
            NativeValue::VectorDouble(vec![])
        );
    }

    #[test]
    fn test_bool_elements_count_as_long() {
        let value = array(vec![Dynamic::TRUE, Dynamic::from(5i64), Dynamic::FALSE]);
        assert_eq!(
            from_engine(&value).unwrap(),
            NativeValue::VectorLong(vec![1, 5, 0])
        );
    }

    #[test]
    fn test_overflowing_element_is_skipped() {
        let value = array(vec![
            Dynamic::from(u128::MAX),
            Dynamic::from(3i64),
            Dynamic::from(i128::MIN),
        ]);
        assert_eq!(from_engine(&value).unwrap(), NativeValue::VectorLong(vec![3]));
    }
}
