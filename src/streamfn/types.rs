//! Core value and context types for the function catalog.
//!
//! - [`FieldValue`] - the dynamic value type flowing through function
//!   execution and aggregation
//! - [`FunctionContext`] - per-invocation data supplied by the surrounding
//!   stream/window engine
//! - [`WindowInfo`] - optional window descriptor inside the context

use chrono::NaiveDateTime;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// A value in a streaming record field.
///
/// This enum represents the data types this subsystem computes over. It
/// supports both simple types (integers, strings, booleans) and the complex
/// types some leaf functions return (arrays, maps).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Boolean value (true/false)
    Boolean(bool),
    /// SQL NULL value
    Null,
    /// Timestamp (YYYY-MM-DD HH:MM:SS[.nnn])
    Timestamp(NaiveDateTime),
    /// Array of values
    Array(Vec<FieldValue>),
    /// Map of key-value pairs - keys must be strings
    Map(HashMap<String, FieldValue>),
}

impl FieldValue {
    /// Convert to `f64` for numeric aggregation.
    ///
    /// Only `Integer` and `Float` are convertible; everything else returns
    /// `None`, which accumulators treat as a no-op per the null-tolerance
    /// contract.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Convert to `i64` when the value is integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            FieldValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Integer(_) => "INTEGER",
            FieldValue::Float(_) => "FLOAT",
            FieldValue::String(_) => "STRING",
            FieldValue::Boolean(_) => "BOOLEAN",
            FieldValue::Null => "NULL",
            FieldValue::Timestamp(_) => "TIMESTAMP",
            FieldValue::Array(_) => "ARRAY",
            FieldValue::Map(_) => "MAP",
        }
    }

    /// Equality with exact type matching, with an epsilon for floats.
    pub fn values_equal(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => (a - b).abs() < f64::EPSILON,
            (FieldValue::Integer(a), FieldValue::Float(b))
            | (FieldValue::Float(b), FieldValue::Integer(a)) => {
                (*a as f64 - b).abs() < f64::EPSILON
            }
            (FieldValue::String(a), FieldValue::String(b)) => a == b,
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a == b,
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a == b,
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Array(a), FieldValue::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.values_equal(y))
            }
            (FieldValue::Map(a), FieldValue::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|bv| v.values_equal(bv)))
            }
            _ => false,
        }
    }

    /// Ordering comparison with numeric coercion, used by MIN/MAX.
    ///
    /// Cross-type comparisons other than Integer/Float return `None`, in
    /// which case the accumulator keeps its current extreme.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.partial_cmp(b),
            (FieldValue::Integer(a), FieldValue::Float(b)) => (*a as f64).partial_cmp(b),
            (FieldValue::Float(a), FieldValue::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "NULL"),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Timestamp(t) => write!(f, "{}", t),
            FieldValue::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            FieldValue::Map(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, k) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, map[*k])?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Custom Serialize implementation for FieldValue.
///
/// Serializes directly to the natural JSON shape without an intermediate
/// `serde_json::Value` allocation:
/// - Timestamp -> ISO format string
/// - Null -> JSON null
/// - Map -> JSON object with sorted keys for deterministic output
impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Integer(i) => serializer.serialize_i64(*i),
            FieldValue::Float(f) => serializer.serialize_f64(*f),
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Boolean(b) => serializer.serialize_bool(*b),
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Timestamp(t) => {
                serializer.serialize_str(&t.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
            }
            FieldValue::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for v in arr {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            FieldValue::Map(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for k in keys {
                    m.serialize_entry(k, &map[k])?;
                }
                m.end()
            }
        }
    }
}

/// Window descriptor supplied by the engine for windowed execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowInfo {
    /// Window start (milliseconds since epoch)
    pub window_start: i64,
    /// Window end (milliseconds since epoch)
    pub window_end: i64,
    /// Number of rows in the window
    pub row_count: usize,
}

/// Per-invocation data supplied by the stream/window engine.
///
/// Functions read from the context but never mutate it; any state a function
/// needs across rows lives inside the function instance itself. `window` may
/// be absent - some call paths run outside windowed execution.
#[derive(Debug, Clone, Default)]
pub struct FunctionContext {
    /// Current row: field name -> value
    pub data: HashMap<String, FieldValue>,
    /// Window descriptor, absent outside windowed execution
    pub window: Option<WindowInfo>,
    /// Free-form extra metadata
    pub extra: HashMap<String, FieldValue>,
}

impl FunctionContext {
    /// Create an empty context (no row data, no window).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context carrying a window descriptor.
    pub fn with_window(window: WindowInfo) -> Self {
        Self {
            window: Some(window),
            ..Self::default()
        }
    }

    /// Look up a field of the current row.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.data.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_f64_conversions() {
        assert_eq!(FieldValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(FieldValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(FieldValue::String("x".to_string()).as_f64(), None);
        assert_eq!(FieldValue::Null.as_f64(), None);
    }

    #[test]
    fn test_compare_numeric_coercion() {
        assert_eq!(
            FieldValue::Integer(2).compare(&FieldValue::Float(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            FieldValue::Float(3.0).compare(&FieldValue::Integer(3)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            FieldValue::String("b".to_string()).compare(&FieldValue::String("a".to_string())),
            Some(Ordering::Greater)
        );
        assert_eq!(
            FieldValue::String("b".to_string()).compare(&FieldValue::Integer(1)),
            None
        );
    }

    #[test]
    fn test_values_equal() {
        assert!(FieldValue::Integer(1).values_equal(&FieldValue::Integer(1)));
        assert!(FieldValue::Integer(1).values_equal(&FieldValue::Float(1.0)));
        assert!(FieldValue::Null.values_equal(&FieldValue::Null));
        assert!(!FieldValue::Null.values_equal(&FieldValue::Integer(0)));
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Null.to_string(), "NULL");
        assert_eq!(
            FieldValue::Array(vec![FieldValue::Integer(1), FieldValue::Integer(2)]).to_string(),
            "[1, 2]"
        );
    }
}
