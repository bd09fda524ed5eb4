//! Runtime shape of a JSON value.

use serde_json::Value;
use std::fmt;

/// The structural kind of a value: keyed map, ordered array, or anything else.
///
/// Strings are always scalars (never arrays of characters) and `null` is a
/// scalar too, so comparing `null` against a populated map is a shape
/// mismatch rather than a partial diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Map,
    Array,
    Scalar,
}

impl Shape {
    /// Classify a value.
    pub fn of(value: &Value) -> Shape {
        match value {
            Value::Object(_) => Shape::Map,
            Value::Array(_) => Shape::Array,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Shape::Scalar,
        }
    }

    /// Maps and arrays can be diffed partially; scalars cannot.
    pub fn is_container(self) -> bool {
        !matches!(self, Shape::Scalar)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Map => write!(f, "map"),
            Shape::Array => write!(f, "array"),
            Shape::Scalar => write!(f, "scalar"),
        }
    }
}

/// Classify a value. Shorthand for [`Shape::of`].
pub fn classify(value: &Value) -> Shape {
    Shape::of(value)
}
