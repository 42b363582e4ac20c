//! Scalar literals and the strict JSON reads used to match them.
use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// The four scalar kinds a literal can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl ScalarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Boolean => "boolean",
        }
    }

    /// Read `value` strictly as this kind. `None` when the JSON type does not fit.
    ///
    /// - strings only read JSON strings
    /// - integers only read JSON numbers that are exactly an `i64`
    /// - floats read any JSON number an `f64` holds exactly
    /// - booleans only read `true` / `false`
    pub fn read(self, value: &Value) -> Option<LiteralValue> {
        match (self, value) {
            (ScalarKind::String, Value::String(s)) => Some(LiteralValue::String(s.clone())),
            (ScalarKind::Integer, Value::Number(n)) => n.as_i64().map(LiteralValue::Integer),
            (ScalarKind::Float, Value::Number(n)) => {
                exact_f64(n).map(|f| LiteralValue::Float(OrderedFloat(f)))
            }
            (ScalarKind::Boolean, Value::Bool(b)) => Some(LiteralValue::Boolean(*b)),
            _ => None,
        }
    }
}

/// `n` as an `f64`, or `None` for an integer that has no exact `f64` form.
fn exact_f64(n: &Number) -> Option<f64> {
    if let Some(i) = n.as_i64() {
        let f = i as f64;
        return (f as i128 == i128::from(i)).then_some(f);
    }
    if let Some(u) = n.as_u64() {
        let f = u as f64;
        return (f as i128 == i128::from(u)).then_some(f);
    }
    n.as_f64()
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tagged scalar constant. Equality is type-sensitive: `"100"` is not `100`,
/// and `100` (integer) is not `100.0` (float).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(String),
    Integer(i64),
    Float(OrderedFloat<f64>),
    Boolean(bool),
}

impl LiteralValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            LiteralValue::String(_) => ScalarKind::String,
            LiteralValue::Integer(_) => ScalarKind::Integer,
            LiteralValue::Float(_) => ScalarKind::Float,
            LiteralValue::Boolean(_) => ScalarKind::Boolean,
        }
    }

    /// The bare JSON scalar for this literal.
    pub fn to_wire(&self) -> Value {
        match self {
            LiteralValue::String(s) => Value::String(s.clone()),
            LiteralValue::Integer(i) => Value::from(*i),
            // non-finite floats have no JSON form
            LiteralValue::Float(f) => {
                serde_json::Number::from_f64(f.0).map(Value::Number).unwrap_or(Value::Null)
            }
            LiteralValue::Boolean(b) => Value::Bool(*b),
        }
    }

    /// Read an arbitrary JSON scalar, picking the kind from the JSON type.
    /// Integral numbers become integers, other numbers floats.
    pub fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) => ScalarKind::String.read(value),
            Value::Bool(_) => ScalarKind::Boolean.read(value),
            Value::Number(_) => {
                ScalarKind::Integer.read(value).or_else(|| ScalarKind::Float.read(value))
            }
            _ => None,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) => write!(f, "{s:?}"),
            LiteralValue::Integer(i) => write!(f, "{i}"),
            LiteralValue::Float(x) => write!(f, "{:?}", x.0),
            LiteralValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl Serialize for LiteralValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LiteralValue::String(s) => serializer.serialize_str(s),
            LiteralValue::Integer(i) => serializer.serialize_i64(*i),
            LiteralValue::Float(x) => serializer.serialize_f64(x.0),
            LiteralValue::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        LiteralValue::String(s.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(s: String) -> Self {
        LiteralValue::String(s)
    }
}

impl From<i32> for LiteralValue {
    fn from(i: i32) -> Self {
        LiteralValue::Integer(i64::from(i))
    }
}

impl From<i64> for LiteralValue {
    fn from(i: i64) -> Self {
        LiteralValue::Integer(i)
    }
}

impl From<f64> for LiteralValue {
    fn from(x: f64) -> Self {
        LiteralValue::Float(OrderedFloat(x))
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        LiteralValue::Boolean(b)
    }
}

/// JSON type name of `value`, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
