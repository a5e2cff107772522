//! Hashable grouping keys.
//!
//! `Value` is not `Eq`/`Hash` (it carries floats and nested data), and the
//! same logical key can arrive in different widths: a source record may hold
//! `Int(5)` while the database returns `BigInt(5)`. Keys are normalised into
//! `KeyValue` before grouping.

use relmodel_core::Value;

/// A normalised key value.
///
/// Every integer width, integral floats, and text or decimals holding a
/// canonical integer literal all become `Int`, so `Int(5)`, `BigInt(5)`,
/// `Double(5.0)` and `Text("5")` group together. `Text("05")` stays text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    Int(i64),
    Bool(bool),
    /// A non-integral float, compared by bit pattern.
    Float(u64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid([u8; 16]),
}

impl KeyValue {
    /// Normalise a value into a key. `Null`, arrays and nested records are
    /// not keys.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null | Value::Array(_) | Value::Record(_) => None,
            Value::Bool(b) => Some(KeyValue::Bool(*b)),
            Value::TinyInt(v) => Some(KeyValue::Int(i64::from(*v))),
            Value::SmallInt(v) => Some(KeyValue::Int(i64::from(*v))),
            Value::Int(v) | Value::Date(v) => Some(KeyValue::Int(i64::from(*v))),
            Value::BigInt(v) | Value::Time(v) | Value::Timestamp(v) | Value::TimestampTz(v) => {
                Some(KeyValue::Int(*v))
            }
            Value::Float(v) => Some(Self::from_f64(f64::from(*v))),
            Value::Double(v) => Some(Self::from_f64(*v)),
            Value::Decimal(s) | Value::Text(s) => Some(Self::from_text(s)),
            Value::Bytes(b) => Some(KeyValue::Bytes(b.clone())),
            Value::Uuid(u) => Some(KeyValue::Uuid(*u)),
            Value::Json(json) => match json {
                serde_json::Value::Bool(b) => Some(KeyValue::Bool(*b)),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => Some(KeyValue::Int(i)),
                    None => n.as_f64().map(Self::from_f64),
                },
                serde_json::Value::String(s) => Some(Self::from_text(s)),
                serde_json::Value::Null
                | serde_json::Value::Array(_)
                | serde_json::Value::Object(_) => None,
            },
        }
    }

    fn from_f64(v: f64) -> Self {
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
            KeyValue::Int(v as i64)
        } else {
            KeyValue::Float(v.to_bits())
        }
    }

    fn from_text(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(i) if i.to_string() == s => KeyValue::Int(i),
            _ => KeyValue::Text(s.to_string()),
        }
    }
}
