//! Dynamic SQL values.

use crate::row::Row;
use serde::{Deserialize, Serialize};

/// A dynamically-typed SQL value.
///
/// This enum represents every value a record field can hold: scalar column
/// values fetched from the database, and resolved relationship values
/// (`Record` for a single related row, `Array` of records for a list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,

    /// Boolean value
    Bool(bool),

    /// 8-bit signed integer
    TinyInt(i8),

    /// 16-bit signed integer
    SmallInt(i16),

    /// 32-bit signed integer
    Int(i32),

    /// 64-bit signed integer
    BigInt(i64),

    /// 32-bit floating point
    Float(f32),

    /// 64-bit floating point
    Double(f64),

    /// Arbitrary precision decimal (stored as string)
    Decimal(String),

    /// Text string
    Text(String),

    /// Binary data
    Bytes(Vec<u8>),

    /// Date (days since epoch)
    Date(i32),

    /// Time (microseconds since midnight)
    Time(i64),

    /// Timestamp (microseconds since epoch)
    Timestamp(i64),

    /// Timestamp with timezone (microseconds since epoch, UTC)
    TimestampTz(i64),

    /// UUID (as 16 bytes)
    Uuid([u8; 16]),

    /// JSON value
    Json(serde_json::Value),

    /// Array of values
    Array(Vec<Value>),

    /// A nested record (a resolved related row)
    Record(Box<Row>),
}

impl Value {
    /// Check if this value is NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name of this value.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::TinyInt(_) => "TINYINT",
            Value::SmallInt(_) => "SMALLINT",
            Value::Int(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::Float(_) => "REAL",
            Value::Double(_) => "DOUBLE",
            Value::Decimal(_) => "DECIMAL",
            Value::Text(_) => "TEXT",
            Value::Bytes(_) => "BLOB",
            Value::Date(_) => "DATE",
            Value::Time(_) => "TIME",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::TimestampTz(_) => "TIMESTAMPTZ",
            Value::Uuid(_) => "UUID",
            Value::Json(_) => "JSON",
            Value::Array(_) => "ARRAY",
            Value::Record(_) => "RECORD",
        }
    }

    /// Check whether this value is the zero value of its type.
    ///
    /// NULL, `false`, numeric zero, the empty string and the nil UUID are
    /// zero. Collections (`Bytes`, `Array`, `Record`) never are, even when
    /// empty: only scalar zero detection is meaningful for keys.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(v) => !*v,
            Value::TinyInt(v) => *v == 0,
            Value::SmallInt(v) => *v == 0,
            Value::Int(v) | Value::Date(v) => *v == 0,
            Value::BigInt(v) | Value::Time(v) | Value::Timestamp(v) | Value::TimestampTz(v) => {
                *v == 0
            }
            Value::Float(v) => *v == 0.0,
            Value::Double(v) => *v == 0.0,
            Value::Decimal(s) => s.is_empty() || s.parse::<f64>().is_ok_and(|d| d == 0.0),
            Value::Text(s) => s.is_empty(),
            Value::Uuid(bytes) => bytes.iter().all(|b| *b == 0),
            Value::Json(json) => match json {
                serde_json::Value::Null => true,
                serde_json::Value::Bool(b) => !*b,
                serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
                serde_json::Value::String(s) => s.is_empty(),
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => false,
            },
            Value::Bytes(_) | Value::Array(_) | Value::Record(_) => false,
        }
    }

    /// Try to convert this value to a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::TinyInt(v) => Some(*v != 0),
            Value::SmallInt(v) => Some(*v != 0),
            Value::Int(v) => Some(*v != 0),
            Value::BigInt(v) => Some(*v != 0),
            Value::Json(serde_json::Value::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Try to convert this value to an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::TinyInt(v) => Some(i64::from(*v)),
            Value::SmallInt(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::BigInt(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            Value::Json(serde_json::Value::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    /// Try to convert this value to an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            Value::TinyInt(v) => Some(f64::from(*v)),
            Value::SmallInt(v) => Some(f64::from(*v)),
            Value::Int(v) => Some(f64::from(*v)),
            Value::BigInt(v) => Some(*v as f64),
            Value::Decimal(s) => s.parse().ok(),
            Value::Json(serde_json::Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Decimal(s) => Some(s),
            Value::Json(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a nested record.
    pub fn as_record(&self) -> Option<&Row> {
        match self {
            Value::Record(row) => Some(row),
            _ => None,
        }
    }

    /// Try to get this value as a list of values.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Build a value from JSON, mapping objects to records and arrays to arrays.
    ///
    /// Unlike `From<serde_json::Value>`, which keeps the document opaque in
    /// `Value::Json`, this produces the native variants so ad hoc JSON
    /// records can be keyed and grouped like database rows.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::BigInt(i),
                None => n.as_f64().map_or(Value::Null, Value::Double),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                let mut row = Row::default();
                for (key, value) in map {
                    row.set(key, Value::from_json(value));
                }
                Value::Record(Box::new(row))
            }
        }
    }

    /// Convert this value to JSON.
    ///
    /// Binary and UUID values are rendered as lowercase hex strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::TinyInt(v) => serde_json::Value::from(*v),
            Value::SmallInt(v) => serde_json::Value::from(*v),
            Value::Int(v) | Value::Date(v) => serde_json::Value::from(*v),
            Value::BigInt(v) | Value::Time(v) | Value::Timestamp(v) | Value::TimestampTz(v) => {
                serde_json::Value::from(*v)
            }
            Value::Float(v) => serde_json::Value::from(f64::from(*v)),
            Value::Double(v) => serde_json::Value::from(*v),
            Value::Decimal(s) | Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(bytes) => serde_json::Value::String(hex(bytes)),
            Value::Uuid(bytes) => serde_json::Value::String(hex(bytes)),
            Value::Json(json) => json.clone(),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Record(row) => row.to_json(),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Check whether a value is the zero value of its type.
///
/// Free-function form of [`Value::is_zero`]; a missing value counts as zero.
pub fn is_zero_value(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_zero)
}

// Conversion implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::TinyInt(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::SmallInt(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::SmallInt(i16::from(v))
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Int(i32::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::BigInt(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<[u8; 16]> for Value {
    fn from(v: [u8; 16]) -> Self {
        Value::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<Row> for Value {
    fn from(v: Row) -> Self {
        Value::Record(Box::new(v))
    }
}

impl From<Vec<Row>> for Value {
    fn from(v: Vec<Row>) -> Self {
        Value::Array(v.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_scalars() {
        assert!(Value::Null.is_zero());
        assert!(Value::Bool(false).is_zero());
        assert!(Value::Int(0).is_zero());
        assert!(Value::BigInt(0).is_zero());
        assert!(Value::Double(0.0).is_zero());
        assert!(Value::Text(String::new()).is_zero());
        assert!(Value::Decimal("0.00".to_string()).is_zero());
        assert!(Value::Uuid([0; 16]).is_zero());
        assert!(Value::Json(serde_json::Value::Null).is_zero());
    }

    #[test]
    fn test_populated_values_are_not_zero() {
        assert!(!Value::Bool(true).is_zero());
        assert!(!Value::BigInt(5).is_zero());
        assert!(!Value::Text("a".to_string()).is_zero());
        assert!(!Value::Decimal("0.5".to_string()).is_zero());
        let mut uuid = [0u8; 16];
        uuid[15] = 1;
        assert!(!Value::Uuid(uuid).is_zero());
    }

    #[test]
    fn test_empty_collections_are_not_zero() {
        assert!(!Value::Array(Vec::new()).is_zero());
        assert!(!Value::Bytes(Vec::new()).is_zero());
        assert!(!Value::Record(Box::default()).is_zero());
    }

    #[test]
    fn test_is_zero_value_treats_missing_as_zero() {
        assert!(is_zero_value(None));
        assert!(is_zero_value(Some(&Value::Int(0))));
        assert!(!is_zero_value(Some(&Value::Int(7))));
    }

    #[test]
    fn test_from_json_builds_native_variants() {
        let value = Value::from_json(serde_json::json!({
            "id": 1,
            "name": "Ada",
            "tags": ["a", "b"],
            "score": 1.5
        }));
        let row = value.as_record().expect("record");
        assert_eq!(row.get_by_name("id"), Some(&Value::BigInt(1)));
        assert_eq!(row.get_by_name("name"), Some(&Value::Text("Ada".to_string())));
        assert_eq!(row.get_by_name("score"), Some(&Value::Double(1.5)));
        assert_eq!(
            row.get_by_name("tags").and_then(Value::as_array).map(<[Value]>::len),
            Some(2)
        );
    }

    #[test]
    fn test_to_json_nested_record() {
        let mut author = Row::default();
        author.set("id", Value::BigInt(5));
        author.set("name", Value::from("Ursula"));
        let value = Value::Array(vec![Value::from(author)]);
        assert_eq!(
            value.to_json(),
            serde_json::json!([{ "id": 5, "name": "Ursula" }])
        );
    }

    #[test]
    fn test_as_accessors() {
        assert_eq!(Value::Int(3).as_i64(), Some(3));
        assert_eq!(Value::Json(serde_json::json!(9)).as_i64(), Some(9));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert!(Value::Null.as_record().is_none());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(4_i64)), Value::BigInt(4));
    }

    #[test]
    fn test_bytes_render_as_hex() {
        assert_eq!(
            Value::Bytes(vec![0xde, 0xad]).to_json(),
            serde_json::json!("dead")
        );
    }
}
