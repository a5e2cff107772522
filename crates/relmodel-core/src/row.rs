//! Database row representation.

use crate::Result;
use crate::error::{Error, TypeError};
use crate::value::Value;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Column metadata shared across all rows in a result set.
///
/// This struct is wrapped in `Arc` so all rows from the same query share
/// the same column information, saving memory for large result sets.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    /// Column names in order
    names: Vec<String>,
    /// Name -> index mapping for O(1) lookup
    name_to_index: HashMap<String, usize>,
}

impl ColumnInfo {
    /// Create new column info from a list of column names.
    pub fn new(names: Vec<String>) -> Self {
        let name_to_index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names,
            name_to_index,
        }
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get the index of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Check if a column exists.
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Get all column names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn push(&mut self, name: String) -> usize {
        let index = self.names.len();
        self.name_to_index.insert(name.clone(), index);
        self.names.push(name);
        index
    }
}

/// A single row: a string-keyed mapping from column name to value.
///
/// Rows returned by one query share their column metadata via `Arc`.
/// Setting a column that does not exist yet appends it, detaching this row's
/// metadata from its siblings (copy-on-write), so rows double as ad hoc map
/// records. Equality ignores column order.
#[derive(Debug, Clone, Default)]
pub struct Row {
    /// Column values in order
    values: Vec<Value>,
    /// Shared column metadata
    columns: Arc<ColumnInfo>,
}

impl Row {
    /// Create a new row with the given columns and values.
    ///
    /// Values are matched to columns by position: missing values become
    /// `Null`, extra values are dropped. For multiple rows from the same
    /// result set, prefer `with_columns` to share the column metadata.
    pub fn new(column_names: Vec<String>, values: Vec<Value>) -> Self {
        Self::with_columns(Arc::new(ColumnInfo::new(column_names)), values)
    }

    /// Create a new row with shared column metadata, aligning `values` to
    /// the columns the same way as `new`.
    pub fn with_columns(columns: Arc<ColumnInfo>, mut values: Vec<Value>) -> Self {
        values.resize(columns.len(), Value::Null);
        Self { values, columns }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = Self::default();
        for (name, value) in pairs {
            row.set(name, value);
        }
        row
    }

    /// Get the shared column metadata.
    pub fn column_info(&self) -> Arc<ColumnInfo> {
        Arc::clone(&self.columns)
    }

    /// Get the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if this row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name. O(1) operation via HashMap lookup.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns.index_of(name).and_then(|i| self.values.get(i))
    }

    /// Check if a column exists by name.
    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Insert or overwrite a column value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if let Some(index) = self.columns.index_of(&name) {
            if let Some(slot) = self.values.get_mut(index) {
                *slot = value;
            }
            return;
        }
        let index = Arc::make_mut(&mut self.columns).push(name);
        self.values.resize(index, Value::Null);
        self.values.push(value);
    }

    /// Get a typed value by column name.
    #[allow(clippy::result_large_err)]
    pub fn get_named<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get_by_name(name).ok_or_else(|| {
            Error::Type(TypeError {
                expected: std::any::type_name::<T>(),
                actual: format!("column '{}' not found", name),
                column: Some(name.to_string()),
            })
        })?;
        T::from_value(value).map_err(|e| e.in_column(name))
    }

    /// Get all column names.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.names().iter().map(String::as_str)
    }

    /// Iterate over all values.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Iterate over (column_name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Render this row as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect(),
        )
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get_by_name(name) == Some(value))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

/// Trait for converting from a `Value` to a typed value.
pub trait FromValue: Sized {
    /// Convert from a Value, returning an error if the conversion fails.
    #[allow(clippy::result_large_err)]
    fn from_value(value: &Value) -> Result<Self>;
}

/// Trait for converting a typed value into a `Value`.
///
/// This is the read half of a struct-backed record: every field type a
/// record exposes through `get_field` implements it.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

fn mismatch<T>(value: &Value) -> Error {
    Error::Type(TypeError {
        expected: std::any::type_name::<T>(),
        actual: value.type_name().to_string(),
        column: None,
    })
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch::<Self>(value))
    }
}

fn integer<T: TryFrom<i64>>(value: &Value) -> Result<T> {
    let wide = match value {
        Value::Text(s) | Value::Decimal(s) => s.trim().parse::<i64>().ok(),
        other => other.as_i64(),
    };
    wide.and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| mismatch::<T>(value))
}

impl FromValue for i8 {
    fn from_value(value: &Value) -> Result<Self> {
        integer(value)
    }
}

impl FromValue for i16 {
    fn from_value(value: &Value) -> Result<Self> {
        integer(value)
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self> {
        integer(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        integer(value)
    }
}

impl FromValue for u32 {
    fn from_value(value: &Value) -> Result<Self> {
        integer(value)
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self> {
        integer(value)
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Float(v) => Ok(*v),
            other => other
                .as_f64()
                .map(|v| v as f32)
                .ok_or_else(|| mismatch::<Self>(value)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_f64().ok_or_else(|| mismatch::<Self>(value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch::<Self>(value))
    }
}

impl FromValue for [u8; 16] {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Uuid(v) => Ok(*v),
            Value::Bytes(v) if v.len() == 16 => {
                let mut arr = [0u8; 16];
                arr.copy_from_slice(v);
                Ok(arr)
            }
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for Row {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Record(row) => Ok((**row).clone()),
            Value::Json(json @ serde_json::Value::Object(_)) => {
                Self::from_value(&Value::from_json(json.clone()))
            }
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.to_json())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            Value::Json(serde_json::Value::Array(items)) => items
                .iter()
                .map(|item| T::from_value(&Value::from_json(item.clone())))
                .collect(),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: &Value) -> Result<Self> {
        T::from_value(value).map(Box::new)
    }
}

macro_rules! to_value_via_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::from(self.clone())
                }
            }
        )*
    };
}

to_value_via_from!(
    bool, i8, i16, i32, i64, u32, f32, f64, String, [u8; 16], Row
);

impl ToValue for u64 {
    fn to_value(&self) -> Value {
        i64::try_from(*self).map_or_else(
            |_| {
                tracing::warn!(
                    value = *self,
                    clamped_to = i64::MAX,
                    "u64 value exceeds i64::MAX; clamping to i64::MAX"
                );
                Value::BigInt(i64::MAX)
            },
            Value::BigInt,
        )
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        Value::Json(self.clone())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_existing_column() {
        let mut row = Row::from_pairs([("id", 1_i64), ("author_id", 5_i64)]);
        row.set("author_id", 6_i64);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get_by_name("author_id"), Some(&Value::BigInt(6)));
    }

    #[test]
    fn test_set_appends_without_touching_siblings() {
        let columns = Arc::new(ColumnInfo::new(vec!["id".to_string()]));
        let first = Row::with_columns(Arc::clone(&columns), vec![Value::BigInt(1)]);
        let mut second = Row::with_columns(columns, vec![Value::BigInt(2)]);

        second.set("author", Value::Null);

        assert!(second.contains_column("author"));
        assert!(!first.contains_column("author"));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_new_aligns_values_to_columns() {
        let mut short = Row::new(
            vec!["a".to_string(), "b".to_string()],
            vec![Value::BigInt(1)],
        );
        assert_eq!(short.len(), 2);
        assert_eq!(short.get_by_name("b"), Some(&Value::Null));
        short.set("b", Value::BigInt(2));
        short.set("c", Value::BigInt(3));
        assert_eq!(short.get_by_name("b"), Some(&Value::BigInt(2)));
        assert_eq!(short.get_by_name("c"), Some(&Value::BigInt(3)));

        let mut long = Row::new(
            vec!["a".to_string()],
            vec![Value::BigInt(1), Value::BigInt(9)],
        );
        assert_eq!(long.len(), 1);
        long.set("b", Value::BigInt(2));
        assert_eq!(long.get_by_name("a"), Some(&Value::BigInt(1)));
        assert_eq!(long.get_by_name("b"), Some(&Value::BigInt(2)));
    }

    #[test]
    fn test_equality_ignores_column_order() {
        let a = Row::from_pairs([("id", Value::BigInt(1)), ("name", Value::from("x"))]);
        let b = Row::from_pairs([("name", Value::from("x")), ("id", Value::BigInt(1))]);
        let c = Row::from_pairs([("id", Value::BigInt(2)), ("name", Value::from("x"))]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_get_named_reports_column() {
        let row = Row::from_pairs([("age", "old")]);
        let err = row.get_named::<i64>("age").unwrap_err();
        assert!(err.to_string().contains("column 'age'"));

        let missing = row.get_named::<i64>("height").unwrap_err();
        assert!(missing.to_string().contains("not found"));
    }

    #[test]
    fn test_integer_conversion_accepts_text_and_rejects_overflow() {
        assert_eq!(i64::from_value(&Value::from("42")).unwrap(), 42);
        assert_eq!(i32::from_value(&Value::BigInt(7)).unwrap(), 7);
        assert!(i8::from_value(&Value::BigInt(1000)).is_err());
        assert!(i64::from_value(&Value::Null).is_err());
    }

    #[test]
    fn test_option_and_vec_conversions() {
        assert_eq!(Option::<i64>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(
            Vec::<i64>::from_value(&Value::Array(vec![Value::Int(1), Value::BigInt(2)])).unwrap(),
            vec![1, 2]
        );
        assert!(Vec::<i64>::from_value(&Value::Null).is_err());
    }

    #[test]
    fn test_row_from_record_value() {
        let row = Row::from_pairs([("id", 3_i64)]);
        let value = Value::from(row.clone());
        assert_eq!(Row::from_value(&value).unwrap(), row);
        assert!(Row::from_value(&Value::BigInt(3)).is_err());
    }

    #[test]
    fn test_serde_roundtrip_as_object() {
        let row = Row::from_pairs([("id", Value::BigInt(1)), ("name", Value::from("Ada"))]);
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.is_object());
        let back: Row = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_to_value_for_containers() {
        assert_eq!(Some(3_i64).to_value(), Value::BigInt(3));
        assert_eq!(None::<String>.to_value(), Value::Null);
        assert_eq!(
            vec![1_i32, 2].to_value(),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(u64::MAX.to_value(), Value::BigInt(i64::MAX));
    }
}
