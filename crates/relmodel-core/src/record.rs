//! Uniform field access over struct-backed and map-backed records.
//!
//! Relationship resolution never knows which representation it is handed:
//! framework structs (via `#[derive(Record)]`) and ad hoc maps both expose
//! the same two operations.
//!
//! Lookup rules:
//!
//! - **Maps** try the snake_case key, then the PascalCase key, then the name
//!   verbatim. Writes always succeed and insert under the name given.
//! - **Structs** resolve reads through snake_case (the Rust field casing)
//!   and then the exact name; writes match the exact field name only.

use crate::error::AssignError;
use crate::naming::lookup_candidates;
use crate::row::Row;
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};

/// A single row of data whose fields can be read and written by name.
pub trait Record {
    /// Read a field. `None` means "no such field", which callers must keep
    /// distinct from a present-but-zero value.
    fn get_field(&self, name: &str) -> Option<Value>;

    /// Write a field, converting `value` into the field's type.
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AssignError>;
}

/// Read a field from an optional record; a missing record has no fields.
pub fn get_field<R: Record + ?Sized>(record: Option<&R>, name: &str) -> Option<Value> {
    record.and_then(|r| r.get_field(name))
}

/// Write a field on an optional record; a missing record has no fields.
pub fn set_field<R: Record + ?Sized>(
    record: Option<&mut R>,
    name: &str,
    value: Value,
) -> Result<(), AssignError> {
    match record {
        Some(r) => r.set_field(name, value),
        None => Err(AssignError::UnknownField(name.to_string())),
    }
}

fn lookup_in<'a, F>(name: &str, get: F) -> Option<Value>
where
    F: Fn(&str) -> Option<&'a Value>,
{
    lookup_candidates(name)
        .iter()
        .find_map(|candidate| get(candidate))
        .cloned()
}

impl Record for Row {
    fn get_field(&self, name: &str) -> Option<Value> {
        lookup_in(name, |key| self.get_by_name(key))
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        self.set(name, value);
        Ok(())
    }
}

impl Record for HashMap<String, Value> {
    fn get_field(&self, name: &str) -> Option<Value> {
        lookup_in(name, |key| self.get(key))
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        self.insert(name.to_string(), value);
        Ok(())
    }
}

impl Record for BTreeMap<String, Value> {
    fn get_field(&self, name: &str) -> Option<Value> {
        lookup_in(name, |key| self.get(key))
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        self.insert(name.to_string(), value);
        Ok(())
    }
}

impl Record for serde_json::Map<String, serde_json::Value> {
    fn get_field(&self, name: &str) -> Option<Value> {
        lookup_candidates(name)
            .iter()
            .find_map(|candidate| self.get(candidate))
            .map(|json| Value::from_json(json.clone()))
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        self.insert(name.to_string(), value.to_json());
        Ok(())
    }
}

impl<R: Record + ?Sized> Record for &mut R {
    fn get_field(&self, name: &str) -> Option<Value> {
        (**self).get_field(name)
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        (**self).set_field(name, value)
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn get_field(&self, name: &str) -> Option<Value> {
        (**self).get_field(name)
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        (**self).set_field(name, value)
    }
}
