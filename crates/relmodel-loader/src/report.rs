//! Structured results of a resolution call.
//!
//! Per-record problems never abort a batch. They are collected here so the
//! caller can decide whether partial success is acceptable.

use relmodel_core::{AssignError, Relationship, RelationshipKind, Value};
use std::fmt;

/// A non-fatal problem with one source record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// The record has no field holding the relationship key.
    MissingKey { record: usize, field: String },
    /// The key field holds a value that cannot be used as a key.
    UnsupportedKey {
        record: usize,
        field: String,
        type_name: &'static str,
    },
    /// The resolved value could not be written to the record.
    Assign { record: usize, error: AssignError },
}

impl LoadWarning {
    /// Index of the record within the batch (0 for lazy loads).
    pub const fn record(&self) -> usize {
        match self {
            LoadWarning::MissingKey { record, .. }
            | LoadWarning::UnsupportedKey { record, .. }
            | LoadWarning::Assign { record, .. } => *record,
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MissingKey { record, field } => {
                write!(f, "record {}: no key field '{}'", record, field)
            }
            LoadWarning::UnsupportedKey {
                record,
                field,
                type_name,
            } => write!(
                f,
                "record {}: key field '{}' holds unsupported {} value",
                record, field, type_name
            ),
            LoadWarning::Assign { record, error } => write!(f, "record {}: {}", record, error),
        }
    }
}

/// Outcome of resolving one relationship over a set of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub relationship: String,
    pub kind: RelationshipKind,
    /// Records handed to the call.
    pub records: usize,
    /// Records left untouched because their key was zero or unusable.
    pub skipped: usize,
    /// Distinct keys looked up.
    pub keys: usize,
    /// Fetches issued.
    pub queries: usize,
    /// Records whose relationship field was written.
    pub assigned: usize,
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    pub fn new(relationship: &Relationship, records: usize) -> Self {
        Self {
            relationship: relationship.name().to_string(),
            kind: relationship.kind(),
            records,
            skipped: 0,
            keys: 0,
            queries: 0,
            assigned: 0,
            warnings: Vec::new(),
        }
    }

    /// Were all records either resolved or deliberately skipped?
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Indices of records that produced a warning, in ascending order.
    pub fn failed_records(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.warnings.iter().map(LoadWarning::record).collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    pub(crate) fn warn(&mut self, warning: LoadWarning) {
        tracing::warn!(
            relationship = %self.relationship,
            kind = %self.kind,
            record = warning.record(),
            warning = %warning,
            "Relationship not resolved for record"
        );
        self.warnings.push(warning);
    }
}

/// Outcome of resolving one relationship for a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct LazyResult {
    /// The resolved value: a record or `Null` for single relationships, an
    /// array for list relationships. `None` when the key was zero or missing
    /// and nothing was resolved.
    pub value: Option<Value>,
    pub report: LoadReport,
}
