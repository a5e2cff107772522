//! In-memory tables implementing `RowFetcher`.
//!
//! Useful for tests and previews: every fetch is logged so callers can
//! assert how many lookups a resolution issued, and failures can be
//! injected per table.

use crate::key::KeyValue;
use relmodel_core::{Error, QueryError, QueryErrorKind, Record, Result, Row, RowFetcher, Value};
use std::collections::{HashMap, HashSet};

/// One logged fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchLog {
    pub table: String,
    pub column: String,
    pub values: Vec<Value>,
}

/// A set of named in-memory tables.
///
/// Lookups match values after key normalisation, so an `Int(5)` parameter
/// finds a `BigInt(5)` column. Rows come back in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Row>>,
    log: Vec<FetchLog>,
    failing: HashMap<String, QueryErrorKind>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or empty) a table.
    #[must_use]
    pub fn with_table(mut self, table: &str) -> Self {
        self.tables.insert(table.to_string(), Vec::new());
        self
    }

    /// Append rows to a table, creating it if needed.
    #[must_use]
    pub fn with_rows(mut self, table: &str, rows: impl IntoIterator<Item = Row>) -> Self {
        self.insert_all(table, rows);
        self
    }

    pub fn insert(&mut self, table: &str, row: Row) {
        self.tables.entry(table.to_string()).or_default().push(row);
    }

    pub fn insert_all(&mut self, table: &str, rows: impl IntoIterator<Item = Row>) {
        self.tables.entry(table.to_string()).or_default().extend(rows);
    }

    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    /// Make every fetch against `table` fail with `kind`.
    pub fn fail_table(&mut self, table: &str, kind: QueryErrorKind) {
        self.failing.insert(table.to_string(), kind);
    }

    pub fn heal_table(&mut self, table: &str) {
        self.failing.remove(table);
    }

    /// Every fetch issued so far, including failed ones.
    pub fn fetches(&self) -> &[FetchLog] {
        &self.log
    }

    pub fn fetch_count(&self) -> usize {
        self.log.len()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl RowFetcher for MemoryStore {
    fn fetch_rows(&mut self, table: &str, column: &str, values: &[Value]) -> Result<Vec<Row>> {
        self.log.push(FetchLog {
            table: table.to_string(),
            column: column.to_string(),
            values: values.to_vec(),
        });

        if let Some(&kind) = self.failing.get(table) {
            return Err(Error::Query(QueryError {
                kind,
                sql: None,
                message: format!("injected failure on table '{}'", table),
                source: None,
            }));
        }

        let Some(rows) = self.tables.get(table) else {
            return Err(Error::Query(QueryError {
                kind: QueryErrorKind::NotFound,
                sql: None,
                message: format!("no such table: {}", table),
                source: None,
            }));
        };

        let wanted: HashSet<KeyValue> = values.iter().filter_map(KeyValue::from_value).collect();
        let matched: Vec<Row> = rows
            .iter()
            .filter(|row| {
                row.get_field(column)
                    .and_then(|v| KeyValue::from_value(&v))
                    .is_some_and(|k| wanted.contains(&k))
            })
            .cloned()
            .collect();

        tracing::trace!(
            table = table,
            column = column,
            keys = values.len(),
            rows = matched.len(),
            "Memory fetch"
        );
        Ok(matched)
    }
}
