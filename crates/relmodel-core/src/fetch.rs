//! The query-execution capability used by relationship resolution.

use crate::error::Result;
use crate::row::Row;
use crate::value::Value;

/// Fetches rows of one table filtered on one column.
///
/// Table and column names come from relationship descriptors and are
/// trusted; implementations quote them but do not validate them.
pub trait RowFetcher {
    /// `SELECT * FROM table WHERE column IN (values)`.
    ///
    /// Callers never pass an empty `values` slice.
    #[allow(clippy::result_large_err)]
    fn fetch_rows(&mut self, table: &str, column: &str, values: &[Value]) -> Result<Vec<Row>>;

    /// Fetch the first row where `column = value`.
    #[allow(clippy::result_large_err)]
    fn fetch_row(&mut self, table: &str, column: &str, value: &Value) -> Result<Option<Row>> {
        let rows = self.fetch_rows(table, column, std::slice::from_ref(value))?;
        Ok(rows.into_iter().next())
    }
}

impl<F: RowFetcher + ?Sized> RowFetcher for &mut F {
    fn fetch_rows(&mut self, table: &str, column: &str, values: &[Value]) -> Result<Vec<Row>> {
        (**self).fetch_rows(table, column, values)
    }

    fn fetch_row(&mut self, table: &str, column: &str, value: &Value) -> Result<Option<Row>> {
        (**self).fetch_row(table, column, value)
    }
}

impl<F: RowFetcher + ?Sized> RowFetcher for Box<F> {
    fn fetch_rows(&mut self, table: &str, column: &str, values: &[Value]) -> Result<Vec<Row>> {
        (**self).fetch_rows(table, column, values)
    }

    fn fetch_row(&mut self, table: &str, column: &str, value: &Value) -> Result<Option<Row>> {
        (**self).fetch_row(table, column, value)
    }
}
