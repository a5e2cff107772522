//! The synchronous database connection consumed by SQL-backed fetchers.

use crate::error::Result;
use crate::row::Row;
use crate::value::Value;

/// A database connection able to run a parameterized SELECT.
///
/// Resolution is synchronous and blocks on the connection. Statement
/// timeouts and cancellation belong to the implementation; a cancelled or
/// timed-out statement surfaces as an `Err` which the caller propagates
/// unchanged.
pub trait Connection {
    /// Execute a query and return every row.
    #[allow(clippy::result_large_err)]
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Execute a query and return the first row, if any.
    #[allow(clippy::result_large_err)]
    fn query_one(&mut self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }
}

impl<C: Connection + ?Sized> Connection for &mut C {
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        (**self).query(sql, params)
    }

    fn query_one(&mut self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        (**self).query_one(sql, params)
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        (**self).query(sql, params)
    }

    fn query_one(&mut self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        (**self).query_one(sql, params)
    }
}
