//! A `RowFetcher` that renders SQL and runs it on a `Connection`.

use crate::clause::OrderBy;
use crate::dialect::Dialect;
use crate::select::InListSelect;
use relmodel_core::{Connection, Result, Row, RowFetcher, Value};
use std::collections::HashMap;

/// Runs relationship lookups as SQL on any synchronous connection.
///
/// Every lookup is one `SELECT * ... WHERE column IN (...)`. Value lists
/// longer than the dialect's bind-parameter limit are split over several
/// statements. Errors from the connection are returned unchanged.
#[derive(Debug)]
pub struct SqlFetcher<C> {
    conn: C,
    dialect: Dialect,
    order_by: HashMap<String, Vec<OrderBy>>,
}

impl<C: Connection> SqlFetcher<C> {
    pub fn new(conn: C, dialect: Dialect) -> Self {
        Self {
            conn,
            dialect,
            order_by: HashMap::new(),
        }
    }

    /// Order lookups against `table` by `order` (for example the related
    /// primary key, so HasOne candidates arrive in a stable order). Other
    /// tables, pivot tables included, stay unordered.
    #[must_use]
    pub fn with_order_by(mut self, table: impl Into<String>, order: OrderBy) -> Self {
        self.order_by.entry(table.into()).or_default().push(order);
        self
    }

    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn into_inner(self) -> C {
        self.conn
    }

    fn select(&self, table: &str, column: &str, values: Vec<Value>) -> InListSelect {
        self.order_by
            .get(table)
            .into_iter()
            .flatten()
            .cloned()
            .fold(InListSelect::new(table, column, values), InListSelect::order_by)
    }
}

impl<C: Connection> RowFetcher for SqlFetcher<C> {
    #[tracing::instrument(level = "trace", skip(self, values), fields(values = values.len()))]
    fn fetch_rows(&mut self, table: &str, column: &str, values: &[Value]) -> Result<Vec<Row>> {
        if values.is_empty() {
            tracing::trace!("Empty IN list, no query issued");
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        for chunk in values.chunks(self.dialect.max_params()) {
            let (sql, params) = self.select(table, column, chunk.to_vec()).build(self.dialect);
            tracing::trace!(sql = %sql, params = params.len(), "Relationship lookup SQL");
            rows.extend(self.conn.query(&sql, &params)?);
        }

        tracing::trace!(rows = rows.len(), "Relationship lookup complete");
        Ok(rows)
    }

    fn fetch_row(&mut self, table: &str, column: &str, value: &Value) -> Result<Option<Row>> {
        let (sql, params) = self
            .select(table, column, vec![value.clone()])
            .limit(1)
            .build(self.dialect);
        tracing::trace!(sql = %sql, "Single relationship lookup SQL");
        self.conn.query_one(&sql, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relmodel_core::{Error, QueryError, QueryErrorKind};

    #[derive(Default)]
    struct Recording {
        statements: Vec<(String, Vec<Value>)>,
        rows: Vec<Row>,
        fail: bool,
    }

    impl Connection for Recording {
        fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
            self.statements.push((sql.to_string(), params.to_vec()));
            if self.fail {
                return Err(Error::Query(QueryError {
                    kind: QueryErrorKind::Timeout,
                    sql: Some(sql.to_string()),
                    message: "statement timeout".to_string(),
                    source: None,
                }));
            }
            Ok(self.rows.clone())
        }
    }

    #[test]
    fn test_fetch_rows_renders_in_list() {
        let conn = Recording {
            rows: vec![Row::from_pairs([("id", 5_i64), ("name", 1_i64)])],
            ..Recording::default()
        };
        let mut fetcher = SqlFetcher::new(conn, Dialect::Sqlite);

        let rows = fetcher
            .fetch_rows("authors", "id", &[Value::BigInt(5), Value::BigInt(6)])
            .unwrap();
        assert_eq!(rows.len(), 1);

        let conn = fetcher.into_inner();
        assert_eq!(
            conn.statements,
            vec![(
                "SELECT * FROM \"authors\" WHERE \"id\" IN (?1, ?2)".to_string(),
                vec![Value::BigInt(5), Value::BigInt(6)]
            )]
        );
    }

    #[test]
    fn test_empty_values_never_reach_connection() {
        let mut fetcher = SqlFetcher::new(Recording::default(), Dialect::Postgres);
        assert!(fetcher.fetch_rows("authors", "id", &[]).unwrap().is_empty());
        assert!(fetcher.connection().statements.is_empty());
    }

    #[test]
    fn test_fetch_row_limits_and_orders() {
        let mut fetcher = SqlFetcher::new(Recording::default(), Dialect::Postgres)
            .with_order_by("profiles", OrderBy::asc("id"));
        let row = fetcher
            .fetch_row("profiles", "user_id", &Value::BigInt(1))
            .unwrap();
        assert!(row.is_none());
        assert_eq!(
            fetcher.connection().statements[0].0,
            "SELECT * FROM \"profiles\" WHERE \"user_id\" IN ($1) ORDER BY \"id\" ASC LIMIT 1"
        );
    }

    #[test]
    fn test_order_by_applies_to_its_table_only() {
        let mut fetcher = SqlFetcher::new(Recording::default(), Dialect::Postgres)
            .with_order_by("tags", OrderBy::asc("id"))
            .with_order_by("tags", OrderBy::desc("label"));
        fetcher
            .fetch_rows("post_tags", "post_id", &[Value::BigInt(1)])
            .unwrap();
        fetcher.fetch_rows("tags", "id", &[Value::BigInt(3)]).unwrap();

        let statements = &fetcher.connection().statements;
        assert_eq!(
            statements[0].0,
            "SELECT * FROM \"post_tags\" WHERE \"post_id\" IN ($1)"
        );
        assert_eq!(
            statements[1].0,
            "SELECT * FROM \"tags\" WHERE \"id\" IN ($1) ORDER BY \"id\" ASC, \"label\" DESC"
        );
    }

    #[test]
    fn test_oversized_lists_are_split() {
        let mut fetcher = SqlFetcher::new(Recording::default(), Dialect::Sqlite);
        let values: Vec<Value> = (0..40_000_i64).map(Value::BigInt).collect();
        fetcher.fetch_rows("tags", "id", &values).unwrap();

        let statements = &fetcher.connection().statements;
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].1.len(), Dialect::Sqlite.max_params());
        assert_eq!(statements[1].1.len(), 40_000 - Dialect::Sqlite.max_params());
    }

    #[test]
    fn test_query_error_propagates_unchanged() {
        let conn = Recording {
            fail: true,
            ..Recording::default()
        };
        let mut fetcher = SqlFetcher::new(conn, Dialect::Postgres);
        let err = fetcher
            .fetch_rows("authors", "id", &[Value::BigInt(1)])
            .unwrap_err();
        match err {
            Error::Query(e) => {
                assert_eq!(e.kind, QueryErrorKind::Timeout);
                assert_eq!(
                    e.sql.as_deref(),
                    Some("SELECT * FROM \"authors\" WHERE \"id\" IN ($1)")
                );
            }
            other => panic!("expected query error, got {other:?}"),
        }
    }
}
