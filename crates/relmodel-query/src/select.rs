//! The single-table IN-list SELECT used for relationship lookups.

use crate::clause::{Limit, OrderBy};
use crate::dialect::Dialect;
use relmodel_core::Value;

/// `SELECT * FROM table WHERE column IN (...)`.
///
/// # Example
///
/// ```
/// use relmodel_core::Value;
/// use relmodel_query::{Dialect, InListSelect};
///
/// let (sql, params) = InListSelect::new("authors", "id", vec![Value::BigInt(5)])
///     .build(Dialect::Postgres);
/// assert_eq!(sql, "SELECT * FROM \"authors\" WHERE \"id\" IN ($1)");
/// assert_eq!(params, vec![Value::BigInt(5)]);
/// ```
#[derive(Debug, Clone)]
pub struct InListSelect {
    table: String,
    column: String,
    values: Vec<Value>,
    order_by: Vec<OrderBy>,
    limit: Option<Limit>,
}

impl InListSelect {
    pub fn new(table: impl Into<String>, column: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            values,
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Add an ORDER BY clause.
    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// Set the LIMIT.
    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(Limit(n));
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// An empty IN list matches nothing.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build the SQL query and parameters.
    ///
    /// An empty value list renders a predicate that is always false rather
    /// than the invalid `IN ()`.
    pub fn build(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut sql = String::from("SELECT * FROM ");
        sql.push_str(&dialect.quote_identifier(&self.table));

        sql.push_str(" WHERE ");
        if self.values.is_empty() {
            sql.push_str("1 = 0");
        } else {
            let placeholders: Vec<String> = (1..=self.values.len())
                .map(|i| dialect.placeholder(i))
                .collect();
            sql.push_str(&dialect.quote_identifier(&self.column));
            sql.push_str(" IN (");
            sql.push_str(&placeholders.join(", "));
            sql.push(')');
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let order_strs: Vec<_> = self.order_by.iter().map(|o| o.to_sql(dialect)).collect();
            sql.push_str(&order_strs.join(", "));
        }

        if let Some(Limit(n)) = self.limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }

        (sql, self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::BigInt).collect()
    }

    #[test]
    fn test_postgres_in_list() {
        let (sql, params) =
            InListSelect::new("profiles", "user_id", ids(&[1, 2, 3, 4, 5])).build(Dialect::Postgres);
        assert_eq!(
            sql,
            "SELECT * FROM \"profiles\" WHERE \"user_id\" IN ($1, $2, $3, $4, $5)"
        );
        assert_eq!(params, ids(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_sqlite_and_mysql_placeholders() {
        let select = InListSelect::new("user_roles", "user_id", ids(&[1, 2]));
        assert_eq!(
            select.build(Dialect::Sqlite).0,
            "SELECT * FROM \"user_roles\" WHERE \"user_id\" IN (?1, ?2)"
        );
        assert_eq!(
            select.build(Dialect::Mysql).0,
            "SELECT * FROM `user_roles` WHERE `user_id` IN (?, ?)"
        );
    }

    #[test]
    fn test_order_by_and_limit() {
        let (sql, _) = InListSelect::new("profiles", "user_id", ids(&[7]))
            .order_by(OrderBy::asc("id"))
            .order_by(OrderBy::desc("created_at"))
            .limit(1)
            .build(Dialect::Postgres);
        assert_eq!(
            sql,
            "SELECT * FROM \"profiles\" WHERE \"user_id\" IN ($1) ORDER BY \"id\" ASC, \"created_at\" DESC LIMIT 1"
        );
    }

    #[test]
    fn test_empty_list_renders_false_predicate() {
        let select = InListSelect::new("authors", "id", Vec::new());
        assert!(select.is_empty());
        let (sql, params) = select.build(Dialect::Postgres);
        assert_eq!(sql, "SELECT * FROM \"authors\" WHERE 1 = 0");
        assert!(params.is_empty());
    }

    #[test]
    fn test_identifiers_are_quoted() {
        let (sql, _) = InListSelect::new("order", "group\"id", ids(&[1])).build(Dialect::Postgres);
        assert_eq!(sql, "SELECT * FROM \"order\" WHERE \"group\"\"id\" IN ($1)");
    }
}
