//! Error types for relationship resolution.

use std::fmt;

/// The primary error type for all RelModel operations.
#[derive(Debug)]
pub enum Error {
    /// Connection-related errors raised by the query-execution capability
    Connection(ConnectionError),
    /// Query execution errors
    Query(QueryError),
    /// Type conversion errors
    Type(TypeError),
    /// Malformed or incomplete configuration (including relationship descriptors)
    Config(ConfigError),
    /// Serialization/deserialization errors
    Serde(String),
    /// Custom error with message
    Custom(String),
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Failed to establish connection
    Connect,
    /// Connection lost during operation
    Disconnected,
}

#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub sql: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Syntax error in SQL
    Syntax,
    /// Constraint violation (unique, foreign key, etc.)
    Constraint,
    /// Table or column not found
    NotFound,
    /// Statement timeout or deadline exceeded
    Timeout,
    /// Cancelled by the caller's execution context
    Cancelled,
    /// Other database error
    Database,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Why a single record's relationship field could not be written.
///
/// Assignment failures never abort a batch; the loader collects them into
/// its load report instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignError {
    /// The record has no field with this name.
    UnknownField(String),
    /// The field exists but is read-only.
    NotSettable(String),
    /// The value cannot be converted into the field's declared type.
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl AssignError {
    /// Name of the field the assignment targeted.
    pub fn field(&self) -> &str {
        match self {
            AssignError::UnknownField(field) | AssignError::NotSettable(field) => field,
            AssignError::TypeMismatch { field, .. } => field,
        }
    }
}

impl Error {
    /// Build a configuration error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(ConfigError {
            message: message.into(),
            source: None,
        })
    }

    /// Attach a column name to a type error; other errors pass through.
    #[must_use]
    pub fn in_column(self, column: &str) -> Self {
        match self {
            Error::Type(mut te) => {
                te.column = Some(column.to_string());
                Error::Type(te)
            }
            other => other,
        }
    }

    /// Is this a configuration error (detected before any query ran)?
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Is this a connection error?
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Get the SQL that caused this error (if available).
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(e) => e.sql.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(e) => write!(f, "Connection error: {}", e.message),
            Error::Query(e) => write!(f, "Query error: {}", e.message),
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Serde(msg) => write!(f, "Serialization error: {}", msg),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.actual)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for AssignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignError::UnknownField(field) => write!(f, "no field named '{}'", field),
            AssignError::NotSettable(field) => write!(f, "field '{}' is not settable", field),
            AssignError::TypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "cannot assign {} to field '{}' of type {}",
                actual, field, expected
            ),
        }
    }
}

impl std::error::Error for AssignError {}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err.to_string())
    }
}

/// Result type alias for RelModel operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = Error::config("relationship 'posts' has an empty foreign key");
        assert!(err.is_config_error());
        assert_eq!(
            err.to_string(),
            "Configuration error: relationship 'posts' has an empty foreign key"
        );
    }

    #[test]
    fn test_query_error_keeps_sql() {
        let err = Error::Query(QueryError {
            kind: QueryErrorKind::Syntax,
            sql: Some("SELECT * FROM".to_string()),
            message: "syntax error at end of input".to_string(),
            source: None,
        });
        assert_eq!(err.sql(), Some("SELECT * FROM"));
        assert!(!err.is_config_error());
        assert_eq!(err.to_string(), "Query error: syntax error at end of input");
    }

    #[test]
    fn test_type_error_display_with_column() {
        let err = Error::Type(TypeError {
            expected: "i64",
            actual: "TEXT".to_string(),
            column: Some("author_id".to_string()),
        });
        assert_eq!(
            err.to_string(),
            "Type error in column 'author_id': expected i64, found TEXT"
        );
    }

    #[test]
    fn test_error_source_chains_connection_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Disconnected,
            message: "lost connection".to_string(),
            source: Some(Box::new(io)),
        });
        assert!(err.is_connection_error());
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "reset by peer");
    }

    #[test]
    fn test_assign_error_field_and_display() {
        let err = AssignError::TypeMismatch {
            field: "author".to_string(),
            expected: "Option<Author>",
            actual: "TEXT",
        };
        assert_eq!(err.field(), "author");
        assert_eq!(
            err.to_string(),
            "cannot assign TEXT to field 'author' of type Option<Author>"
        );
        assert_eq!(
            AssignError::NotSettable("id".to_string()).to_string(),
            "field 'id' is not settable"
        );
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Serde(_)));
    }
}
