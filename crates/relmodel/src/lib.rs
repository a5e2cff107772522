//! RelModel Rust - batched relationship resolution.
//!
//! RelModel resolves BelongsTo, HasOne, HasMany and BelongsToMany
//! relationships for records that are either derived structs or plain maps:
//!
//! - One `IN` fetch per relationship for a whole batch, none for an empty key set
//! - Single-record resolution for on-demand loads
//! - A `LoadReport` listing every record whose relationship could not be written
//! - SQL rendering over any synchronous `Connection`, or an in-memory store
//! - N+1 detection for lazy loads issued in a loop
//!
//! # Quick Start
//!
//! ```
//! use relmodel::prelude::*;
//!
//! let store = MemoryStore::new()
//!     .with_rows(
//!         "roles",
//!         [
//!             Row::from_pairs([("id", Value::BigInt(10)), ("name", Value::from("admin"))]),
//!             Row::from_pairs([("id", Value::BigInt(11)), ("name", Value::from("editor"))]),
//!         ],
//!     )
//!     .with_rows(
//!         "user_roles",
//!         [
//!             Row::from_pairs([("user_id", Value::BigInt(1)), ("role_id", Value::BigInt(10))]),
//!             Row::from_pairs([("user_id", Value::BigInt(1)), ("role_id", Value::BigInt(11))]),
//!         ],
//!     );
//! let mut loader = Loader::new(store);
//!
//! let mut users: Vec<Row> = (1..=2)
//!     .map(|id| Row::from_pairs([("id", Value::BigInt(id))]))
//!     .collect();
//! let roles = Relationship::belongs_to_many("roles", "roles", "user_roles", "user_id", "role_id");
//!
//! let report = loader.eager_load(&mut users, &roles).unwrap();
//! assert!(report.is_complete());
//! assert_eq!(report.queries, 2);
//! assert!(matches!(users[0].get_field("roles"), Some(Value::Array(ref r)) if r.len() == 2));
//! assert_eq!(users[1].get_field("roles"), Some(Value::Array(vec![])));
//! ```
//!
//! Structs take part through `#[derive(Record)]`; the generated code refers
//! to `relmodel_core`, so depend on it alongside this crate.

pub use relmodel_core::{
    AssignError, ConfigError, Connection, ConnectionError, ConnectionErrorKind, Error, FromValue,
    KeyedRelation, PivotRelation, QueryError, QueryErrorKind, Record, Relationship,
    RelationshipKind, Result, Row, RowFetcher, ToValue, TypeError, Value, get_field,
    is_zero_value, naming, quote_ident, quote_ident_mysql, set_field, to_pascal_case,
    to_snake_case,
};

pub use relmodel_macros::Record;

pub use relmodel_query::{Dialect, InListSelect, Limit, OrderBy, OrderDirection, SqlFetcher};

pub use relmodel_loader::{
    CallSite, FetchLog, KeyValue, LazyResult, LoadReport, LoadWarning, Loader, LoaderConfig,
    MemoryStore, N1Detector, N1Stats, TieBreak,
};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use relmodel::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Descriptors
        KeyedRelation,
        // Loading
        LoadReport,
        LoadWarning,
        Loader,
        LoaderConfig,
        MemoryStore,
        PivotRelation,
        // Core traits and types
        Record,
        Relationship,
        RelationshipKind,
        Result,
        Row,
        RowFetcher,
        // SQL
        Dialect,
        SqlFetcher,
        Connection,
        Error,
        Value,
    };
}
