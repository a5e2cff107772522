//! Core types and traits for RelModel Rust.
//!
//! This crate provides the building blocks for relationship resolution:
//!
//! - `Value` and `Row` for dynamically typed data
//! - `Record` for uniform field access over structs and maps
//! - `Relationship` descriptors (BelongsTo, HasOne, HasMany, BelongsToMany)
//! - `RowFetcher` and `Connection`, the query-execution capability
//! - `Error` and `Result`

pub mod connection;
pub mod error;
pub mod fetch;
pub mod identifiers;
pub mod naming;
pub mod record;
pub mod relationship;
pub mod row;
pub mod value;

pub use connection::Connection;
pub use error::{
    AssignError, ConfigError, ConnectionError, ConnectionErrorKind, Error, QueryError,
    QueryErrorKind, Result, TypeError,
};
pub use fetch::RowFetcher;
pub use identifiers::{quote_ident, quote_ident_mysql};
pub use naming::{to_pascal_case, to_snake_case};
pub use record::{Record, get_field, set_field};
pub use relationship::{KeyedRelation, PivotRelation, Relationship, RelationshipKind};
pub use row::{ColumnInfo, FromValue, Row, ToValue};
pub use value::{Value, is_zero_value};
