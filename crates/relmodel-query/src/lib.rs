//! SQL rendering for RelModel Rust.
//!
//! `relmodel-query` turns relationship lookups into SQL:
//!
//! - `Dialect` for placeholders and identifier quoting
//! - `InListSelect` for `SELECT * FROM t WHERE c IN (...)`
//! - `SqlFetcher`, a `RowFetcher` over any synchronous `Connection`

pub mod clause;
pub mod dialect;
pub mod fetcher;
pub mod select;

pub use clause::{Limit, OrderBy, OrderDirection};
pub use dialect::Dialect;
pub use fetcher::SqlFetcher;
pub use select::InListSelect;
