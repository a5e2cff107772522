//! Relationship resolution for RelModel Rust.
//!
//! `relmodel-loader` resolves relationship descriptors against records:
//!
//! - `Loader::eager_load` resolves one relationship for a whole batch with
//!   one `IN` fetch (two for many-to-many)
//! - `Loader::lazy_load` resolves it for a single record
//! - `LoadReport` lists records that could not be resolved
//! - `N1Detector` warns about lazy loads issued in a loop
//! - `MemoryStore` is an in-memory `RowFetcher` for tests and previews

mod batch;
pub mod config;
pub mod key;
mod lazy;
pub mod loader;
pub mod memory;
pub mod n1_detection;
pub mod report;

pub use config::{LoaderConfig, TieBreak};
pub use key::KeyValue;
pub use loader::Loader;
pub use memory::{FetchLog, MemoryStore};
pub use n1_detection::{CallSite, N1Detector, N1Stats};
pub use report::{LazyResult, LoadReport, LoadWarning};
