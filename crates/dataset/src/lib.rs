//! # Orderscope Dataset Crate
//!
//! Loads the static order file into memory exactly once and hands it out as an
//! immutable, cheaply clonable `OrderTable`.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Adapter:** This crate is the only place that knows about the on-disk
//!   format. Everything downstream works with typed `OrderRecord` rows.
//! - **Read-Only:** The table is never mutated after loading. Filtering and aggregation
//!   borrow from it and produce new values.
//!
//! ## Public API
//!
//! - `load_orders`: Reads and type-coerces the delimited file.
//! - `OrderTable`: The shared in-memory table.
//! - `DatasetError`: The specific error types that can be returned from this crate.

pub mod error;
pub mod loader;
pub mod table;

pub use error::DatasetError;
pub use loader::{LoadOptions, REQUIRED_COLUMNS, load_orders, parse_timestamp};
pub use table::OrderTable;
