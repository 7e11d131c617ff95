//! # Orderscope Analytics Engine
//!
//! This crate turns raw order rows into the summary views shown on the dashboard:
//! total orders, daily order counts, repeat purchases by region, review-score ratings
//! by product, category and payment method, and the RFM customer table.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files, HTTP or
//!   terminals. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless calculator. It takes a
//!   borrowed order slice and a `DateRange` and produces a fresh `DashboardReport` every
//!   time. Nothing is cached between calls.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: Runs the date filter and every view in one pass.
//! - `DashboardReport`: The standardized struct holding every computed view.
//! - `views`: The individual aggregation functions, usable on their own.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod filter;
pub mod report;
pub mod views;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use filter::filter_by_date;
pub use report::{
    DailyOrderCount, DashboardReport, PanelView, RatingAggregate, RatingTable,
    RegionRepeatPurchase, RfmRow, RfmTable,
};
