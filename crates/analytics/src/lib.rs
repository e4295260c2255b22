//! # Market Index Query Engine
//!
//! The analytical core: range statistics, extremum dates, day-over-day change
//! rankings, period returns, yearly summaries and multi-symbol comparison over
//! the daily bars held by a [`timeseries::TimeSeriesStore`].
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** Operations never write. The engine holds a
//!   [`timeseries::StoreHandle`] and reads whichever store is current.
//! - **Structured Outcomes:** "No data" is a result, not a failure. Operations
//!   return `Outcome::Error` for it and reserve `Err(QueryError)` for bad
//!   arguments and an unavailable store.
//! - **One Rounding Rule:** Every average, change and return is rounded with
//!   `core_types::rounding`.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{DEFAULT_DAY_LIMIT, QueryEngine, Ranking};
pub use error::QueryError;
pub use report::{
    DailyMove, ErrorBody, Outcome, PriceOnDate, PriceRange, SymbolComparison, SymbolInfo,
    YearlySummary,
};
