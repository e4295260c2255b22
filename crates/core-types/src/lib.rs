//! # Market Index Core Types
//!
//! The shared vocabulary of the workspace: symbols, daily bars, the snapshot
//! payload they are loaded from, and the small set of argument checks and
//! rounding rules every other crate must agree on.
//!
//! This crate has no knowledge of storage or transport.

pub mod dates;
pub mod error;
pub mod rounding;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use dates::{parse_date, parse_year, validate_symbol, year_bounds};
pub use error::CoreError;
pub use rounding::{mean_2dp, pct_change, round_2dp};
pub use structs::{DailyBar, Snapshot, Symbol};
