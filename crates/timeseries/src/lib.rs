//! # Market Index Time Series Store
//!
//! The read side of the dataset. A [`TimeSeriesStore`] indexes every daily bar
//! by `(symbol, date)` and answers the range scans, extremum lookups, boundary
//! closes and day-over-day change series the query engine is built on.
//!
//! Stores are immutable. [`StoreHandle`] is the one piece of shared state: an
//! atomically swappable pointer to the current store.

pub mod error;
pub mod handle;
pub mod loader;
pub mod store;

pub use error::StoreError;
pub use handle::StoreHandle;
pub use loader::load_store;
pub use store::{Bars, DailyChange, DailyChanges, DatedClose, Extreme, RangeStats, TimeSeriesStore};
