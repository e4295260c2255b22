//! # Market Index Database Crate
//!
//! This crate is the durable home of the dataset: an embedded SQLite file
//! holding the symbol directory and the daily bars. It is written only by the
//! snapshot load and read in full when the in-memory store is (re)built.
//!
//! ## Public API
//!
//! - `connect`: Opens (and if needed creates) the SQLite database as a pool.
//! - `run_migrations`: Applies the embedded schema.
//! - `database_exists`: First-run detection.
//! - `DbRepository`: Snapshot upsert and full-table reads.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, database_exists, database_path, run_migrations};
pub use error::DbError;
pub use repository::{DbRepository, LoadSummary};
