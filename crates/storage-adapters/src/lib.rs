//! # storage-adapters
//!
//! Implementations of the `domains` ports.
//!
//! - [`MemoryStore`]: process-local store behind a single lock, always compiled.
//! - [`PgStore`]: PostgreSQL via sqlx (feature `db-postgres`).

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
