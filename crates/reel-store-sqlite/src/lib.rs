//! SQLite backend for the Reel catalog.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The [`Migrator`] applies the
//! [`reel_core::migration`] catalog to the live database and keeps the ledger
//! of applied steps.

mod encode;
mod migrate;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use migrate::{MigrationStatus, Migrator};
pub use store::SqliteStore;
