//! SQLite backend for the crit review store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. All statements against one store go
//! through a single connection, which is what makes the rating update a true
//! atomic operation.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
