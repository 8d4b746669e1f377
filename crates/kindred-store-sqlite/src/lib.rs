//! SQLite backend for the Kindred tree store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The relationship uniqueness
//! constraints live in the schema itself; the store reports their
//! rejections as typed [`kindred_core::store::InsertOutcome`] values.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
