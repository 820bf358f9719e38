//! Persistence port and adapters.
//!
//! The state core talks to storage through the [`ProgressStore`] trait: a
//! namespaced key-value contract over JSON values. Keys in use:
//!
//! - `progress-<subjectId>` — the overlay snapshot for one subject
//! - `bookmarked-lessons` — the bookmarked lesson-id set
//! - `preferences` — user preference overrides
//!
//! [`MemoryStore`] backs tests (with an injectable write-failure mode);
//! [`Database`] is the durable SQLite adapter.

mod db;
mod memory;
mod progress;
mod types;

use std::future::Future;

pub use db::Database;
pub use memory::MemoryStore;
pub use types::{DatabaseError, StorageError};

/// Key-value persistence contract.
///
/// Reads are snapshots; writes need no transactionality across keys. The
/// caller applies its in-memory change before calling `set` and never rolls
/// it back on failure, so adapters must treat a failed write as the caller's
/// problem to report, not to repair.
pub trait ProgressStore {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, StorageError>> + Send;

    fn set(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}
