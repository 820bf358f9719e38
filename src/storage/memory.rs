use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::types::StorageError;
use super::ProgressStore;

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory [`ProgressStore`] adapter.
///
/// Used by tests and as a fallback when no durable store is available.
/// Cloning shares the underlying map, so a test can hand a clone to a session
/// and still inspect what was written. `fail_writes` makes every subsequent
/// `set` fail, for exercising persistence-failure semantics.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, serde_json::Value>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle injected write failures.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Direct read for test assertions, bypassing the async port.
    pub fn peek(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.lock().expect("store lock poisoned").get(key).cloned()
    }
}

impl ProgressStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self.inner.lock().expect("store lock poisoned").get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        self.inner
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_owned(), value);
        Ok(())
    }
}
