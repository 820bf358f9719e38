use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors from a [`super::ProgressStore`] adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The backing store rejected the write (test injection, read-only
    /// filesystem, etc.).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Database-specific errors with user-friendly messages.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another instance of the application has locked the database.
    #[error("Another instance of lectern appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed.
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error.
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify a sqlx error, mapping SQLite lock conditions to
    /// [`DatabaseError::InstanceLocked`].
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if is_lock_error(&err.to_string()) {
            DatabaseError::InstanceLocked
        } else {
            DatabaseError::Other(err)
        }
    }
}

/// SQLITE_BUSY (5), SQLITE_LOCKED (6), and SQLITE_CANTOPEN (14) all surface
/// as locked-database message text from sqlx.
pub(crate) fn is_lock_error(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("sqlite_busy")
        || message.contains("sqlite_locked")
        || message.contains("unable to open database file")
}
