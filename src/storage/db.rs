use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use super::types::{is_lock_error, DatabaseError};

// ============================================================================
// Database
// ============================================================================

/// SQLite-backed durable store.
///
/// One database per user; progress data is personal, so on unix the file is
/// created with mode 0600.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open a database connection and run migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InstanceLocked`] when another lectern
    /// instance has the database locked, [`DatabaseError::Other`] for other
    /// database errors.
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        let url = format!("sqlite:{}?mode=rwc", path);

        #[cfg(unix)]
        if path != ":memory:" {
            restrict_permissions(path);
        }

        // busy_timeout=5000: wait up to 5s for a lock to release before
        // surfacing SQLITE_BUSY. Set via pragma so every pooled connection
        // inherits it.
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(DatabaseError::from_sqlx)?
            .pragma("busy_timeout", "5000");
        // Single-writer workload: one session writing snapshots, the CLI
        // reading. A small pool is plenty. In-memory databases are private to
        // a connection, so they get exactly one that never closes.
        let in_memory = path == ":memory:";
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 3 })
            .min_connections(if in_memory { 1 } else { 0 })
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        let db = Self { pool };
        db.migrate().await.map_err(|e| {
            if is_lock_error(&e.to_string()) {
                DatabaseError::InstanceLocked
            } else {
                DatabaseError::Migration(e.to_string())
            }
        })?;
        Ok(db)
    }

    /// Run schema migrations inside a single transaction.
    ///
    /// `IF NOT EXISTS` keeps re-runs idempotent; the transaction keeps a
    /// half-applied migration from surviving a crash.
    async fn migrate(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS progress_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Pre-create the database file with owner-only permissions, or tighten an
/// existing file. Failures are logged, not fatal — SQLite will surface any
/// real access problem at connect time.
#[cfg(unix)]
fn restrict_permissions(path: &str) {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let db_path = std::path::Path::new(path);
    if db_path.exists() {
        let perms = std::fs::Permissions::from_mode(0o600);
        if let Err(e) = std::fs::set_permissions(path, perms) {
            tracing::warn!(path = %path, error = %e, "Failed to set database file permissions");
        }
    } else if db_path.parent().is_some_and(|p| p.exists()) {
        // mode(0o600) at creation avoids a window with default umask perms
        let _ = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(db_path);
    }
}
