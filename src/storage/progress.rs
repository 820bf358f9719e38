use super::db::Database;
use super::types::StorageError;
use super::ProgressStore;

impl ProgressStore for Database {
    /// Read a value by key. Missing keys are `None`; a stored value that no
    /// longer parses as JSON is an error (the caller decides whether to
    /// degrade or fail).
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM progress_store WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((raw,)) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// UPSERT a value, refreshing the row timestamp.
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&value)?;
        sqlx::query(
            r#"
            INSERT INTO progress_store (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(&raw)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
