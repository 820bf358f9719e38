//! Preference manager that merges config.toml defaults with stored overrides.
//!
//! Config values serve as defaults; values under the `preferences` store key
//! override them. Writes always go to the store, never to the config file.
use std::collections::HashMap;

use crate::config::Config;
use crate::storage::{ProgressStore, StorageError};

/// Store key holding the preference override document.
pub const PREFS_KEY: &str = "preferences";

// ============================================================================
// PreferenceManager
// ============================================================================

/// Merged preference store: config defaults + stored overrides.
///
/// On load, config fields are flattened into a string map, then every entry
/// of the stored `preferences` document is layered on top. Reads are
/// in-memory O(1). Writes update the map first and then persist the whole
/// document; a failed write leaves the in-memory value applied (the caller
/// reports the warning).
pub struct PreferenceManager {
    prefs: HashMap<String, String>,
}

impl PreferenceManager {
    /// Load preferences by merging config defaults with stored overrides.
    /// Store errors degrade to config-only with a warning.
    pub async fn load<S: ProgressStore>(config: &Config, store: &S) -> Self {
        let mut prefs = Self::flatten_config(config);

        match store.get(PREFS_KEY).await {
            Ok(Some(serde_json::Value::Object(map))) => {
                for (key, value) in map {
                    if let serde_json::Value::String(value) = value {
                        prefs.insert(key, value);
                    }
                }
            }
            Ok(Some(other)) => {
                tracing::warn!(value = %other, "Preference document is not an object, ignoring");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load preferences, using config defaults");
            }
        }

        Self { prefs }
    }

    /// Create from config only (no store).
    pub fn from_config(config: &Config) -> Self {
        Self {
            prefs: Self::flatten_config(config),
        }
    }

    /// Get a preference value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.prefs.get(key).map(String::as_str)
    }

    /// Set a preference: updates the in-memory map, then persists the whole
    /// override document. The in-memory value stays applied even when the
    /// write fails.
    pub async fn set<S: ProgressStore>(
        &mut self,
        store: &S,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        self.prefs.insert(key.to_owned(), value.to_owned());

        let doc: serde_json::Map<String, serde_json::Value> = self
            .prefs
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        store.set(PREFS_KEY, serde_json::Value::Object(doc)).await
    }

    // ========================================================================
    // Typed Accessors
    // ========================================================================

    pub fn emoji_mode(&self) -> bool {
        self.bool_pref("emoji_mode", false)
    }

    pub fn expand_all(&self) -> bool {
        self.bool_pref("expand_all", false)
    }

    pub fn celebrations(&self) -> bool {
        self.bool_pref("celebrations", true)
    }

    /// The last subject the user had open, if any.
    pub fn last_subject(&self) -> Option<&str> {
        self.get("last_subject")
    }

    fn bool_pref(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// Flatten Config fields into key-value pairs.
    fn flatten_config(config: &Config) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("emoji_mode".to_owned(), config.emoji_mode.to_string());
        map.insert("expand_all".to_owned(), config.expand_all.to_string());
        map.insert("celebrations".to_owned(), config.celebrations.to_string());
        map
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::storage::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn defaults_come_from_config() {
        let store = MemoryStore::new();
        let config = Config::default();
        let pm = PreferenceManager::load(&config, &store).await;

        assert!(!pm.emoji_mode());
        assert!(!pm.expand_all());
        assert!(pm.celebrations());
        assert_eq!(pm.last_subject(), None);
    }

    #[tokio::test]
    async fn store_overrides_config() {
        let store = MemoryStore::new();
        store
            .set(PREFS_KEY, json!({"emoji_mode": "true"}))
            .await
            .unwrap();

        let pm = PreferenceManager::load(&Config::default(), &store).await;
        assert!(pm.emoji_mode());
    }

    #[tokio::test]
    async fn set_persists_and_updates_memory() {
        let store = MemoryStore::new();
        let mut pm = PreferenceManager::load(&Config::default(), &store).await;

        pm.set(&store, "expand_all", "true").await.unwrap();
        assert!(pm.expand_all());

        // Survives a reload
        let pm2 = PreferenceManager::load(&Config::default(), &store).await;
        assert!(pm2.expand_all());
    }

    #[tokio::test]
    async fn failed_write_keeps_memory_value() {
        let store = MemoryStore::new();
        let mut pm = PreferenceManager::load(&Config::default(), &store).await;
        store.fail_writes(true);

        assert!(pm.set(&store, "emoji_mode", "true").await.is_err());
        assert!(pm.emoji_mode());
    }

    #[tokio::test]
    async fn last_subject_round_trips() {
        let store = MemoryStore::new();
        let mut pm = PreferenceManager::load(&Config::default(), &store).await;
        pm.set(&store, "last_subject", "algebra").await.unwrap();

        let pm2 = PreferenceManager::load(&Config::default(), &store).await;
        assert_eq!(pm2.last_subject(), Some("algebra"));
    }

    #[tokio::test]
    async fn non_object_document_is_ignored() {
        let store = MemoryStore::new();
        store.set(PREFS_KEY, json!(["nope"])).await.unwrap();

        let pm = PreferenceManager::load(&Config::default(), &store).await;
        assert!(pm.celebrations());
    }

    #[tokio::test]
    async fn config_values_flatten() {
        let config = Config {
            emoji_mode: true,
            celebrations: false,
            ..Config::default()
        };
        let pm = PreferenceManager::from_config(&config);
        assert!(pm.emoji_mode());
        assert!(!pm.celebrations());
    }
}
