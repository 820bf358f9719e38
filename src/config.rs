//! Configuration file parser for ~/.config/lectern/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde.
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Config values are session defaults; the preference store overrides them
/// (see [`crate::preferences::PreferenceManager`]).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding subject JSON files.
    pub content_dir: PathBuf,

    /// Start sessions in emoji mode (reactions count as done) rather than
    /// checkbox mode.
    pub emoji_mode: bool,

    /// Start sessions with the expand-all override on.
    pub expand_all: bool,

    /// Emit celebration effects when objectives and lessons complete.
    pub celebrations: bool,

    /// Reopen the last viewed subject on startup.
    pub restore_last_subject: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            emoji_mode: false,
            expand_all: false,
            celebrations: true,
            restore_last_subject: true,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("lectern_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert!(!config.emoji_mode);
        assert!(!config.expand_all);
        assert!(config.celebrations);
        assert!(config.restore_last_subject);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/lectern/config.toml")).unwrap();
        assert!(!config.emoji_mode);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let path = temp_config("empty.toml", "   \n");
        let config = Config::load(&path).unwrap();
        assert!(config.celebrations);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let path = temp_config(
            "partial.toml",
            r#"
emoji_mode = true
content_dir = "/srv/curricula"
"#,
        );
        let config = Config::load(&path).unwrap();
        assert!(config.emoji_mode);
        assert_eq!(config.content_dir, PathBuf::from("/srv/curricula"));
        assert!(config.celebrations); // default preserved
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn oversized_file_is_rejected() {
        // One byte over the cap; content is never parsed
        let contents = format!("# {}\n", "x".repeat(Config::MAX_FILE_SIZE as usize));
        let path = temp_config("huge.toml", &contents);
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::TooLarge(_))
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let path = temp_config("bad.toml", "emoji_mode = [not toml");
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Parse(_))
        ));
        std::fs::remove_file(path).ok();
    }
}
