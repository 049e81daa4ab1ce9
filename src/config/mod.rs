//! Configuration management for EdgeBoard
//!
//! Every constant the clipboard core depends on (history capacity, preview
//! limits, poll cadence) can be overridden from a TOML file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Maximum number of entries kept in history
pub const MAX_HISTORY: usize = 50;
/// Number of entries pushed to the overlay on each update
pub const PUBLISH_LIMIT: usize = 10;
/// Characters shown for text and document previews
pub const PREVIEW_TEXT_LIMIT: usize = 80;
/// Characters shown for code previews
pub const PREVIEW_CODE_LIMIT: usize = 200;
/// Clipboard poll cadence
pub const POLL_INTERVAL_MS: u64 = 500;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Failed to serialize TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Validation error
    #[error("Config validation failed: {0}")]
    Validation(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// History configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Preview rendering configuration
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Clipboard poller configuration
    #[serde(default)]
    pub poller: PollerConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// History configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of clipboard items to keep
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Number of items sent to the overlay per update
    #[serde(default = "default_publish_limit")]
    pub publish_limit: usize,

    /// Directory used by history exports
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

/// Preview configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Character limit for text and document previews
    #[serde(default = "default_text_limit")]
    pub text_limit: usize,

    /// Character limit for code previews
    #[serde(default = "default_code_limit")]
    pub code_limit: usize,
}

/// Clipboard poller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Poll interval in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Run the startup clipboard read through the classifier instead of
    /// recording it as plain text
    #[serde(default)]
    pub classify_bootstrap: bool,

    /// Skip content that looks like credentials or keys
    #[serde(default)]
    pub skip_sensitive: bool,
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_max_history() -> usize {
    MAX_HISTORY
}

fn default_publish_limit() -> usize {
    PUBLISH_LIMIT
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("~/Downloads")
}

fn default_text_limit() -> usize {
    PREVIEW_TEXT_LIMIT
}

fn default_code_limit() -> usize {
    PREVIEW_CODE_LIMIT
}

fn default_interval_ms() -> u64 {
    POLL_INTERVAL_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            publish_limit: default_publish_limit(),
            export_dir: default_export_dir(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            text_limit: default_text_limit(),
            code_limit: default_code_limit(),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            classify_bootstrap: false,
            skip_sensitive: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            preview: PreviewConfig::default(),
            poller: PollerConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Checks in order:
    /// 1. Path from EDGEBOARD_CONFIG environment variable
    /// 2. ~/.config/edgeboard/config.toml
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => {
                let mut config = Self::default();
                config.expand_paths();
                Ok(config)
            }
        }
    }

    /// Load configuration with optional custom path
    pub fn load_config(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load_from_path(&path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml_str)?;
        config.expand_paths();
        config.validate_config()?;
        Ok(config)
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("EDGEBOARD_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        Self::default_path().filter(|p| p.exists())
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("edgeboard").join("config.toml"))
    }

    fn expand_paths(&mut self) {
        self.history.export_dir = expand_path(&self.history.export_dir);
    }

    fn validate_config(&self) -> Result<(), ConfigError> {
        let history = &self.history;
        if !(1..=1000).contains(&history.max_history) {
            return Err(ConfigError::Validation(
                "max_history must be between 1 and 1000".to_string(),
            ));
        }
        if history.publish_limit < 1 || history.publish_limit > history.max_history {
            return Err(ConfigError::Validation(
                "publish_limit must be between 1 and max_history".to_string(),
            ));
        }

        if self.preview.text_limit < 1 || self.preview.code_limit < 1 {
            return Err(ConfigError::Validation(
                "preview limits must be at least 1".to_string(),
            ));
        }

        if !(50..=60_000).contains(&self.poller.interval_ms) {
            return Err(ConfigError::Validation(
                "interval_ms must be between 50 and 60000".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Write the commented example config to the default location
    pub fn generate_example_config(force: bool) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not find config directory",
            ))
        })?;

        if !force && path.exists() {
            return Err(ConfigError::Validation(
                "Config file already exists. Use --force to overwrite.".to_string(),
            ));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Self::generate_example())?;
        Ok(path)
    }

    /// Generate example configuration file
    pub fn generate_example() -> String {
        let config = Config::default();

        format!(
            r#"# EdgeBoard Configuration File
# Location: ~/.config/edgeboard/config.toml

# Clipboard history
[history]
# Number of clipboard items to keep
max_history = {}
# Number of items pushed to the overlay per update
publish_limit = {}
# Directory for history exports
export_dir = "{}"

# Preview rendering
[preview]
# Characters shown for text and document entries
text_limit = {}
# Characters shown for code entries
code_limit = {}

# Clipboard polling
[poller]
# Poll interval in milliseconds
interval_ms = {}
# Classify the clipboard content found at startup
classify_bootstrap = {}
# Ignore content that looks like passwords or keys
skip_sensitive = {}

# Logging level (trace, debug, info, warn, error)
log_level = "{}"
"#,
            config.history.max_history,
            config.history.publish_limit,
            config.history.export_dir.display(),
            config.preview.text_limit,
            config.preview.code_limit,
            config.poller.interval_ms,
            config.poller.classify_bootstrap,
            config.poller.skip_sensitive,
            config.log_level
        )
    }
}

/// Expand tilde in path
fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(path_str.as_ref());
    PathBuf::from(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.history.max_history, 50);
        assert_eq!(config.history.publish_limit, 10);
        assert_eq!(config.preview.text_limit, 80);
        assert_eq!(config.preview.code_limit, 200);
        assert_eq!(config.poller.interval_ms, 500);
        assert!(!config.poller.classify_bootstrap);
        assert!(!config.poller.skip_sensitive);
    }

    #[test]
    fn test_load_from_toml() {
        let toml_str = r#"
            log_level = "debug"

            [history]
            max_history = 20
            publish_limit = 5

            [poller]
            interval_ms = 250
            classify_bootstrap = true
        "#;

        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.history.max_history, 20);
        assert_eq!(config.history.publish_limit, 5);
        assert_eq!(config.poller.interval(), Duration::from_millis(250));
        assert!(config.poller.classify_bootstrap);
        assert_eq!(config.preview, PreviewConfig::default());
    }

    #[test]
    fn test_validation_max_history() {
        let result = Config::from_toml("[history]\nmax_history = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_publish_limit() {
        let toml_str = r#"
            [history]
            max_history = 5
            publish_limit = 10
        "#;
        assert!(Config::from_toml(toml_str).is_err());
    }

    #[test]
    fn test_validation_interval() {
        assert!(Config::from_toml("[poller]\ninterval_ms = 10\n").is_err());
    }

    #[test]
    fn test_export_dir_tilde_expanded() {
        let config = Config::from_toml("[history]\nexport_dir = \"~/exports\"\n").unwrap();
        assert!(!config.history.export_dir.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("edgeboard").join("config.toml");

        let mut config = Config::default();
        config.history.max_history = 25;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.history.max_history, 25);
        assert_eq!(loaded.poller.interval_ms, config.poller.interval_ms);
    }

    #[test]
    fn test_generate_example() {
        let example = Config::generate_example();
        assert!(example.contains("EdgeBoard Configuration"));
        assert!(example.contains("max_history = 50"));

        let parsed = Config::from_toml(&example).unwrap();
        assert_eq!(parsed.preview.code_limit, 200);
    }
}
