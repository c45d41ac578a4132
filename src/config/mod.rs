//! Configuration management for CloudClip
//!
//! This module handles loading, validating, and managing configuration
//! for the CloudClip agent.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Validation error
    #[error("Config validation failed: {0}")]
    Validation(String),

    /// No config file found at any known location
    #[error("No config file found (looked at {})", .0.display())]
    NotFound(PathBuf),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the remote clipboard store
    pub base_url: String,

    /// Name of the shared clipboard resource under `base_url`
    #[serde(default = "default_config_file_name")]
    pub config_file_name: String,

    /// Seconds between sync ticks
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Optional push-notification endpoint
    #[serde(default)]
    pub notification_url: Option<String>,

    /// Stable identifier for this device (generated if not specified)
    #[serde(default = "generate_device_id")]
    pub device_id: String,

    /// Basic-auth username for the remote store
    pub username: String,

    /// Basic-auth password for the remote store
    pub password: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions
fn default_config_file_name() -> String {
    "SyncClipboard.json".to_string()
}

fn default_check_interval() -> u64 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn generate_device_id() -> String {
    format!("Device_{}", rand::rng().random_range(100..10000))
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Checks in order:
    /// 1. Path from CLOUDCLIP_CONFIG environment variable
    /// 2. ~/.config/cloudclip/config.toml
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Err(ConfigError::NotFound(Self::default_config_path())),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate_config()?;
        Ok(config)
    }

    /// Load configuration with optional custom path
    pub fn load_config(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            Self::load_from_path(&path)
        } else {
            Self::load()
        }
    }

    /// URL of the shared remote clipboard resource
    pub fn remote_resource_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.config_file_name
        )
    }

    /// Interval between sync ticks
    pub fn check_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.check_interval_secs)
    }

    /// Default config file location
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cloudclip")
            .join("config.toml")
    }

    /// Find configuration file path
    pub fn find_config_path() -> Option<PathBuf> {
        // Check environment variable first
        if let Ok(path) = std::env::var("CLOUDCLIP_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        Some(Self::default_config_path()).filter(|p| p.exists())
    }

    /// Validate configuration values
    fn validate_config(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "base_url must not be empty".to_string(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "base_url must start with http:// or https://".to_string(),
            ));
        }
        if self.check_interval_secs < 1 {
            return Err(ConfigError::Validation(
                "check_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.config_file_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "config_file_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Write an example configuration file to the default location
    pub fn generate_example_config(force: bool) -> Result<PathBuf, ConfigError> {
        let config_path = Self::default_config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !force && config_path.exists() {
            return Err(ConfigError::Validation(
                "Config file already exists. Use --force to overwrite.".to_string(),
            ));
        }

        std::fs::write(&config_path, Self::generate_example())?;
        Ok(config_path)
    }

    /// Generate example configuration file content
    pub fn generate_example() -> String {
        format!(
            r#"# CloudClip Configuration File
# Location: ~/.config/cloudclip/config.toml

# Base URL of the remote clipboard store (WebDAV or any HTTP server
# that supports GET/HEAD/PUT on a single JSON document)
base_url = "https://example.com/dav"

# Name of the shared resource under base_url
config_file_name = "SyncClipboard.json"

# Seconds between sync ticks
check_interval_secs = {}

# Optional push-notification endpoint (e.g. a Bark server)
# notification_url = "https://bark.example.com/your-key"

# Stable identifier for this device (generated if omitted)
device_id = "{}"

# Basic-auth credentials for the remote store
username = "user"
password = "secret"

# Logging level (trace, debug, info, warn, error)
log_level = "{}"
"#,
            default_check_interval(),
            generate_device_id(),
            default_log_level()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn minimal_toml() -> &'static str {
        r#"
            base_url = "https://dav.example.com"
            username = "alice"
            password = "secret"
        "#
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_toml(minimal_toml()).unwrap();
        assert_eq!(config.config_file_name, "SyncClipboard.json");
        assert_eq!(config.check_interval_secs, 2);
        assert_eq!(config.log_level, "info");
        assert!(config.notification_url.is_none());
        assert!(config.device_id.starts_with("Device_"));
    }

    #[test]
    fn test_load_from_toml() {
        let toml_str = r#"
            base_url = "https://dav.example.com/store/"
            config_file_name = "clip.json"
            check_interval_secs = 5
            notification_url = "https://bark.example.com/key"
            device_id = "Device_42"
            username = "alice"
            password = "secret"
            log_level = "debug"
        "#;

        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(config.device_id, "Device_42");
        assert_eq!(config.check_interval_secs, 5);
        assert_eq!(
            config.notification_url.as_deref(),
            Some("https://bark.example.com/key")
        );
        assert_eq!(
            config.remote_resource_url(),
            "https://dav.example.com/store/clip.json"
        );
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let toml_str = r#"
            base_url = "ftp://dav.example.com"
            username = "alice"
            password = "secret"
        "#;
        assert!(Config::from_toml(toml_str).is_err());
    }

    #[test]
    fn test_validation_rejects_zero_interval() {
        let toml_str = r#"
            base_url = "https://dav.example.com"
            check_interval_secs = 0
            username = "alice"
            password = "secret"
        "#;
        assert!(Config::from_toml(toml_str).is_err());
    }

    #[test]
    fn test_missing_credentials_is_parse_error() {
        let toml_str = r#"base_url = "https://dav.example.com""#;
        assert!(matches!(
            Config::from_toml(toml_str),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_load_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, minimal_toml()).unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.username, "alice");
    }

    #[test]
    fn test_generate_example_parses() {
        let example = Config::generate_example();
        let parsed = Config::from_toml(&example).unwrap();
        assert_eq!(parsed.config_file_name, "SyncClipboard.json");
    }
}
