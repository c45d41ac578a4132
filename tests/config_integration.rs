//! Integration tests for configuration loading

use cloudclip::config::{Config, ConfigError};
use tempfile::TempDir;

#[test]
fn test_load_from_explicit_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
            base_url = "https://dav.example.com/store"
            device_id = "Device_7"
            username = "alice"
            password = "secret"
            check_interval_secs = 3
        "#,
    )
    .unwrap();

    let config = Config::load_config(Some(path)).unwrap();
    assert_eq!(config.device_id, "Device_7");
    assert_eq!(config.check_interval().as_secs(), 3);
    assert_eq!(
        config.remote_resource_url(),
        "https://dav.example.com/store/SyncClipboard.json"
    );
}

#[test]
fn test_missing_file_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.toml");
    let result = Config::load_config(Some(path));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_invalid_toml_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "base_url = [not toml").unwrap();

    let result = Config::load_config(Some(path));
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_trailing_slash_in_base_url() {
    let config = Config::from_toml(
        r#"
            base_url = "https://dav.example.com/"
            username = "alice"
            password = "secret"
        "#,
    )
    .unwrap();
    assert_eq!(
        config.remote_resource_url(),
        "https://dav.example.com/SyncClipboard.json"
    );
}
