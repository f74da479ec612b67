//! Tests for configuration resolution and graceful degradation
//!
//! Covers:
//! - Priority order: CLI > environment > TOML file > compiled default
//! - Missing config files do not prevent startup
//! - Explicit config paths must exist and parse
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate LSYNC_* variables are marked with #[serial].

use lsync_common::config::{
    load_toml_config, ConfigOverrides, ServiceConfig, TomlConfig, DEFAULT_BIND_ADDR,
    DEFAULT_EVENT_CAPACITY, DEFAULT_IDLE_SESSION_SECS, ENV_ADMIN_TOKEN, ENV_BIND_ADDR,
    ENV_DB_PATH, ENV_SYNC_PASSCODE,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(ENV_BIND_ADDR);
    env::remove_var(ENV_DB_PATH);
    env::remove_var(ENV_SYNC_PASSCODE);
    env::remove_var(ENV_ADMIN_TOKEN);
}

#[test]
#[serial]
fn test_defaults_with_no_overrides() {
    clear_env();

    let config = ServiceConfig::resolve(ConfigOverrides::default(), None);

    assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
    assert_eq!(config.idle_session_secs, DEFAULT_IDLE_SESSION_SECS);
    assert!(config.sync_passcode.is_empty());
    assert!(config.admin_token.is_none());
    assert!(config.db_path.ends_with("lsync.db"));
}

#[test]
#[serial]
fn test_toml_file_used_when_no_env_or_cli() {
    clear_env();

    let file = TomlConfig {
        bind_addr: Some("0.0.0.0:8080".to_string()),
        db_path: Some(PathBuf::from("/srv/lsync/catalog.db")),
        sync_passcode: Some("from-file".to_string()),
        admin_token: Some("file-admin".to_string()),
        event_capacity: Some(16),
        idle_session_secs: Some(600),
    };
    let config = ServiceConfig::resolve(ConfigOverrides::default(), Some(file));

    assert_eq!(config.bind_addr, "0.0.0.0:8080");
    assert_eq!(config.db_path, PathBuf::from("/srv/lsync/catalog.db"));
    assert_eq!(config.sync_passcode, "from-file");
    assert_eq!(config.admin_token.as_deref(), Some("file-admin"));
    assert_eq!(config.event_capacity, 16);
    assert_eq!(config.idle_session_secs, 600);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    env::set_var(ENV_SYNC_PASSCODE, "from-env");
    env::set_var(ENV_DB_PATH, "/tmp/lsync-env.db");

    let file = TomlConfig {
        sync_passcode: Some("from-file".to_string()),
        db_path: Some(PathBuf::from("/srv/file.db")),
        ..TomlConfig::default()
    };
    let config = ServiceConfig::resolve(ConfigOverrides::default(), Some(file));

    assert_eq!(config.sync_passcode, "from-env");
    assert_eq!(config.db_path, PathBuf::from("/tmp/lsync-env.db"));

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_BIND_ADDR, "127.0.0.1:1111");
    env::set_var(ENV_ADMIN_TOKEN, "env-admin");

    let cli = ConfigOverrides {
        bind_addr: Some("127.0.0.1:2222".to_string()),
        admin_token: Some("cli-admin".to_string()),
        ..ConfigOverrides::default()
    };
    let config = ServiceConfig::resolve(cli, None);

    assert_eq!(config.bind_addr, "127.0.0.1:2222");
    assert_eq!(config.admin_token.as_deref(), Some("cli-admin"));

    clear_env();
}

#[test]
#[serial]
fn test_empty_admin_token_means_no_admin() {
    clear_env();

    let file = TomlConfig {
        admin_token: Some(String::new()),
        ..TomlConfig::default()
    };
    let config = ServiceConfig::resolve(ConfigOverrides::default(), Some(file));

    assert!(config.admin_token.is_none());
}

#[test]
fn test_load_explicit_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        "bind_addr = \"127.0.0.1:9000\"\nsync_passcode = \"karaoke\"\nevent_capacity = 8\n",
    )
    .unwrap();

    let config = load_toml_config(Some(&path)).unwrap().unwrap();
    assert_eq!(config.bind_addr.as_deref(), Some("127.0.0.1:9000"));
    assert_eq!(config.sync_passcode.as_deref(), Some("karaoke"));
    assert_eq!(config.event_capacity, Some(8));
}

#[test]
fn test_explicit_missing_config_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.toml");

    assert!(load_toml_config(Some(&path)).is_err());
}

#[test]
fn test_explicit_invalid_config_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "event_capacity = \"lots\"\n").unwrap();

    assert!(load_toml_config(Some(&path)).is_err());
}
