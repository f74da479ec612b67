//! Configuration loading and resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error; the service starts on defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable names
pub const ENV_BIND_ADDR: &str = "LSYNC_BIND_ADDR";
pub const ENV_DB_PATH: &str = "LSYNC_DB_PATH";
pub const ENV_SYNC_PASSCODE: &str = "LSYNC_SYNC_PASSCODE";
pub const ENV_ADMIN_TOKEN: &str = "LSYNC_ADMIN_TOKEN";

/// Compiled defaults
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5726";
pub const DEFAULT_EVENT_CAPACITY: usize = 100;
/// Browser sessions idle longer than this are dropped (4 hours)
pub const DEFAULT_IDLE_SESSION_SECS: u64 = 4 * 60 * 60;

/// Contents of `config.toml`
///
/// All fields are optional so partial files are valid.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub db_path: Option<PathBuf>,
    pub sync_passcode: Option<String>,
    pub admin_token: Option<String>,
    pub event_capacity: Option<usize>,
    pub idle_session_secs: Option<u64>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_addr: Option<String>,
    pub db_path: Option<PathBuf>,
    pub sync_passcode: Option<String>,
    pub admin_token: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
    /// SQLite catalog database path
    pub db_path: PathBuf,
    /// Shared passcode for the sync gate (empty = gate cannot be unlocked)
    pub sync_passcode: String,
    /// Admin bearer token (None = nobody is privileged)
    pub admin_token: Option<String>,
    /// Broadcast channel capacity for workflow events
    pub event_capacity: usize,
    /// Idle time after which a browser session expires (gate locks again)
    pub idle_session_secs: u64,
}

impl ServiceConfig {
    /// Resolve configuration from CLI overrides, environment and TOML file
    pub fn resolve(cli: ConfigOverrides, file: Option<TomlConfig>) -> Self {
        let file = file.unwrap_or_default();

        let bind_addr = pick(cli.bind_addr, ENV_BIND_ADDR, file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let db_path = cli
            .db_path
            .or_else(|| std::env::var(ENV_DB_PATH).ok().map(PathBuf::from))
            .or(file.db_path)
            .unwrap_or_else(default_db_path);

        let sync_passcode =
            pick(cli.sync_passcode, ENV_SYNC_PASSCODE, file.sync_passcode).unwrap_or_default();
        if sync_passcode.is_empty() {
            warn!("No sync passcode configured; only admins can enter the sync workflow");
        }

        let admin_token = pick(cli.admin_token, ENV_ADMIN_TOKEN, file.admin_token)
            .filter(|token| !token.is_empty());

        Self {
            bind_addr,
            db_path,
            sync_passcode,
            admin_token,
            event_capacity: file.event_capacity.unwrap_or(DEFAULT_EVENT_CAPACITY),
            idle_session_secs: file.idle_session_secs.unwrap_or(DEFAULT_IDLE_SESSION_SECS),
        }
    }
}

fn pick(cli: Option<String>, env_var_name: &str, file: Option<String>) -> Option<String> {
    cli.or_else(|| std::env::var(env_var_name).ok()).or(file)
}

/// Load the TOML config file
///
/// With an explicit path the file must exist and parse. Without one the
/// platform locations are searched and a missing file yields `Ok(None)`.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<Option<TomlConfig>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match find_config_file() {
            Some(path) => path,
            None => {
                debug!("No config file found, using defaults");
                return Ok(None);
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    let config = parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    debug!("Loaded config file: {}", path.display());
    Ok(Some(config))
}

/// Parse `config.toml` contents
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
}

/// Search platform config locations
///
/// Linux: `~/.config/lsync/config.toml`, then `/etc/lsync/config.toml`.
/// Elsewhere: the platform config dir only.
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("lsync").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/lsync/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database location
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("lsync"))
        .unwrap_or_else(|| PathBuf::from("./lsync_data"))
        .join("lsync.db")
}
