//! Bootstrap configuration loading
//!
//! Configuration file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`KIOSK_CONFIG`)
//! 3. User config directory (`~/.config/kiosk-player/config.toml` on Linux)
//! 4. System config (`/etc/kiosk-player/config.toml`)
//! 5. Built-in defaults (no file)
//!
//! A missing file is never fatal: the player starts with defaults. A file that
//! exists but does not parse is a configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "KIOSK_CONFIG";

const CONFIG_DIR_NAME: &str = "kiosk-player";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Bootstrap configuration loaded from TOML
///
/// These settings cannot change while running.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP server port
    pub port: u16,

    /// Address the HTTP server binds to
    pub bind_address: String,

    /// Catalog JSON file
    pub catalog_path: PathBuf,

    /// Resume checkpoint file
    pub state_path: PathBuf,

    /// Web UI directory served for unmatched paths
    pub static_dir: PathBuf,

    /// Playback clock period in milliseconds (one simulated second per tick)
    pub tick_interval_ms: u64,

    /// Volume (0-100) of the player at startup
    pub initial_volume: u8,

    /// Device mode reported by the status endpoint
    pub device_mode: String,

    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "0.0.0.0".to_string(),
            catalog_path: PathBuf::from("config/catalog.json"),
            state_path: PathBuf::from("data/state.json"),
            static_dir: PathBuf::from("webui/static"),
            tick_interval_ms: 1000,
            initial_volume: 40,
            device_mode: "kids".to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from `path`
    ///
    /// A missing file yields defaults; an unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Resolve the config file location and load it
    ///
    /// Returns built-in defaults when no file is found anywhere.
    pub fn resolve_and_load(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            Some(path) => Self::load(&path),
            None => {
                info!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Locate the config file following the documented priority order
///
/// Explicit locations (CLI argument, environment variable) are returned even
/// if the file does not exist, so the caller can report it.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }

    // Priority 3: User config directory
    if let Some(path) = dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)) {
        if path.exists() {
            return Some(path);
        }
    }

    // Priority 4: System config
    let system_config = PathBuf::from("/etc")
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME);
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}
