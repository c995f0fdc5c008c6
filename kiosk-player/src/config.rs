//! Runtime configuration for kiosk-player
//!
//! Merges the bootstrap TOML file with command-line overrides. Command-line
//! values win; anything left unset falls back to the file, then to built-in
//! defaults.

use kiosk_common::config::TomlConfig;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Values supplied on the command line (or their environment variables)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub state_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
}

/// Validated player configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub catalog_path: PathBuf,
    pub state_path: PathBuf,
    pub static_dir: PathBuf,
    pub tick_interval: Duration,
    pub initial_volume: u8,
    pub device_mode: String,
    pub log_level: String,
}

impl Config {
    /// Apply `overrides` on top of `toml` and validate the result
    pub fn from_parts(toml: TomlConfig, overrides: Overrides) -> Result<Self> {
        if toml.tick_interval_ms == 0 {
            return Err(Error::Config("tick_interval_ms must be greater than 0".to_string()));
        }
        if toml.initial_volume > 100 {
            return Err(Error::Config(format!(
                "initial_volume must be 0-100, got {}",
                toml.initial_volume
            )));
        }

        let ip: IpAddr = toml.bind_address.parse().map_err(|e| {
            Error::Config(format!("Invalid bind_address '{}': {}", toml.bind_address, e))
        })?;
        let port = overrides.port.unwrap_or(toml.port);

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            catalog_path: overrides.catalog_path.unwrap_or(toml.catalog_path),
            state_path: overrides.state_path.unwrap_or(toml.state_path),
            static_dir: overrides.static_dir.unwrap_or(toml.static_dir),
            tick_interval: Duration::from_millis(toml.tick_interval_ms),
            initial_volume: toml.initial_volume,
            device_mode: toml.device_mode,
            log_level: toml.logging.level,
        })
    }
}

/// Default tracing directives for `level` when `RUST_LOG` is unset
pub fn log_directives(level: &str) -> String {
    format!("kiosk_player={level},kiosk_common={level},tower_http=info")
}
