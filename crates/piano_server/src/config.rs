//! Environment configuration for the melody service.
//!
//! # Invariants
//! - Every setting has a fixed fallback; reading config never fails.
//! - Problems with provided values are kept as warnings and logged once
//!   logging is up.

use piano_core::default_log_level;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DB_LOCATION: &str = "piano-app.sqlite3";

pub const PORT_VAR: &str = "PORT";
pub const DB_PATH_VAR: &str = "PIANO_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "PIANO_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "PIANO_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// SQLite file path, or `:memory:`.
    pub db_location: String,
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
    pub warnings: Vec<String>,
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let mut warnings = Vec::new();

        let port = match value(PORT_VAR) {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                warnings.push(format!(
                    "invalid {PORT_VAR} `{raw}`; using default {DEFAULT_PORT}"
                ));
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let working_dir = std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir());
        let log_dir = match value(LOG_DIR_VAR) {
            Some(raw) => working_dir.join(raw),
            None => working_dir.join("logs"),
        };

        Self {
            port,
            db_location: value(DB_PATH_VAR).unwrap_or_else(|| DEFAULT_DB_LOCATION.to_string()),
            log_level: value(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_dir,
            warnings,
        }
    }

    /// Listen address on all interfaces.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
