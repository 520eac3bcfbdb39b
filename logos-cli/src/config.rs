//! Configuration loading for logos-dashboard.
//!
//! Configuration is loaded from a TOML file (default: `logos-dashboard.toml`).
//! Every section and key is optional.

use logos_client::{ClientConfig, DEFAULT_ENDPOINT};
use logos_core::{EngineConfig, DEFAULT_ACTIVITY_CAPACITY, DEFAULT_CLIENT_NAME};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "logos-dashboard.toml";

/// Root configuration for logos-dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    /// Socket configuration.
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Engine configuration.
    #[serde(default)]
    pub dashboard: EngineSection,
    /// Download output configuration.
    #[serde(default)]
    pub downloads: DownloadsConfig,
}

/// Socket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Server dashboard endpoint (default: ws://localhost:3000/ws/client).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Delay before each reconnect attempt in milliseconds (default: 3000).
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Name announced when joining a storage (default: Dashboard).
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// Activity entries kept (default: 100).
    #[serde(default = "default_activity_capacity")]
    pub activity_capacity: usize,
    /// Drop pending downloads after this many seconds (default: never).
    #[serde(default)]
    pub pending_timeout_secs: Option<u64>,
}

/// Download output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadsConfig {
    /// Directory finished downloads are written to (default: downloads).
    #[serde(default = "default_download_dir")]
    pub directory: PathBuf,
}

// Default value functions
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_client_name() -> String {
    DEFAULT_CLIENT_NAME.to_string()
}

fn default_activity_capacity() -> usize {
    DEFAULT_ACTIVITY_CAPACITY
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            activity_capacity: default_activity_capacity(),
            pending_timeout_secs: None,
        }
    }
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            directory: default_download_dir(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load `path` if given, else the default file if it exists, else defaults.
    ///
    /// An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Engine settings.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            client_name: self.dashboard.client_name.clone(),
            activity_capacity: self.dashboard.activity_capacity,
            reconnect_delay: Duration::from_millis(self.connection.reconnect_delay_ms),
            pending_timeout: self.dashboard.pending_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Client settings (endpoint plus engine).
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.connection.endpoint).with_engine(self.engine_config())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}
