//! Configuration schema for precache
//!
//! Configuration is stored at `~/.config/precache/config.toml`. The store
//! name and manifest are compiled in and cannot be configured here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Network client settings
    pub network: NetworkConfig,

    /// Cache storage settings
    pub storage: StorageConfig,

    /// Host signal settings
    pub host: HostConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Network client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Origin that relative resource identifiers resolve against
    pub origin: String,

    /// Global timeout per request in seconds
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Cache storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage root (defaults to the state directory)
    pub root: Option<PathBuf>,
}

/// Host signal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Total attempts for the install signal
    pub install_attempts: u32,

    /// Delay between install attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            install_attempts: 1,
            retry_delay_ms: 500,
        }
    }
}
