//! Error types for precache
//!
//! All modules use `PrecacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for precache operations
pub type PrecacheResult<T> = Result<T, PrecacheError>;

/// All errors that can occur in precache
#[derive(Error, Debug)]
pub enum PrecacheError {
    // Install errors
    #[error("Install failed fetching {url}: {reason}")]
    InstallFetch { url: String, reason: String },

    // Network errors
    #[error("Network error for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Invalid origin URL: {0}")]
    InvalidOrigin(String),

    // Host errors
    #[error("No worker registered with the host")]
    NoWorker,

    #[error("Background task failed: {0}")]
    Join(String),

    // Storage errors
    #[error("Cache entry for {url} is corrupt: {reason}")]
    CorruptEntry { url: String, reason: String },

    #[error("Invalid cache store name: {0}")]
    InvalidStoreName(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl PrecacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for a URL
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create an install fetch error for a manifest entry
    pub fn install_fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstallFetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InstallFetch { .. } | Self::Network { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InstallFetch { .. } => {
                Some("Check that every manifest path is served by the origin, then run: precache install")
            }
            Self::Network { .. } => Some("Check network.origin with: precache config show"),
            Self::InvalidOrigin(_) => Some("Run: precache config set network.origin http://host:port"),
            Self::CorruptEntry { .. } => Some("Re-run: precache install"),
            _ => None,
        }
    }
}
