//! Named cache stores for captured responses
//!
//! A [`CacheStorage`] hands out [`CacheStore`]s by name, creating them on
//! first open. Stores are keyed by exact resource identifier and keep
//! entries until something outside the worker deletes them.
//!
//! # Backends
//!
//! | Backend | Lifetime | Use |
//! |---------|----------|-----|
//! | [`DiskStorage`] | Persistent, per store directory | Default |
//! | [`MemoryStorage`] | Process | Tests and library embedding |

pub mod disk;
pub mod memory;

pub use disk::DiskStorage;
pub use memory::{MemoryStorage, MemoryStore};

use crate::error::{PrecacheError, PrecacheResult};
use crate::http::{Method, Request, Response};
use crate::network::Network;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Summary of one stored entry, used for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    pub url: String,
    pub status: u16,
    pub size: u64,
    pub cached_at: DateTime<Utc>,
}

/// Host storage subsystem: opens named stores
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the named store, creating it if absent
    async fn open(&self, name: &str) -> PrecacheResult<Arc<dyn CacheStore>>;

    /// Check whether a store with this name exists
    async fn has(&self, name: &str) -> PrecacheResult<bool>;

    /// Names of all existing stores
    async fn names(&self) -> PrecacheResult<Vec<String>>;
}

/// A single named key-value store of captured responses
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store name
    fn name(&self) -> &str;

    /// Store a response under an identifier, replacing any previous entry
    async fn put(&self, url: &str, response: &Response) -> PrecacheResult<()>;

    /// Exact-match lookup by identifier
    async fn get(&self, url: &str) -> PrecacheResult<Option<Response>>;

    /// All stored entries, sorted by identifier
    async fn entries(&self) -> PrecacheResult<Vec<EntryInfo>>;

    /// Look up a request. Only GET requests are answered from the store.
    async fn match_request(&self, request: &Request) -> PrecacheResult<Option<Response>> {
        if request.method != Method::Get {
            return Ok(None);
        }
        self.get(&request.url).await
    }

    /// Stored identifiers, sorted
    async fn keys(&self) -> PrecacheResult<Vec<String>> {
        Ok(self.entries().await?.into_iter().map(|e| e.url).collect())
    }

    /// Fetch every identifier and store the responses.
    ///
    /// All fetches must succeed with a 2xx status before anything is
    /// written. A failed put midway leaves the earlier entries in place.
    async fn add_all(&self, network: &dyn Network, urls: &[String]) -> PrecacheResult<usize> {
        let fetches = urls.iter().map(|url| async move {
            let response = network
                .fetch(&Request::get(url.as_str()))
                .await
                .map_err(|e| PrecacheError::install_fetch(url.as_str(), e.to_string()))?;

            if !response.is_ok() {
                return Err(PrecacheError::install_fetch(
                    url.as_str(),
                    format!("HTTP {}", response.status),
                ));
            }

            Ok(response)
        });

        let responses = try_join_all(fetches).await?;

        for (url, response) in urls.iter().zip(&responses) {
            self.put(url, response).await?;
            debug!("Stored {} in {}", url, self.name());
        }

        Ok(responses.len())
    }
}

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
