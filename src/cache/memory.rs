//! In-memory cache storage
//!
//! Stores live as long as the `MemoryStorage` (and its clones) do. Every
//! handle opened under the same name shares one map.

use super::{CacheStorage, CacheStore, EntryInfo};
use crate::error::{PrecacheError, PrecacheResult};
use crate::http::Response;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local storage, cheap to clone
#[derive(Clone, Default)]
pub struct MemoryStorage {
    stores: Arc<RwLock<HashMap<String, Arc<MemoryStore>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store and keep the concrete type (for inspection in tests)
    pub async fn open_memory(&self, name: &str) -> PrecacheResult<Arc<MemoryStore>> {
        if name.trim().is_empty() {
            return Err(PrecacheError::InvalidStoreName(name.to_string()));
        }

        let mut stores = self.stores.write().await;
        let store = stores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryStore::new(name)));
        Ok(Arc::clone(store))
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> PrecacheResult<Arc<dyn CacheStore>> {
        let store: Arc<dyn CacheStore> = self.open_memory(name).await?;
        Ok(store)
    }

    async fn has(&self, name: &str) -> PrecacheResult<bool> {
        Ok(self.stores.read().await.contains_key(name))
    }

    async fn names(&self) -> PrecacheResult<Vec<String>> {
        let mut names: Vec<String> = self.stores.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

struct StoredEntry {
    response: Response,
    cached_at: DateTime<Utc>,
}

/// A single in-memory store
pub struct MemoryStore {
    name: String,
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl MemoryStore {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, url: &str, response: &Response) -> PrecacheResult<()> {
        let entry = StoredEntry {
            response: response.clone(),
            cached_at: Utc::now(),
        };
        self.entries.write().await.insert(url.to_string(), entry);
        Ok(())
    }

    async fn get(&self, url: &str) -> PrecacheResult<Option<Response>> {
        Ok(self
            .entries
            .read()
            .await
            .get(url)
            .map(|entry| entry.response.clone()))
    }

    async fn entries(&self) -> PrecacheResult<Vec<EntryInfo>> {
        let mut entries: Vec<EntryInfo> = self
            .entries
            .read()
            .await
            .iter()
            .map(|(url, entry)| EntryInfo {
                url: url.clone(),
                status: entry.response.status,
                size: entry.response.body.len() as u64,
                cached_at: entry.cached_at,
            })
            .collect();
        entries.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(entries)
    }
}
