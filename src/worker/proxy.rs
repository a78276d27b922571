//! Cache-first proxy worker

use super::{InstallReport, Manifest, Worker, STORE_NAME};
use crate::cache::CacheStorage;
use crate::error::PrecacheResult;
use crate::http::{Request, Response};
use crate::network::Network;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Pre-caches the manifest on install and serves requests cache-first.
///
/// The proxy holds only the store name; the store itself belongs to the
/// injected storage. Misses are forwarded to the network and never
/// written back.
pub struct CacheProxy {
    store_name: String,
    manifest: Manifest,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
}

impl CacheProxy {
    /// Create a proxy over the built-in manifest and store name
    pub fn new(storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> Self {
        Self {
            store_name: STORE_NAME.to_string(),
            manifest: Manifest::builtin(),
            storage,
            network,
        }
    }

    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = name.into();
        self
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

#[async_trait]
impl Worker for CacheProxy {
    async fn on_install(&self) -> PrecacheResult<InstallReport> {
        let store = self.storage.open(&self.store_name).await?;
        let entries = store
            .add_all(self.network.as_ref(), self.manifest.resources())
            .await?;

        info!("Pre-cached {} resources in {}", entries, self.store_name);
        Ok(InstallReport {
            store: self.store_name.clone(),
            entries,
        })
    }

    async fn on_fetch(&self, request: Request) -> PrecacheResult<Response> {
        // Looking up must not create the store
        if self.storage.has(&self.store_name).await? {
            let store = self.storage.open(&self.store_name).await?;
            if let Some(response) = store.match_request(&request).await? {
                debug!("Cache hit: {} {}", request.method, request.url);
                return Ok(response);
            }
        }

        debug!("Cache miss: {} {}", request.method, request.url);
        self.network.fetch(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, MemoryStorage};
    use crate::error::PrecacheError;
    use crate::http::Method;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves `content of <url>` for every request except failing ones
    #[derive(Default)]
    struct CountingNetwork {
        calls: AtomicUsize,
        failing: Mutex<HashSet<String>>,
    }

    impl CountingNetwork {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn fail(&self, url: &str) {
            self.failing.lock().unwrap().insert(url.to_string());
        }

        fn recover(&self) {
            self.failing.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl Network for CountingNetwork {
        async fn fetch(&self, request: &Request) -> PrecacheResult<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.lock().unwrap().contains(&request.url) {
                return Err(PrecacheError::network(&request.url, "unreachable"));
            }
            Ok(Response::new(
                &request.url,
                200,
                format!("content of {}", request.url),
            ))
        }
    }

    fn proxy() -> (CacheProxy, MemoryStorage, Arc<CountingNetwork>) {
        let storage = MemoryStorage::new();
        let network = Arc::new(CountingNetwork::default());
        let proxy = CacheProxy::new(Arc::new(storage.clone()), network.clone());
        (proxy, storage, network)
    }

    #[tokio::test]
    async fn install_populates_manifest() {
        let (proxy, storage, network) = proxy();

        let report = proxy.on_install().await.unwrap();

        assert_eq!(report.store, "sw-demo");
        assert_eq!(report.entries, 3);
        assert_eq!(network.calls(), 3);
        let store = storage.open_memory("sw-demo").await.unwrap();
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn cached_resources_skip_network() {
        let (proxy, _storage, network) = proxy();
        proxy.on_install().await.unwrap();
        let after_install = network.calls();

        for url in ["/", "/index.html", "/style.css"] {
            let response = proxy.on_fetch(Request::get(url)).await.unwrap();
            assert_eq!(response.body, format!("content of {}", url).into_bytes());
        }

        assert_eq!(network.calls(), after_install);
    }

    #[tokio::test]
    async fn miss_goes_to_network_once_without_storing() {
        let (proxy, storage, network) = proxy();
        proxy.on_install().await.unwrap();
        let after_install = network.calls();

        let response = proxy.on_fetch(Request::get("/app.js")).await.unwrap();

        assert_eq!(response.body, b"content of /app.js");
        assert_eq!(network.calls(), after_install + 1);
        let store = storage.open_memory("sw-demo").await.unwrap();
        assert_eq!(store.len().await, 3);
        assert!(store.get("/app.js").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn miss_failure_is_passed_through() {
        let (proxy, _storage, network) = proxy();
        network.fail("/offline.js");

        let err = proxy.on_fetch(Request::get("/offline.js")).await.unwrap_err();

        match err {
            PrecacheError::Network { url, reason } => {
                assert_eq!(url, "/offline.js");
                assert_eq!(reason, "unreachable");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn install_fails_if_any_resource_fails_then_recovers() {
        let (proxy, storage, network) = proxy();
        network.fail("/style.css");

        let err = proxy.on_install().await.unwrap_err();
        assert!(matches!(err, PrecacheError::InstallFetch { ref url, .. } if url == "/style.css"));

        network.recover();
        let report = proxy.on_install().await.unwrap();

        assert_eq!(report.entries, 3);
        let store = storage.open_memory("sw-demo").await.unwrap();
        assert_eq!(
            store.keys().await.unwrap(),
            vec!["/".to_string(), "/index.html".to_string(), "/style.css".to_string()]
        );
    }

    #[tokio::test]
    async fn lookup_is_exact_match() {
        let storage = MemoryStorage::new();
        let network = Arc::new(CountingNetwork::default());
        let proxy = CacheProxy::new(Arc::new(storage.clone()), network.clone())
            .with_manifest(Manifest::new(["/"]));
        proxy.on_install().await.unwrap();
        assert_eq!(network.calls(), 1);

        let response = proxy.on_fetch(Request::get("/index.html")).await.unwrap();

        assert_eq!(response.body, b"content of /index.html");
        assert_eq!(network.calls(), 2);
    }

    #[tokio::test]
    async fn non_get_requests_bypass_cache() {
        let (proxy, _storage, network) = proxy();
        proxy.on_install().await.unwrap();
        let after_install = network.calls();

        proxy
            .on_fetch(Request::new(Method::Post, "/"))
            .await
            .unwrap();

        assert_eq!(network.calls(), after_install + 1);
    }

    #[tokio::test]
    async fn fetch_before_install_does_not_create_store() {
        let (proxy, storage, network) = proxy();

        proxy.on_fetch(Request::get("/")).await.unwrap();

        assert_eq!(network.calls(), 1);
        assert!(!storage.has("sw-demo").await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_misses_may_each_hit_network() {
        let (proxy, _storage, network) = proxy();

        let (a, b) = tokio::join!(
            proxy.on_fetch(Request::get("/new.js")),
            proxy.on_fetch(Request::get("/new.js"))
        );

        assert_eq!(a.unwrap().body, b.unwrap().body);
        // No request deduplication: both signals reach the network
        assert_eq!(network.calls(), 2);
    }

    #[tokio::test]
    async fn custom_store_name() {
        let (proxy, storage, _network) = proxy();
        let proxy = proxy.with_store_name("assets-v2");

        proxy.on_install().await.unwrap();

        assert!(storage.has("assets-v2").await.unwrap());
        assert!(!storage.has("sw-demo").await.unwrap());
    }
}
