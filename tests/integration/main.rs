//! Integration tests for precache

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Manifest resources served by the test origin
const PAGES: [(&str, &str); 3] = [
    ("/", "<html>home</html>"),
    ("/index.html", "<html>home</html>"),
    ("/style.css", "body { margin: 0 }"),
];

/// Start an origin serving the demo page
///
/// Each manifest resource must be fetched exactly once; `/app.js` is
/// expected `live_hits` times.
async fn demo_origin(live_hits: u64) -> MockServer {
    let server = MockServer::start().await;
    for (resource, body) in PAGES {
        Mock::given(method("GET"))
            .and(path(resource))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/app.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("console.log('live')"))
        .expect(live_hits)
        .mount(&server)
        .await;
    server
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

mod cli_tests {
    use super::{demo_origin, request_count};
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Command isolated from the user's config and cache directories
    fn precache(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("precache");
        cmd.env_remove("PRECACHE_ORIGIN")
            .env("PRECACHE_CONFIG", temp.path().join("config.toml"))
            .env("PRECACHE_STORE_DIR", temp.path().join("caches"));
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        precache(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache-first offline proxy"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        precache(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("precache"));
    }

    #[test]
    fn manifest_lists_resources() {
        let temp = TempDir::new().unwrap();
        precache(&temp)
            .arg("manifest")
            .assert()
            .success()
            .stdout(predicate::str::contains("sw-demo"))
            .stdout(predicate::str::contains("/index.html"))
            .stdout(predicate::str::contains("/style.css"));
    }

    #[test]
    fn list_empty() {
        let temp = TempDir::new().unwrap();
        precache(&temp)
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        precache(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        precache(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[network]"));
    }

    #[test]
    fn config_set_and_show() {
        let temp = TempDir::new().unwrap();
        precache(&temp)
            .args(["config", "set", "network.origin", "https://example.com"])
            .assert()
            .success();

        precache(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("origin = \"https://example.com\""));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let temp = TempDir::new().unwrap();
        precache(&temp)
            .args(["config", "set", "store.name", "other"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn install_unreachable_origin_fails() {
        let temp = TempDir::new().unwrap();
        precache(&temp)
            .args(["install", "--origin", "http://127.0.0.1:9"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Install failed fetching"));
    }

    #[test]
    fn fetch_miss_with_unreachable_origin_fails() {
        let temp = TempDir::new().unwrap();
        precache(&temp)
            .args(["fetch", "/app.js", "--origin", "http://127.0.0.1:9"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Network error"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn install_then_serve_offline() {
        let temp = TempDir::new().unwrap();
        let origin = demo_origin(1).await;
        let url = origin.uri();

        precache(&temp)
            .args(["install", "--origin", &url])
            .assert()
            .success()
            .stdout(predicate::str::contains("Installed 3 entries into sw-demo"));
        assert_eq!(request_count(&origin).await, 3);

        precache(&temp)
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout("/\n/index.html\n/style.css\n");

        // Cache hit: served even though the origin is unreachable
        precache(&temp)
            .args(["fetch", "/style.css", "--origin", "http://127.0.0.1:9"])
            .assert()
            .success()
            .stdout("body { margin: 0 }");
        assert_eq!(request_count(&origin).await, 3);

        // Miss: one network call, not stored
        precache(&temp)
            .args(["fetch", "/app.js", "--origin", &url])
            .assert()
            .success()
            .stdout("console.log('live')");
        assert_eq!(request_count(&origin).await, 4);

        precache(&temp)
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout("/\n/index.html\n/style.css\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fetch_passes_non_ok_status_through() {
        let temp = TempDir::new().unwrap();
        let origin = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .expect(1)
            .mount(&origin)
            .await;

        precache(&temp)
            .args(["fetch", "/missing.png", "-i", "--origin", &origin.uri()])
            .assert()
            .success()
            .stdout("missing")
            .stderr(predicate::str::contains("HTTP 404"));
    }
}

mod proxy_tests {
    use super::demo_origin;
    use async_trait::async_trait;
    use precache::cache::{CacheStorage, DiskStorage, MemoryStorage};
    use precache::error::{PrecacheError, PrecacheResult};
    use precache::host::{Host, HostPolicy};
    use precache::http::{Request, Response};
    use precache::network::{HttpNetwork, Network};
    use precache::worker::{CacheProxy, STORE_NAME};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Answers every request unless switched offline
    struct FakeNetwork {
        calls: AtomicUsize,
        online: AtomicBool,
    }

    impl FakeNetwork {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                online: AtomicBool::new(true),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn set_online(&self, online: bool) {
            self.online.store(online, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Network for FakeNetwork {
        async fn fetch(&self, request: &Request) -> PrecacheResult<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.online.load(Ordering::SeqCst) {
                return Err(PrecacheError::network(&request.url, "offline"));
            }
            Ok(Response::new(&request.url, 200, format!("live {}", request.url)))
        }
    }

    fn host_with(storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> Host {
        let mut host = Host::new(HostPolicy::default());
        host.register(Arc::new(CacheProxy::new(storage, network)));
        host
    }

    #[tokio::test]
    async fn end_to_end_scenario() {
        let temp = TempDir::new().unwrap();
        let storage = Arc::new(DiskStorage::new(temp.path()));
        let network = FakeNetwork::new();
        let host = host_with(storage.clone(), network.clone());

        let report = host.install().await.unwrap();
        assert_eq!(report.entries, 3);
        let store = storage.open(STORE_NAME).await.unwrap();
        assert_eq!(store.keys().await.unwrap().len(), 3);

        let before = network.calls();
        let css = host.fetch(Request::get("/style.css")).await.unwrap();
        assert_eq!(css.body, b"live /style.css");
        assert_eq!(network.calls(), before);

        let js = host.fetch(Request::get("/app.js")).await.unwrap();
        assert_eq!(js.body, b"live /app.js");
        assert_eq!(network.calls(), before + 1);
        assert_eq!(store.keys().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn install_is_all_or_nothing_and_rerunnable() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::new();
        let host = host_with(storage.clone(), network.clone());

        network.set_online(false);
        let err = host.install().await.unwrap_err();
        assert!(matches!(err, PrecacheError::InstallFetch { .. }));

        network.set_online(true);
        host.install().await.unwrap();

        let store = storage.open_memory(STORE_NAME).await.unwrap();
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn cached_entries_survive_network_loss() {
        let temp = TempDir::new().unwrap();
        let network = FakeNetwork::new();
        let host = host_with(Arc::new(DiskStorage::new(temp.path())), network.clone());
        host.install().await.unwrap();

        network.set_online(false);

        for url in ["/", "/index.html", "/style.css"] {
            assert!(host.fetch(Request::get(url)).await.is_ok());
        }
        let err = host.fetch(Request::get("/app.js")).await.unwrap_err();
        assert!(matches!(err, PrecacheError::Network { .. }));
    }

    #[tokio::test]
    async fn http_network_installs_from_live_origin() {
        let origin = demo_origin(0).await;
        let temp = TempDir::new().unwrap();
        let network = HttpNetwork::new(&origin.uri(), Duration::from_secs(5)).unwrap();
        let storage = Arc::new(DiskStorage::new(temp.path()));
        let host = host_with(storage.clone(), Arc::new(network));

        host.install().await.unwrap();

        let store = storage.open(STORE_NAME).await.unwrap();
        let index = store.get("/index.html").await.unwrap().unwrap();
        assert_eq!(index.status, 200);
        assert_eq!(index.body, b"<html>home</html>");
        assert!(index
            .header("content-type")
            .is_some_and(|value| value.starts_with("text/plain")));
    }
}
