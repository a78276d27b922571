//! The offline worker
//!
//! A worker reacts to two host signals: `install` warms the cache from the
//! manifest, `fetch` answers a request cache-first.

mod manifest;
mod proxy;

pub use manifest::{Manifest, RESOURCES, STORE_NAME};
pub use proxy::CacheProxy;

use crate::error::PrecacheResult;
use crate::http::{Request, Response};
use async_trait::async_trait;

/// Result of a successful install signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Store that was populated
    pub store: String,
    /// Number of manifest entries written
    pub entries: usize,
}

/// Signal handlers a host invokes
///
/// Each returned future resolves when the signal is fully handled; the host
/// keeps the worker alive until then.
#[async_trait]
pub trait Worker: Send + Sync {
    /// Handle the install signal
    async fn on_install(&self) -> PrecacheResult<InstallReport>;

    /// Handle an intercepted request
    async fn on_fetch(&self, request: Request) -> PrecacheResult<Response>;
}
