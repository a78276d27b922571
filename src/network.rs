//! Network access for the worker
//!
//! The worker never talks to sockets directly: it goes through the
//! [`Network`] trait so the host can supply the real HTTP client or a fake.

use crate::error::{PrecacheError, PrecacheResult};
use crate::http::{Method, Request, Response};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Abstract network interface used for manifest population and pass-through
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform a request, returning whatever response the server produced.
    ///
    /// Non-2xx statuses are responses, not errors. Only transport failures
    /// are reported as `Err`.
    async fn fetch(&self, request: &Request) -> PrecacheResult<Response>;
}

/// Network backed by a blocking ureq agent run on the tokio blocking pool
#[derive(Clone)]
pub struct HttpNetwork {
    origin: String,
    agent: ureq::Agent,
}

impl HttpNetwork {
    /// Create a client resolving relative identifiers against `origin`
    pub fn new(origin: &str, timeout: Duration) -> PrecacheResult<Self> {
        let origin = validate_origin(origin)?;

        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();

        Ok(Self {
            origin,
            agent: ureq::Agent::new_with_config(config),
        })
    }

    /// The origin relative identifiers resolve against
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Resolve an identifier to an absolute URL
    pub fn resolve(&self, identifier: &str) -> String {
        resolve_url(&self.origin, identifier)
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> PrecacheResult<Response> {
        let agent = self.agent.clone();
        let url = self.resolve(&request.url);
        let request = request.clone();

        debug!("{} {}", request.method, url);

        tokio::task::spawn_blocking(move || execute(&agent, &url, &request))
            .await
            .map_err(|e| PrecacheError::Join(e.to_string()))?
    }
}

fn execute(agent: &ureq::Agent, url: &str, request: &Request) -> PrecacheResult<Response> {
    let result = match request.method {
        Method::Get => with_headers(agent.get(url), &request.headers).call(),
        Method::Head => with_headers(agent.head(url), &request.headers).call(),
        Method::Delete => with_headers(agent.delete(url), &request.headers).call(),
        Method::Options => with_headers(agent.options(url), &request.headers).call(),
        Method::Post => with_headers(agent.post(url), &request.headers).send_empty(),
        Method::Put => with_headers(agent.put(url), &request.headers).send_empty(),
        Method::Patch => with_headers(agent.patch(url), &request.headers).send_empty(),
    };

    let mut response = result.map_err(|e| PrecacheError::network(url, e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_vec()
        .map_err(|e| PrecacheError::network(url, format!("reading body: {}", e)))?;

    Ok(Response {
        status,
        headers,
        body,
        url: request.url.clone(),
    })
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Check that an origin is an absolute http(s) URL and strip trailing slashes
pub fn validate_origin(origin: &str) -> PrecacheResult<String> {
    let origin = origin.trim();
    let rest = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
        .ok_or_else(|| PrecacheError::InvalidOrigin(origin.to_string()))?;

    if rest.trim_end_matches('/').is_empty() {
        return Err(PrecacheError::InvalidOrigin(origin.to_string()));
    }

    Ok(origin.trim_end_matches('/').to_string())
}

/// Join an identifier onto an origin. Absolute identifiers are returned as-is.
pub fn resolve_url(origin: &str, identifier: &str) -> String {
    if identifier.starts_with("http://") || identifier.starts_with("https://") {
        return identifier.to_string();
    }

    if identifier.starts_with('/') {
        format!("{}{}", origin, identifier)
    } else {
        format!("{}/{}", origin, identifier)
    }
}
