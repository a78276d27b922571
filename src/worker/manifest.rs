//! The pre-cache manifest compiled into the worker

/// Name of the cache store the worker populates and reads
pub const STORE_NAME: &str = "sw-demo";

/// Resources fetched and stored on install
pub const RESOURCES: [&str; 3] = ["/", "/index.html", "/style.css"];

/// Ordered list of resource identifiers to pre-cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    resources: Vec<String>,
}

impl Manifest {
    pub fn new<I, S>(resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }

    /// The manifest built into this binary
    pub fn builtin() -> Self {
        Self::new(RESOURCES)
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    pub fn contains(&self, url: &str) -> bool {
        self.resources.iter().any(|r| r == url)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::builtin()
    }
}
