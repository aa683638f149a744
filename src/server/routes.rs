//! Static gateway route table
//!
//! GET and POST each get their own table keyed by exact path. The table is
//! built once at startup and only read afterwards.

use std::collections::HashMap;
use std::fmt;

use axum::http::Method;
use thiserror::Error;

pub const VERSION_PATH: &str = "/version";
pub const SYSINFO_PATH: &str = "/sysinfo";
pub const IMAGE_PATH: &str = "/image";
pub const RELAY_IMAGE_PATH: &str = "/relay/image";

/// What a matched route does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Report the gateway version
    Version,
    /// Render the cluster node/pod readiness report
    ClusterStatus,
    /// Store the uploaded image and run the classifier on it
    ClassifyImage,
    /// Forward the uploaded body to the upstream gateway
    RelayImage,
}

impl Capability {
    /// Whether the capability consumes the request body
    pub fn reads_body(&self) -> bool {
        matches!(self, Capability::ClassifyImage | Capability::RelayImage)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Version => "version",
            Capability::ClusterStatus => "cluster-status",
            Capability::ClassifyImage => "classify-image",
            Capability::RelayImage => "relay-image",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("No route for {method} {path}")]
    NotFound { method: String, path: String },

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    get: HashMap<&'static str, Capability>,
    post: HashMap<&'static str, Capability>,
}

impl RouteTable {
    /// Build the table; the relay route exists only when a relay is configured.
    pub fn new(relay_enabled: bool) -> Self {
        let mut get = HashMap::new();
        get.insert(VERSION_PATH, Capability::Version);
        get.insert(SYSINFO_PATH, Capability::ClusterStatus);

        let mut post = HashMap::new();
        post.insert(IMAGE_PATH, Capability::ClassifyImage);
        if relay_enabled {
            post.insert(RELAY_IMAGE_PATH, Capability::RelayImage);
        }

        Self { get, post }
    }

    /// Look up the capability for `method` and `path`.
    pub fn route(&self, method: &Method, path: &str) -> Result<Capability, RouteError> {
        let table = if method == Method::GET {
            &self.get
        } else if method == Method::POST {
            &self.post
        } else {
            return Err(RouteError::UnsupportedMethod(method.to_string()));
        };

        table
            .get(path)
            .copied()
            .ok_or_else(|| RouteError::NotFound {
                method: method.to_string(),
                path: path.to_string(),
            })
    }

    /// All registered routes, GET first, each group sorted by path
    pub fn entries(&self) -> Vec<(Method, &'static str, Capability)> {
        let mut get: Vec<_> = self.get.iter().map(|(p, c)| (Method::GET, *p, *c)).collect();
        let mut post: Vec<_> = self.post.iter().map(|(p, c)| (Method::POST, *p, *c)).collect();
        get.sort_by_key(|(_, p, _)| *p);
        post.sort_by_key(|(_, p, _)| *p);
        get.extend(post);
        get
    }
}
