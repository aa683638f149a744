//! Cluster status aggregation
//!
//! Pulls the node and pod inventories from the authority service and renders
//! them as a plain-text report, one readiness line per entity.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use super::entity::{parse_entities, ClusterEntity, EntityKind};

/// Collections in report order
pub const REPORT_ORDER: [EntityKind; 2] = [EntityKind::Node, EntityKind::Pod];

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("HTTP error fetching {collection}: {message}")]
    Http {
        collection: EntityKind,
        message: String,
    },

    #[error("Authority returned {status} for {collection}")]
    Status { collection: EntityKind, status: u16 },

    #[error("Invalid {collection} document: {message}")]
    Parse {
        collection: EntityKind,
        message: String,
    },

    #[error("{kind} entry '{name}' has no location")]
    MissingLocation { kind: EntityKind, name: String },
}

// ============================================================================
// SBIO: Trait for abstraction (allows mocking in tests)
// ============================================================================

#[async_trait]
pub trait AuthorityClient: Send + Sync {
    /// Fetch the raw JSON list document for one collection
    async fn fetch(&self, kind: EntityKind) -> Result<String, AggregateError>;
}

// ============================================================================
// SBIO: I/O implementation (real HTTP client)
// ============================================================================

#[derive(Clone)]
pub struct HttpAuthorityClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthorityClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: EntityKind) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            kind.collection()
        )
    }
}

#[async_trait]
impl AuthorityClient for HttpAuthorityClient {
    async fn fetch(&self, kind: EntityKind) -> Result<String, AggregateError> {
        let url = self.collection_url(kind);
        debug!("Fetching {} from {}", kind, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AggregateError::Http {
                collection: kind,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AggregateError::Status {
                collection: kind,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| AggregateError::Http {
            collection: kind,
            message: e.to_string(),
        })
    }
}

// ============================================================================
// SBIO: Pure rendering (no I/O)
// ============================================================================

/// Render one report section: banner, column header, one row per entity.
pub fn render_section(
    kind: EntityKind,
    entities: &[ClusterEntity],
) -> Result<String, AggregateError> {
    let mut out = format!("--------- {} ---------\n", kind.title());
    out.push_str(&format!(
        "{:<12}{:<14}{}\n",
        "NAME",
        kind.location_label(),
        "STATUS"
    ));

    for entity in entities {
        let location = entity
            .location_key()
            .ok_or_else(|| AggregateError::MissingLocation {
                kind: entity.kind(),
                name: entity.name().to_string(),
            })?;
        out.push_str(&format!(
            "{} {} {}\n",
            entity.name(),
            location,
            entity.readiness()
        ));
    }

    Ok(out)
}

/// Builds the combined node/pod status report
#[derive(Clone)]
pub struct StatusAggregator {
    client: Arc<dyn AuthorityClient>,
}

impl StatusAggregator {
    pub fn new(client: Arc<dyn AuthorityClient>) -> Self {
        Self { client }
    }

    /// Aggregator backed by the authority service at `base_url`
    pub fn from_url(base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(HttpAuthorityClient::new(base_url)))
    }

    /// Fetch both collections in turn and render the report.
    ///
    /// Any fetch or parse failure aborts the whole report.
    pub async fn aggregate(&self) -> Result<String, AggregateError> {
        let mut report = String::new();

        for kind in REPORT_ORDER {
            let body = self.client.fetch(kind).await?;
            let entities = parse_entities(kind, &body).map_err(|e| AggregateError::Parse {
                collection: kind,
                message: e.to_string(),
            })?;
            debug!("Parsed {} {}", entities.len(), kind);
            report.push_str(&render_section(kind, &entities)?);
        }

        Ok(report)
    }
}

// ============================================================================
// SBIO: Mock implementation for testing (no I/O)
// ============================================================================
