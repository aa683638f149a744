use std::sync::Arc;

use crate::artifact::ArtifactStore;
use crate::cluster::StatusAggregator;
use crate::config::{EdgeConfig, DEFAULT_MAX_BODY_BYTES};
use crate::inference::Classifier;
use crate::relay::Relay;
use crate::server::routes::RouteTable;

/// Shared application state
///
/// Everything here is read-only once the server starts; requests share no
/// mutable state beyond the artifact directory.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub artifacts: ArtifactStore,
    pub classifier: Arc<dyn Classifier>,
    pub aggregator: StatusAggregator,
    pub relay: Option<Relay>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        artifacts: ArtifactStore,
        classifier: Arc<dyn Classifier>,
        aggregator: StatusAggregator,
    ) -> Self {
        Self {
            routes: Arc::new(RouteTable::new(false)),
            artifacts,
            classifier,
            aggregator,
            relay: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Build the full gateway state from configuration
    pub fn from_config(config: &EdgeConfig) -> Self {
        let state = Self::new(
            config.artifacts.store(),
            Arc::new(config.inference.client()),
            StatusAggregator::from_url(config.authority.url.clone()),
        )
        .with_max_body_bytes(config.gateway.max_body_bytes);

        match &config.relay.image_url {
            Some(url) => state.with_relay(Relay::new(url.clone())),
            None => state,
        }
    }

    /// Enable the relay route
    pub fn with_relay(mut self, relay: Relay) -> Self {
        self.relay = Some(relay);
        self.routes = Arc::new(RouteTable::new(true));
        self
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }
}
