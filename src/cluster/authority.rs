//! Authority service
//!
//! Exposes the k3s inventory over HTTP for edge functions that cannot reach
//! the cluster API themselves:
//! - `GET /version` - liveness probe
//! - `GET /nodes`   - `kubectl get nodes -o json`
//! - `GET /pods`    - `kubectl get pods -o json`

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use thiserror::Error;
use tokio::process::Command;
use tower_http::trace::TraceLayer;
use tracing::error;

use super::entity::EntityKind;

/// Version string reported by `GET /version`
pub const AUTHORITY_VERSION: &str = "1.0";

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("{program} exited with code {code}: {stderr}")]
    Failed {
        program: String,
        code: i32,
        stderr: String,
    },
}

/// Source of raw inventory documents
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn list(&self, kind: EntityKind) -> Result<String, InventoryError>;
}

/// Inventory read through the kubectl CLI
#[derive(Debug, Clone)]
pub struct Kubectl {
    program: String,
}

impl Kubectl {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn args(kind: EntityKind) -> [&'static str; 4] {
        ["get", kind.collection(), "-o", "json"]
    }
}

impl Default for Kubectl {
    fn default() -> Self {
        Self::new("kubectl")
    }
}

#[async_trait]
impl InventorySource for Kubectl {
    async fn list(&self, kind: EntityKind) -> Result<String, InventoryError> {
        let output = Command::new(&self.program)
            .args(Self::args(kind))
            .output()
            .await
            .map_err(|e| InventoryError::Spawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(InventoryError::Failed {
                program: self.program.clone(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Shared state for the authority API
#[derive(Clone)]
pub struct AuthorityState {
    pub inventory: Arc<dyn InventorySource>,
}

impl AuthorityState {
    pub fn new(inventory: Arc<dyn InventorySource>) -> Self {
        Self { inventory }
    }
}

/// Create the authority service router
pub fn create_authority_router(state: AuthorityState) -> Router {
    Router::new()
        .route("/version", get(version))
        .route("/nodes", get(list_nodes))
        .route("/pods", get(list_pods))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn version() -> &'static str {
    AUTHORITY_VERSION
}

async fn list_nodes(State(state): State<AuthorityState>) -> Response {
    list(&state, EntityKind::Node).await
}

async fn list_pods(State(state): State<AuthorityState>) -> Response {
    list(&state, EntityKind::Pod).await
}

async fn list(state: &AuthorityState, kind: EntityKind) -> Response {
    match state.inventory.list(kind).await {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => {
            error!("Listing {} failed: {}", kind, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
