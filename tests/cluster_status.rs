//! Integration tests for the status aggregator against live HTTP servers
//!
//! The authority side is either a thin axum server with canned documents or
//! the real authority router backed by an in-test inventory.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use edgefaas::cluster::{
    create_authority_router, AggregateError, AuthorityState, EntityKind, InventoryError,
    InventorySource, StatusAggregator,
};

const NODES: &str = r#"{
    "apiVersion": "v1",
    "kind": "List",
    "items": [{
        "metadata": {
            "name": "n1",
            "annotations": {"k3s.io/internal-ip": "10.0.0.1"}
        },
        "status": {
            "conditions": [
                {"type": "MemoryPressure", "status": "False"},
                {"type": "Ready", "status": "True"}
            ]
        }
    }]
}"#;

const PODS: &str = r#"{
    "apiVersion": "v1",
    "kind": "List",
    "items": [{
        "metadata": {"name": "p1", "namespace": "default"},
        "status": {
            "hostIP": "10.0.0.2",
            "conditions": [
                {"type": "Initialized", "status": "True"},
                {"type": "Ready", "status": "False"}
            ]
        }
    }]
}"#;

const EXPECTED_REPORT: &str = "--------- Nodes ---------\n\
                               NAME        IP            STATUS\n\
                               n1 10.0.0.1 True\n\
                               --------- Pods ---------\n\
                               NAME        HostIP        STATUS\n\
                               p1 10.0.0.2 False\n";

/// Serve `app` on an ephemeral port and return its base URL
async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().expect("Failed to get local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

struct FixedInventory;

#[async_trait]
impl InventorySource for FixedInventory {
    async fn list(&self, kind: EntityKind) -> Result<String, InventoryError> {
        Ok(match kind {
            EntityKind::Node => NODES.to_string(),
            EntityKind::Pod => PODS.to_string(),
        })
    }
}

#[tokio::test]
async fn test_aggregate_from_static_authority() {
    let app = Router::new()
        .route("/nodes", get(|| async { NODES }))
        .route("/pods", get(|| async { PODS }));
    let base = spawn_server(app).await;

    let report = StatusAggregator::from_url(base).aggregate().await.unwrap();
    assert_eq!(report, EXPECTED_REPORT);
}

#[tokio::test]
async fn test_aggregate_through_authority_service() {
    let app = create_authority_router(AuthorityState::new(Arc::new(FixedInventory)));
    let base = spawn_server(app).await;

    let report = StatusAggregator::from_url(format!("{}/", base))
        .aggregate()
        .await
        .unwrap();
    assert_eq!(report, EXPECTED_REPORT);
}

#[tokio::test]
async fn test_authority_error_status_aborts() {
    let app = Router::new()
        .route("/nodes", get(|| async { NODES }))
        .route(
            "/pods",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "kubectl failed") }),
        );
    let base = spawn_server(app).await;

    let result = StatusAggregator::from_url(base).aggregate().await;
    assert!(matches!(
        result,
        Err(AggregateError::Status {
            collection: EntityKind::Pod,
            status: 500
        })
    ));
}

#[tokio::test]
async fn test_non_json_authority_response_aborts() {
    let app = Router::new()
        .route("/nodes", get(|| async { "<html>gateway timeout</html>" }))
        .route("/pods", get(|| async { PODS }));
    let base = spawn_server(app).await;

    let result = StatusAggregator::from_url(base).aggregate().await;
    assert!(matches!(
        result,
        Err(AggregateError::Parse {
            collection: EntityKind::Node,
            ..
        })
    ));
}

#[tokio::test]
async fn test_unreachable_authority_aborts() {
    // Bind then drop to get a port nothing listens on
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let result = StatusAggregator::from_url(format!("http://127.0.0.1:{}", port))
        .aggregate()
        .await;
    assert!(matches!(result, Err(AggregateError::Http { .. })));
}
