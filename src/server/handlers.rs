use axum::{
    body::{to_bytes, Bytes},
    extract::{Request, State},
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::GatewayError;
use crate::server::routes::{Capability, RouteError, RELAY_IMAGE_PATH};
use crate::server::state::AppState;

/// Body returned by `GET /version`
pub const GATEWAY_VERSION: &str = "1.0\n";

fn plain_text(body: impl Into<String>) -> Response {
    ([(CONTENT_TYPE, "text/plain")], body.into()).into_response()
}

/// Single entry point: resolve the route, then run the capability
pub async fn dispatch(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, GatewayError> {
    let capability = state
        .routes
        .route(request.method(), request.uri().path())?;
    debug!(
        "{} {} -> {}",
        request.method(),
        request.uri().path(),
        capability
    );

    let body = if capability.reads_body() {
        read_body(&state, request).await?
    } else {
        Bytes::new()
    };

    match capability {
        Capability::Version => Ok(plain_text(GATEWAY_VERSION)),
        Capability::ClusterStatus => cluster_status(&state).await,
        Capability::ClassifyImage => classify_image(&state, body).await,
        Capability::RelayImage => relay_image(&state, body).await,
    }
}

/// Read the whole body, rejecting a declared length over the limit up front
async fn read_body(state: &AppState, request: Request) -> Result<Bytes, GatewayError> {
    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if let Some(len) = declared {
        if len > state.max_body_bytes {
            return Err(GatewayError::PayloadTooLarge {
                len,
                limit: state.max_body_bytes,
            });
        }
    }

    to_bytes(request.into_body(), state.max_body_bytes)
        .await
        .map_err(|e| GatewayError::BodyRead(e.to_string()))
}

async fn cluster_status(state: &AppState) -> Result<Response, GatewayError> {
    let report = state.aggregator.aggregate().await?;
    Ok(plain_text(report))
}

/// Store the upload, classify it, and return the classifier's output.
///
/// The artifact is dropped (and removed, unless retained) when this returns,
/// whether or not classification succeeded.
async fn classify_image(state: &AppState, body: Bytes) -> Result<Response, GatewayError> {
    if body.is_empty() {
        return Err(GatewayError::EmptyPayload);
    }

    let artifact = state.artifacts.store(&body).await?;
    info!(
        "Classifying artifact {} ({} bytes)",
        artifact.id(),
        artifact.len()
    );

    let output = state.classifier.classify(artifact.path()).await?;
    Ok(plain_text(output))
}

async fn relay_image(state: &AppState, body: Bytes) -> Result<Response, GatewayError> {
    // Only routed when a relay is configured
    let Some(relay) = &state.relay else {
        return Err(RouteError::NotFound {
            method: "POST".to_string(),
            path: RELAY_IMAGE_PATH.to_string(),
        }
        .into());
    };

    let response = relay.forward(body).await?;
    Ok(response.into_response())
}

/// Create the Axum router
///
/// Dispatch goes through the gateway's own route table rather than axum's
/// path router, so every request lands in [`dispatch`].
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactStore;
    use crate::cluster::aggregator::mock::MockAuthorityClient;
    use crate::cluster::StatusAggregator;
    use crate::inference::mock::MockClassifier;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const NODES: &str = r#"{"items": [{
        "metadata": {"name": "n1", "annotations": {"k3s.io/internal-ip": "10.0.0.1"}},
        "status": {"conditions": [{"type": "Ready", "status": "True"}]}
    }]}"#;

    const PODS: &str = r#"{"items": [{
        "metadata": {"name": "p1"},
        "status": {"hostIP": "10.0.0.2", "conditions": [{"type": "Ready", "status": "False"}]}
    }]}"#;

    struct TestApp {
        router: Router,
        classifier: Arc<MockClassifier>,
        dir: TempDir,
    }

    fn create_test_app(classifier: MockClassifier, retain: bool) -> TestApp {
        let dir = TempDir::new().unwrap();
        let classifier = Arc::new(classifier);
        let state = AppState::new(
            ArtifactStore::new(dir.path()).with_retain(retain),
            classifier.clone(),
            StatusAggregator::new(Arc::new(MockAuthorityClient::new(NODES, PODS))),
        );
        TestApp {
            router: create_router(state),
            classifier,
            dir,
        }
    }

    fn files_in(dir: &TempDir) -> Vec<std::path::PathBuf> {
        std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn post_image(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/image")
            .body(body.into())
            .unwrap()
    }

    #[tokio::test]
    async fn test_version_endpoint() {
        let app = create_test_app(MockClassifier::replying(""), false);

        let response = app
            .router
            .oneshot(Request::builder().uri("/version").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"1.0\n");
    }

    #[tokio::test]
    async fn test_unknown_paths_are_404() {
        let app = create_test_app(MockClassifier::replying(""), false);

        let (status, _) = send(
            app.router.clone(),
            Request::builder().uri("/nodes").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            app.router,
            Request::builder()
                .method("POST")
                .uri("/upload")
                .body(Body::from("x"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unsupported_method_is_501() {
        let app = create_test_app(MockClassifier::replying(""), false);
        let (status, _) = send(
            app.router,
            Request::builder()
                .method("PUT")
                .uri("/image")
                .body(Body::from("x"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_empty_image_is_501_and_never_classified() {
        let app = create_test_app(MockClassifier::replying("mug"), false);

        let (status, _) = send(app.router, post_image(Body::empty())).await;

        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert!(app.classifier.calls().is_empty());
        assert!(files_in(&app.dir).is_empty());
    }

    #[tokio::test]
    async fn test_image_is_stored_and_classified() {
        let app = create_test_app(MockClassifier::replying("0.72 (504) = COFFEE MUG\n"), true);
        let payload: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();

        let (status, body) = send(app.router, post_image(payload.clone())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "0.72 (504) = COFFEE MUG\n");

        let calls = app.classifier.calls();
        assert_eq!(calls.len(), 1);
        let (path, contents) = &calls[0];
        assert_eq!(contents, &payload);
        assert!(path.starts_with(app.dir.path()));

        let files = files_in(&app.dir);
        assert_eq!(files, vec![path.clone()]);
        assert_eq!(std::fs::read(path).unwrap(), payload);
    }

    #[tokio::test]
    async fn test_artifact_removed_after_request() {
        let app = create_test_app(MockClassifier::replying("ok"), false);

        let (status, _) = send(app.router, post_image("image-bytes")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(app.classifier.calls()[0].1, b"image-bytes");
        assert!(files_in(&app.dir).is_empty());
    }

    #[tokio::test]
    async fn test_classifier_failure_is_500_and_cleans_up() {
        let app = create_test_app(MockClassifier::failing("server unreachable"), false);

        let (status, body) = send(app.router, post_image("image-bytes")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("server unreachable"));
        assert!(files_in(&app.dir).is_empty());
    }

    #[tokio::test]
    async fn test_declared_length_over_limit_is_413() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(
            ArtifactStore::new(dir.path()),
            Arc::new(MockClassifier::replying("")),
            StatusAggregator::new(Arc::new(MockAuthorityClient::new(NODES, PODS))),
        )
        .with_max_body_bytes(4);

        let request = Request::builder()
            .method("POST")
            .uri("/image")
            .header(CONTENT_LENGTH, "10")
            .body(Body::from("0123456789"))
            .unwrap();
        let (status, _) = send(create_router(state), request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_sysinfo_report() {
        let app = create_test_app(MockClassifier::replying(""), false);

        let (status, body) = send(
            app.router,
            Request::builder().uri("/sysinfo").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(lines[0], "--------- Nodes ---------");
        assert_eq!(lines[2], "n1 10.0.0.1 True");
        assert_eq!(lines[3], "--------- Pods ---------");
        assert_eq!(lines[5], "p1 10.0.0.2 False");
    }

    #[tokio::test]
    async fn test_sysinfo_upstream_failure_is_502() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(
            ArtifactStore::new(dir.path()),
            Arc::new(MockClassifier::replying("")),
            StatusAggregator::new(Arc::new(MockAuthorityClient::nodes_only(NODES))),
        );

        let (status, _) = send(
            create_router(state),
            Request::builder().uri("/sysinfo").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
