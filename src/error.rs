//! Request-boundary error shared by the gateway handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::artifact::StorageError;
use crate::cluster::AggregateError;
use crate::inference::InferenceError;
use crate::relay::RelayError;
use crate::server::routes::RouteError;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("Empty payload")]
    EmptyPayload,

    #[error("Payload of {len} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { len: usize, limit: usize },

    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Invocation(#[from] InferenceError),

    #[error(transparent)]
    UpstreamFetch(#[from] AggregateError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Route(RouteError::NotFound { .. }) => StatusCode::NOT_FOUND,
            GatewayError::Route(RouteError::UnsupportedMethod(_)) => StatusCode::NOT_IMPLEMENTED,
            GatewayError::EmptyPayload => StatusCode::NOT_IMPLEMENTED,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::BodyRead(_) => StatusCode::BAD_REQUEST,
            GatewayError::Storage(_) | GatewayError::Invocation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::UpstreamFetch(_) | GatewayError::Relay(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}
