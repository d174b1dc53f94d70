//! Gateway error taxonomy and HTTP mapping.
//!
//! Classification and range errors resolve locally into status codes with no
//! retry. Object-store failures surface directly; counter-store failures are
//! handled by the rate limiter's fail-open policy and normally never reach
//! this type. Every error response carries the full security header set.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::SECURITY_HEADERS;
use crate::store::StoreError;

/// Request-terminating errors, one per response class.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed object key. Resolved before any storage call.
    #[error("Invalid object key: {0}")]
    BadRequest(&'static str),

    /// Protected tier with a missing or mismatched secret.
    #[error("Unauthorized: invalid or missing secret key")]
    Unauthorized,

    /// The object does not exist in the backing store.
    #[error("Object not found")]
    NotFound,

    /// The `Range` header could not be satisfied against the object.
    #[error("Range not satisfiable")]
    RangeNotSatisfiable { size: u64 },

    /// Window quota spent; retry after the window ends.
    #[error("Rate limited: {retry_after} seconds remaining")]
    RateLimited { retry_after: u64 },

    /// Object store (or fail-closed counter store) unreachable.
    #[error("Storage unavailable: {0}")]
    StoreUnavailable(String),

    /// Object store did not answer in time.
    #[error("Storage timeout: {0}")]
    StoreTimeout(String),

    /// Anything unexpected.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::StoreUnavailable(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::StoreTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => GatewayError::NotFound,
            StoreError::Unavailable(msg) => GatewayError::StoreUnavailable(msg),
            StoreError::Timeout(msg) => GatewayError::StoreTimeout(msg),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut builder = Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8");

        for (name, value) in SECURITY_HEADERS {
            builder = builder.header(name, value);
        }

        let body = match &self {
            GatewayError::RateLimited { retry_after } => {
                builder = builder.header(header::RETRY_AFTER, retry_after.to_string());
                Body::from(self.to_string())
            }
            // 416 answers with the total size and no body.
            GatewayError::RangeNotSatisfiable { size } => {
                builder = builder.header(header::CONTENT_RANGE, format!("bytes */{size}"));
                Body::empty()
            }
            _ => Body::from(self.to_string()),
        };

        builder
            .body(body)
            .unwrap_or_else(|_| status.into_response())
    }
}
