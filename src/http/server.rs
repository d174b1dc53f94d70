//! HTTP server setup and request orchestration.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (tracing, request IDs)
//! - Drive each request through the gateway pipeline:
//!   classify → rate-limit → fetch metadata → negotiate range → assemble
//! - Stream object bodies from the storage collaborator
//! - Serve with graceful shutdown
//!
//! One pass per request: no step retries, no backtracking. Retry-on-429 is a
//! caller-side concern driven by `Retry-After`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::{ConnectInfo, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::range::{self, RangeOutcome};
use crate::http::response::{self, SECURITY_HEADERS};
use crate::observability::metrics;
use crate::security::access::{self, Classified};
use crate::security::rate_limit::{Decision, RateLimiter};
use crate::store::{CounterStore, ObjectStore};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub objects: Arc<dyn ObjectStore>,
    pub limiter: Arc<RateLimiter>,
}

/// HTTP server for the object gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server wired to the two storage collaborators.
    pub fn new(
        config: GatewayConfig,
        objects: Arc<dyn ObjectStore>,
        counters: Arc<dyn CounterStore>,
    ) -> Self {
        let config = Arc::new(config);
        let limiter = Arc::new(RateLimiter::new(counters, config.rate_limit.clone()));

        let state = AppState {
            config,
            objects,
            limiter,
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(banner_handler))
            .route("/{*path}", get(object_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Usage banner for the bare root path.
async fn banner_handler() -> Response {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8");
    for (name, value) in SECURITY_HEADERS {
        builder = builder.header(name, value);
    }
    builder
        .body(Body::from(
            "Object gateway is running. Access objects via /<key> or /protected/<key>?secret=<value>",
        ))
        .unwrap_or_else(|_| StatusCode::OK.into_response())
}

/// Main gateway handler. One request, one pass through the pipeline.
async fn object_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(path): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    // Classifying
    let classified = match access::classify(
        &path,
        params.get("secret").map(String::as_str),
        &state.config.access.protected_secret,
    ) {
        Ok(classified) => classified,
        Err(err) => {
            tracing::warn!(request_id = %request_id, path = %path, error = %err, "Request rejected");
            return finish(err.into_response(), &request_id, "none", start);
        }
    };

    let tier = classified.tier.as_str();
    tracing::debug!(
        request_id = %request_id,
        tier = tier,
        key = %classified.key,
        "Handling object request"
    );

    match serve_object(&state, classified, &headers, peer).await {
        Ok(resp) => finish(resp, &request_id, tier, start),
        Err(err) => {
            match &err {
                GatewayError::StoreUnavailable(_) | GatewayError::StoreTimeout(_) => {
                    metrics::record_store_error("object");
                    tracing::error!(request_id = %request_id, tier = tier, error = %err, "Store failure");
                }
                _ => {
                    tracing::debug!(request_id = %request_id, tier = tier, error = %err, "Request failed");
                }
            }
            finish(err.into_response(), &request_id, tier, start)
        }
    }
}

/// RateLimiting → FetchingMetadata → NegotiatingRange → Assembling.
async fn serve_object(
    state: &AppState,
    classified: Classified,
    headers: &HeaderMap,
    peer: SocketAddr,
) -> Result<Response, GatewayError> {
    let identity = client_identity(headers, peer);
    let decision = state
        .limiter
        .check(identity.as_deref(), classified.tier, unix_now())
        .await?;
    if let Decision::Denied { retry_after } = decision {
        return Err(GatewayError::RateLimited { retry_after });
    }

    let meta = state
        .objects
        .metadata(&classified.key)
        .await?
        .ok_or(GatewayError::NotFound)?;

    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    let range = match range::negotiate(range_header, meta.size) {
        RangeOutcome::Full => None,
        RangeOutcome::Partial(range) => Some(range),
        RangeOutcome::Unsatisfiable => {
            return Err(GatewayError::RangeNotSatisfiable { size: meta.size })
        }
    };

    let body = match range {
        Some(range) => Body::from_stream(
            state
                .objects
                .body_range(&classified.key, range.start, range.end)
                .await?,
        ),
        None => Body::from_stream(state.objects.body(&classified.key).await?),
    };

    response::assemble(
        classified.tier,
        &classified.key,
        &meta,
        range,
        state.config.storage.max_recommended_object_size,
        body,
    )
}

/// Attach the request ID and record metrics before the response leaves.
fn finish(mut resp: Response, request_id: &str, tier: &str, start: Instant) -> Response {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        resp.headers_mut().insert("x-request-id", value);
    }
    metrics::record_request("GET", resp.status().as_u16(), tier, start);
    resp
}

/// Resolve the client identity for rate limiting: forwarded headers first,
/// then the peer address. `None` means no usable source address.
fn client_identity(headers: &HeaderMap, peer: SocketAddr) -> Option<String> {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded
            .split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return Some(first.to_string());
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        if !real_ip.is_empty() {
            return Some(real_ip.to_string());
        }
    }
    Some(peer.ip().to_string())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install Ctrl+C handler");
        // Never resolves; the broadcast channel remains the only trigger.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
