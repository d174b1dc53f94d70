//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (request counts, latency, denials, store errors)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, tier
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_rate_limited_total` (counter): denials by tier
//! - `gateway_store_errors_total` (counter): collaborator failures by store

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, tier: &str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "tier" => tier.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "tier" => tier.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a rate-limit denial.
pub fn record_rate_limited(tier: &str) {
    counter!("gateway_rate_limited_total", "tier" => tier.to_string()).increment(1);
}

/// Record a collaborator failure ("counter" or "object").
pub fn record_store_error(store: &str) {
    counter!("gateway_store_errors_total", "store" => store.to_string()).increment(1);
}
