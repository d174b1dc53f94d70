//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields: request_id, tier, key, status)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout via tracing-subscriber)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via the tracing crate; level set from config/env
//! - Request ID flows through all log events and is echoed to the client
//! - Metric updates are cheap (atomic increments)

pub mod metrics;
