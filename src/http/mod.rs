//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request orchestration)
//!     → security::access (tier + key) / security::rate_limit (quota)
//!     → store (metadata, body stream)
//!     → range.rs (byte-range negotiation)
//!     → mime.rs + response.rs (content type, headers, status)
//!     → Send to client
//! ```

pub mod mime;
pub mod range;
pub mod response;
pub mod server;

pub use range::{ByteRange, RangeOutcome};
pub use server::HttpServer;
