//! Storage collaborator interfaces.
//!
//! # Data Flow
//! ```text
//! http/server.rs (orchestrator)
//!     → ObjectStore::metadata (size, content type, etag)
//!     → ObjectStore::body / body_range (streamed bytes)
//!
//! security/rate_limit.rs
//!     → CounterStore::get / put (window records with TTL)
//! ```
//!
//! # Design Decisions
//! - The gateway never implements storage itself; everything durable lives
//!   behind these two traits
//! - Bodies are streamed, never buffered whole in the gateway
//! - Counter atomicity is the counter store's contract; the gateway only
//!   does get/put with a per-key TTL

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use thiserror::Error;

pub mod fs;
pub mod memory;

pub use fs::FsObjectStore;
pub use memory::{MemoryCounterStore, MemoryObjectStore};

/// A streamed object body. Chunks arrive in order; the stream ends at the
/// requested boundary.
pub type BodyStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// Metadata the gateway needs to serve an object. Immutable for the lifetime
/// of one request.
#[derive(Debug, Clone, Default)]
pub struct ObjectMetadata {
    /// Total object size in bytes.
    pub size: u64,
    /// Content type recorded by the store, if any.
    pub content_type: Option<String>,
    /// Entity tag recorded by the store, if any.
    pub etag: Option<String>,
}

/// Failures surfaced by the collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key does not exist. Only body reads report this; metadata lookups
    /// use `Option` instead.
    #[error("object not found")]
    NotFound,

    /// The collaborator could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The collaborator did not answer in time.
    #[error("store timed out: {0}")]
    Timeout(String),
}

/// Read-side interface to the backing object store.
///
/// Reads are idempotent and side-effect-free, so concurrent requests for the
/// same key are never coalesced or locked.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Look up an object's metadata. `Ok(None)` means the key is absent.
    async fn metadata(&self, key: &str) -> Result<Option<ObjectMetadata>, StoreError>;

    /// Stream the full object body.
    async fn body(&self, key: &str) -> Result<BodyStream, StoreError>;

    /// Stream the inclusive byte interval `[start, end]`. Callers guarantee
    /// `start <= end < size`.
    async fn body_range(&self, key: &str, start: u64, end: u64) -> Result<BodyStream, StoreError>;
}

/// Shared counter store used by the rate limiter.
///
/// Multiple gateway instances share one store; values expire server-side
/// after the given TTL.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;
}
