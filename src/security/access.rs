//! Access tier classification.
//!
//! # Responsibilities
//! - Split the request path into an access tier and an object key
//! - Enforce the protected-tier shared secret
//! - Reject empty keys and parent-directory traversal before any storage call
//!
//! Secret comparison is plain equality. The secret also travels in request
//! URLs, so timing-safe comparison buys nothing here.

use crate::error::GatewayError;

/// Reserved first path segment selecting the protected tier.
pub const PROTECTED_SEGMENT: &str = "protected";

/// Access classification for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTier {
    Public,
    Protected,
}

impl AccessTier {
    /// Label used in counter-store keys, logs, and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            AccessTier::Public => "public",
            AccessTier::Protected => "protected",
        }
    }
}

/// A classified request: which tier, and which object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub tier: AccessTier,
    pub key: String,
}

/// Classify a request path (leading slash already stripped) and validate the
/// protected-tier secret if required.
pub fn classify(
    path: &str,
    provided_secret: Option<&str>,
    required_secret: &str,
) -> Result<Classified, GatewayError> {
    let (tier, key) = match path.split_once('/') {
        Some((first, rest)) if first == PROTECTED_SEGMENT => (AccessTier::Protected, rest),
        _ if path == PROTECTED_SEGMENT => (AccessTier::Protected, ""),
        _ => (AccessTier::Public, path),
    };

    if tier == AccessTier::Protected && provided_secret != Some(required_secret) {
        return Err(GatewayError::Unauthorized);
    }

    if key.is_empty() {
        return Err(GatewayError::BadRequest("empty object key"));
    }

    if key.split('/').any(|segment| segment == "..") || key.contains("..\\") {
        return Err(GatewayError::BadRequest("invalid object key"));
    }

    Ok(Classified {
        tier,
        key: key.to_string(),
    })
}
