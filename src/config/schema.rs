//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the object gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Access tier settings (protected-tier secret).
    pub access: AccessConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Storage collaborator settings.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Access tier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Shared secret required for the protected tier. The value also travels
    /// in request URLs, so it is a deterrent, not a high-security credential.
    pub protected_secret: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            protected_secret: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Per-tier window override.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct TierLimits {
    /// Window length in seconds.
    pub window_secs: u64,

    /// Maximum requests per window.
    pub max_requests: u64,
}

/// Rate limiting configuration (fixed window).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Maximum requests per window per (tier, client) pair.
    pub max_requests: u64,

    /// On counter-store failure, admit the request (true) or deny it (false).
    pub fail_open: bool,

    /// Optional override for the public tier.
    pub public: Option<TierLimits>,

    /// Optional override for the protected tier.
    pub protected: Option<TierLimits>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 900,
            max_requests: 100,
            fail_open: true,
            public: None,
            protected: None,
        }
    }
}

/// Storage collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for the filesystem object store used by the binary.
    pub root: String,

    /// Objects larger than this get advisory warning headers. Never rejects.
    pub max_recommended_object_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "./data".to_string(),
            max_recommended_object_size: 50 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
