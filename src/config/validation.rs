//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (window > 0, quotas > 0, addresses parseable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{GatewayConfig, TierLimits};

/// A single semantic validation failure.
#[derive(Debug)]
pub struct ValidationError {
    /// Config field path, e.g. "rate_limit.window_secs".
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_limits(field: &'static str, limits: &TierLimits, errors: &mut Vec<ValidationError>) {
    if limits.window_secs == 0 {
        errors.push(ValidationError {
            field,
            message: "window_secs must be positive".to_string(),
        });
    }
    if limits.max_requests == 0 {
        errors.push(ValidationError {
            field,
            message: "max_requests must be positive".to_string(),
        });
    }
}

/// Validate a parsed configuration, collecting every failure.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a valid socket address: {}", config.listener.bind_address),
        });
    }

    if config.access.protected_secret.is_empty() {
        errors.push(ValidationError {
            field: "access.protected_secret",
            message: "must not be empty".to_string(),
        });
    }

    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError {
            field: "rate_limit.window_secs",
            message: "must be positive".to_string(),
        });
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError {
            field: "rate_limit.max_requests",
            message: "must be positive".to_string(),
        });
    }
    if let Some(limits) = &config.rate_limit.public {
        check_limits("rate_limit.public", limits, &mut errors);
    }
    if let Some(limits) = &config.rate_limit.protected {
        check_limits("rate_limit.protected", limits, &mut errors);
    }

    if config.observability.log_level.is_empty() {
        errors.push(ValidationError {
            field: "observability.log_level",
            message: "must not be empty".to_string(),
        });
    } else if tracing_subscriber::EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError {
            field: "observability.log_level",
            message: format!(
                "not a valid filter directive: {}",
                config.observability.log_level
            ),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!(
                "not a valid socket address: {}",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn zero_window_and_quota_are_rejected() {
        let mut config = GatewayConfig::default();
        config.rate_limit.window_secs = 0;
        config.rate_limit.max_requests = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn bad_addresses_and_empty_secret_are_rejected() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.access.protected_secret = String::new();
        config.observability.metrics_address = "also bad".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn log_level_must_be_a_usable_filter() {
        let mut config = GatewayConfig::default();
        config.observability.log_level = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "observability.log_level");

        // Directive syntax is accepted, not just bare levels.
        config.observability.log_level = "object_gateway=debug,tower_http=warn".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn per_tier_overrides_are_checked() {
        let mut config = GatewayConfig::default();
        config.rate_limit.protected = Some(TierLimits {
            window_secs: 0,
            max_requests: 10,
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "rate_limit.protected");
    }
}
