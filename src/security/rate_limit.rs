//! Fixed-window rate limiting over the shared counter store.
//!
//! # Responsibilities
//! - Count requests per (tier, client identity) in fixed windows
//! - Deny with a retry-after once the window quota is spent
//! - Fail open (configurable) when the counter store is down
//!
//! The window record lives exclusively in the counter store, serialized as
//! `"{count}:{window_start}"` with a TTL, so every gateway instance sees the
//! same counters. Atomicity of concurrent increments is the store's contract.

use std::sync::Arc;

use crate::config::RateLimitConfig;
use crate::error::GatewayError;
use crate::observability::metrics;
use crate::security::access::AccessTier;
use crate::store::CounterStore;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied {
        /// Seconds until the current window ends.
        retry_after: u64,
    },
}

/// Fixed-window request limiter.
pub struct RateLimiter {
    counters: Arc<dyn CounterStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(counters: Arc<dyn CounterStore>, config: RateLimitConfig) -> Self {
        Self { counters, config }
    }

    /// Window length and quota for a tier, honoring per-tier overrides.
    fn limits(&self, tier: AccessTier) -> (u64, u64) {
        let over = match tier {
            AccessTier::Public => self.config.public,
            AccessTier::Protected => self.config.protected,
        };
        match over {
            Some(limits) => (limits.window_secs, limits.max_requests),
            None => (self.config.window_secs, self.config.max_requests),
        }
    }

    /// Check and count one request.
    ///
    /// `identity` is the resolved client identity; `None` means no usable
    /// source address, which is admitted rather than treated as abuse.
    /// `now` is seconds since the Unix epoch.
    pub async fn check(
        &self,
        identity: Option<&str>,
        tier: AccessTier,
        now: u64,
    ) -> Result<Decision, GatewayError> {
        if !self.config.enabled {
            return Ok(Decision::Allowed);
        }
        let Some(identity) = identity else {
            tracing::debug!(tier = tier.as_str(), "No client identity, admitting");
            return Ok(Decision::Allowed);
        };

        match self.try_window(identity, tier, now).await {
            Ok(decision) => {
                if let Decision::Denied { retry_after } = decision {
                    tracing::warn!(
                        client = identity,
                        tier = tier.as_str(),
                        retry_after,
                        "Rate limit exceeded"
                    );
                    metrics::record_rate_limited(tier.as_str());
                }
                Ok(decision)
            }
            Err(e) => {
                metrics::record_store_error("counter");
                if self.config.fail_open {
                    tracing::error!(
                        error = %e,
                        tier = tier.as_str(),
                        "Counter store failure, failing open"
                    );
                    Ok(Decision::Allowed)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn try_window(
        &self,
        identity: &str,
        tier: AccessTier,
        now: u64,
    ) -> Result<Decision, crate::store::StoreError> {
        let (window_secs, max_requests) = self.limits(tier);
        let key = format!("rl:{}:{}", tier.as_str(), identity);

        let record = self.counters.get(&key).await?;
        let (count, window_start) = record.as_deref().map(parse_record).unwrap_or((0, 0));

        let elapsed = now.saturating_sub(window_start);
        if elapsed > window_secs {
            // New window.
            self.counters
                .put(&key, &format!("1:{now}"), window_secs)
                .await?;
            return Ok(Decision::Allowed);
        }

        if count >= max_requests {
            return Ok(Decision::Denied {
                retry_after: window_secs - elapsed,
            });
        }

        // Preserve the original window expiry when incrementing.
        let remaining = (window_secs - elapsed).max(1);
        self.counters
            .put(&key, &format!("{}:{}", count + 1, window_start), remaining)
            .await?;
        Ok(Decision::Allowed)
    }
}

/// Parse a `"{count}:{window_start}"` record; garbled values reset the window.
fn parse_record(raw: &str) -> (u64, u64) {
    raw.split_once(':')
        .and_then(|(count, start)| Some((count.parse().ok()?, start.parse().ok()?)))
        .unwrap_or((0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TierLimits;
    use crate::store::MemoryCounterStore;

    fn limiter(config: RateLimitConfig) -> (Arc<MemoryCounterStore>, RateLimiter) {
        let store = Arc::new(MemoryCounterStore::new());
        let limiter = RateLimiter::new(store.clone(), config);
        (store, limiter)
    }

    fn small_config() -> RateLimitConfig {
        RateLimitConfig {
            window_secs: 60,
            max_requests: 3,
            ..RateLimitConfig::default()
        }
    }

    #[tokio::test]
    async fn quota_plus_one_is_denied_within_a_window() {
        let (_, limiter) = limiter(small_config());

        for _ in 0..3 {
            let d = limiter.check(Some("1.2.3.4"), AccessTier::Public, 1000).await.unwrap();
            assert_eq!(d, Decision::Allowed);
        }
        let d = limiter.check(Some("1.2.3.4"), AccessTier::Public, 1010).await.unwrap();
        assert_eq!(d, Decision::Denied { retry_after: 50 });
    }

    #[tokio::test]
    async fn a_new_window_resets_the_count() {
        let (_, limiter) = limiter(small_config());

        for _ in 0..4 {
            let _ = limiter.check(Some("1.2.3.4"), AccessTier::Public, 1000).await.unwrap();
        }
        // Past the window end: allowed regardless of prior count.
        let d = limiter.check(Some("1.2.3.4"), AccessTier::Public, 1061).await.unwrap();
        assert_eq!(d, Decision::Allowed);
    }

    #[tokio::test]
    async fn identities_and_tiers_are_counted_separately() {
        let (_, limiter) = limiter(small_config());

        for _ in 0..3 {
            limiter.check(Some("1.2.3.4"), AccessTier::Public, 1000).await.unwrap();
        }
        assert_eq!(
            limiter.check(Some("5.6.7.8"), AccessTier::Public, 1000).await.unwrap(),
            Decision::Allowed
        );
        assert_eq!(
            limiter.check(Some("1.2.3.4"), AccessTier::Protected, 1000).await.unwrap(),
            Decision::Allowed
        );
    }

    #[tokio::test]
    async fn missing_identity_is_admitted() {
        let (_, limiter) = limiter(RateLimitConfig {
            max_requests: 1,
            ..small_config()
        });

        for _ in 0..5 {
            assert_eq!(
                limiter.check(None, AccessTier::Public, 1000).await.unwrap(),
                Decision::Allowed
            );
        }
    }

    #[tokio::test]
    async fn disabled_limiter_admits_everything() {
        let (_, limiter) = limiter(RateLimitConfig {
            enabled: false,
            max_requests: 1,
            ..small_config()
        });

        for _ in 0..5 {
            assert_eq!(
                limiter.check(Some("1.2.3.4"), AccessTier::Public, 1000).await.unwrap(),
                Decision::Allowed
            );
        }
    }

    #[tokio::test]
    async fn store_outage_fails_open_by_default() {
        let (store, limiter) = limiter(small_config());
        store.set_unavailable(true);

        assert_eq!(
            limiter.check(Some("1.2.3.4"), AccessTier::Public, 1000).await.unwrap(),
            Decision::Allowed
        );
    }

    #[tokio::test]
    async fn store_outage_surfaces_when_fail_closed() {
        let (store, limiter) = limiter(RateLimitConfig {
            fail_open: false,
            ..small_config()
        });
        store.set_unavailable(true);

        assert!(matches!(
            limiter.check(Some("1.2.3.4"), AccessTier::Public, 1000).await,
            Err(GatewayError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn per_tier_overrides_apply() {
        let (_, limiter) = limiter(RateLimitConfig {
            protected: Some(TierLimits {
                window_secs: 60,
                max_requests: 1,
            }),
            ..small_config()
        });

        assert_eq!(
            limiter.check(Some("1.2.3.4"), AccessTier::Protected, 1000).await.unwrap(),
            Decision::Allowed
        );
        assert!(matches!(
            limiter.check(Some("1.2.3.4"), AccessTier::Protected, 1000).await.unwrap(),
            Decision::Denied { .. }
        ));
        // The public tier still has the default quota.
        for _ in 0..3 {
            assert_eq!(
                limiter.check(Some("1.2.3.4"), AccessTier::Public, 1000).await.unwrap(),
                Decision::Allowed
            );
        }
    }

    #[test]
    fn garbled_records_reset_the_window() {
        assert_eq!(parse_record("not-a-record"), (0, 0));
        assert_eq!(parse_record("7:"), (0, 0));
        assert_eq!(parse_record("7:900"), (7, 900));
    }
}
