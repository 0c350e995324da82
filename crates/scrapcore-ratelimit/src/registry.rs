//! Shares one [`RateLimiter`] per domain across every worker fetching that
//! domain within a source's run (spec §3: "rate-limiter state is shared
//! across all workers fetching the same host within one source").

use crate::bucket::RateLimiter;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Per-source registry of per-domain rate limiters. Dropped with the
/// source's engine instance at the end of its run — it never outlives the
/// run (spec §3).
#[derive(Default)]
pub struct RateLimiterRegistry {
    limiters: DashMap<String, Arc<RateLimiter>>,
    rps: f64,
    burst: u32,
    min_delay: Duration,
    jitter: Duration,
}

impl RateLimiterRegistry {
    pub fn new(rps: f64, burst: u32, min_delay: Duration, jitter: Duration) -> Self {
        Self {
            limiters: DashMap::new(),
            rps,
            burst,
            min_delay,
            jitter,
        }
    }

    /// Get or lazily create the limiter for `domain`.
    pub fn for_domain(&self, domain: &str) -> Arc<RateLimiter> {
        if let Some(existing) = self.limiters.get(domain) {
            return existing.clone();
        }
        let limiter = Arc::new(RateLimiter::new(
            self.rps,
            self.burst,
            self.min_delay,
            self.jitter,
        ));
        self.limiters
            .entry(domain.to_string())
            .or_insert(limiter)
            .clone()
    }

    pub fn domain_count(&self) -> usize {
        self.limiters.len()
    }
}

/// Extract the registry key (host) from a URL, defaulting to the whole URL
/// string if it cannot be parsed as one (callers should already have
/// validated the URL by this point).
pub fn domain_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}
