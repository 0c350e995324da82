//! Retry/backoff policy (spec §4.2): on a retryable outcome, sleep
//! `backoff(attempt)` and retry up to `max_retries`. Grounded in
//! `ReliableHttpClient::calculate_delay`, generalized to the three backoff
//! modes the descriptor allows (`exp`, `fixed`, `none`).

use rand::Rng;
use scrapcore_types::BackoffMode;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub mode: BackoffMode,
    pub base: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            mode: BackoffMode::Exp,
            base: Duration::from_millis(200),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Total attempts a single fetch may issue against the transport:
    /// the initial try plus `max_retries` retries (spec §8 invariant 5).
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay to sleep before the `attempt`-th retry (0-indexed: the delay
    /// before retry #1 is `backoff(0)`).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = match self.mode {
            BackoffMode::None => Duration::ZERO,
            BackoffMode::Fixed => self.base,
            BackoffMode::Exp => {
                let millis = self.base.as_millis() as f64 * 2f64.powi(attempt as i32);
                Duration::from_millis(millis as u64)
            }
        };
        let base = base.min(self.max_delay);
        if base.is_zero() {
            return base;
        }
        let jitter_millis = rand::thread_rng().gen_range(0..=(base.as_millis() as u64 / 4).max(1));
        (base + Duration::from_millis(jitter_millis)).min(self.max_delay)
    }
}

/// Whether an HTTP status code should be retried, given the descriptor's
/// configured retry set (spec §4.2 default: {429, 500, 502, 503, 504}).
pub fn is_retryable_status(status: u16, retry_on_status: &[u16]) -> bool {
    retry_on_status.contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_attempts_is_max_retries_plus_one() {
        let policy = RetryPolicy {
            max_retries: 3,
            ..Default::default()
        };
        assert_eq!(policy.total_attempts(), 4);
    }

    #[test]
    fn none_mode_never_sleeps() {
        let policy = RetryPolicy {
            mode: BackoffMode::None,
            ..Default::default()
        };
        assert_eq!(policy.backoff(0), Duration::ZERO);
        assert_eq!(policy.backoff(5), Duration::ZERO);
    }

    #[test]
    fn fixed_mode_does_not_grow_with_attempt() {
        let policy = RetryPolicy {
            mode: BackoffMode::Fixed,
            base: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            max_retries: 5,
        };
        let d0 = policy.backoff(0).as_millis();
        let d3 = policy.backoff(3).as_millis();
        // Both are base + jitter in [0, base/4]; fixed mode never grows
        // with attempt the way exp does.
        assert!(d0 >= 100 && d0 <= 125);
        assert!(d3 >= 100 && d3 <= 125);
    }

    #[test]
    fn exp_mode_grows_with_attempt() {
        let policy = RetryPolicy {
            mode: BackoffMode::Exp,
            base: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            max_retries: 5,
        };
        assert!(policy.backoff(0).as_millis() < policy.backoff(3).as_millis());
    }

    #[test]
    fn exp_mode_is_capped_at_max_delay() {
        let policy = RetryPolicy {
            mode: BackoffMode::Exp,
            base: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            max_retries: 10,
        };
        assert!(policy.backoff(10) <= Duration::from_millis(500));
    }

    #[test]
    fn retry_on_status_set_is_respected() {
        assert!(is_retryable_status(503, &[429, 500, 502, 503, 504]));
        assert!(!is_retryable_status(404, &[429, 500, 502, 503, 504]));
    }
}
