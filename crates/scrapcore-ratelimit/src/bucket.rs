//! Per-domain token bucket rate limiter (spec §4.2).
//!
//! Tokens replenish continuously at `rps` tokens/sec up to `burst` capacity.
//! A request acquires one token before issue; if none is available the
//! caller waits rather than failing. After acquisition a randomized delay
//! of `max(min_delay_s, uniform(0, jitter_s))` is inserted to avoid
//! lockstep bursts across workers.

use rand::Rng;
use scrapcore_types::ErrorKind;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// A single domain's rate-limit state: one token bucket plus the jitter
/// policy applied after each acquisition.
#[derive(Debug)]
pub struct RateLimiter {
    rps: f64,
    burst: f64,
    min_delay: Duration,
    jitter: Duration,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    pub fn new(rps: f64, burst: u32, min_delay: Duration, jitter: Duration) -> Self {
        Self {
            rps: rps.max(0.0),
            burst: (burst.max(1)) as f64,
            min_delay,
            jitter,
            state: Mutex::new(BucketState {
                tokens: burst.max(1) as f64,
                last_refill: Instant::now(),
            }),
        }
    }

    fn refill_and_try_take(&self) -> bool {
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.rps).min(self.burst);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Block until a token is available (or `cancel` fires), then sleep the
    /// jittered post-acquisition delay. Returns `Err` only on cancellation.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), ErrorKind> {
        loop {
            if cancel.is_cancelled() {
                return Err(ErrorKind::Transport("rate limiter wait cancelled".to_string()));
            }
            if self.refill_and_try_take() {
                break;
            }
            // rps == 0 means "never issue": still honor cancellation, don't busy-loop.
            let poll_interval = if self.rps > 0.0 {
                Duration::from_secs_f64((1.0 / self.rps).min(0.25).max(0.001))
            } else {
                Duration::from_millis(250)
            };
            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {}
                _ = cancel.cancelled() => {
                    return Err(ErrorKind::Transport("rate limiter wait cancelled".to_string()));
                }
            }
        }

        let delay = self.post_acquire_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn post_acquire_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.min_delay;
        }
        let jittered_nanos = rand::thread_rng().gen_range(0..=self.jitter.as_nanos().max(1));
        let jittered = Duration::from_nanos(jittered_nanos as u64);
        self.min_delay.max(jittered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_capacity_is_consumed_immediately() {
        let limiter = RateLimiter::new(1.0, 3, Duration::ZERO, Duration::ZERO);
        let cancel = CancellationToken::new();
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire(&cancel).await.unwrap();
        }
        // All three come from burst capacity, so this should be near-instant.
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn acquisitions_beyond_burst_wait_for_refill() {
        let limiter = RateLimiter::new(10.0, 1, Duration::ZERO, Duration::ZERO);
        let cancel = CancellationToken::new();
        limiter.acquire(&cancel).await.unwrap();
        let start = Instant::now();
        limiter.acquire(&cancel).await.unwrap();
        // At 10 rps the second token takes roughly 100ms to refill.
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn cancellation_aborts_the_wait() {
        let limiter = RateLimiter::new(0.1, 1, Duration::ZERO, Duration::ZERO);
        let cancel = CancellationToken::new();
        limiter.acquire(&cancel).await.unwrap(); // consumes the only token

        let cancel2 = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel2.cancel();
        });

        let result = limiter.acquire(&cancel).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn post_acquire_delay_respects_min_delay_floor() {
        let limiter = RateLimiter::new(100.0, 10, Duration::from_millis(50), Duration::ZERO);
        let cancel = CancellationToken::new();
        let start = Instant::now();
        limiter.acquire(&cancel).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(45));
    }
}
