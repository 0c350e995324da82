//! HTTP fetch engine (spec §4.3.1). Reuses a pooled `reqwest::Client`,
//! follows redirects, respects `verify_ssl`, sends `user_agent`.
//! `get_rendered` degrades to `get` — actions are ignored, which is an
//! explicit degradation rather than an error.
//!
//! Retry/backoff and per-domain rate limiting are hoisted out into
//! `scrapcore-ratelimit` and shared by every engine (spec §3: rate-limiter
//! state is shared per domain within one source). Grounded in
//! `riptide-fetch::fetch::ReliableHttpClient`'s retry loop, generalized
//! from a fixed client-error/server-error split to the descriptor's
//! `retry_on_status` set.

use crate::block::classify_block;
use crate::contract::FetchEngine;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scrapcore_ratelimit::{domain_of, RateLimiterRegistry, RetryPolicy};
use scrapcore_types::{Action, BlockSignal, EngineConfig, EngineKind, FetchResponse, TraceEntry};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

pub struct HttpEngine {
    client: Client,
    config: EngineConfig,
    limiters: Arc<RateLimiterRegistry>,
    retry: RetryPolicy,
    block_patterns: Vec<Regex>,
}

impl HttpEngine {
    pub fn new(config: EngineConfig, block_patterns: Vec<Regex>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(!config.verify_ssl)
            .pool_max_idle_per_host(config.pool_maxsize)
            .connect_timeout(Duration::from_secs_f64(config.timeout_s.min(10.0)))
            .timeout(Duration::from_secs_f64(config.timeout_s))
            .gzip(true)
            .brotli(true)
            .cookie_store(true)
            .build()?;

        let limiters = Arc::new(RateLimiterRegistry::new(
            config.rps,
            config.burst,
            Duration::from_secs_f64(config.min_delay_s),
            Duration::from_secs_f64(config.jitter_s),
        ));

        let retry = RetryPolicy {
            max_retries: config.max_retries,
            mode: config.backoff_mode,
            ..RetryPolicy::default()
        };

        Ok(Self {
            client,
            config,
            limiters,
            retry,
            block_patterns,
        })
    }

    #[instrument(skip(self, headers, cookies, cancel), fields(url = %url))]
    async fn fetch_once(
        &self,
        url: &str,
        headers: &Option<HashMap<String, String>>,
        cookies: &Option<HashMap<String, String>>,
        cancel: &CancellationToken,
    ) -> FetchResponse {
        let run_started = Instant::now();
        let domain = domain_of(url);
        let limiter = self.limiters.for_domain(&domain);
        let mut trace = Vec::new();
        let mut last_body = String::new();
        let mut last_status: u16 = 0;
        let mut last_headers = HashMap::new();

        for attempt in 0..self.retry.total_attempts() {
            if cancel.is_cancelled() {
                break;
            }
            if limiter.acquire(cancel).await.is_err() {
                break;
            }

            let attempt_start = Instant::now();
            let mut builder = self.client.get(url);
            if let Some(h) = headers {
                for (k, v) in h {
                    builder = builder.header(k, v);
                }
            }
            if let Some(c) = cookies {
                let cookie_header = c
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                if !cookie_header.is_empty() {
                    builder = builder.header("Cookie", cookie_header);
                }
            }

            let outcome = builder.send().await;
            let elapsed_ms = attempt_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let mut hdrs = HashMap::new();
                    for (k, v) in resp.headers() {
                        if let Ok(s) = v.to_str() {
                            hdrs.insert(k.to_string(), s.to_string());
                        }
                    }
                    let final_url = resp.url().to_string();
                    let body = resp.text().await.unwrap_or_default();

                    trace.push(TraceEntry {
                        engine: EngineKind::Http,
                        attempt,
                        status,
                        elapsed_ms,
                        error: None,
                    });

                    last_status = status;
                    last_body = body.clone();
                    last_headers = hdrs.clone();

                    let retryable = self.retry.max_retries > 0
                        && scrapcore_ratelimit::is_retryable_status(status, &self.config.retry_on_status);

                    if !retryable {
                        let block_signal = classify_block(status, &body, &self.block_patterns);
                        return FetchResponse {
                            final_url,
                            status,
                            headers: hdrs,
                            body,
                            fetched_at: chrono::Utc::now(),
                            elapsed_ms: run_started.elapsed().as_millis() as u64,
                            trace,
                            block_signal,
                        };
                    }

                    warn!(url, status, attempt, "retryable status, backing off");
                }
                Err(err) => {
                    trace.push(TraceEntry {
                        engine: EngineKind::Http,
                        attempt,
                        status: 0,
                        elapsed_ms,
                        error: Some(err.to_string()),
                    });
                    warn!(url, attempt, error = %err, "transport error, backing off");
                }
            }

            if attempt + 1 < self.retry.total_attempts() {
                let delay = self.retry.backoff(attempt);
                if !delay.is_zero() {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => break,
                    }
                }
            }
        }

        // Exhausted every attempt without a terminal (non-retryable) response:
        // surfaced as status=0, per-attempt statuses remain visible in trace[].
        let block_signal = classify_block(last_status, &last_body, &self.block_patterns);
        FetchResponse {
            final_url: url.to_string(),
            status: 0,
            headers: last_headers,
            body: last_body,
            fetched_at: chrono::Utc::now(),
            elapsed_ms: run_started.elapsed().as_millis() as u64,
            trace,
            block_signal,
        }
    }
}

#[async_trait]
impl FetchEngine for HttpEngine {
    async fn get(
        &self,
        url: &str,
        headers: Option<HashMap<String, String>>,
        cookies: Option<HashMap<String, String>>,
        cancel: &CancellationToken,
    ) -> FetchResponse {
        self.fetch_once(url, &headers, &cookies, cancel).await
    }

    async fn get_rendered(
        &self,
        url: &str,
        _actions: &[Action],
        _wait_for: Option<&str>,
        cancel: &CancellationToken,
    ) -> FetchResponse {
        // Explicit degradation (spec §4.3.1): actions are ignored, not an error.
        self.fetch_once(url, &None, &None, cancel).await
    }

    async fn close(&self) {
        // reqwest::Client's pool is released on drop; nothing to do eagerly.
    }
}
