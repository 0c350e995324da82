//! Hybrid fetch engine (spec §4.3.3): try HTTP first, fall back to the
//! Browser engine when the response looks unusable. Falls back when any of:
//! the HTTP attempt exhausted retries without a 2xx, a block signal other
//! than `None` was raised, or the extracted text is shorter than
//! `quality.min_text_len`. The combined trace records both attempts so
//! `FetchResponse::hybrid_fallback_fired` can tell a true fallback from a
//! same-engine retry (spec §8 invariant 8).

use crate::contract::FetchEngine;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scrapcore_types::{Action, BlockSignal, FetchResponse};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

static TAG_STRIPPER: Lazy<Regex> = Lazy::new(|| Regex::new("<[^>]*>").unwrap());

/// Cheap text-length estimate used only to decide whether to fall back to
/// rendering. The real structured extraction (with boilerplate filtering)
/// lives downstream in the extraction stage; duplicating a full HTML parser
/// here to save one fallback decision would pull a higher-level concern into
/// the fetch layer.
fn visible_text_len(html: &str) -> usize {
    TAG_STRIPPER.replace_all(html, " ").split_whitespace().count()
}

pub struct HybridEngine {
    http: Arc<dyn FetchEngine>,
    browser: Arc<dyn FetchEngine>,
    min_text_len: usize,
}

impl HybridEngine {
    pub fn new(http: Arc<dyn FetchEngine>, browser: Arc<dyn FetchEngine>, min_text_len: usize) -> Self {
        Self {
            http,
            browser,
            min_text_len,
        }
    }

    fn needs_fallback(&self, resp: &FetchResponse) -> bool {
        if !resp.is_ok() {
            return true;
        }
        if !matches!(resp.block_signal, BlockSignal::None) {
            return true;
        }
        self.min_text_len > 0 && visible_text_len(&resp.body) < self.min_text_len
    }

    async fn fetch_with_fallback(
        &self,
        url: &str,
        headers: Option<HashMap<String, String>>,
        cookies: Option<HashMap<String, String>>,
        actions: &[Action],
        wait_for: Option<&str>,
        cancel: &CancellationToken,
    ) -> FetchResponse {
        let mut response = self.http.get(url, headers, cookies, cancel).await;

        if cancel.is_cancelled() || !self.needs_fallback(&response) {
            return response;
        }

        debug!(url, status = response.status, block_signal = ?response.block_signal, "falling back to browser engine");

        let rendered = self.browser.get_rendered(url, actions, wait_for, cancel).await;

        response.trace.extend(rendered.trace);
        FetchResponse {
            final_url: rendered.final_url,
            status: rendered.status,
            headers: rendered.headers,
            body: rendered.body,
            fetched_at: rendered.fetched_at,
            elapsed_ms: response.elapsed_ms + rendered.elapsed_ms,
            trace: response.trace,
            block_signal: rendered.block_signal,
        }
    }
}

#[async_trait]
impl FetchEngine for HybridEngine {
    async fn get(
        &self,
        url: &str,
        headers: Option<HashMap<String, String>>,
        cookies: Option<HashMap<String, String>>,
        cancel: &CancellationToken,
    ) -> FetchResponse {
        self.fetch_with_fallback(url, headers, cookies, &[], None, cancel).await
    }

    async fn get_rendered(
        &self,
        url: &str,
        actions: &[Action],
        wait_for: Option<&str>,
        cancel: &CancellationToken,
    ) -> FetchResponse {
        self.fetch_with_fallback(url, None, None, actions, wait_for, cancel).await
    }

    async fn close(&self) {
        self.http.close().await;
        self.browser.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrapcore_types::{EngineKind, TraceEntry};

    struct StubEngine {
        kind: EngineKind,
        status: u16,
        body: &'static str,
        block_signal: BlockSignal,
    }

    #[async_trait]
    impl FetchEngine for StubEngine {
        async fn get(
            &self,
            url: &str,
            _headers: Option<HashMap<String, String>>,
            _cookies: Option<HashMap<String, String>>,
            _cancel: &CancellationToken,
        ) -> FetchResponse {
            self.response(url)
        }

        async fn get_rendered(
            &self,
            url: &str,
            _actions: &[Action],
            _wait_for: Option<&str>,
            _cancel: &CancellationToken,
        ) -> FetchResponse {
            self.response(url)
        }

        async fn close(&self) {}
    }

    impl StubEngine {
        fn response(&self, url: &str) -> FetchResponse {
            FetchResponse {
                final_url: url.to_string(),
                status: self.status,
                headers: HashMap::new(),
                body: self.body.to_string(),
                fetched_at: chrono::Utc::now(),
                elapsed_ms: 1,
                trace: vec![TraceEntry {
                    engine: self.kind,
                    attempt: 0,
                    status: self.status,
                    elapsed_ms: 1,
                    error: None,
                }],
                block_signal: self.block_signal,
            }
        }
    }

    #[tokio::test]
    async fn successful_http_response_never_triggers_fallback() {
        let http = Arc::new(StubEngine {
            kind: EngineKind::Http,
            status: 200,
            body: "plenty of perfectly ordinary visible text content here",
            block_signal: BlockSignal::None,
        });
        let browser = Arc::new(StubEngine {
            kind: EngineKind::Browser,
            status: 200,
            body: "rendered",
            block_signal: BlockSignal::None,
        });
        let engine = HybridEngine::new(http, browser, 0);
        let cancel = CancellationToken::new();
        let resp = engine.get("https://fix.test", None, None, &cancel).await;

        assert!(!resp.hybrid_fallback_fired());
        assert_eq!(resp.trace.len(), 1);
    }

    #[tokio::test]
    async fn block_signal_triggers_browser_fallback() {
        let http = Arc::new(StubEngine {
            kind: EngineKind::Http,
            status: 200,
            body: "please verify you are human",
            block_signal: BlockSignal::LikelyBlocked,
        });
        let browser = Arc::new(StubEngine {
            kind: EngineKind::Browser,
            status: 200,
            body: "rendered content after js executed",
            block_signal: BlockSignal::None,
        });
        let engine = HybridEngine::new(http, browser, 0);
        let cancel = CancellationToken::new();
        let resp = engine.get("https://fix.test", None, None, &cancel).await;

        assert!(resp.hybrid_fallback_fired());
        assert_eq!(resp.trace.len(), 2);
        assert_eq!(resp.body, "rendered content after js executed");
    }

    #[tokio::test]
    async fn thin_text_triggers_browser_fallback() {
        let http = Arc::new(StubEngine {
            kind: EngineKind::Http,
            status: 200,
            body: "hi",
            block_signal: BlockSignal::None,
        });
        let browser = Arc::new(StubEngine {
            kind: EngineKind::Browser,
            status: 200,
            body: "a much longer rendered body with real content in it now",
            block_signal: BlockSignal::None,
        });
        let engine = HybridEngine::new(http, browser, 20);
        let cancel = CancellationToken::new();
        let resp = engine.get("https://fix.test", None, None, &cancel).await;

        assert!(resp.hybrid_fallback_fired());
    }

    #[tokio::test]
    async fn non_ok_status_triggers_browser_fallback() {
        let http = Arc::new(StubEngine {
            kind: EngineKind::Http,
            status: 503,
            body: "",
            block_signal: BlockSignal::None,
        });
        let browser = Arc::new(StubEngine {
            kind: EngineKind::Browser,
            status: 200,
            body: "recovered via browser",
            block_signal: BlockSignal::None,
        });
        let engine = HybridEngine::new(http, browser, 0);
        let cancel = CancellationToken::new();
        let resp = engine.get("https://fix.test", None, None, &cancel).await;

        assert!(resp.hybrid_fallback_fired());
        assert_eq!(resp.status, 200);
    }
}
