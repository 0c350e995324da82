//! Headless-browser fetch engine (spec §4.3.2). One `chromiumoxide::Browser`
//! per engine instance; every request gets a fresh page so action sequences
//! and cookies from one URL never leak into the next. Grounded in
//! `riptide-headless::launcher::HeadlessLauncher` and its CDP event pump,
//! generalized from a pooled-launcher design (overkill for one source's
//! concurrency) down to a single shared browser process.

use crate::block::classify_block;
use crate::contract::FetchEngine;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use regex::Regex;
use scrapcore_actions::{run_actions, ChromiumPage};
use scrapcore_types::{Action, EngineConfig, EngineKind, FetchResponse, TraceEntry};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

pub struct BrowserEngine {
    browser: Mutex<Browser>,
    config: EngineConfig,
    block_patterns: Vec<Regex>,
}

impl BrowserEngine {
    pub async fn launch(config: EngineConfig, block_patterns: Vec<Regex>) -> anyhow::Result<Self> {
        let browser_config = BrowserConfig::builder()
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;

        // Drive the CDP event stream for the lifetime of the browser; a
        // dropped handler means every subsequent page call hangs.
        tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok(Self {
            browser: Mutex::new(browser),
            config,
            block_patterns,
        })
    }

    #[instrument(skip(self, actions, cancel), fields(url = %url))]
    async fn render(
        &self,
        url: &str,
        actions: &[Action],
        wait_for: Option<&str>,
        cancel: &CancellationToken,
    ) -> FetchResponse {
        let started = Instant::now();
        let browser = self.browser.lock().await;

        let nav_timeout = Duration::from_secs_f64(self.config.nav_timeout_s);
        let page = match tokio::time::timeout(nav_timeout, browser.new_page(url)).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => return transport_failure(url, started, format!("navigation failed: {e}")),
            Err(_) => return transport_failure(url, started, "navigation timed out".to_string()),
        };
        drop(browser);

        if cancel.is_cancelled() {
            let _ = page.close().await;
            return transport_failure(url, started, "cancelled before actions ran".to_string());
        }

        if !actions.is_empty() {
            let handle = ChromiumPage(page.clone());
            let report = run_actions(&handle, actions).await;
            if let Some(idx) = report.aborted_at {
                warn!(url, index = idx, "strict action aborted render sequence");
            }
        }

        if let Some(selector) = wait_for {
            let render_timeout = Duration::from_secs_f64(self.config.render_timeout_s);
            let handle = ChromiumPage(page.clone());
            if tokio::time::timeout(render_timeout, handle.wait_for_selector(selector, render_timeout))
                .await
                .is_err()
            {
                warn!(url, selector, "wait_for selector never appeared");
            }
        }

        let body = page.content().await.unwrap_or_default();
        let status = 200u16;
        let _ = page.close().await;

        let block_signal = classify_block(status, &body, &self.block_patterns);
        FetchResponse {
            final_url: url.to_string(),
            status,
            headers: HashMap::new(),
            body: body.clone(),
            fetched_at: chrono::Utc::now(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            trace: vec![TraceEntry {
                engine: EngineKind::Browser,
                attempt: 0,
                status,
                elapsed_ms: started.elapsed().as_millis() as u64,
                error: None,
            }],
            block_signal,
        }
    }
}

fn transport_failure(url: &str, started: Instant, error: String) -> FetchResponse {
    FetchResponse {
        final_url: url.to_string(),
        status: 0,
        headers: HashMap::new(),
        body: String::new(),
        fetched_at: chrono::Utc::now(),
        elapsed_ms: started.elapsed().as_millis() as u64,
        trace: vec![TraceEntry {
            engine: EngineKind::Browser,
            attempt: 0,
            status: 0,
            elapsed_ms: started.elapsed().as_millis() as u64,
            error: Some(error),
        }],
        block_signal: scrapcore_types::BlockSignal::None,
    }
}

#[async_trait]
impl FetchEngine for BrowserEngine {
    async fn get(
        &self,
        url: &str,
        _headers: Option<HashMap<String, String>>,
        _cookies: Option<HashMap<String, String>>,
        cancel: &CancellationToken,
    ) -> FetchResponse {
        self.render(url, &[], None, cancel).await
    }

    async fn get_rendered(
        &self,
        url: &str,
        actions: &[Action],
        wait_for: Option<&str>,
        cancel: &CancellationToken,
    ) -> FetchResponse {
        self.render(url, actions, wait_for, cancel).await
    }

    async fn close(&self) {
        if let Err(e) = self.browser.lock().await.close().await {
            warn!(error = %e, "failed to close browser cleanly");
        }
    }
}
