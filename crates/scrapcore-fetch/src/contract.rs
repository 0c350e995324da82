//! The uniform capability every fetch engine implements (spec §4.3):
//! `get`, `get_rendered`, `close`. Implemented by `HttpEngine`,
//! `BrowserEngine`, and `HybridEngine` — a trait object, not an abstract
//! base class (spec §9 Design Notes).

use async_trait::async_trait;
use scrapcore_types::{Action, FetchResponse};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// Plain GET. `headers`/`cookies` are merged on top of the engine's
    /// defaults (user agent, etc).
    async fn get(
        &self,
        url: &str,
        headers: Option<HashMap<String, String>>,
        cookies: Option<HashMap<String, String>>,
        cancel: &CancellationToken,
    ) -> FetchResponse;

    /// GET with a rendered page: the Browser engine drives the action
    /// sequence and (optionally) waits for `wait_for` before capturing
    /// HTML. On the HTTP engine this degrades to `get` with actions ignored
    /// (spec §4.3.1 — an explicit degradation, not an error).
    async fn get_rendered(
        &self,
        url: &str,
        actions: &[Action],
        wait_for: Option<&str>,
        cancel: &CancellationToken,
    ) -> FetchResponse;

    /// Release transport resources. Guaranteed to run on every exit path by
    /// callers (spec §4.3); idempotent.
    async fn close(&self);
}
