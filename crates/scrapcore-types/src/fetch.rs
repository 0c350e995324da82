//! The uniform response contract every fetch engine produces (spec §3).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classification of a response as a block page, captcha wall, login gate,
/// or ordinary content. The engine detects and reports these; it never
/// tries to defeat them (spec §1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockSignal {
    None,
    LikelyBlocked,
    CaptchaPresent,
    LoginRequired,
    Unknown,
}

impl Default for BlockSignal {
    fn default() -> Self {
        BlockSignal::None
    }
}

/// Which engine produced a trace entry, and (for Hybrid) which attempt in
/// the fallback sequence it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    Http,
    Browser,
}

/// One attempt recorded in a `FetchResponse`'s trace — either a retry within
/// one engine, or (for Hybrid) the handoff from HTTP to Browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub engine: EngineKind,
    pub attempt: u32,
    pub status: u16,
    pub elapsed_ms: u64,
    pub error: Option<String>,
}

/// The response contract shared by the HTTP, Browser, and Hybrid engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub final_url: String,
    /// `0` when every attempt failed and retries are exhausted.
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
    pub elapsed_ms: u64,
    pub trace: Vec<TraceEntry>,
    pub block_signal: BlockSignal,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True once a Hybrid fetch's trace shows it fell back from HTTP to
    /// Browser (spec §8 invariant 8: trace length >= 2 and the final entry
    /// is the Browser attempt).
    pub fn hybrid_fallback_fired(&self) -> bool {
        self.trace.len() >= 2
            && matches!(self.trace.last().map(|t| t.engine), Some(EngineKind::Browser))
    }
}
