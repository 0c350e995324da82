//! Run report: per-run, per-source machine-readable summary (spec §3, §4.7).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatencyStats {
    pub p50_ms: u64,
    pub p95_ms: u64,
}

impl LatencyStats {
    /// Compute p50/p95 from a vector of per-fetch latencies. Empty input
    /// yields zeroed stats rather than panicking on an out-of-range index.
    pub fn from_samples(samples: &mut [u64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        samples.sort_unstable();
        let p = |pct: f64| -> u64 {
            let idx = ((samples.len() as f64 - 1.0) * pct).round() as usize;
            samples[idx.min(samples.len() - 1)]
        };
        Self {
            p50_ms: p(0.50),
            p95_ms: p(0.95),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageCounts {
    pub pages_attempted: u64,
    pub pages_succeeded: u64,
    pub links_found: u64,
    pub items_parsed: u64,
    pub items_valid: u64,
    pub items_dropped: u64,
    pub dropped_by_reason: HashMap<String, u64>,
    pub fallbacks_fired: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    pub source_id: String,
    pub status: RunStatus,
    pub counts: StageCounts,
    pub top_error_kinds: Vec<(String, u64)>,
    pub latency: LatencyStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub status: RunStatus,
    pub sources: Vec<SourceReport>,
}

impl RunReport {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: chrono::Utc::now(),
            finished_at: None,
            status: RunStatus::Success,
            sources: Vec::new(),
        }
    }

    /// Aggregate status is `Failed` if every source failed, `Partial` if any
    /// source is partial or failed while others succeeded, else `Success`.
    pub fn recompute_status(&mut self) {
        let any_success = self
            .sources
            .iter()
            .any(|s| s.status == RunStatus::Success);
        let any_partial_or_failed = self
            .sources
            .iter()
            .any(|s| s.status != RunStatus::Success);

        self.status = if self.sources.is_empty() {
            RunStatus::Failed
        } else if any_partial_or_failed && any_success {
            RunStatus::Partial
        } else if any_partial_or_failed {
            RunStatus::Failed
        } else {
            RunStatus::Success
        };
    }

    /// CLI exit code per spec §6: 0 all success, 1 at least one partial, 2
    /// fatal (no sources ran at all, i.e. failed outright).
    pub fn exit_code(&self) -> i32 {
        match self.status {
            RunStatus::Success => 0,
            RunStatus::Partial => 1,
            RunStatus::Failed => 2,
        }
    }
}
