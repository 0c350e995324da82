//! The structured document produced by the parse stage, and the reasons an
//! item might be dropped before reaching `items_valid.jsonl` (spec §3, §4.6).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why an item never made it to `items_valid.jsonl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    Blocked,
    Quality,
    Validation,
    Dedupe,
    FetchFailed,
    ExtractionEmpty,
    PersistError,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DropReason::Blocked => "blocked",
            DropReason::Quality => "quality",
            DropReason::Validation => "validation",
            DropReason::Dedupe => "dedupe",
            DropReason::FetchFailed => "fetch_failed",
            DropReason::ExtractionEmpty => "extraction_empty",
            DropReason::PersistError => "persist_error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
    #[serde(default)]
    pub meta: HashMap<String, serde_json::Value>,

    #[serde(default, rename = "_quality_issues")]
    pub quality_issues: Vec<String>,

    #[serde(default, rename = "_validation_errors")]
    pub validation_errors: Vec<String>,

    /// Populated only on items routed to `items_dropped.jsonl`.
    #[serde(default, rename = "_drop_reason", skip_serializing_if = "Option::is_none")]
    pub drop_reason: Option<DropReason>,
}

impl Item {
    pub fn new(url: impl Into<String>, title: Option<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title,
            text: text.into(),
            meta: HashMap::new(),
            quality_issues: Vec::new(),
            validation_errors: Vec::new(),
            drop_reason: None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.quality_issues.is_empty() && self.validation_errors.is_empty()
    }

    pub fn drop_with(mut self, reason: DropReason) -> Self {
        self.drop_reason = Some(reason);
        self
    }
}
