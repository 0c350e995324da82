//! The source descriptor: the only input that varies between scraping
//! targets (spec §3). Typed so invariants are checked once, at load time,
//! rather than scattered through the pipeline as `if let Some(...)` guards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Either a single source or a list of sources, as accepted by the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptorDoc {
    One(Descriptor),
    Many { sources: Vec<Descriptor> },
}

impl DescriptorDoc {
    pub fn into_sources(self) -> Vec<Descriptor> {
        match self {
            DescriptorDoc::One(d) => vec![d],
            DescriptorDoc::Many { sources } => sources,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    pub source_id: String,

    pub engine: EngineConfig,

    #[serde(default)]
    pub entrypoints: Vec<Entrypoint>,

    #[serde(default)]
    pub actions: Vec<crate::action::Action>,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub parse: ParseConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub quality: QualityConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub schedule: Option<ScheduleConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineType {
    Http,
    Browser,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffMode {
    Exp,
    Fixed,
    None,
}

impl Default for BackoffMode {
    fn default() -> Self {
        BackoffMode::Exp
    }
}

fn default_timeout_s() -> f64 {
    20.0
}
fn default_true() -> bool {
    true
}
fn default_user_agent() -> String {
    "scrapcore/0.1".to_string()
}
fn default_rps() -> f64 {
    1.0
}
fn default_burst() -> u32 {
    1
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_on_status() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}
fn default_pool_connections() -> usize {
    10
}
fn default_pool_maxsize() -> usize {
    10
}
fn default_nav_timeout_s() -> f64 {
    30.0
}
fn default_render_timeout_s() -> f64 {
    10.0
}
fn default_concurrency() -> usize {
    4
}

/// Transport, rate-limit, and retry knobs for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(rename = "type")]
    pub kind: EngineType,

    #[serde(default = "default_timeout_s")]
    pub timeout_s: f64,

    #[serde(default = "default_true")]
    pub verify_ssl: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_rps")]
    pub rps: f64,

    #[serde(default = "default_burst")]
    pub burst: u32,

    #[serde(default)]
    pub min_delay_s: f64,

    #[serde(default)]
    pub jitter_s: f64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub backoff_mode: BackoffMode,

    #[serde(default = "default_retry_on_status")]
    pub retry_on_status: Vec<u16>,

    #[serde(default = "default_pool_connections")]
    pub pool_connections: usize,

    #[serde(default = "default_pool_maxsize")]
    pub pool_maxsize: usize,

    #[serde(default = "default_nav_timeout_s")]
    pub nav_timeout_s: f64,

    #[serde(default = "default_render_timeout_s")]
    pub render_timeout_s: f64,

    /// Per-source override of `global.max_workers`; overrides the global
    /// cap only when lower (spec §9 Open Questions).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineType::Http,
            timeout_s: default_timeout_s(),
            verify_ssl: true,
            user_agent: default_user_agent(),
            rps: default_rps(),
            burst: default_burst(),
            min_delay_s: 0.0,
            jitter_s: 0.0,
            max_retries: default_max_retries(),
            backoff_mode: BackoffMode::Exp,
            retry_on_status: default_retry_on_status(),
            pool_connections: default_pool_connections(),
            pool_maxsize: default_pool_maxsize(),
            nav_timeout_s: default_nav_timeout_s(),
            render_timeout_s: default_render_timeout_s(),
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagingMode {
    Page,
    Offset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging {
    pub mode: PagingMode,
    pub start: i64,
    pub pages: u32,
    #[serde(default = "default_step")]
    pub step: i64,
}

fn default_step() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entrypoint {
    pub url: String,
    pub paging: Paging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkExtractMethod {
    Regex,
    Css,
    Xpath,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkExtractConfig {
    pub method: LinkExtractMethod,
    pub pattern: Option<String>,
    pub selector: Option<String>,
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DedupeConfig {
    /// Fields that feed the content fingerprint. Defaults to `title` plus
    /// the first N characters of `text` when empty (spec §4.6).
    #[serde(default)]
    pub content_fields: Vec<String>,

    #[serde(default = "default_fingerprint_text_len")]
    pub fingerprint_text_len: usize,
}

fn default_fingerprint_text_len() -> usize {
    256
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    pub link_extract: LinkExtractConfig,

    #[serde(default)]
    pub dedupe: DedupeConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            link_extract: LinkExtractConfig {
                method: LinkExtractMethod::Css,
                pattern: None,
                selector: Some("a[href]".to_string()),
                identifier: None,
            },
            dedupe: DedupeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ParseConfig {
    pub title_selector: Option<String>,
    pub text_selector: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub min_text_len: usize,
    #[serde(default)]
    pub require_title: bool,
    #[serde(default)]
    pub require_text: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_text_len: 0,
            require_title: false,
            require_text: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    #[serde(default)]
    pub block_patterns: Vec<String>,
    #[serde(default)]
    pub min_text_len: usize,
    #[serde(default = "default_boilerplate_ratio")]
    pub max_boilerplate_ratio: f64,
}

fn default_boilerplate_ratio() -> f64 {
    0.6
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            block_patterns: Vec::new(),
            min_text_len: 0,
            max_boilerplate_ratio: default_boilerplate_ratio(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemsFormat {
    Jsonl,
    Csv,
    Parquet,
}

impl Default for ItemsFormat {
    fn default() -> Self {
        ItemsFormat::Jsonl
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub items_format: ItemsFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub interval_s: Option<u64>,
    pub cron: Option<String>,
}

/// Global, cross-source settings (spec §5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

fn default_max_workers() -> usize {
    8
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}

/// A non-fatal finding surfaced by `validate()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub source_id: String,
    pub message: String,
}

impl ConfigWarning {
    pub fn new(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            message: message.into(),
        }
    }
}

/// Resolve the effective worker cap for one source, applying the
/// per-source/global precedence rule from spec §9: a per-source value
/// overrides the global cap only when it is lower, never when higher.
pub fn effective_concurrency(global: &GlobalConfig, per_source: usize) -> usize {
    per_source.min(global.max_workers)
}

pub type RawJson = HashMap<String, serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_defaults_are_sane() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.kind, EngineType::Http);
        assert!(cfg.timeout_s > 0.0);
        assert!(cfg.retry_on_status.contains(&503));
    }

    #[test]
    fn per_source_concurrency_never_exceeds_global() {
        let global = GlobalConfig { max_workers: 4 };
        assert_eq!(effective_concurrency(&global, 10), 4);
        assert_eq!(effective_concurrency(&global, 2), 2);
    }

    #[test]
    fn descriptor_doc_accepts_single_source() {
        let json = serde_json::json!({
            "source_id": "jobs",
            "engine": { "type": "http" },
            "entrypoints": [],
        });
        let doc: DescriptorDoc = serde_json::from_value(json).unwrap();
        let sources = doc.into_sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source_id, "jobs");
    }

    #[test]
    fn descriptor_doc_accepts_source_list() {
        let json = serde_json::json!({
            "sources": [
                { "source_id": "a", "engine": { "type": "http" } },
                { "source_id": "b", "engine": { "type": "browser" } },
            ]
        });
        let doc: DescriptorDoc = serde_json::from_value(json).unwrap();
        assert_eq!(doc.into_sources().len(), 2);
    }

    #[test]
    fn paging_round_trips_through_json() {
        let paging = Paging {
            mode: PagingMode::Offset,
            start: 0,
            pages: 5,
            step: 20,
        };
        let v = serde_json::to_value(&paging).unwrap();
        let back: Paging = serde_json::from_value(v).unwrap();
        assert_eq!(back.start, paging.start);
        assert_eq!(back.step, paging.step);
    }
}
