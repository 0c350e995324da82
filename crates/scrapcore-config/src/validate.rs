//! Descriptor validation: hard invariants raise a `ConfigError`, soft
//! findings are returned as warnings (spec §4.1).

use regex::Regex;
use scrapcore_types::{ConfigWarning, Descriptor, EngineType, LinkExtractMethod};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("source '{source_id}': {message}")]
    Invariant { source_id: String, message: String },
}

impl ConfigError {
    fn new(source_id: &str, message: impl Into<String>) -> Self {
        ConfigError::Invariant {
            source_id: source_id.to_string(),
            message: message.into(),
        }
    }
}

/// Validate one descriptor. Returns the collected warnings on success, or
/// the first hard invariant violation as an error.
pub fn validate(desc: &Descriptor) -> Result<Vec<ConfigWarning>, ConfigError> {
    let id = &desc.source_id;
    let mut warnings = Vec::new();

    if desc.source_id.trim().is_empty() {
        return Err(ConfigError::new(id, "source_id must not be empty"));
    }
    if desc
        .source_id
        .chars()
        .any(|c| matches!(c, '/' | '\\' | '\0'))
    {
        return Err(ConfigError::new(
            id,
            "source_id must be safe for use as a filesystem path component",
        ));
    }

    if desc.engine.timeout_s <= 0.0 {
        return Err(ConfigError::new(id, "engine.timeout_s must be > 0"));
    }
    if desc.engine.rps < 0.0 {
        return Err(ConfigError::new(id, "engine.rps must be >= 0"));
    }
    if desc.engine.min_delay_s < 0.0 {
        return Err(ConfigError::new(id, "engine.min_delay_s must be >= 0"));
    }

    if desc.entrypoints.is_empty() {
        return Err(ConfigError::new(id, "at least one entrypoint is required"));
    }
    for ep in &desc.entrypoints {
        if url::Url::parse(&ep.url.replace("{page}", "1").replace("{offset}", "0")).is_err() {
            return Err(ConfigError::new(
                id,
                format!("entrypoint url is not well-formed: {}", ep.url),
            ));
        }
        if ep.paging.step < 1 {
            return Err(ConfigError::new(id, "paging.step must be >= 1"));
        }
    }

    match desc.discovery.link_extract.method {
        LinkExtractMethod::Regex => {
            if desc.discovery.link_extract.pattern.is_none() {
                return Err(ConfigError::new(
                    id,
                    "discovery.link_extract.method=regex requires a pattern",
                ));
            }
        }
        LinkExtractMethod::Css | LinkExtractMethod::Xpath => {
            if desc.discovery.link_extract.selector.is_none() {
                return Err(ConfigError::new(
                    id,
                    "discovery.link_extract.method requires a selector",
                ));
            }
        }
    }

    if !(0.0..=1.0).contains(&desc.quality.max_boilerplate_ratio) {
        return Err(ConfigError::new(
            id,
            "quality.max_boilerplate_ratio must be between 0 and 1",
        ));
    }
    for pattern in &desc.quality.block_patterns {
        if let Err(e) = Regex::new(pattern) {
            return Err(ConfigError::new(
                id,
                format!("quality.block_patterns entry '{pattern}' does not compile: {e}"),
            ));
        }
    }

    // --- soft warnings ---
    if !desc.engine.verify_ssl {
        warnings.push(ConfigWarning::new(id, "verify_ssl is disabled"));
    }
    if desc.engine.kind == EngineType::Browser {
        warnings.push(ConfigWarning::new(
            id,
            "browser engine requested; ensure a headless backend is installed (see `doctor`)",
        ));
    }
    if let Some(pattern) = &desc.discovery.link_extract.pattern {
        if is_broad_regex(pattern) {
            warnings.push(ConfigWarning::new(
                id,
                format!("link_extract pattern '{pattern}' could match off-domain URLs"),
            ));
        }
    }

    Ok(warnings)
}

/// Heuristic: a pattern with no scheme/host anchor and a permissive `.*`
/// is a classic source of off-domain link leakage.
fn is_broad_regex(pattern: &str) -> bool {
    !pattern.contains("://") && pattern.contains(".*")
}
