//! `${ENV_VAR}` expansion over a raw config document (spec §6).
//!
//! Expansion runs as a pre-pass over the untyped JSON value tree before
//! typed deserialization, so any string field in the descriptor may
//! reference an environment variable without every struct needing its own
//! expansion logic.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static VAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Errors produced while expanding `${VAR}` references.
#[derive(Debug, thiserror::Error)]
pub enum EnvExpandError {
    #[error("environment variable {0} referenced in config but not set")]
    MissingVar(String),
}

/// Expand every `${VAR}` occurrence in every string leaf of `value`,
/// recursing through objects and arrays. Missing variables are a hard
/// error: a silently-empty secret is worse than a loud failure.
pub fn expand(value: &Value) -> Result<Value, EnvExpandError> {
    match value {
        Value::String(s) => Ok(Value::String(expand_str(s)?)),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(expand(item)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), expand(v)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn expand_str(input: &str) -> Result<String, EnvExpandError> {
    let mut err = None;
    let expanded = VAR_PATTERN.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        match std::env::var(var) {
            Ok(v) => v,
            Err(_) => {
                err.get_or_insert_with(|| EnvExpandError::MissingVar(var.to_string()));
                String::new()
            }
        }
    });
    if let Some(e) = err {
        return Err(e);
    }
    Ok(expanded.into_owned())
}
