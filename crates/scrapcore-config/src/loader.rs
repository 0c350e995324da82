//! Loads a config file (JSON or YAML) into one or more validated
//! descriptors (spec §4.1, §6).

use crate::{env, migrate, validate};
use scrapcore_types::{ConfigWarning, Descriptor, DescriptorDoc, GlobalConfig};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is neither valid JSON nor valid YAML: {message}")]
    Parse { path: String, message: String },

    #[error(transparent)]
    EnvExpand(#[from] env::EnvExpandError),

    #[error(transparent)]
    Config(#[from] validate::ConfigError),
}

/// The result of a successful load: every source's descriptor, plus any
/// non-fatal warnings collected along the way (migration notices and
/// `validate()` findings).
pub struct LoadedConfig {
    pub descriptors: Vec<Descriptor>,
    pub warnings: Vec<ConfigWarning>,
    pub global: GlobalConfig,
}

/// Load, migrate, expand, parse, and validate a config file. A hard
/// invariant violation in any one source fails the whole load (spec §4.6:
/// "Config error: fatal, run never starts").
pub fn load(path: &Path) -> Result<LoadedConfig, LoadError> {
    let raw = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let value = parse_document(path, &raw)?;
    load_value(value)
}

/// Same as [`load`] but takes an already-parsed JSON value — used by the
/// CLI's `--dry-run` path and by tests that build documents in-memory.
pub fn load_value(value: serde_json::Value) -> Result<LoadedConfig, LoadError> {
    let (migrated, migration_warnings) = migrate::migrate(&value);
    let expanded = env::expand(&migrated)?;

    let global: GlobalConfig = expanded
        .get("global")
        .map(|g| serde_json::from_value(g.clone()))
        .transpose()
        .map_err(|e: serde_json::Error| LoadError::Parse {
            path: "<value>".to_string(),
            message: format!("invalid `global` section: {e}"),
        })?
        .unwrap_or_default();

    let doc: DescriptorDoc = serde_json::from_value(expanded).map_err(|e| LoadError::Parse {
        path: "<value>".to_string(),
        message: e.to_string(),
    })?;

    let descriptors = doc.into_sources();
    let mut warnings: Vec<ConfigWarning> = migration_warnings
        .into_iter()
        .map(|w| ConfigWarning::new("<migration>", w.0))
        .collect();

    for desc in &descriptors {
        warnings.extend(validate::validate(desc)?);
    }

    Ok(LoadedConfig {
        descriptors,
        warnings,
        global,
    })
}

fn parse_document(path: &Path, raw: &str) -> Result<serde_json::Value, LoadError> {
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    if is_yaml {
        serde_yaml::from_str(raw).map_err(|e| LoadError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    } else {
        serde_json::from_str(raw).map_err(|e| LoadError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn descriptor_json() -> serde_json::Value {
        serde_json::json!({
            "source_id": "jobs",
            "engine": { "type": "http" },
            "entrypoints": [{
                "url": "https://fix.test/jobs?page={page}",
                "paging": { "mode": "page", "start": 1, "pages": 2, "step": 1 }
            }],
            "discovery": {
                "link_extract": { "method": "regex", "pattern": r"https://fix\.test/jobs/\d+" }
            }
        })
    }

    #[test]
    fn loads_single_source_document() {
        let loaded = load_value(descriptor_json()).unwrap();
        assert_eq!(loaded.descriptors.len(), 1);
        assert_eq!(loaded.descriptors[0].source_id, "jobs");
    }

    #[test]
    fn loads_multi_source_document() {
        let doc = serde_json::json!({ "sources": [descriptor_json(), descriptor_json()] });
        let loaded = load_value(doc).unwrap();
        assert_eq!(loaded.descriptors.len(), 2);
    }

    #[test]
    fn round_trip_through_json_preserves_source_id() {
        let original = descriptor_json();
        let loaded = load_value(original.clone()).unwrap();
        let reserialized = serde_json::to_value(&loaded.descriptors[0]).unwrap();
        assert_eq!(reserialized["source_id"], original["source_id"]);
    }

    #[test]
    fn invalid_descriptor_fails_the_whole_load() {
        let mut doc = descriptor_json();
        doc["engine"]["timeout_s"] = serde_json::json!(0.0);
        assert!(load_value(doc).is_err());
    }

    #[test]
    fn legacy_shape_is_migrated_before_validation() {
        let legacy = serde_json::json!({
            "base_url": "https://fix.test/jobs",
            "pattern": r"https://fix\.test/jobs/\d+",
            "max_pages": 2,
        });
        let loaded = load_value(legacy).unwrap();
        assert_eq!(loaded.descriptors.len(), 1);
        assert_eq!(loaded.descriptors[0].source_id, "fix.test");
    }

    #[test]
    fn yaml_file_loads_identically_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.yaml");
        let yaml = r#"
source_id: jobs
engine:
  type: http
entrypoints:
  - url: "https://fix.test/jobs?page={page}"
    paging:
      mode: page
      start: 1
      pages: 2
      step: 1
discovery:
  link_extract:
    method: regex
    pattern: "https://fix\\.test/jobs/\\d+"
"#;
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(yaml.as_bytes()).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.descriptors.len(), 1);
        assert_eq!(loaded.descriptors[0].source_id, "jobs");
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let missing = Path::new("/nonexistent/path/source.json");
        assert!(matches!(load(missing), Err(LoadError::Io { .. })));
    }

    #[test]
    fn missing_global_section_falls_back_to_defaults() {
        let loaded = load_value(descriptor_json()).unwrap();
        assert_eq!(loaded.global.max_workers, GlobalConfig::default().max_workers);
    }

    #[test]
    fn global_section_is_parsed_alongside_sources() {
        let mut doc = serde_json::json!({ "sources": [descriptor_json()] });
        doc["global"] = serde_json::json!({ "max_workers": 2 });
        let loaded = load_value(doc).unwrap();
        assert_eq!(loaded.global.max_workers, 2);
    }
}
