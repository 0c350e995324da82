//! Migration of legacy job-scraper config shapes into the current schema
//! (spec §4.1, §9).
//!
//! The legacy shape is a flat "dict of dicts" keyed by `base_url`, `pattern`,
//! `max_pages`, `unsequential`, `step_page`, `action_scrolling`, and
//! `action_click`. `migrate` is idempotent: running it on an
//! already-current document is a no-op, and running it twice on a legacy
//! document produces the same result as running it once.

use serde_json::{json, Value};

/// A warning surfaced while migrating an ambiguous legacy field. Per spec
/// §9, ambiguous inputs are flagged rather than guessed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationWarning(pub String);

/// True if `doc` looks like a legacy job-scraper config rather than the
/// current schema (presence of `base_url`/`pattern` at the top level,
/// absence of `engine`/`source_id`/`sources`).
pub fn is_legacy_shape(doc: &Value) -> bool {
    let obj = match doc.as_object() {
        Some(o) => o,
        None => return false,
    };
    let has_legacy_marker = obj.contains_key("base_url") || obj.contains_key("pattern");
    let has_current_marker =
        obj.contains_key("engine") || obj.contains_key("source_id") || obj.contains_key("sources");
    has_legacy_marker && !has_current_marker
}

/// Migrate one legacy document into the current `Descriptor` JSON shape.
/// Idempotent: already-current documents are returned unchanged.
pub fn migrate(doc: &Value) -> (Value, Vec<MigrationWarning>) {
    if !is_legacy_shape(doc) {
        return (doc.clone(), Vec::new());
    }

    let mut warnings = Vec::new();
    let obj = doc.as_object().cloned().unwrap_or_default();

    let base_url = obj
        .get("base_url")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let source_id = obj
        .get("name")
        .or_else(|| obj.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            warnings.push(MigrationWarning(
                "legacy config has no name/id; deriving source_id from base_url host".to_string(),
            ));
            url::Url::parse(&base_url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "legacy_source".to_string())
        });

    let max_pages = obj.get("max_pages").and_then(Value::as_u64).unwrap_or(1);

    let unsequential = obj.get("unsequential").and_then(Value::as_bool);
    let step_page = obj.get("step_page").and_then(Value::as_u64);

    let (paging_mode, step) = match (unsequential, step_page) {
        (Some(true), Some(step)) => ("offset", step as i64),
        (Some(true), None) => {
            warnings.push(MigrationWarning(
                "unsequential=true without step_page; defaulting step to 1".to_string(),
            ));
            ("offset", 1)
        }
        (Some(false), Some(step)) => {
            warnings.push(MigrationWarning(
                "step_page set but unsequential=false; step_page is ignored under page mode"
                    .to_string(),
            ));
            let _ = step;
            ("page", 1)
        }
        (Some(false), None) | (None, None) => ("page", 1),
        (None, Some(_step)) => {
            warnings.push(MigrationWarning(
                "step_page set without unsequential; assuming page mode".to_string(),
            ));
            ("page", 1)
        }
    };

    let mut actions = Vec::new();
    if let Some(scroll) = obj.get("action_scrolling") {
        if scroll.as_bool() == Some(true) {
            actions.push(json!({
                "type": "scroll",
                "repeat": 5,
                "min_px": 200,
                "max_px": 800,
            }));
        }
    }
    if let Some(click_selector) = obj.get("action_click").and_then(Value::as_str) {
        actions.push(json!({
            "type": "click",
            "selector": click_selector,
            "repeat": 1,
        }));
    }

    let discovery = obj.get("pattern").and_then(Value::as_str).map(|pattern| {
        json!({
            "link_extract": {
                "method": "regex",
                "pattern": pattern,
            }
        })
    });

    let migrated = json!({
        "source_id": source_id,
        "engine": { "type": "http" },
        "entrypoints": [{
            "url": base_url,
            "paging": {
                "mode": paging_mode,
                "start": 1,
                "pages": max_pages,
                "step": step,
            }
        }],
        "actions": actions,
        "discovery": discovery.unwrap_or(json!({
            "link_extract": { "method": "css", "selector": "a[href]" }
        })),
    });

    (migrated, warnings)
}
