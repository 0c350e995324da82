//! `run_meta.json` / `run_report.json` writers (spec §4.7, §6).

use crate::layout::RunLayout;
use scrapcore_types::{ErrorKind, Result, RunReport};
use serde::Serialize;
use serde_json::Value;
use tokio::fs;

/// Written once at run start: host, crate version, start time, and a
/// snapshot of the resolved config (post-merge, pre-run).
pub async fn write_run_meta(layout: &RunLayout, config_snapshot: &Value) -> Result<()> {
    let meta = serde_json::json!({
        "hostname": hostname_best_effort(),
        "scrapcore_version": env!("CARGO_PKG_VERSION"),
        "started_at": chrono::Utc::now().to_rfc3339(),
        "config_snapshot": config_snapshot,
    });
    write_json_file(layout.run_meta(), &meta).await
}

/// Written once at run end, after every source has finished or the run
/// deadline has fired.
pub async fn write_run_report(layout: &RunLayout, report: &RunReport) -> Result<()> {
    write_json_file(layout.run_report(), report).await
}

async fn write_json_file<T: Serialize>(path: std::path::PathBuf, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(ErrorKind::Io)?;
    }
    let body = serde_json::to_vec_pretty(value).map_err(ErrorKind::Json)?;
    fs::write(path, body).await.map_err(ErrorKind::Io)?;
    Ok(())
}

fn hostname_best_effort() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn run_meta_carries_the_config_snapshot_verbatim() {
        let dir = tempdir().unwrap();
        let layout = RunLayout::new(dir.path(), "20260727_aa");
        let snapshot = serde_json::json!({"global": {"max_workers": 4}});
        write_run_meta(&layout, &snapshot).await.unwrap();

        let written = fs::read_to_string(layout.run_meta()).await.unwrap();
        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["config_snapshot"], snapshot);
        assert_eq!(parsed["scrapcore_version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn run_report_round_trips_through_json() {
        let dir = tempdir().unwrap();
        let layout = RunLayout::new(dir.path(), "20260727_bb");
        let report = RunReport::new("20260727_bb".to_string());
        write_run_report(&layout, &report).await.unwrap();

        let written = fs::read_to_string(layout.run_report()).await.unwrap();
        let parsed: RunReport = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.run_id, report.run_id);
    }
}
