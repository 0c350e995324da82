//! `RunWriter` / `SourceWriter`: the storage crate's only stateful,
//! I/O-performing handles. A run owns one `RunWriter`; each source gets
//! its own `SourceWriter` opened against the same run directory
//! (spec §3: run owns its directory, a source writes only under its own
//! `sources/<id>/` subtree).

use crate::layout::RunLayout;
use crate::report::{write_run_meta, write_run_report};
use crate::writer::{ItemsWriter, JsonlWriter, LineLogWriter};
use scrapcore_types::{ErrorKind, ExtractedLink, Item, ItemsFormat, Result, RunReport};
use serde_json::Value;
use std::path::Path;

/// Owns the run directory: `run.log`, `run_meta.json`, and (at the end of
/// the run) `run_report.json`.
pub struct RunWriter {
    layout: RunLayout,
    log: LineLogWriter,
}

impl RunWriter {
    pub async fn create(
        results_dir: impl AsRef<Path>,
        run_id: &str,
        config_snapshot: &Value,
    ) -> Result<Self> {
        let layout = RunLayout::new(results_dir, run_id);
        let log = LineLogWriter::create(layout.run_log()).await?;
        write_run_meta(&layout, config_snapshot).await?;
        Ok(Self { layout, log })
    }

    pub fn run_dir(&self) -> &Path {
        self.layout.root()
    }

    pub async fn log(&self, line: &str) -> Result<()> {
        self.log.log(line).await
    }

    pub async fn writer_for_source(
        &self,
        source_id: &str,
        items_format: ItemsFormat,
    ) -> Result<SourceWriter> {
        SourceWriter::create(&self.layout, source_id, items_format).await
    }

    /// Writes `run_report.json`. Should be called exactly once, after every
    /// source has finished (or been cut off by the run deadline).
    pub async fn finalize(&self, report: &RunReport) -> Result<()> {
        write_run_report(&self.layout, report).await
    }
}

/// Per-source artifact writers: raw pages, extracted links, parsed items,
/// dropped items, and the format-selected `items_valid` writer.
pub struct SourceWriter {
    source_log: LineLogWriter,
    raw_listing: JsonlWriter,
    raw_detail: JsonlWriter,
    links: JsonlWriter,
    items: JsonlWriter,
    items_dropped: JsonlWriter,
    items_valid: ItemsWriter,
}

impl SourceWriter {
    async fn create(layout: &RunLayout, source_id: &str, items_format: ItemsFormat) -> Result<Self> {
        Ok(Self {
            source_log: LineLogWriter::create(layout.source_log(source_id)).await?,
            raw_listing: JsonlWriter::create(layout.raw_listing(source_id)).await?,
            raw_detail: JsonlWriter::create(layout.raw_detail(source_id)).await?,
            links: JsonlWriter::create(layout.extracted_links(source_id)).await?,
            items: JsonlWriter::create(layout.items(source_id)).await?,
            items_dropped: JsonlWriter::create(layout.items_dropped(source_id)).await?,
            items_valid: ItemsWriter::create(layout.items_valid_stem(source_id), items_format).await?,
        })
    }

    pub async fn write_raw_listing(&self, record: &Value) -> Result<()> {
        self.raw_listing.write(record).await
    }

    pub async fn write_raw_detail(&self, record: &Value) -> Result<()> {
        self.raw_detail.write(record).await
    }

    pub async fn write_link(&self, link: &ExtractedLink) -> Result<()> {
        self.links.write(link).await
    }

    pub async fn write_item(&self, item: &Item) -> Result<()> {
        self.items.write(item).await
    }

    pub async fn write_valid(&self, item: &Item) -> Result<()> {
        self.items_valid.write(item).await
    }

    pub async fn write_dropped(&self, item: &Item) -> Result<()> {
        if item.drop_reason.is_none() {
            return Err(ErrorKind::Persist(
                "write_dropped called on an item with no drop_reason set".to_string(),
            ));
        }
        self.items_dropped.write(item).await
    }

    pub async fn log(&self, line: &str) -> Result<()> {
        self.source_log.log(line).await
    }

    /// Flushes the `items_valid` writer (a no-op except for the Parquet
    /// variant, which writes its buffered file here).
    pub async fn finalize(&self) -> Result<()> {
        self.items_valid.finalize().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrapcore_types::DropReason;
    use tempfile::tempdir;

    #[tokio::test]
    async fn run_writer_creates_run_meta_and_log_on_construction() {
        let dir = tempdir().unwrap();
        let run = RunWriter::create(dir.path(), "20260727_cc", &serde_json::json!({})).await.unwrap();
        assert!(run.run_dir().join("run_meta.json").exists());
        run.log("run started").await.unwrap();
        assert!(run.run_dir().join("run.log").exists());
    }

    #[tokio::test]
    async fn source_writer_routes_items_to_their_named_files() {
        let dir = tempdir().unwrap();
        let run = RunWriter::create(dir.path(), "20260727_dd", &serde_json::json!({})).await.unwrap();
        let source = run.writer_for_source("jobs", ItemsFormat::Jsonl).await.unwrap();

        let clean = Item::new("https://fix.test/a", Some("A".into()), "hello world");
        source.write_item(&clean).await.unwrap();
        source.write_valid(&clean).await.unwrap();

        let dropped = clean.clone().drop_with(DropReason::Quality);
        source.write_dropped(&dropped).await.unwrap();
        source.finalize().await.unwrap();

        let source_dir = run.run_dir().join("sources").join("jobs");
        assert!(source_dir.join("items").join("items.jsonl").exists());
        assert!(source_dir.join("items").join("items_valid.jsonl").exists());
        assert!(source_dir.join("items").join("items_dropped.jsonl").exists());
    }

    #[tokio::test]
    async fn write_dropped_rejects_an_item_with_no_drop_reason() {
        let dir = tempdir().unwrap();
        let run = RunWriter::create(dir.path(), "20260727_ee", &serde_json::json!({})).await.unwrap();
        let source = run.writer_for_source("jobs", ItemsFormat::Jsonl).await.unwrap();
        let clean = Item::new("https://fix.test/a", None, "text");
        assert!(source.write_dropped(&clean).await.is_err());
    }

    #[tokio::test]
    async fn finalize_writes_the_run_report() {
        let dir = tempdir().unwrap();
        let run = RunWriter::create(dir.path(), "20260727_ff", &serde_json::json!({})).await.unwrap();
        let report = RunReport::new("20260727_ff".to_string());
        run.finalize(&report).await.unwrap();
        assert!(run.run_dir().join("run_report.json").exists());
    }
}
