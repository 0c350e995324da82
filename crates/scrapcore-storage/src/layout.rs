//! On-disk run layout (spec §4.7): `results/run_<ts>_<id>/...`. A run's
//! directory is created once at run start and never mutated after run end;
//! this module only computes paths, it performs no I/O itself.

use std::path::{Path, PathBuf};

/// Paths for one run's directory tree, rooted at
/// `results_dir/run_<run_id>/`.
#[derive(Debug, Clone)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    /// `run_id` is expected to already be the `<timestamp>_<id>` pair
    /// (spec §3: a run owns a directory named `run_<timestamp>_<id>/`).
    pub fn new(results_dir: impl AsRef<Path>, run_id: &str) -> Self {
        Self {
            root: results_dir.as_ref().join(format!("run_{run_id}")),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_log(&self) -> PathBuf {
        self.root.join("run.log")
    }

    pub fn run_meta(&self) -> PathBuf {
        self.root.join("run_meta.json")
    }

    pub fn run_report(&self) -> PathBuf {
        self.root.join("run_report.json")
    }

    pub fn source_dir(&self, source_id: &str) -> PathBuf {
        self.root.join("sources").join(source_id)
    }

    pub fn source_log(&self, source_id: &str) -> PathBuf {
        self.source_dir(source_id).join("source.log")
    }

    pub fn raw_listing(&self, source_id: &str) -> PathBuf {
        self.source_dir(source_id).join("raw_pages").join("listing.jsonl")
    }

    pub fn raw_detail(&self, source_id: &str) -> PathBuf {
        self.source_dir(source_id).join("raw_pages").join("detail.jsonl")
    }

    pub fn extracted_links(&self, source_id: &str) -> PathBuf {
        self.source_dir(source_id).join("links").join("extracted_links.jsonl")
    }

    pub fn items(&self, source_id: &str) -> PathBuf {
        self.source_dir(source_id).join("items").join("items.jsonl")
    }

    pub fn items_dropped(&self, source_id: &str) -> PathBuf {
        self.source_dir(source_id).join("items").join("items_dropped.jsonl")
    }

    /// `items_valid` without its format-dependent extension; callers append
    /// `.jsonl` / `.csv` / `.parquet`.
    pub fn items_valid_stem(&self, source_id: &str) -> PathBuf {
        self.source_dir(source_id).join("items").join("items_valid")
    }
}
