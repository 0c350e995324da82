//! `run --config PATH [--only SOURCE_ID] [--dry-run] [--items-format ...] [--results DIR]`
//! (spec §6): run every source in a config end to end, writing artifacts
//! under a timestamped run directory, and exit with the aggregate status.

use crate::exit_code::ExitCode;
use anyhow::{Context, Result};
use clap::Args;
use scrapcore_pipeline::run_many;
use scrapcore_storage::RunWriter;
use scrapcore_types::ItemsFormat;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Args)]
pub struct RunArgs {
    #[arg(long)]
    pub config: PathBuf,

    /// Restrict the run to a single source_id.
    #[arg(long)]
    pub only: Option<String>,

    /// Validate and print the plan, but fetch nothing and write no artifacts.
    #[arg(long)]
    pub dry_run: bool,

    /// Override every source's `storage.items_format`.
    #[arg(long, value_enum)]
    pub items_format: Option<ItemsFormatArg>,

    /// Directory under which `run_<ts>_<id>/` is created. Defaults to `./results`.
    #[arg(long, default_value = "results")]
    pub results: PathBuf,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum ItemsFormatArg {
    Jsonl,
    Csv,
    Parquet,
}

impl From<ItemsFormatArg> for ItemsFormat {
    fn from(v: ItemsFormatArg) -> Self {
        match v {
            ItemsFormatArg::Jsonl => ItemsFormat::Jsonl,
            ItemsFormatArg::Csv => ItemsFormat::Csv,
            ItemsFormatArg::Parquet => ItemsFormat::Parquet,
        }
    }
}

pub async fn execute(args: RunArgs) -> Result<ExitCode> {
    let loaded = super::load_config(&args.config)?;
    for w in &loaded.warnings {
        eprintln!("warning [{}]: {}", w.source_id, w.message);
    }

    let mut descriptors: Vec<_> = loaded
        .descriptors
        .into_iter()
        .filter(|d| args.only.as_deref().map_or(true, |only| only == d.source_id))
        .collect();

    if descriptors.is_empty() {
        eprintln!("no matching source in {}", args.config.display());
        return Ok(ExitCode::Fatal);
    }

    if let Some(fmt) = args.items_format {
        for d in &mut descriptors {
            d.storage.items_format = fmt.into();
        }
    }

    if args.dry_run {
        for d in &descriptors {
            let urls = scrapcore_pipeline::expand_entrypoints(&d.entrypoints);
            println!("{}: would fetch {} listing page(s)", d.source_id, urls.len());
        }
        return Ok(ExitCode::Success);
    }

    let run_id = new_run_id();
    let config_snapshot = serde_json::json!({
        "global": loaded.global,
        "sources": descriptors.iter().map(|d| d.source_id.clone()).collect::<Vec<_>>(),
    });
    let run_writer = RunWriter::create(&args.results, &run_id, &config_snapshot)
        .await
        .context("failed to initialize run directory")?;
    run_writer.log(&format!("run {run_id} starting with {} source(s)", descriptors.len())).await.ok();

    let run_cancel = CancellationToken::new();
    let ctrl_c_token = run_cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let report = run_many(&descriptors, &loaded.global, &run_writer, &run_cancel, None).await;
    run_writer
        .log(&format!("run {run_id} finished with status {:?}", report.status))
        .await
        .ok();
    run_writer.finalize(&report).await.context("failed to write run_report.json")?;

    println!("run {run_id}: {:?}", report.status);
    for source in &report.sources {
        println!(
            "  {}: {:?} ({} valid, {} dropped)",
            source.source_id, source.status, source.counts.items_valid, source.counts.items_dropped
        );
    }
    println!("artifacts: {}", run_writer.run_dir().display());

    Ok(ExitCode::from(report.status))
}

fn new_run_id() -> String {
    format!(
        "{}_{}",
        chrono::Utc::now().format("%Y%m%d%H%M%S"),
        &uuid::Uuid::new_v4().simple().to_string()[..8]
    )
}
