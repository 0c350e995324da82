//! `plan --config PATH`: describe the set of listing URLs a config would
//! fetch, without fetching them (spec §6). A pure function of the
//! descriptor's entrypoints — no network, no rate limiter, no engine.

use crate::exit_code::ExitCode;
use anyhow::Result;
use clap::Args;
use scrapcore_pipeline::expand_entrypoints;
use std::path::PathBuf;

#[derive(Args)]
pub struct PlanArgs {
    #[arg(long)]
    pub config: PathBuf,

    /// Restrict the plan to a single source_id.
    #[arg(long)]
    pub only: Option<String>,

    /// Emit the plan as a JSON array of `{source_id, url}` instead of text.
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: PlanArgs) -> Result<ExitCode> {
    let loaded = super::load_config(&args.config)?;

    let descriptors: Vec<_> = loaded
        .descriptors
        .into_iter()
        .filter(|d| args.only.as_deref().map_or(true, |only| only == d.source_id))
        .collect();

    if descriptors.is_empty() {
        eprintln!("no matching source in {}", args.config.display());
        return Ok(ExitCode::Fatal);
    }

    if args.json {
        let mut rows = Vec::new();
        for d in &descriptors {
            for url in expand_entrypoints(&d.entrypoints) {
                rows.push(serde_json::json!({ "source_id": d.source_id, "url": url }));
            }
        }
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for d in &descriptors {
            let urls = expand_entrypoints(&d.entrypoints);
            println!("{} ({} listing page(s)):", d.source_id, urls.len());
            for url in urls {
                println!("  {url}");
            }
        }
    }

    Ok(ExitCode::Success)
}
