//! `capture-fixture --url URL --out PATH` (spec §6): fetch one URL over the
//! plain HTTP engine and save its body as an HTML fixture for tests — the
//! same fixtures Scenario A-F in the spec's test design are built from.

use crate::exit_code::ExitCode;
use anyhow::{bail, Context, Result};
use clap::Args;
use scrapcore_fetch::{FetchEngine, HttpEngine};
use scrapcore_types::EngineConfig;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Args)]
pub struct CaptureFixtureArgs {
    #[arg(long)]
    pub url: String,

    #[arg(long)]
    pub out: PathBuf,

    /// Render with the headless browser before capturing instead of a
    /// plain GET (useful for JS-dependent fixtures).
    #[arg(long)]
    pub rendered: bool,
}

pub async fn execute(args: CaptureFixtureArgs) -> Result<ExitCode> {
    let engine = HttpEngine::new(EngineConfig::default(), Vec::new())
        .context("failed to construct the http engine")?;
    let cancel = CancellationToken::new();

    let resp = if args.rendered {
        engine.get_rendered(&args.url, &[], None, &cancel).await
    } else {
        engine.get(&args.url, None, None, &cancel).await
    };
    engine.close().await;

    if !resp.is_ok() {
        bail!("fetch of {} failed with status {}", args.url, resp.status);
    }

    if let Some(parent) = args.out.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }
    tokio::fs::write(&args.out, resp.body.as_bytes())
        .await
        .with_context(|| format!("failed to write fixture to {}", args.out.display()))?;

    println!(
        "captured {} bytes from {} into {}",
        resp.body.len(),
        args.url,
        args.out.display()
    );

    Ok(ExitCode::Success)
}
