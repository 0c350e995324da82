//! `validate --config PATH`: schema + sanity checks without running
//! anything (spec §6). Exit 0 valid, 2 invalid.

use crate::exit_code::ExitCode;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to a source descriptor (single source or `{sources: [...]}`),
    /// JSON or YAML.
    #[arg(long)]
    pub config: PathBuf,
}

pub fn execute(args: ValidateArgs) -> Result<ExitCode> {
    let loaded = match super::load_config(&args.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("invalid: {e}");
            return Ok(ExitCode::Fatal);
        }
    };

    println!(
        "valid: {} source(s), {} warning(s)",
        loaded.descriptors.len(),
        loaded.warnings.len()
    );
    for d in &loaded.descriptors {
        println!("  - {} ({:?})", d.source_id, d.engine.kind);
    }
    for w in &loaded.warnings {
        println!("  warning [{}]: {}", w.source_id, w.message);
    }

    Ok(ExitCode::Success)
}
