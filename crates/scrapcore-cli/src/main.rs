//! `scrapcore` — the scraping engine's CLI entry point (spec §6). Drives
//! the pipeline library in-process rather than talking to a remote API
//! server, since this engine has no server component of its own.

mod commands;
mod exit_code;

use clap::{Parser, Subcommand};
use exit_code::ExitCode;

#[derive(Parser)]
#[command(name = "scrapcore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Config-driven scraping engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the local environment for required transport/browser backends.
    Doctor,

    /// Validate a config file without running it.
    Validate(commands::validate::ValidateArgs),

    /// Run every source in a config file end to end.
    Run(commands::run::RunArgs),

    /// Describe the set of listing URLs a config would fetch, without fetching them.
    Plan(commands::plan::PlanArgs),

    /// Fetch one URL and save its HTML body as a test fixture.
    CaptureFixture(commands::capture_fixture::CaptureFixtureArgs),
}

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match Cli::parse().command {
        Commands::Doctor => commands::doctor::execute().await,
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::CaptureFixture(args) => commands::capture_fixture::execute(args).await,
    };

    std::process::exit(exit_code.unwrap_or_else(|e| {
        eprintln!("error: {e}");
        ExitCode::Fatal
    }) as i32);
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
