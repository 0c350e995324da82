//! `doctor`: checks the local environment for the transports a source
//! descriptor can name (spec §6) — the HTTP client always works, the
//! headless browser backend is probed best-effort since `browser`/`hybrid`
//! engines degrade to a hard construction failure without one.

use crate::exit_code::ExitCode;
use anyhow::Result;
use scrapcore_fetch::{BrowserEngine, FetchEngine, HttpEngine};
use scrapcore_types::EngineConfig;
use std::time::Duration;

const BROWSER_LAUNCH_TIMEOUT: Duration = Duration::from_secs(15);

pub async fn execute() -> Result<ExitCode> {
    println!("scrapcore doctor");
    println!();

    let mut code = ExitCode::Success;

    print!("http transport ......... ");
    match HttpEngine::new(EngineConfig::default(), Vec::new()) {
        Ok(engine) => {
            println!("ok");
            engine.close().await;
        }
        Err(e) => {
            println!("FAILED: {e}");
            code = ExitCode::Fatal;
        }
    }

    print!("browser backend ........ ");
    let launch = tokio::time::timeout(
        BROWSER_LAUNCH_TIMEOUT,
        BrowserEngine::launch(EngineConfig::default(), Vec::new()),
    )
    .await;
    match launch {
        Ok(Ok(engine)) => {
            println!("ok");
            engine.close().await;
        }
        Ok(Err(e)) => {
            println!("unavailable: {e}");
            println!("  note: sources with engine.type = browser or hybrid will fail to");
            println!("  construct until a headless Chromium/Firefox/WebKit backend is installed.");
            if code == ExitCode::Success {
                code = ExitCode::Partial;
            }
        }
        Err(_) => {
            println!("unavailable: timed out launching a headless browser");
            if code == ExitCode::Success {
                code = ExitCode::Partial;
            }
        }
    }

    println!();
    match code {
        ExitCode::Success => println!("all checks passed"),
        ExitCode::Partial => println!("some backends are unavailable; see notes above"),
        ExitCode::Fatal => println!("the http transport itself is broken; nothing will run"),
    }

    Ok(code)
}
