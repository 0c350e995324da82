//! `run_many`: runs every source in a config doc, bounded by
//! `global.max_workers` concurrent sources (spec §5 — distinct from
//! `effective_concurrency`, which bounds one source's `fetch_details`
//! parallelism, not how many sources run at once).

use crate::context::{deadline_token, SourceContext};
use crate::engine::build_engine;
use crate::orchestrator::run_source;
use scrapcore_storage::RunWriter;
use scrapcore_types::{effective_concurrency, Descriptor, GlobalConfig, RunReport, SourceReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Run every descriptor in `sources`, honoring `global.max_workers` as the
/// ceiling on concurrently-running sources, and `run_deadline` as an
/// optional wall-clock cutoff for the whole run.
pub async fn run_many(
    sources: &[Descriptor],
    global: &GlobalConfig,
    run_writer: &RunWriter,
    run_cancel: &CancellationToken,
    run_deadline: Option<Duration>,
) -> RunReport {
    let run_id = run_writer
        .run_dir()
        .file_name()
        .map(|n| n.to_string_lossy().trim_start_matches("run_").to_string())
        .unwrap_or_default();
    let mut report = RunReport::new(run_id);

    let run_token = deadline_token(run_cancel, run_deadline);
    let source_slots = Arc::new(Semaphore::new(global.max_workers.max(1)));

    let mut handles = Vec::new();
    for descriptor in sources {
        let descriptor = descriptor.clone();
        let global = global.clone();
        let source_slots = source_slots.clone();
        let run_token = run_token.clone();
        let source_writer = match run_writer
            .writer_for_source(&descriptor.source_id, descriptor.storage.items_format)
            .await
        {
            Ok(w) => w,
            Err(e) => {
                error!(source_id = %descriptor.source_id, error = %e, "failed to set up source writer, skipping source");
                continue;
            }
        };

        handles.push(tokio::spawn(async move {
            let _permit = source_slots.acquire_owned().await.ok();
            let source_cancel = run_token.child_token();
            let concurrency = effective_concurrency(&global, descriptor.engine.concurrency);
            let ctx = SourceContext::new(source_cancel.clone(), concurrency);

            info!(source_id = %descriptor.source_id, "source starting");
            let engine = match build_engine(&descriptor.engine, &descriptor.quality).await {
                Ok(engine) => engine,
                Err(e) => {
                    error!(source_id = %descriptor.source_id, error = %e, "engine construction failed");
                    return failed_report(&descriptor.source_id);
                }
            };

            let report = run_source(&descriptor, engine.clone(), &ctx, &source_writer).await;
            engine.close().await;
            let _ = source_writer.log(&format!("source finished with status {:?}", report.status)).await;
            report
        }));
    }

    for handle in handles {
        match handle.await {
            Ok(source_report) => report.sources.push(source_report),
            Err(e) => error!(error = %e, "source task panicked"),
        }
    }

    report.recompute_status();
    report.finished_at = Some(chrono::Utc::now());
    report
}

fn failed_report(source_id: &str) -> SourceReport {
    SourceReport {
        source_id: source_id.to_string(),
        status: scrapcore_types::RunStatus::Failed,
        counts: Default::default(),
        top_error_kinds: Vec::new(),
        latency: Default::default(),
    }
}
