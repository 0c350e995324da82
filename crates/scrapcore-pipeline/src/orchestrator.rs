//! `run_source`: the fixed nine-stage pipeline driving one source
//! descriptor end to end (spec §4.6, §5):
//! expand_entrypoints → fetch_listing → extract_links → dedupe(url) →
//! fetch_details (bounded parallel) → html_to_structured → quality_filter →
//! validate → dedupe(content) → persist.
//!
//! Every suspension point takes the source's `CancellationToken` so a run
//! or source deadline can cut the stage short without leaving the run
//! directory half-written (spec §5).

use crate::context::SourceContext;
use crate::dedupe::{ContentDedupe, UrlDedupe};
use crate::entrypoints::expand_entrypoints;
use scrapcore_extract::{extract_content, extract_links, NormalizeOptions};
use scrapcore_fetch::FetchEngine;
use scrapcore_storage::SourceWriter;
use scrapcore_types::{
    BlockSignal, Descriptor, DropReason, ErrorKind, ExtractedLink, FetchResponse, Item,
    LatencyStats, QualityConfig, RunStatus, SourceReport, StageCounts, ValidationConfig,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Drive one source's descriptor through all nine stages, writing every
/// artifact as it's produced and returning the aggregate `SourceReport`.
pub async fn run_source(
    descriptor: &Descriptor,
    engine: Arc<dyn FetchEngine>,
    ctx: &SourceContext,
    writer: &SourceWriter,
) -> SourceReport {
    let mut counts = StageCounts::default();
    let mut latencies = Vec::new();
    let mut error_kinds: HashMap<String, u64> = HashMap::new();
    let mut url_dedupe = UrlDedupe::new();
    let mut content_dedupe = ContentDedupe::new(&descriptor.discovery.dedupe);

    let listing_urls = expand_entrypoints(&descriptor.entrypoints);
    let normalize_opts = NormalizeOptions::default();

    // Stage 1-3: fetch_listing (sequential) + extract_links + url dedupe.
    let mut unique_links: Vec<ExtractedLink> = Vec::new();
    for url in &listing_urls {
        if ctx.cancel.is_cancelled() {
            break;
        }
        counts.pages_attempted += 1;
        let resp = engine.get(url, None, None, &ctx.cancel).await;
        latencies.push(resp.elapsed_ms);
        record_trace_errors(&resp, &mut error_kinds);
        let _ = writer.write_raw_listing(&page_record(url, &resp)).await;

        if !resp.is_ok() {
            warn!(url, status = resp.status, "listing page fetch did not succeed");
            continue;
        }
        counts.pages_succeeded += 1;

        match extract_links(&resp.body, url, &descriptor.discovery.link_extract, &normalize_opts) {
            Ok(links) => {
                counts.links_found += links.len() as u64;
                for link in links {
                    let _ = writer.write_link(&link).await;
                    if url_dedupe.check(&link.url_normalized) {
                        unique_links.push(link);
                    } else {
                        drop_item(writer, &mut counts, &link.url_normalized, None, "", DropReason::Dedupe).await;
                    }
                }
            }
            Err(e) => {
                *error_kinds.entry(e.to_string()).or_default() += 1;
            }
        }
    }

    // Stage 4: fetch_details, bounded by the source's concurrency permit.
    let mut handles = Vec::new();
    for link in unique_links {
        if ctx.cancel.is_cancelled() {
            break;
        }
        let engine = engine.clone();
        let semaphore = ctx.semaphore.clone();
        let cancel = ctx.cancel.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let resp = engine.get(&link.url_normalized, None, None, &cancel).await;
            (link, resp)
        }));
    }

    let mut detail_results = Vec::new();
    for handle in handles {
        if let Ok(pair) = handle.await {
            detail_results.push(pair);
        }
    }

    for (link, resp) in detail_results {
        counts.pages_attempted += 1;
        latencies.push(resp.elapsed_ms);
        record_trace_errors(&resp, &mut error_kinds);
        if resp.hybrid_fallback_fired() {
            counts.fallbacks_fired += 1;
        }
        let _ = writer
            .write_raw_detail(&page_record(&link.url_normalized, &resp))
            .await;

        if !resp.is_ok() {
            drop_item(writer, &mut counts, &link.url_normalized, None, "", DropReason::FetchFailed).await;
            continue;
        }
        counts.pages_succeeded += 1;

        if !matches!(resp.block_signal, BlockSignal::None) {
            drop_item(writer, &mut counts, &link.url_normalized, None, "", DropReason::Blocked).await;
            continue;
        }

        // Stage 5: html_to_structured.
        let extracted = extract_content(&resp.body, &descriptor.parse);
        if extracted.text.trim().is_empty() && extracted.title.is_none() {
            drop_item(writer, &mut counts, &link.url_normalized, None, "", DropReason::ExtractionEmpty).await;
            continue;
        }

        let mut item = Item::new(link.url_normalized.clone(), extracted.title.clone(), extracted.text.clone());
        item.meta = extracted.meta.clone();
        counts.items_parsed += 1;
        let _ = writer.write_item(&item).await;

        // Stage 6: quality_filter.
        apply_quality_filter(&mut item, &descriptor.quality, extracted.boilerplate_ratio);
        // Stage 7: validate.
        apply_validation(&mut item, &descriptor.validation);

        if !item.is_clean() {
            let reason = first_drop_reason(&item);
            let dropped = item.drop_with(reason);
            let _ = writer.write_dropped(&dropped).await;
            counts.items_dropped += 1;
            *counts.dropped_by_reason.entry(reason.to_string()).or_default() += 1;
            continue;
        }

        // Stage 8: dedupe (content fingerprint).
        if !content_dedupe.check(&item) {
            let dropped = item.drop_with(DropReason::Dedupe);
            let _ = writer.write_dropped(&dropped).await;
            counts.items_dropped += 1;
            *counts.dropped_by_reason.entry(DropReason::Dedupe.to_string()).or_default() += 1;
            continue;
        }

        // Stage 9: persist.
        match writer.write_valid(&item).await {
            Ok(()) => counts.items_valid += 1,
            Err(e) => {
                debug!(error = %e, url = %item.url, "failed to persist valid item");
                let dropped = item.drop_with(DropReason::PersistError);
                let _ = writer.write_dropped(&dropped).await;
                counts.items_dropped += 1;
                *counts
                    .dropped_by_reason
                    .entry(DropReason::PersistError.to_string())
                    .or_default() += 1;
            }
        }
    }

    let _ = writer.finalize().await;

    let mut top_error_kinds: Vec<(String, u64)> = error_kinds.into_iter().collect();
    top_error_kinds.sort_by(|a, b| b.1.cmp(&a.1));
    top_error_kinds.truncate(5);

    let status = if counts.pages_attempted > 0 && counts.pages_succeeded == 0 {
        RunStatus::Failed
    } else if ctx.cancel.is_cancelled() || counts.items_dropped > 0 || !top_error_kinds.is_empty() {
        RunStatus::Partial
    } else {
        RunStatus::Success
    };

    SourceReport {
        source_id: descriptor.source_id.clone(),
        status,
        counts,
        top_error_kinds,
        latency: LatencyStats::from_samples(&mut latencies),
    }
}

async fn drop_item(
    writer: &SourceWriter,
    counts: &mut StageCounts,
    url: &str,
    title: Option<String>,
    text: &str,
    reason: DropReason,
) {
    let dropped = Item::new(url.to_string(), title, text.to_string()).drop_with(reason);
    let _ = writer.write_dropped(&dropped).await;
    counts.items_dropped += 1;
    *counts.dropped_by_reason.entry(reason.to_string()).or_default() += 1;
}

/// Quality takes priority over validation: quality_filter runs first in
/// stage order, so when both sets of issues are present the item is
/// reported as quality-dropped (spec §4.6).
fn first_drop_reason(item: &Item) -> DropReason {
    if !item.quality_issues.is_empty() {
        DropReason::Quality
    } else {
        DropReason::Validation
    }
}

fn apply_quality_filter(item: &mut Item, quality: &QualityConfig, boilerplate_ratio: f64) {
    if item.text.chars().count() < quality.min_text_len {
        item.quality_issues.push(format!(
            "text shorter than min_text_len ({} < {})",
            item.text.chars().count(),
            quality.min_text_len
        ));
    }
    if boilerplate_ratio > quality.max_boilerplate_ratio {
        item.quality_issues.push(format!(
            "boilerplate_ratio {boilerplate_ratio:.2} exceeds max {0:.2}",
            quality.max_boilerplate_ratio
        ));
    }
}

fn apply_validation(item: &mut Item, validation: &ValidationConfig) {
    if validation.require_title && item.title.as_deref().unwrap_or("").trim().is_empty() {
        item.validation_errors.push("title is required but missing".to_string());
    }
    if validation.require_text && item.text.trim().is_empty() {
        item.validation_errors.push("text is required but missing".to_string());
    }
    if item.text.chars().count() < validation.min_text_len {
        item.validation_errors.push(format!(
            "text shorter than min_text_len ({} < {})",
            item.text.chars().count(),
            validation.min_text_len
        ));
    }
}

/// Tally transport/status errors seen across a response's trace, keyed by
/// their `Display` rendering so the run report stays human-readable.
fn record_trace_errors(resp: &FetchResponse, error_kinds: &mut HashMap<String, u64>) {
    for entry in &resp.trace {
        if let Some(err) = &entry.error {
            *error_kinds.entry(err.clone()).or_default() += 1;
        } else if !(200..300).contains(&entry.status) && entry.status != 0 {
            let kind = if resp.trace.len() > 1 {
                ErrorKind::RetryableStatus(entry.status)
            } else {
                ErrorKind::TerminalStatus(entry.status)
            };
            *error_kinds.entry(kind.to_string()).or_default() += 1;
        }
    }
}

fn page_record(url: &str, resp: &FetchResponse) -> serde_json::Value {
    serde_json::json!({
        "url": url,
        "final_url": resp.final_url,
        "status": resp.status,
        "fetched_at": resp.fetched_at,
        "elapsed_ms": resp.elapsed_ms,
        "block_signal": resp.block_signal,
        "trace": resp.trace,
    })
}
