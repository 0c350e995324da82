//! Builds the `FetchEngine` trait object a source's `engine.type` calls for
//! (spec §4.3): one `HttpEngine`/`BrowserEngine`/`HybridEngine` per source,
//! never shared across sources, so per-source rate limits and cookies never
//! leak between sources (spec §3).

use regex::Regex;
use scrapcore_fetch::{BrowserEngine, FetchEngine, HttpEngine, HybridEngine};
use scrapcore_types::{EngineConfig, EngineType, ErrorKind, QualityConfig, Result};
use std::sync::Arc;

/// Build the engine named by `config.kind`, wiring in `quality`'s block
/// patterns so every engine classifies blocks identically regardless of
/// which one ends up serving the request.
pub async fn build_engine(config: &EngineConfig, quality: &QualityConfig) -> Result<Arc<dyn FetchEngine>> {
    let block_patterns = compile_block_patterns(quality)?;

    Ok(match config.kind {
        EngineType::Http => {
            Arc::new(HttpEngine::new(config.clone(), block_patterns).map_err(|e| {
                ErrorKind::EngineConstruction(format!("failed to build http engine: {e}"))
            })?)
        }
        EngineType::Browser => Arc::new(
            BrowserEngine::launch(config.clone(), block_patterns)
                .await
                .map_err(|e| ErrorKind::EngineConstruction(format!("failed to launch browser engine: {e}")))?,
        ),
        EngineType::Hybrid => {
            let http: Arc<dyn FetchEngine> = Arc::new(
                HttpEngine::new(config.clone(), block_patterns.clone())
                    .map_err(|e| ErrorKind::EngineConstruction(format!("failed to build http engine: {e}")))?,
            );
            let browser: Arc<dyn FetchEngine> = Arc::new(
                BrowserEngine::launch(config.clone(), block_patterns)
                    .await
                    .map_err(|e| ErrorKind::EngineConstruction(format!("failed to launch browser engine: {e}")))?,
            );
            Arc::new(HybridEngine::new(http, browser, quality.min_text_len))
        }
    })
}

fn compile_block_patterns(quality: &QualityConfig) -> Result<Vec<Regex>> {
    quality
        .block_patterns
        .iter()
        .map(|p| Regex::new(p).map_err(ErrorKind::Regex))
        .collect()
}
