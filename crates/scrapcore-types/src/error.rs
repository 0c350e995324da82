//! Typed error kinds for the scraping engine.
//!
//! One variant per row of the error table: every failure the engine can
//! produce is named here rather than carried as string prose, so callers can
//! match on `ErrorKind` to decide routing (retry, drop-with-reason, fail the
//! run) instead of parsing messages.

use thiserror::Error;

/// Result alias used throughout the engine crates.
pub type Result<T> = std::result::Result<T, ErrorKind>;

/// Error kinds the engine distinguishes.
///
/// Only [`ErrorKind::Config`] and engine-construction failures
/// ([`ErrorKind::EngineConstruction`]) are fatal to a run; everything else is
/// captured on the item or the run report and does not abort the run.
#[derive(Error, Debug)]
pub enum ErrorKind {
    /// A hard invariant in the source descriptor was violated. Fatal: the
    /// run never starts.
    #[error("config error: {0}")]
    Config(String),

    /// Building an engine instance for a source failed. Fatal to that
    /// source only.
    #[error("engine construction failed: {0}")]
    EngineConstruction(String),

    /// TCP/TLS connect phase did not complete before the deadline.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(std::time::Duration),

    /// The response body did not finish arriving before the deadline.
    #[error("read timed out after {0:?}")]
    ReadTimeout(std::time::Duration),

    /// Browser navigation did not settle before `nav_timeout_s`.
    #[error("render timed out after {0:?}")]
    RenderTimeout(std::time::Duration),

    /// `wait_for` did not find its selector before `render_timeout_s`.
    #[error("wait_for timed out after {0:?} waiting for {1:?}")]
    WaitTimeout(std::time::Duration, String),

    /// HTTP status was in the configured retry set; caller should retry per
    /// the backoff policy.
    #[error("retryable status {0}")]
    RetryableStatus(u16),

    /// HTTP 4xx status outside the retry set. Not retried; the page fetch
    /// fails but the source continues.
    #[error("terminal status {0}")]
    TerminalStatus(u16),

    /// A quality pattern or known body shape classified the response as
    /// blocked. Not a transport error — the item is quality-dropped.
    #[error("block signal detected: {0:?}")]
    BlockSignal(crate::fetch::BlockSignal),

    /// A strict action step in the Action DSL failed.
    #[error("action failed: {0}")]
    ActionFailure(String),

    /// Link extraction found nothing, or content extraction produced empty
    /// text.
    #[error("extraction produced no usable content")]
    ExtractionEmpty,

    /// A required field was missing, mistyped, or out of the configured
    /// length bounds.
    #[error("validation failed: {0}")]
    ValidationFailure(String),

    /// The item's normalized URL or content fingerprint was already
    /// emitted. Counted, not treated as an error condition.
    #[error("suppressed by dedupe: {0}")]
    DedupeSuppressed(String),

    /// Writing an artifact failed. Logged and counted; never aborts the
    /// run.
    #[error("persist failed: {0}")]
    Persist(String),

    /// Transport-level error not covered by a more specific variant above.
    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl ErrorKind {
    /// Whether this error should be retried under the retry policy, given
    /// `retry_on_status`. Transport-level kinds are always retryable;
    /// status-derived kinds depend on which variant they produced.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::ConnectTimeout(_)
                | ErrorKind::ReadTimeout(_)
                | ErrorKind::RetryableStatus(_)
                | ErrorKind::Transport(_)
        )
    }

    /// Whether this error is fatal to the whole run (as opposed to one
    /// source, one page, or one item).
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, ErrorKind::Config(_))
    }
}
