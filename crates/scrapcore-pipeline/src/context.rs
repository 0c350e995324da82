//! Run/source deadlines and the `fetch_details` concurrency bound (spec §5).
//! Every suspension point in the orchestrator takes a `CancellationToken` so
//! a run-level or source-level deadline can abort in-flight work cleanly.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Per-source execution context: the cancellation token that gates every
/// suspension point, and the semaphore bounding `fetch_details`' bounded
/// parallelism.
pub struct SourceContext {
    pub cancel: CancellationToken,
    pub semaphore: Arc<Semaphore>,
}

impl SourceContext {
    pub fn new(cancel: CancellationToken, concurrency: usize) -> Self {
        Self {
            cancel,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }
}

/// Derive a child token from `parent` that also cancels on its own when
/// `deadline` elapses. Passing `None` just forwards the parent's
/// cancellation with no extra timer.
pub fn deadline_token(parent: &CancellationToken, deadline: Option<Duration>) -> CancellationToken {
    let child = parent.child_token();
    if let Some(duration) = deadline {
        let timer_token = child.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => timer_token.cancel(),
                _ = timer_token.cancelled() => {}
            }
        });
    }
    child
}
