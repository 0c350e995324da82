//! Single-match interpreter for the Action DSL (spec §4.4, §9 Design
//! Notes). Actions execute sequentially; a strict action's failure aborts
//! the sequence and the page is returned in its current state with a
//! failure note recorded on the report. Actions never trigger retries by
//! themselves — that is the fetch engine's concern.

use crate::page::PageHandle;
use rand::Rng;
use scrapcore_types::{Action, ActionRunReport, SleepPreset};
use std::time::Duration;
use tracing::{debug, warn};

/// Run `actions` in order against `page`, returning a report of every
/// outcome. Never returns an `Err` itself — failures are captured per-action
/// in the report so the caller can decide what to do with a partially
/// executed sequence.
pub async fn run_actions(page: &dyn PageHandle, actions: &[Action]) -> ActionRunReport {
    let mut report = ActionRunReport::default();

    for (index, action) in actions.iter().enumerate() {
        let result = run_one(page, action).await;
        match result {
            Ok(note) => report.record(index, true, note),
            Err(err) => {
                let msg = err.to_string();
                warn!(index, action = ?action, error = %msg, "action failed");
                report.record(index, false, Some(msg));
                if action.is_strict() {
                    report.aborted_at = Some(index);
                    break;
                }
            }
        }
    }

    report
}

async fn run_one(page: &dyn PageHandle, action: &Action) -> anyhow::Result<Option<String>> {
    match action {
        Action::WaitFor { selector, timeout_s } => {
            page.wait_for_selector(selector, Duration::from_secs_f64(*timeout_s))
                .await?;
            Ok(None)
        }

        Action::Click {
            selector,
            repeat,
            pause_s,
            strict,
        } => {
            let mut soft_note = None;
            for i in 0..*repeat {
                let res = page.click(selector).await;
                if let Err(e) = res {
                    if *strict {
                        return Err(e);
                    }
                    debug!(selector, attempt = i, "soft click failure, continuing");
                    soft_note = Some(format!("click {selector:?} missed on attempt {i}: {e}"));
                    break;
                }
                if *pause_s > 0.0 {
                    tokio::time::sleep(Duration::from_secs_f64(*pause_s)).await;
                }
            }
            Ok(soft_note)
        }

        Action::Hover { selector } => {
            page.hover(selector).await?;
            Ok(None)
        }

        Action::Type { selector, text, clear } => {
            page.type_text(selector, text, *clear).await?;
            Ok(None)
        }

        Action::ClosePopup { selector } => {
            if page.exists(selector).await.unwrap_or(false) {
                page.click(selector).await.ok();
                Ok(Some(format!("closed popup {selector}")))
            } else {
                Ok(Some(format!("no popup matched {selector}")))
            }
        }

        Action::Scroll {
            repeat,
            min_px,
            max_px,
            pause_s,
        } => {
            let (lo, hi) = (*min_px.min(max_px), (*max_px).max(*min_px));
            for _ in 0..*repeat {
                let px = if hi > lo {
                    rand::thread_rng().gen_range(lo..=hi)
                } else {
                    lo
                };
                page.scroll_by(px as i64).await?;
                if *pause_s > 0.0 {
                    tokio::time::sleep(Duration::from_secs_f64(*pause_s)).await;
                }
            }
            Ok(None)
        }

        Action::Sleep { preset, seconds } => {
            tokio::time::sleep(Action::sleep_duration(*preset, *seconds)).await;
            Ok(None)
        }

        Action::MouseDrift => {
            page.mouse_drift().await?;
            Ok(None)
        }
    }
}
