//! The Action DSL: an ordered, declarative interaction sequence evaluated by
//! the Browser engine (spec §4.4). Expressed as a tagged variant with
//! per-variant parameter records, matched by a single interpreter — not a
//! method-lookup hierarchy (spec §9 Design Notes).

use serde::{Deserialize, Serialize};

fn default_strict() -> bool {
    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepPreset {
    Short,
    Medium,
    Long,
}

impl SleepPreset {
    /// Wall-clock duration the preset maps to, in milliseconds.
    pub fn millis(self) -> u64 {
        match self {
            SleepPreset::Short => 300,
            SleepPreset::Medium => 1_000,
            SleepPreset::Long => 3_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    WaitFor {
        selector: String,
        timeout_s: f64,
    },
    Click {
        selector: String,
        #[serde(default = "default_repeat")]
        repeat: u32,
        #[serde(default)]
        pause_s: f64,
        #[serde(default = "default_strict")]
        strict: bool,
    },
    Hover {
        selector: String,
    },
    Type {
        selector: String,
        text: String,
        #[serde(default)]
        clear: bool,
    },
    ClosePopup {
        selector: String,
    },
    Scroll {
        repeat: u32,
        min_px: u32,
        max_px: u32,
        #[serde(default)]
        pause_s: f64,
    },
    Sleep {
        #[serde(default)]
        preset: Option<SleepPreset>,
        #[serde(default)]
        seconds: Option<f64>,
    },
    MouseDrift,
}

fn default_repeat() -> u32 {
    1
}

impl Action {
    /// `wait_for` and strict `click` abort the sequence on failure; every
    /// other action is a soft failure (spec §4.4).
    pub fn is_strict(&self) -> bool {
        matches!(self, Action::WaitFor { .. })
            || matches!(self, Action::Click { strict: true, .. })
    }

    /// Duration a `sleep` action pauses for, resolving preset vs explicit
    /// seconds (explicit `seconds` wins when both are set).
    pub fn sleep_duration(preset: Option<SleepPreset>, seconds: Option<f64>) -> std::time::Duration {
        if let Some(s) = seconds {
            std::time::Duration::from_secs_f64(s.max(0.0))
        } else if let Some(p) = preset {
            std::time::Duration::from_millis(p.millis())
        } else {
            std::time::Duration::from_millis(SleepPreset::Short.millis())
        }
    }
}

/// Outcome of running one action in the sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub index: usize,
    pub ok: bool,
    pub note: Option<String>,
}

/// Result of interpreting the full action sequence against a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionRunReport {
    pub outcomes: Vec<ActionOutcome>,
    /// Set when a strict action failed and the sequence was aborted early.
    pub aborted_at: Option<usize>,
}

impl ActionRunReport {
    pub fn record(&mut self, index: usize, ok: bool, note: Option<String>) {
        self.outcomes.push(ActionOutcome { index, ok, note });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_for_is_always_strict() {
        let a = Action::WaitFor {
            selector: ".x".to_string(),
            timeout_s: 5.0,
        };
        assert!(a.is_strict());
    }

    #[test]
    fn close_popup_is_never_strict() {
        let a = Action::ClosePopup {
            selector: ".x".to_string(),
        };
        assert!(!a.is_strict());
    }

    #[test]
    fn click_strictness_follows_flag() {
        let strict = Action::Click {
            selector: ".x".to_string(),
            repeat: 1,
            pause_s: 0.0,
            strict: true,
        };
        let soft = Action::Click {
            selector: ".x".to_string(),
            repeat: 1,
            pause_s: 0.0,
            strict: false,
        };
        assert!(strict.is_strict());
        assert!(!soft.is_strict());
    }

    #[test]
    fn sleep_duration_prefers_explicit_seconds() {
        let d = Action::sleep_duration(Some(SleepPreset::Long), Some(0.05));
        assert_eq!(d, std::time::Duration::from_secs_f64(0.05));
    }

    #[test]
    fn sleep_duration_falls_back_to_preset() {
        let d = Action::sleep_duration(Some(SleepPreset::Medium), None);
        assert_eq!(d, std::time::Duration::from_millis(1000));
    }

    #[test]
    fn action_deserializes_from_tagged_json() {
        let json = serde_json::json!({
            "type": "scroll",
            "repeat": 3,
            "min_px": 100,
            "max_px": 400
        });
        let action: Action = serde_json::from_value(json).unwrap();
        matches!(action, Action::Scroll { .. });
    }
}
