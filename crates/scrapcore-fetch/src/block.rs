//! Block-signal classification (spec §3, §4.3): the engine detects and
//! reports access-control responses, it never tries to defeat them
//! (spec §1). Classification runs on the response status and body on every
//! engine, generalizing the teacher's post-hoc status-code classification
//! (`error_for_status`, status-code tables in `riptide-fetch`'s tests) into
//! the richer four-way signal the spec requires.

use regex::Regex;
use scrapcore_types::BlockSignal;

const CAPTCHA_MARKERS: &[&str] = &[
    "captcha",
    "recaptcha",
    "hcaptcha",
    "verify you are human",
    "are you a robot",
];

const LOGIN_MARKERS: &[&str] = &[
    "please log in to continue",
    "please sign in to continue",
    "login required",
    "authentication required",
];

/// Classify a response as a block page, captcha wall, login gate, or
/// ordinary content. `custom_patterns` are the descriptor's
/// `quality.block_patterns`, checked first since they are author-supplied
/// and most specific.
pub fn classify_block(status: u16, body: &str, custom_patterns: &[Regex]) -> BlockSignal {
    for pattern in custom_patterns {
        if pattern.is_match(body) {
            return BlockSignal::LikelyBlocked;
        }
    }

    let lower = body.to_ascii_lowercase();

    if CAPTCHA_MARKERS.iter().any(|m| lower.contains(m)) {
        return BlockSignal::CaptchaPresent;
    }
    if LOGIN_MARKERS.iter().any(|m| lower.contains(m)) {
        return BlockSignal::LoginRequired;
    }
    if status == 403 || status == 429 {
        return BlockSignal::LikelyBlocked;
    }
    if status == 451 {
        return BlockSignal::LikelyBlocked;
    }

    BlockSignal::None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_pattern_match_wins_over_everything_else() {
        let patterns = vec![Regex::new("please verify you are human").unwrap()];
        let sig = classify_block(200, "Please verify you are human to continue", &patterns);
        assert_eq!(sig, BlockSignal::LikelyBlocked);
    }

    #[test]
    fn captcha_marker_is_detected_case_insensitively() {
        let sig = classify_block(200, "Solve the RECAPTCHA below", &[]);
        assert_eq!(sig, BlockSignal::CaptchaPresent);
    }

    #[test]
    fn login_marker_is_detected() {
        let sig = classify_block(200, "Authentication required to view this page", &[]);
        assert_eq!(sig, BlockSignal::LoginRequired);
    }

    #[test]
    fn status_403_without_body_markers_is_likely_blocked() {
        let sig = classify_block(403, "Forbidden", &[]);
        assert_eq!(sig, BlockSignal::LikelyBlocked);
    }

    #[test]
    fn ordinary_response_is_none() {
        let sig = classify_block(200, "<html><body>Hello world</body></html>", &[]);
        assert_eq!(sig, BlockSignal::None);
    }
}
