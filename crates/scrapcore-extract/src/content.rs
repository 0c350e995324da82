//! HTML→structured conversion (spec §4.5): `{title, text, meta}` plus a
//! `boilerplate_ratio` the quality-filter stage gates on. Strategy order is
//! explicit selectors from `parse`, then an extraction-library heuristic
//! (common article containers), then a plain-text fallback (strip tags,
//! collapse whitespace) — grounded in `riptide-html::dom_utils`'s layered
//! fallback and `css_extraction`'s `scraper` selector walking.

use scraper::{ElementRef, Html, Selector};
use scrapcore_types::ParseConfig;
use std::collections::HashMap;

const TITLE_FALLBACKS: &[&str] = &["title", "h1"];
const CONTENT_FALLBACKS: &[&str] = &["article", "main", "[role=\"main\"]"];
const BOILERPLATE_SELECTOR: &str =
    "nav, header, footer, aside, script, style, noscript, .nav, .navbar, .footer, .sidebar";

pub struct ExtractedContent {
    pub title: Option<String>,
    pub text: String,
    pub meta: HashMap<String, serde_json::Value>,
    pub boilerplate_ratio: f64,
}

/// Convert a detail page body into its structured form, per `parse`'s
/// explicit selectors (falling back through the strategy order above when a
/// selector is absent or matches nothing).
pub fn extract_content(body: &str, parse: &ParseConfig) -> ExtractedContent {
    let document = Html::parse_document(body);

    let title = extract_title(&document, parse.title_selector.as_deref());
    let text = extract_text(&document, parse.text_selector.as_deref());
    let boilerplate_ratio = compute_boilerplate_ratio(&document);

    let mut meta = HashMap::new();
    if let Some(description) = extract_meta_description(&document) {
        meta.insert("description".to_string(), serde_json::Value::String(description));
    }

    ExtractedContent {
        title,
        text,
        meta,
        boilerplate_ratio,
    }
}

fn extract_title(document: &Html, explicit_selector: Option<&str>) -> Option<String> {
    if let Some(found) = explicit_selector.and_then(|sel| select_first_text(document, sel)) {
        return Some(found);
    }
    TITLE_FALLBACKS.iter().find_map(|sel| select_first_text(document, sel))
}

fn extract_text(document: &Html, explicit_selector: Option<&str>) -> String {
    if let Some(sel) = explicit_selector {
        let joined = select_all_text(document, sel);
        if !joined.is_empty() {
            return joined;
        }
    }

    for fallback in CONTENT_FALLBACKS {
        if let Some(found) = select_first_text(document, fallback) {
            if !found.is_empty() {
                return found;
            }
        }
    }

    plain_text_fallback(document)
}

fn select_first_text(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    let el = document.select(&selector).next()?;
    let text = collapse_whitespace(&collect_text(el));
    (!text.is_empty()).then_some(text)
}

fn select_all_text(document: &Html, selector_str: &str) -> String {
    let Ok(selector) = Selector::parse(selector_str) else {
        return String::new();
    };
    let joined = document
        .select(&selector)
        .map(collect_text)
        .collect::<Vec<_>>()
        .join("\n");
    collapse_whitespace(&joined)
}

fn plain_text_fallback(document: &Html) -> String {
    let text = match Selector::parse("body") {
        Ok(selector) => document
            .select(&selector)
            .next()
            .map(collect_text)
            .unwrap_or_else(|| document.root_element().text().collect::<Vec<_>>().join(" ")),
        Err(_) => document.root_element().text().collect::<Vec<_>>().join(" "),
    };
    collapse_whitespace(&text)
}

/// Proportion of the document's visible text that sits inside common
/// navigational/footer containers — a coarse stand-in for repeated-n-gram
/// boilerplate detection, cheap enough to run on every page.
fn compute_boilerplate_ratio(document: &Html) -> f64 {
    let total = plain_text_fallback(document).len();
    if total == 0 {
        return 0.0;
    }
    let Ok(selector) = Selector::parse(BOILERPLATE_SELECTOR) else {
        return 0.0;
    };
    let boilerplate_len: usize = document
        .select(&selector)
        .map(|el| collapse_whitespace(&collect_text(el)).len())
        .sum();
    (boilerplate_len as f64 / total as f64).min(1.0)
}

fn extract_meta_description(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="description"]"#).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
}

fn collect_text(el: ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_selectors_take_priority() {
        let body = r#"<html><body>
            <h1>Wrong title</h1>
            <h2 class="headline">Senior Engineer</h2>
            <div class="body">Full job description text.</div>
        </body></html>"#;
        let parse = ParseConfig {
            title_selector: Some("h2.headline".to_string()),
            text_selector: Some("div.body".to_string()),
        };
        let extracted = extract_content(body, &parse);
        assert_eq!(extracted.title.as_deref(), Some("Senior Engineer"));
        assert_eq!(extracted.text, "Full job description text.");
    }

    #[test]
    fn falls_back_to_title_tag_and_article_container() {
        let body = r#"<html><head><title>Fallback Title</title></head>
            <body><nav>Home About</nav><article>The actual article body.</article></body></html>"#;
        let parse = ParseConfig::default();
        let extracted = extract_content(body, &parse);
        assert_eq!(extracted.title.as_deref(), Some("Fallback Title"));
        assert_eq!(extracted.text, "The actual article body.");
    }

    #[test]
    fn plain_text_fallback_strips_tags_and_collapses_whitespace() {
        let body = "<html><body><p>Hello   <b>world</b>\n\n!</p></body></html>";
        let parse = ParseConfig::default();
        let extracted = extract_content(body, &parse);
        assert_eq!(extracted.text, "Hello world !");
    }

    #[test]
    fn boilerplate_heavy_page_has_a_high_ratio() {
        let body = r#"<html><body>
            <nav>Home About Contact Careers Blog Press Login Signup</nav>
            <p>one sentence</p>
            <footer>Copyright Terms Privacy Cookies Sitemap</footer>
        </body></html>"#;
        let parse = ParseConfig::default();
        let extracted = extract_content(body, &parse);
        assert!(extracted.boilerplate_ratio > 0.5);
    }

    #[test]
    fn meta_description_is_captured_when_present() {
        let body = r#"<html><head><meta name="description" content="A short summary."></head><body><p>x</p></body></html>"#;
        let parse = ParseConfig::default();
        let extracted = extract_content(body, &parse);
        assert_eq!(
            extracted.meta.get("description").and_then(|v| v.as_str()),
            Some("A short summary.")
        );
    }
}
