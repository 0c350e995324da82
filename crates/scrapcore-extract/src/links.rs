//! Link discovery (spec §4.5): `regex` / `css` / `xpath` methods, each
//! producing the insertion-order-preserving unique sequence of normalized
//! URLs. Grounded in `riptide-html::regex_extraction` for the regex method
//! and `riptide-html::css_extraction`'s `scraper`-based selector walking for
//! the `css` method; `xpath` reuses the same parsed DOM through
//! `sxd_xpath`/`sxd_document`, the crate the pack pairs with `scraper` for
//! XPath support that `scraper` itself does not offer.

use crate::normalize::{normalize_with, NormalizeOptions};
use regex::Regex;
use scraper::{Html, Selector};
use scrapcore_types::{ErrorKind, ExtractedLink, LinkExtractConfig, LinkExtractMethod, Result};
use std::collections::HashSet;
use sxd_document::parser as xml_parser;
use sxd_xpath::{Context, Factory};

/// Discover detail-page links in `body`, fetched from `page_url`, per
/// `config`. Every candidate is resolved against `page_url` (relative hrefs
/// are common) and normalized before being returned.
pub fn extract_links(
    body: &str,
    page_url: &str,
    config: &LinkExtractConfig,
    normalize_opts: &NormalizeOptions,
) -> Result<Vec<ExtractedLink>> {
    let base = url::Url::parse(page_url).map_err(ErrorKind::UrlParse)?;

    let raw_candidates = match config.method {
        LinkExtractMethod::Regex => extract_regex(body, config)?,
        LinkExtractMethod::Css => extract_css(body, config)?,
        LinkExtractMethod::Xpath => extract_xpath(body, config)?,
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let now = chrono::Utc::now();

    for raw in raw_candidates {
        if let Some(identifier) = &config.identifier {
            if !raw.contains(identifier.as_str()) {
                continue;
            }
        }

        let resolved = match base.join(&raw) {
            Ok(u) => u.to_string(),
            Err(_) => continue, // not a usable URL, skip rather than fail the whole page
        };

        let normalized = match normalize_with(&resolved, normalize_opts) {
            Ok(n) => n,
            Err(_) => continue,
        };

        if seen.insert(normalized.clone()) {
            out.push(ExtractedLink {
                url_raw: raw,
                url_normalized: normalized,
                source_page_url: page_url.to_string(),
                discovered_at: now,
            });
        }
    }

    Ok(out)
}

fn extract_regex(body: &str, config: &LinkExtractConfig) -> Result<Vec<String>> {
    let pattern = config
        .pattern
        .as_deref()
        .ok_or_else(|| ErrorKind::Config("regex link extraction requires `pattern`".to_string()))?;
    let re = Regex::new(pattern).map_err(ErrorKind::Regex)?;
    Ok(re.find_iter(body).map(|m| m.as_str().to_string()).collect())
}

fn extract_css(body: &str, config: &LinkExtractConfig) -> Result<Vec<String>> {
    let selector_str = config
        .selector
        .as_deref()
        .ok_or_else(|| ErrorKind::Config("css link extraction requires `selector`".to_string()))?;
    let selector = Selector::parse(selector_str)
        .map_err(|e| ErrorKind::Config(format!("invalid css selector {selector_str:?}: {e:?}")))?;

    let document = Html::parse_document(body);
    let mut hrefs = Vec::new();
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            hrefs.push(href.to_string());
        }
    }
    Ok(hrefs)
}

fn extract_xpath(body: &str, config: &LinkExtractConfig) -> Result<Vec<String>> {
    let expr = config
        .pattern
        .as_deref()
        .ok_or_else(|| ErrorKind::Config("xpath link extraction requires `pattern`".to_string()))?;

    let package = xml_parser::parse(body)
        .map_err(|e| ErrorKind::Config(format!("xpath extraction: could not parse document: {e:?}")))?;
    let document = package.as_document();

    let factory = Factory::new();
    let xpath = factory
        .build(expr)
        .map_err(|e| ErrorKind::Config(format!("invalid xpath expression {expr:?}: {e:?}")))?
        .ok_or_else(|| ErrorKind::Config(format!("empty xpath expression {expr:?}")))?;

    let context = Context::new();
    let value = xpath
        .evaluate(&context, document.root())
        .map_err(|e| ErrorKind::Config(format!("xpath evaluation failed: {e:?}")))?;

    let mut out = Vec::new();
    if let sxd_xpath::Value::Nodeset(nodes) = value {
        for node in nodes.document_order() {
            let text = node.string_value();
            if !text.is_empty() {
                out.push(text);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrapcore_types::LinkExtractMethod;

    fn cfg(method: LinkExtractMethod, pattern: Option<&str>, selector: Option<&str>) -> LinkExtractConfig {
        LinkExtractConfig {
            method,
            pattern: pattern.map(str::to_string),
            selector: selector.map(str::to_string),
            identifier: None,
        }
    }

    #[test]
    fn regex_method_finds_matching_urls() {
        let body = r#"<a href="https://fix.test/jobs/1">a</a> <a href="https://fix.test/jobs/2">b</a> <a href="https://fix.test/about">c</a>"#;
        let config = cfg(LinkExtractMethod::Regex, Some(r"https://fix\.test/jobs/\d+"), None);
        let links = extract_links(body, "https://fix.test/jobs", &config, &NormalizeOptions::default()).unwrap();
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn css_method_resolves_relative_hrefs_against_page_url() {
        let body = r#"<a class="job" href="/jobs/42">job</a>"#;
        let config = cfg(LinkExtractMethod::Css, None, Some("a.job"));
        let links = extract_links(body, "https://fix.test/jobs?page=1", &config, &NormalizeOptions::default()).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url_normalized, "https://fix.test/jobs/42");
    }

    #[test]
    fn duplicate_candidates_collapse_to_first_occurrence() {
        let body = r#"<a href="/jobs/1">a</a><a href="/jobs/1?utm_source=x">a again</a>"#;
        let config = cfg(LinkExtractMethod::Css, None, Some("a"));
        let links = extract_links(body, "https://fix.test/jobs", &config, &NormalizeOptions::default()).unwrap();
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn identifier_filters_out_non_matching_candidates() {
        let body = r#"<a href="/jobs/1">a</a><a href="/about">b</a>"#;
        let mut config = cfg(LinkExtractMethod::Css, None, Some("a"));
        config.identifier = Some("/jobs/".to_string());
        let links = extract_links(body, "https://fix.test", &config, &NormalizeOptions::default()).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url_normalized, "https://fix.test/jobs/1");
    }

    #[test]
    fn xpath_method_selects_href_attribute_values() {
        let body = r#"<html><body><a href="/jobs/7">job</a></body></html>"#;
        let config = cfg(LinkExtractMethod::Xpath, Some("//a/@href"), None);
        let links = extract_links(body, "https://fix.test", &config, &NormalizeOptions::default()).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url_normalized, "https://fix.test/jobs/7");
    }

    #[test]
    fn regex_without_pattern_is_a_config_error() {
        let config = cfg(LinkExtractMethod::Regex, None, None);
        let err = extract_links("<html></html>", "https://fix.test", &config, &NormalizeOptions::default())
            .unwrap_err();
        assert!(matches!(err, ErrorKind::Config(_)));
    }
}
