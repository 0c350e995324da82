//! Dedupe stage (spec §4.6): intra-run URL dedupe on the normalized URL,
//! then content-fingerprint dedupe over `discovery.dedupe.content_fields`.
//! Both key on first-seen order, not completion order (spec §5) — callers
//! must check `UrlDedupe` while links are still in extraction order and
//! `ContentDedupe` as items complete, which may be out of order; the
//! fingerprint set itself doesn't care about ordering, only "have I seen
//! this fingerprint before."

use scrapcore_types::{DedupeConfig, Item};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// First-seen-wins set over normalized URLs.
#[derive(Default)]
pub struct UrlDedupe {
    seen: HashSet<String>,
}

impl UrlDedupe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `normalized_url` is seen, `false` on
    /// every subsequent occurrence.
    pub fn check(&mut self, normalized_url: &str) -> bool {
        self.seen.insert(normalized_url.to_string())
    }
}

/// First-seen-wins set over content fingerprints.
pub struct ContentDedupe {
    seen: HashSet<u64>,
    fields: Vec<String>,
    fingerprint_text_len: usize,
}

impl ContentDedupe {
    pub fn new(config: &DedupeConfig) -> Self {
        Self {
            seen: HashSet::new(),
            fields: config.content_fields.clone(),
            fingerprint_text_len: config.fingerprint_text_len,
        }
    }

    /// Returns `true` the first time `item`'s fingerprint is seen, `false`
    /// on every subsequent occurrence.
    pub fn check(&mut self, item: &Item) -> bool {
        self.seen.insert(self.fingerprint(item))
    }

    /// Default fingerprint: `title` plus the first `fingerprint_text_len`
    /// characters of `text`. When `content_fields` is configured, hash each
    /// named field in order instead — an absent field hashes as an empty
    /// string, but the field *name* is still part of the hash input, so two
    /// differently-shaped `content_fields` configs never collide just
    /// because both happen to produce empty values (spec §9 Open
    /// Questions).
    fn fingerprint(&self, item: &Item) -> u64 {
        let mut hasher = DefaultHasher::new();
        if self.fields.is_empty() {
            item.title.as_deref().unwrap_or("").hash(&mut hasher);
            let prefix: String = item.text.chars().take(self.fingerprint_text_len).collect();
            prefix.hash(&mut hasher);
        } else {
            for field in &self.fields {
                field.hash(&mut hasher);
                field_value(item, field).hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

fn field_value(item: &Item, field: &str) -> String {
    match field {
        "title" => item.title.clone().unwrap_or_default(),
        "text" => item.text.clone(),
        "url" => item.url.clone(),
        other => item
            .meta
            .get(other)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_dedupe_emits_only_the_first_occurrence() {
        let mut d = UrlDedupe::new();
        assert!(d.check("https://fix.test/a"));
        assert!(!d.check("https://fix.test/a"));
        assert!(d.check("https://fix.test/b"));
    }

    #[test]
    fn default_fingerprint_collapses_same_title_and_text_prefix() {
        let config = DedupeConfig {
            content_fields: vec![],
            fingerprint_text_len: 8,
        };
        let mut d = ContentDedupe::new(&config);
        let a = Item::new("https://fix.test/a?x=1", Some("Same Title".into()), "identical body text here");
        let b = Item::new("https://fix.test/a?x=2", Some("Same Title".into()), "identical body text but longer tail");
        assert!(d.check(&a));
        assert!(!d.check(&b));
    }

    #[test]
    fn different_titles_do_not_collide() {
        let config = DedupeConfig {
            content_fields: vec![],
            fingerprint_text_len: 8,
        };
        let mut d = ContentDedupe::new(&config);
        let a = Item::new("https://fix.test/a", Some("Title One".into()), "text");
        let b = Item::new("https://fix.test/b", Some("Title Two".into()), "text");
        assert!(d.check(&a));
        assert!(d.check(&b));
    }

    #[test]
    fn absent_configured_field_hashes_as_empty_but_field_name_still_counts() {
        let config = DedupeConfig {
            content_fields: vec!["salary".to_string()],
            fingerprint_text_len: 256,
        };
        let mut d = ContentDedupe::new(&config);
        let a = Item::new("https://fix.test/a", None, "text");
        let b = Item::new("https://fix.test/b", None, "text");
        // Neither item has a `salary` meta field; both fingerprint the same
        // way (empty value for the `salary` field), so the second collides.
        assert!(d.check(&a));
        assert!(!d.check(&b));
    }
}
