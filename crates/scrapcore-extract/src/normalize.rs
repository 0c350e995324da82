//! URL normalization (spec §3, §8 invariant 3): `normalize(normalize(u)) ==
//! normalize(u)`, and two URLs differing only in tracking params, fragment,
//! or query-key order normalize to the same string.
//!
//! Grounded in `riptide-core::spider::url_utils`'s normalization helpers,
//! generalized from one hardcoded policy into `NormalizeOptions` so a
//! descriptor can opt into stripping `www.` or lowercasing the whole URL on
//! top of the core, always-on rules.

use scrapcore_types::{ErrorKind, Result};
use url::Url;

const TRACKING_PARAM_PREFIXES: &[&str] = &["utm_"];
const TRACKING_PARAMS: &[&str] = &[
    "gclid", "fbclid", "msclkid", "yclid", "mc_eid", "mc_cid", "igshid", "_hsenc", "_hsmi", "spm",
    "ref", "ref_src",
];

fn is_tracking_param(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    TRACKING_PARAM_PREFIXES.iter().any(|p| lower.starts_with(p)) || TRACKING_PARAMS.contains(&lower.as_str())
}

/// Toggles layered on top of the always-on core rules (lowercase
/// scheme+host, strip tracking params, drop the fragment, sort query keys).
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub remove_www: bool,
    pub lowercase_whole_url: bool,
}

/// Normalize a URL under the core, always-on rules spec.md requires.
pub fn normalize(url: &str) -> Result<String> {
    normalize_with(url, &NormalizeOptions::default())
}

/// Normalize a URL, additionally applying `opts`.
pub fn normalize_with(url: &str, opts: &NormalizeOptions) -> Result<String> {
    let mut parsed = Url::parse(url).map_err(ErrorKind::UrlParse)?;

    // `url` already lowercases the scheme and (for non-opaque hosts) the
    // host on parse, but we re-assert it explicitly since that's the
    // invariant this function promises, not an implementation detail of the
    // underlying crate.
    let scheme = parsed.scheme().to_ascii_lowercase();
    parsed
        .set_scheme(&scheme)
        .map_err(|_| ErrorKind::UrlParse(url::ParseError::EmptyHost))?;

    if let Some(host) = parsed.host_str() {
        let mut host = host.to_ascii_lowercase();
        if opts.remove_www {
            if let Some(stripped) = host.strip_prefix("www.") {
                host = stripped.to_string();
            }
        }
        parsed
            .set_host(Some(&host))
            .map_err(|_| ErrorKind::UrlParse(url::ParseError::EmptyHost))?;
    }

    parsed.set_fragment(None);

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    if pairs.is_empty() {
        parsed.set_query(None);
    } else {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &pairs {
            serializer.append_pair(k, v);
        }
        parsed.set_query(Some(&serializer.finish()));
    }

    let mut result = parsed.to_string();
    if opts.lowercase_whole_url {
        result = result.to_ascii_lowercase();
    }
    Ok(result)
}
