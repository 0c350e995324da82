//! `expand_entrypoints` (spec §4.6): materialize `{page}`/`{offset}`
//! templates by walking `paging.start` to `start + (pages-1)*step`. The
//! yielded sequence is deterministic (spec §8 invariant 2) — a pure
//! function of the descriptor, no I/O, no randomness.

use scrapcore_types::{Entrypoint, PagingMode};

/// Expand every entrypoint's paging template into the concrete listing URL
/// sequence, preserving entrypoint order and then page order within each.
pub fn expand_entrypoints(entrypoints: &[Entrypoint]) -> Vec<String> {
    entrypoints.iter().flat_map(expand_one).collect()
}

fn expand_one(entry: &Entrypoint) -> Vec<String> {
    let placeholder = match entry.paging.mode {
        PagingMode::Page => "{page}",
        PagingMode::Offset => "{offset}",
    };
    (0..entry.paging.pages)
        .map(|i| {
            let value = entry.paging.start + i as i64 * entry.paging.step;
            entry.url.replace(placeholder, &value.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrapcore_types::Paging;

    fn entry(url: &str, mode: PagingMode, start: i64, pages: u32, step: i64) -> Entrypoint {
        Entrypoint {
            url: url.to_string(),
            paging: Paging { mode, start, pages, step },
        }
    }

    #[test]
    fn page_mode_expands_sequential_pages() {
        let e = entry("https://fix.test/jobs?page={page}", PagingMode::Page, 1, 3, 1);
        let urls = expand_entrypoints(&[e]);
        assert_eq!(
            urls,
            vec![
                "https://fix.test/jobs?page=1",
                "https://fix.test/jobs?page=2",
                "https://fix.test/jobs?page=3",
            ]
        );
    }

    #[test]
    fn offset_mode_steps_by_the_configured_stride() {
        let e = entry("https://fix.test/jobs?offset={offset}", PagingMode::Offset, 0, 3, 20);
        let urls = expand_entrypoints(&[e]);
        assert_eq!(
            urls,
            vec![
                "https://fix.test/jobs?offset=0",
                "https://fix.test/jobs?offset=20",
                "https://fix.test/jobs?offset=40",
            ]
        );
    }

    #[test]
    fn expansion_is_deterministic_across_calls() {
        let e = entry("https://fix.test/jobs?page={page}", PagingMode::Page, 1, 5, 1);
        let a = expand_entrypoints(&[e.clone()]);
        let b = expand_entrypoints(&[e]);
        assert_eq!(a, b);
    }

    #[test]
    fn multiple_entrypoints_preserve_order() {
        let a = entry("https://fix.test/a?page={page}", PagingMode::Page, 1, 1, 1);
        let b = entry("https://fix.test/b?page={page}", PagingMode::Page, 1, 1, 1);
        let urls = expand_entrypoints(&[a, b]);
        assert_eq!(urls, vec!["https://fix.test/a?page=1", "https://fix.test/b?page=1"]);
    }
}
