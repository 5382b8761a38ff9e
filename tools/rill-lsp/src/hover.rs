//! The per-version hover index.
//!
//! Keyed by `(uri, version)`: entries written for one version are never
//! touched by later parses, so a request against a stale version simply
//! misses. Entries are replaced wholesale per successful parse and a
//! failed parse leaves the previous version's entries in place, so hover
//! keeps working against the last good text.
//!
//! The index is never pruned; bounding memory per URI is a host concern,
//! not a correctness requirement.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use rill_ir::{Pos, SourceRange};

/// One hover entry: a source range and its markdown rendering.
pub type HoverEntry = (SourceRange, String);

#[derive(Default)]
pub struct HoverIndex {
    entries: DashMap<(Url, i32), Arc<Vec<HoverEntry>>>,
}

impl HoverIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entries for `(uri, version)`.
    pub fn replace(&self, uri: Url, version: i32, entries: Vec<HoverEntry>) {
        self.entries.insert((uri, version), Arc::new(entries));
    }

    /// Snapshot of the entries at `(uri, version)`.
    pub fn at(&self, uri: &Url, version: i32) -> Option<Arc<Vec<HoverEntry>>> {
        self.entries
            .get(&(uri.clone(), version))
            .map(|e| e.value().clone())
    }
}

/// The smallest entry whose range contains `pos`.
///
/// A fold over the containing entries: the accumulator is replaced
/// whenever it encloses the candidate, so nested ranges resolve to the
/// innermost one and equal ranges resolve to the row occurring later in
/// the list.
pub fn find_smallest(entries: &[HoverEntry], pos: Pos) -> Option<&HoverEntry> {
    entries
        .iter()
        .filter(|(range, _)| range.contains(pos))
        .fold(None, |best, candidate| match best {
            None => Some(candidate),
            Some(b) if b.0.encloses(&candidate.0) => Some(candidate),
            Some(b) => Some(b),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(l1: u32, c1: u32, l2: u32, c2: u32) -> SourceRange {
        SourceRange::new(Pos::new(l1, c1), Pos::new(l2, c2))
    }

    fn url() -> Url {
        Url::parse("file:///tmp/script.rill").unwrap()
    }

    #[test]
    fn innermost_containing_range_wins() {
        let entries = vec![
            (range(1, 0, 1, 10), "A".to_string()),
            (range(1, 2, 1, 6), "B".to_string()),
        ];
        let hit = find_smallest(&entries, Pos::new(1, 4)).unwrap();
        assert_eq!(hit.1, "B");

        // Outside the inner range the outer one answers.
        let hit = find_smallest(&entries, Pos::new(1, 8)).unwrap();
        assert_eq!(hit.1, "A");

        assert!(find_smallest(&entries, Pos::new(2, 0)).is_none());
    }

    #[test]
    fn equal_ranges_prefer_the_later_entry() {
        let entries = vec![
            (range(0, 0, 0, 5), "first".to_string()),
            (range(0, 0, 0, 5), "second".to_string()),
        ];
        let hit = find_smallest(&entries, Pos::new(0, 2)).unwrap();
        assert_eq!(hit.1, "second");
    }

    #[test]
    fn the_index_is_version_keyed() {
        let index = HoverIndex::new();
        index.replace(url(), 0, vec![(range(0, 0, 0, 5), "v0".into())]);
        index.replace(url(), 1, vec![(range(0, 0, 0, 5), "v1".into())]);

        assert_eq!(index.at(&url(), 0).unwrap()[0].1, "v0");
        assert_eq!(index.at(&url(), 1).unwrap()[0].1, "v1");
        // A stale or future version simply misses.
        assert!(index.at(&url(), 7).is_none());
    }
}
