//! Cheap size+mtime classification of discovered pairs
//!
//! A single pass over the pair snapshot decides, per pair, one of:
//! - sizes differ: a `size changed` record, no hashing
//! - equal size and equal truncated mtime: presumed identical, no hashing
//! - equal size, differing mtime: queued for content hashing
//!
//! Zero-byte pairs follow the same rules: equal mtimes fast-skip, differing
//! mtimes still go to the hasher (which reports them identical via the
//! empty-input digest).

use crate::discovered::DiscoveredSet;
use crate::model::{DiffRecord, PairJob};
use std::sync::Arc;

/// Result of partitioning the pair snapshot
pub struct Classified {
    /// Synthetic `size changed` records, ready to emit
    pub size_changed: Vec<DiffRecord>,

    /// Pairs that need a content hash (equal size, differing mtime)
    pub need_hash: Vec<PairJob>,

    /// Pairs identical by size and mtime (paths only; no records unless
    /// --show-same asks for them)
    pub same_fast: Vec<Arc<str>>,
}

/// Partition every discovered pair. Purely local, no I/O.
pub fn classify_pairs(set: &DiscoveredSet) -> Classified {
    let pair_paths = set.pair_paths();
    let mut out = Classified {
        size_changed: Vec::new(),
        need_hash: Vec::new(),
        same_fast: Vec::new(),
    };

    for rel in pair_paths {
        let Some(cached) = set.pair_info(&rel) else {
            // A path in the pair list always has both sides; tolerate a
            // missing entry rather than trusting it.
            continue;
        };
        if cached.left.size != cached.right.size {
            out.size_changed.push(DiffRecord::size_changed(rel, &cached));
        } else if cached.left.mtime == cached.right.mtime {
            out.same_fast.push(rel);
        } else {
            out.need_hash.push(PairJob { rel, cached });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileMeta, Side};

    fn meta(size: u64, mtime: i64) -> FileMeta {
        FileMeta { size, mtime }
    }

    fn set_with(pairs: &[(&str, FileMeta, FileMeta)]) -> DiscoveredSet {
        let set = DiscoveredSet::new();
        for (rel, left, right) in pairs {
            set.add(rel, Side::Left, *left);
            set.add(rel, Side::Right, *right);
        }
        set
    }

    #[test]
    fn test_three_way_partition() {
        let set = set_with(&[
            ("sized", meta(2, 10), meta(3, 10)),
            ("same", meta(5, 10), meta(5, 10)),
            ("check", meta(5, 10), meta(5, 20)),
        ]);

        let classified = classify_pairs(&set);
        assert_eq!(classified.size_changed.len(), 1);
        assert_eq!(classified.size_changed[0].rel.as_ref(), "sized");
        assert_eq!(classified.size_changed[0].reason, "size changed");
        assert_eq!(classified.size_changed[0].left_size, Some(2));
        assert_eq!(classified.size_changed[0].right_size, Some(3));

        assert_eq!(classified.same_fast.len(), 1);
        assert_eq!(classified.same_fast[0].as_ref(), "same");

        assert_eq!(classified.need_hash.len(), 1);
        assert_eq!(classified.need_hash[0].rel.as_ref(), "check");
    }

    #[test]
    fn test_empty_pair_with_equal_mtime_fast_skips() {
        let set = set_with(&[("empty", meta(0, 10), meta(0, 10))]);
        let classified = classify_pairs(&set);
        assert!(classified.size_changed.is_empty());
        assert!(classified.need_hash.is_empty());
        assert_eq!(classified.same_fast.len(), 1);
    }

    #[test]
    fn test_empty_pair_with_differing_mtime_needs_check() {
        let set = set_with(&[("empty", meta(0, 10), meta(0, 20))]);
        let classified = classify_pairs(&set);
        assert_eq!(classified.need_hash.len(), 1);
        assert!(classified.same_fast.is_empty());
    }

    #[test]
    fn test_size_difference_wins_over_mtime() {
        // Differing size AND differing mtime still classifies by size; no
        // hashing happens for such pairs.
        let set = set_with(&[("f", meta(1, 10), meta(2, 20))]);
        let classified = classify_pairs(&set);
        assert_eq!(classified.size_changed.len(), 1);
        assert!(classified.need_hash.is_empty());
    }

    #[test]
    fn test_no_pairs() {
        let set = DiscoveredSet::new();
        set.add("left-only", Side::Left, meta(1, 1));
        let classified = classify_pairs(&set);
        assert!(classified.size_changed.is_empty());
        assert!(classified.need_hash.is_empty());
        assert!(classified.same_fast.is_empty());
    }
}
