//! Thread-safe join of both walks' path streams
//!
//! Maps each relative path to the metadata seen on either side and keeps
//! three tallies - left-only, right-only, pairs - maintained incrementally
//! so count queries are O(1) for the progress loop. The pair list records
//! each path the first time both sides have been observed, in discovery
//! order; it is only stable once the walkers have quiesced.

use crate::model::{FileMeta, PairInfo, Side};
use crate::paths::PathInterner;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Slots {
    left: Option<FileMeta>,
    right: Option<FileMeta>,
}

#[derive(Default)]
struct SetInner {
    entries: HashMap<Arc<str>, Slots>,
    pair_paths: Vec<Arc<str>>,
    left_only: usize,
    right_only: usize,
}

/// Join of both sides' discovered files
pub struct DiscoveredSet {
    interner: PathInterner,
    inner: Mutex<SetInner>,
}

impl DiscoveredSet {
    pub fn new() -> Self {
        Self {
            interner: PathInterner::new(),
            inner: Mutex::new(SetInner::default()),
        }
    }

    /// Record that `rel` was seen on `side` with the given walk metadata.
    ///
    /// Returns true exactly when this call completes a pair: the other side
    /// had already been seen and this side had not. Re-observing the same
    /// (path, side) refreshes the cached metadata and returns false.
    pub fn add(&self, rel: &str, side: Side, meta: FileMeta) -> bool {
        let rel = self.interner.intern(rel);
        let mut inner = self.inner.lock().expect("discovered set poisoned");
        let slots = inner.entries.entry(Arc::clone(&rel)).or_default();

        let (own, other_present) = match side {
            Side::Left => (&mut slots.left, slots.right.is_some()),
            Side::Right => (&mut slots.right, slots.left.is_some()),
        };
        let first_time = own.is_none();
        *own = Some(meta);

        if !first_time {
            return false;
        }
        if other_present {
            // This observation turned a single-sided path into a pair.
            inner.pair_paths.push(rel);
            match side {
                Side::Left => inner.right_only -= 1,
                Side::Right => inner.left_only -= 1,
            }
            true
        } else {
            match side {
                Side::Left => inner.left_only += 1,
                Side::Right => inner.right_only += 1,
            }
            false
        }
    }

    /// Snapshot of paths seen on both sides, in discovery order.
    pub fn pair_paths(&self) -> Vec<Arc<str>> {
        self.inner
            .lock()
            .expect("discovered set poisoned")
            .pair_paths
            .clone()
    }

    /// Cached metadata for both sides of a pair, if both have been seen.
    pub fn pair_info(&self, rel: &str) -> Option<PairInfo> {
        let inner = self.inner.lock().expect("discovered set poisoned");
        let slots = inner.entries.get(rel)?;
        Some(PairInfo {
            left: slots.left?,
            right: slots.right?,
        })
    }

    /// Snapshot of paths seen only on the left.
    pub fn left_only_paths(&self) -> Vec<Arc<str>> {
        self.single_sided(Side::Left)
    }

    /// Snapshot of paths seen only on the right.
    pub fn right_only_paths(&self) -> Vec<Arc<str>> {
        self.single_sided(Side::Right)
    }

    fn single_sided(&self, side: Side) -> Vec<Arc<str>> {
        let inner = self.inner.lock().expect("discovered set poisoned");
        inner
            .entries
            .iter()
            .filter(|(_, slots)| match side {
                Side::Left => slots.left.is_some() && slots.right.is_none(),
                Side::Right => slots.right.is_some() && slots.left.is_none(),
            })
            .map(|(rel, _)| Arc::clone(rel))
            .collect()
    }

    pub fn pair_count(&self) -> usize {
        self.inner
            .lock()
            .expect("discovered set poisoned")
            .pair_paths
            .len()
    }

    pub fn left_only_count(&self) -> usize {
        self.inner.lock().expect("discovered set poisoned").left_only
    }

    pub fn right_only_count(&self) -> usize {
        self.inner
            .lock()
            .expect("discovered set poisoned")
            .right_only
    }

    /// Total distinct paths observed on either side.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("discovered set poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DiscoveredSet {
    fn default() -> Self {
        Self::new()
    }
}
