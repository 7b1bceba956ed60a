//! # In-Node Search
//!
//! Locating a key inside a node is a bisection over its sorted item slab.
//! The result is `(found, index)` where `index` is the matching slot when
//! `found`, and the insertion position otherwise.
//!
//! ## Path Hints
//!
//! A [`PathHint`] is a caller-owned cache of the last search path: one
//! byte per tree level, holding the slot index the previous search landed
//! on at that level. A hinted search probes the remembered slot first and,
//! on a miss, uses the probe's outcome to bound one side of the bisection.
//!
//! ```text
//! hint byte d = 0      slot never recorded, plain bisection
//! probe == key         answered in one comparison
//! probe <  key         bisect (probe, end]
//! probe >  key         bisect [start, probe)
//! ```
//!
//! Sequential and clustered access patterns resolve most levels in a
//! single comparison. Hints are pure acceleration: the winning index is
//! written back after every search, stale or garbage bytes only cost the
//! probe, and levels at depth 8 or beyond ignore the hint entirely. Slot
//! indexes wider than a byte are stored truncated, which is harmless for
//! the same reason.

use crate::compare::Comparator;
use crate::config::HINT_DEPTH;

/// Per-depth memory of the last search path. Start from
/// [`PathHint::new`] and thread the same hint through related calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathHint {
    pub(crate) path: [u8; HINT_DEPTH],
}

impl PathHint {
    pub fn new() -> Self {
        Self::default()
    }
}

pub(crate) fn bsearch<T, C: Comparator<T>>(cmp: &C, items: &[T], key: &T) -> (bool, usize) {
    let mut i = 0;
    let mut n = items.len();
    while i < n {
        let j = (i + n) >> 1;
        match cmp.compare(key, &items[j]) {
            std::cmp::Ordering::Equal => return (true, j),
            std::cmp::Ordering::Less => n = j,
            std::cmp::Ordering::Greater => i = j + 1,
        }
    }
    (false, i)
}

pub(crate) fn bsearch_hint<T, C: Comparator<T>>(
    cmp: &C,
    items: &[T],
    key: &T,
    hint: &mut PathHint,
    depth: usize,
) -> (bool, usize) {
    let mut low = 0;
    let mut high = items.len();
    if depth < HINT_DEPTH && !items.is_empty() {
        let probe = (hint.path[depth] as usize).min(items.len() - 1);
        if probe > 0 {
            match cmp.compare(key, &items[probe]) {
                std::cmp::Ordering::Equal => return (true, probe),
                std::cmp::Ordering::Greater => low = probe + 1,
                std::cmp::Ordering::Less => high = probe,
            }
        }
    }
    let mut found = false;
    let mut index = low;
    while low < high {
        let mid = (low + high) / 2;
        match cmp.compare(key, &items[mid]) {
            std::cmp::Ordering::Equal => {
                found = true;
                index = mid;
                break;
            }
            std::cmp::Ordering::Less => high = mid,
            std::cmp::Ordering::Greater => low = mid + 1,
        }
    }
    if !found {
        index = low;
    }
    if depth < HINT_DEPTH {
        hint.path[depth] = index as u8;
    }
    (found, index)
}

pub(crate) fn search<T, C: Comparator<T>>(
    cmp: &C,
    items: &[T],
    key: &T,
    hint: Option<&mut PathHint>,
    depth: usize,
) -> (bool, usize) {
    match hint {
        Some(hint) => bsearch_hint(cmp, items, key, hint, depth),
        None => bsearch(cmp, items, key),
    }
}
