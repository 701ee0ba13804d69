//! Contiguous item storage for the loaded range.

use crate::range::IndexRange;
use std::collections::VecDeque;

/// Materialized items for exactly one contiguous index range.
///
/// # Invariants
/// - `range.is_none()` iff `items.is_empty()`
/// - `items.len() == range.len()` otherwise; there are no gaps
#[derive(Debug, Clone)]
pub(crate) struct EntryStore<T> {
    range: Option<IndexRange>,
    items: VecDeque<T>,
}

impl<T> EntryStore<T> {
    pub(crate) fn new() -> Self {
        Self {
            range: None,
            items: VecDeque::new(),
        }
    }

    pub(crate) fn range(&self) -> Option<IndexRange> {
        self.range
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.range
            .and_then(|range| range.offset_of(index))
            .and_then(|offset| self.items.get(offset))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        let start = self.range.map_or(0, |range| range.start());
        self.items
            .iter()
            .enumerate()
            .map(move |(offset, item)| (start + offset, item))
    }

    /// Drop everything. Returns the number of items evicted.
    pub(crate) fn clear(&mut self) -> usize {
        let evicted = self.items.len();
        self.items.clear();
        self.range = None;
        evicted
    }

    /// Evict items at or past `total`. Returns the number evicted.
    pub(crate) fn truncate_to(&mut self, total: usize) -> usize {
        let Some(range) = self.range else {
            return 0;
        };
        match range.clamp_to(total) {
            Some(kept) if kept == range => 0,
            Some(kept) => {
                let evicted = self.items.len() - kept.len();
                self.items.truncate(kept.len());
                self.range = Some(kept);
                evicted
            }
            None => self.clear(),
        }
    }

    /// Replace the stored range with `target`.
    ///
    /// Items inside `retained` are kept in place; everything else is
    /// evicted. `chunks` must cover `target` minus `retained` exactly, in
    /// index order, with each chunk's length equal to its range's length.
    /// Returns the number of items evicted.
    pub(crate) fn rebuild(
        &mut self,
        target: IndexRange,
        retained: Option<IndexRange>,
        chunks: impl IntoIterator<Item = (IndexRange, Vec<T>)>,
    ) -> usize {
        let before = self.items.len();

        let keep = match (retained, self.range) {
            (Some(keep), Some(current)) if current.contains_range(&keep) => {
                let leading = keep.start() - current.start();
                self.items.drain(..leading);
                self.items.truncate(keep.len());
                Some(keep)
            }
            _ => {
                self.items.clear();
                None
            }
        };
        let evicted = before - self.items.len();

        for (range, chunk) in chunks {
            let is_leading = keep.is_some_and(|keep| range.end_inclusive() < keep.start());
            if is_leading {
                for item in chunk.into_iter().rev() {
                    self.items.push_front(item);
                }
            } else {
                self.items.extend(chunk);
            }
        }

        debug_assert_eq!(
            self.items.len(),
            target.len(),
            "store for {} holds {} items",
            target,
            self.items.len()
        );
        self.range = Some(target);
        evicted
    }
}
