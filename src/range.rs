//! Closed index intervals and the arithmetic the cache is built on.
//!
//! Every helper here is a pure function over `[start, end_inclusive]`.
//! Keeping them separate from the cache lets the boundary cases
//! (index `total - 1`, empty collections, saturating margins) be tested
//! on their own.

use std::fmt;

/// A non-empty, closed range of absolute indices.
///
/// # Invariants
/// - `start <= end_inclusive`
/// - `len() >= 1`; an empty range is expressed as `Option<IndexRange>::None`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct IndexRange {
    start: usize,
    end_inclusive: usize,
}

impl IndexRange {
    /// Create a range covering `start..=end_inclusive`.
    ///
    /// Returns `None` when `start > end_inclusive`.
    pub fn new(start: usize, end_inclusive: usize) -> Option<Self> {
        (start <= end_inclusive).then_some(Self {
            start,
            end_inclusive,
        })
    }

    /// Range holding exactly one index.
    pub fn single(index: usize) -> Self {
        Self {
            start: index,
            end_inclusive: index,
        }
    }

    /// Range covering `[0, total - 1]`, or `None` for an empty collection.
    pub fn for_total(total: usize) -> Option<Self> {
        total.checked_sub(1).map(|last| Self {
            start: 0,
            end_inclusive: last,
        })
    }

    /// First index (inclusive).
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last index (inclusive).
    pub fn end_inclusive(&self) -> usize {
        self.end_inclusive
    }

    /// Number of indices covered. Always at least 1.
    pub fn len(&self) -> usize {
        self.end_inclusive - self.start + 1
    }

    /// Always `false`; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if `index` falls inside the range.
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end_inclusive
    }

    /// Check if `other` lies entirely inside `self`.
    pub fn contains_range(&self, other: &IndexRange) -> bool {
        self.start <= other.start && other.end_inclusive <= self.end_inclusive
    }

    /// Indices present in both ranges.
    pub fn intersection(&self, other: &IndexRange) -> Option<IndexRange> {
        IndexRange::new(
            self.start.max(other.start),
            self.end_inclusive.min(other.end_inclusive),
        )
    }

    /// Grow by `margin` on each side, saturating at `0` and `usize::MAX`.
    pub fn expand(&self, margin: usize) -> IndexRange {
        IndexRange {
            start: self.start.saturating_sub(margin),
            end_inclusive: self.end_inclusive.saturating_add(margin),
        }
    }

    /// Restrict to `[0, total - 1]`.
    ///
    /// Returns `None` when `total == 0` or the range starts at or past `total`.
    pub fn clamp_to(&self, total: usize) -> Option<IndexRange> {
        IndexRange::for_total(total).and_then(|bounds| self.intersection(&bounds))
    }

    /// The pieces of `self` not covered by `other`, in index order.
    ///
    /// At most two pieces exist: one before `other.start` and one after
    /// `other.end_inclusive`.
    pub fn difference(&self, other: &IndexRange) -> (Option<IndexRange>, Option<IndexRange>) {
        let Some(overlap) = self.intersection(other) else {
            return (Some(*self), None);
        };

        let before = overlap
            .start
            .checked_sub(1)
            .and_then(|end| IndexRange::new(self.start, end));
        let after = overlap
            .end_inclusive
            .checked_add(1)
            .and_then(|start| IndexRange::new(start, self.end_inclusive));

        (before, after)
    }

    /// Offset of `index` from `start`, if contained.
    pub fn offset_of(&self, index: usize) -> Option<usize> {
        self.contains(index).then(|| index - self.start)
    }

    /// Iterate over every index in order.
    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end_inclusive
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end_inclusive)
    }
}

impl IntoIterator for IndexRange {
    type Item = usize;
    type IntoIter = std::ops::RangeInclusive<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
