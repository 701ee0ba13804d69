//! Viewport and collection-size inputs supplied by the view layer.

use crate::range::IndexRange;

/// Inclusive range of rows currently visible in the view.
///
/// # Invariants
/// - `first_visible_index <= last_visible_index_inclusive`
///
/// The producer is expected to clamp both indices to `[0, total - 1]`;
/// the cache clamps again on every update regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportInfo {
    /// First visible row (inclusive).
    pub first_visible_index: usize,
    /// Last visible row (inclusive).
    pub last_visible_index_inclusive: usize,
}

impl ViewportInfo {
    /// Create new viewport info.
    ///
    /// # Panics
    /// In debug builds, panics if `first > last_inclusive`.
    pub fn new(first: usize, last_inclusive: usize) -> Self {
        debug_assert!(
            first <= last_inclusive,
            "viewport first index {} > last index {}",
            first,
            last_inclusive
        );
        Self {
            first_visible_index: first,
            last_visible_index_inclusive: last_inclusive,
        }
    }

    /// Viewport showing a single row.
    pub fn single(index: usize) -> Self {
        Self::new(index, index)
    }

    /// Viewport of `height` rows starting at `first`. A zero height is
    /// treated as one row.
    pub fn with_height(first: usize, height: usize) -> Self {
        Self::new(first, first.saturating_add(height.saturating_sub(1)))
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.as_range().len()
    }

    /// Always `false`; a viewport holds at least one row.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The viewport as a closed index range.
    ///
    /// Inverted bounds (possible in release builds) are reordered rather
    /// than rejected.
    pub fn as_range(&self) -> IndexRange {
        let lo = self.first_visible_index.min(self.last_visible_index_inclusive);
        let hi = self.first_visible_index.max(self.last_visible_index_inclusive);
        IndexRange::new(lo, hi).unwrap_or(IndexRange::single(lo))
    }

    /// Restrict the viewport to a collection of `total` items.
    ///
    /// A viewport lying entirely past the end is pinned to the last row,
    /// so a stale scroll position after the collection shrank still maps
    /// to something loadable. Returns `None` only for an empty collection.
    pub fn clamp_to(&self, total: usize) -> Option<IndexRange> {
        let bounds = IndexRange::for_total(total)?;
        let range = self.as_range();
        Some(
            range
                .intersection(&bounds)
                .unwrap_or(IndexRange::single(bounds.end_inclusive())),
        )
    }
}

impl From<IndexRange> for ViewportInfo {
    fn from(range: IndexRange) -> Self {
        Self::new(range.start(), range.end_inclusive())
    }
}

/// The view layer's belief about the collection size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TotalCount {
    /// Size not known yet; the cache holds no data in this state.
    #[default]
    Unknown,
    /// Collection holds exactly this many items.
    Known(usize),
}

impl TotalCount {
    /// Map the signed convention (negative = not ready) onto `TotalCount`.
    pub fn from_signed(count: i64) -> Self {
        usize::try_from(count).map_or(Self::Unknown, Self::Known)
    }

    /// The count, if known.
    pub fn known(&self) -> Option<usize> {
        match self {
            Self::Unknown => None,
            Self::Known(n) => Some(*n),
        }
    }
}

impl From<usize> for TotalCount {
    fn from(count: usize) -> Self {
        Self::Known(count)
    }
}

impl From<Option<usize>> for TotalCount {
    fn from(count: Option<usize>) -> Self {
        count.map_or(Self::Unknown, Self::Known)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_height_covers_height_rows() {
        let viewport = ViewportInfo::with_height(250, 303);
        assert_eq!(viewport, ViewportInfo::new(250, 552));
        assert_eq!(viewport.len(), 303);
    }

    #[test]
    fn with_zero_height_is_single_row() {
        assert_eq!(ViewportInfo::with_height(7, 0), ViewportInfo::single(7));
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn new_panics_when_first_greater_than_last() {
        ViewportInfo::new(10, 5);
    }

    #[test]
    fn clamp_to_trims_tail() {
        let clamped = ViewportInfo::new(4990, 5010).clamp_to(5000);
        assert_eq!(clamped, IndexRange::new(4990, 4999));
    }

    #[test]
    fn clamp_to_pins_viewport_past_end_to_last_row() {
        let clamped = ViewportInfo::new(6000, 6100).clamp_to(5000);
        assert_eq!(clamped, Some(IndexRange::single(4999)));
    }

    #[test]
    fn clamp_to_empty_collection_is_none() {
        assert_eq!(ViewportInfo::new(0, 10).clamp_to(0), None);
    }

    #[test]
    fn from_signed_maps_negative_to_unknown() {
        assert_eq!(TotalCount::from_signed(-1), TotalCount::Unknown);
        assert_eq!(TotalCount::from_signed(i64::MIN), TotalCount::Unknown);
        assert_eq!(TotalCount::from_signed(0), TotalCount::Known(0));
        assert_eq!(TotalCount::from_signed(5000), TotalCount::Known(5000));
    }

    #[test]
    fn known_returns_count() {
        assert_eq!(TotalCount::Known(3).known(), Some(3));
        assert_eq!(TotalCount::Unknown.known(), None);
        assert_eq!(TotalCount::from(Some(4)), TotalCount::Known(4));
    }
}
