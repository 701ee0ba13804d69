//! Range loaders: the pluggable source of items for an index range.
//!
//! A loader must be a pure function of `range -> items` for the stamp the
//! cache was updated with. It returns exactly `range.len()` items in index
//! order. The cache never retries a failed load.

use crate::range::IndexRange;
use std::future::Future;

/// Synchronous range loader used by [`ViewportDataCache::update`].
///
/// Implemented for any `FnMut(IndexRange) -> Result<Vec<T>, E>`.
///
/// [`ViewportDataCache::update`]: crate::cache::ViewportDataCache::update
pub trait RangeLoader {
    /// Item produced for each index.
    type Item;
    /// Failure reported by the data source.
    type Error;

    /// Produce the items for `range`, in index order.
    ///
    /// # Errors
    ///
    /// Returns the data source's error; the cache surfaces it unchanged
    /// inside [`CacheError::Loader`](crate::error::CacheError::Loader).
    fn load(&mut self, range: IndexRange) -> Result<Vec<Self::Item>, Self::Error>;
}

impl<F, T, E> RangeLoader for F
where
    F: FnMut(IndexRange) -> Result<Vec<T>, E>,
{
    type Item = T;
    type Error = E;

    fn load(&mut self, range: IndexRange) -> Result<Vec<T>, E> {
        self(range)
    }
}

/// Asynchronous range loader for remote or IPC-backed collections.
///
/// Used with [`LoadRequest::fetch`](crate::cache::LoadRequest::fetch); the
/// result is handed back to the cache through
/// [`ViewportDataCache::commit`](crate::cache::ViewportDataCache::commit),
/// which discards it if a newer update has superseded the request.
pub trait AsyncRangeLoader {
    /// Item produced for each index.
    type Item;
    /// Failure reported by the data source.
    type Error;

    /// Produce the items for `range`, in index order.
    fn load(
        &self,
        range: IndexRange,
    ) -> impl Future<Output = Result<Vec<Self::Item>, Self::Error>>;
}

/// Loader that counts how many times and how many items it was asked for.
///
/// Wraps another loader; handy for asserting the fast path never fetches.
#[derive(Debug, Clone, Default)]
pub struct CountingLoader<L> {
    inner: L,
    calls: usize,
    items: usize,
    ranges: Vec<IndexRange>,
}

impl<L> CountingLoader<L> {
    /// Wrap `inner`.
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            calls: 0,
            items: 0,
            ranges: Vec::new(),
        }
    }

    /// Number of `load` calls so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Total indices requested so far.
    pub fn items_requested(&self) -> usize {
        self.items
    }

    /// Every range requested, oldest first.
    pub fn ranges(&self) -> &[IndexRange] {
        &self.ranges
    }

    /// Forget recorded calls.
    pub fn reset(&mut self) {
        self.calls = 0;
        self.items = 0;
        self.ranges.clear();
    }
}

impl<L: RangeLoader> RangeLoader for CountingLoader<L> {
    type Item = L::Item;
    type Error = L::Error;

    fn load(&mut self, range: IndexRange) -> Result<Vec<Self::Item>, Self::Error> {
        self.calls += 1;
        self.items += range.len();
        self.ranges.push(range);
        self.inner.load(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn closure_implements_range_loader() {
        let mut loader = |range: IndexRange| -> Result<Vec<usize>, Infallible> {
            Ok(range.iter().map(|i| i * 2).collect())
        };
        let items = loader
            .load(IndexRange::new(3, 5).expect("valid range"))
            .expect("infallible");
        assert_eq!(items, vec![6, 8, 10]);
    }

    #[test]
    fn counting_loader_records_requests() {
        let mut loader = CountingLoader::new(|range: IndexRange| -> Result<Vec<usize>, Infallible> {
            Ok(range.iter().collect())
        });

        loader.load(IndexRange::new(0, 9).expect("valid")).expect("ok");
        loader.load(IndexRange::single(42)).expect("ok");

        assert_eq!(loader.calls(), 2);
        assert_eq!(loader.items_requested(), 11);
        assert_eq!(loader.ranges()[1], IndexRange::single(42));

        loader.reset();
        assert_eq!(loader.calls(), 0);
        assert!(loader.ranges().is_empty());
    }
}
