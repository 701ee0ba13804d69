//! Error types for the viewport cache.
//!
//! Only genuine loader failures and loader contract violations are errors.
//! A stale stamp, an out-of-range index or a superseded load are ordinary
//! absence-of-data states and never surface here.

use crate::range::IndexRange;
use thiserror::Error;

/// Failure while bringing the cache in line with a new viewport.
///
/// Whenever one of these is returned the previously committed range,
/// contents and stamp are left exactly as they were.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError<E> {
    /// The range loader reported a failure for `range`.
    ///
    /// The cache does not retry; the caller owns the retry/backoff policy.
    #[error("range loader failed for {range}")]
    Loader {
        /// Sub-range the loader was asked for.
        range: IndexRange,
        /// Error returned by the loader.
        #[source]
        source: E,
    },

    /// The loader returned a different number of items than requested.
    #[error("range loader returned {actual} items for {range}, expected {expected}")]
    LengthMismatch {
        /// Sub-range the loader was asked for.
        range: IndexRange,
        /// `range.len()`.
        expected: usize,
        /// Number of items actually returned.
        actual: usize,
    },

    /// A commit supplied a different number of chunks than the request
    /// asked to fetch.
    #[error("commit supplied {actual} chunks, request needs {expected}")]
    ChunkCountMismatch {
        /// Number of sub-ranges in the request.
        expected: usize,
        /// Number of chunks supplied.
        actual: usize,
    },
}

impl<E> CacheError<E> {
    /// Wrap a loader failure for `range`.
    pub fn loader(range: IndexRange, source: E) -> Self {
        Self::Loader { range, source }
    }

    /// Check if this error came from the loader itself rather than a
    /// contract violation.
    pub fn is_loader_failure(&self) -> bool {
        matches!(self, Self::Loader { .. })
    }
}
