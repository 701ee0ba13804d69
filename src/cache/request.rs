//! Load requests and update outcomes.
//!
//! A [`LoadRequest`] is the recorded intent of one `begin_update` call. It
//! carries the ticket the cache checks on commit, so a slow fetch for an
//! old viewport can never overwrite the result of a newer one.

use crate::error::CacheError;
use crate::loader::{AsyncRangeLoader, RangeLoader};
use crate::range::IndexRange;

/// Token identifying one update call.
///
/// Tickets are issued in increasing order; only the most recently issued
/// ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw sequence number.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Work needed to bring the cache to a new loaded range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest<S> {
    pub(crate) ticket: LoadTicket,
    pub(crate) stamp: S,
    pub(crate) target: IndexRange,
    pub(crate) retained: Option<IndexRange>,
    pub(crate) fetch: Vec<IndexRange>,
}

impl<S> LoadRequest<S> {
    /// Ticket the commit is checked against.
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Stamp the loaded data will be recorded under.
    pub fn stamp(&self) -> &S {
        &self.stamp
    }

    /// Loaded range after a successful commit.
    pub fn target(&self) -> IndexRange {
        self.target
    }

    /// Part of the current loaded range that survives without refetching.
    pub fn retained(&self) -> Option<IndexRange> {
        self.retained
    }

    /// Sub-ranges the loader must produce, in index order.
    pub fn ranges_to_fetch(&self) -> &[IndexRange] {
        &self.fetch
    }

    /// Number of items the loader must produce.
    pub fn items_to_fetch(&self) -> usize {
        self.fetch.iter().map(IndexRange::len).sum()
    }

    /// Run a synchronous loader over every sub-range.
    ///
    /// Stops at the first failure.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Loader`] when the loader fails and
    /// [`CacheError::LengthMismatch`] when it returns the wrong item count.
    pub fn load_with<L: RangeLoader>(
        &self,
        loader: &mut L,
    ) -> Result<Vec<Vec<L::Item>>, CacheError<L::Error>> {
        self.fetch
            .iter()
            .map(|&range| {
                let items = loader
                    .load(range)
                    .map_err(|source| CacheError::loader(range, source))?;
                check_len(range, items)
            })
            .collect()
    }

    /// Run an asynchronous loader over every sub-range, one after another.
    ///
    /// # Errors
    ///
    /// Same as [`LoadRequest::load_with`].
    pub async fn fetch<L: AsyncRangeLoader>(
        &self,
        loader: &L,
    ) -> Result<Vec<Vec<L::Item>>, CacheError<L::Error>> {
        let mut chunks = Vec::with_capacity(self.fetch.len());
        for &range in &self.fetch {
            let items = loader
                .load(range)
                .await
                .map_err(|source| CacheError::loader(range, source))?;
            chunks.push(check_len(range, items)?);
        }
        Ok(chunks)
    }
}

fn check_len<T, E>(range: IndexRange, items: Vec<T>) -> Result<Vec<T>, CacheError<E>> {
    if items.len() == range.len() {
        Ok(items)
    } else {
        Err(CacheError::LengthMismatch {
            range,
            expected: range.len(),
            actual: items.len(),
        })
    }
}

/// What `begin_update` decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePlan<S> {
    /// No load is needed; the committed state already reflects the update.
    Settled(UpdateOutcome),
    /// Items must be fetched and handed to `commit`.
    Load(LoadRequest<S>),
}

impl<S> UpdatePlan<S> {
    /// The pending request, if a load is needed.
    pub fn into_request(self) -> Option<LoadRequest<S>> {
        match self {
            Self::Settled(_) => None,
            Self::Load(request) => Some(request),
        }
    }
}

/// Result of an update or a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// Total count unknown or zero; the cache now holds nothing.
    Cleared,
    /// Viewport already covered; nothing fetched, nothing evicted.
    Unchanged,
    /// A new range was committed.
    Loaded {
        /// New loaded range.
        range: IndexRange,
        /// Items produced by the loader.
        fetched: usize,
        /// Items kept from the previous range.
        retained: usize,
        /// Items dropped from the previous range.
        evicted: usize,
    },
    /// A newer update overtook this load; its result was discarded.
    Superseded,
}
