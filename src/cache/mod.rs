//! Windowed data cache for virtualized views.
//!
//! [`ViewportDataCache`] holds the items for one contiguous index range
//! around the visible rows of a very large collection. It is driven by two
//! calls from the view layer:
//!
//! - `update(viewport, total, stamp, loader)` whenever the scroll position,
//!   collection size or collection generation changes
//! - `get_data(index, stamp)` for each row being painted
//!
//! # Loading
//!
//! A load is needed when the viewport leaves the loaded range, when the
//! stamp changes, or when the prefetch window reaches an end of the
//! collection that the loaded range does not. The new loaded range is the
//! viewport widened by `prefetch_margin` on each side and clamped to the
//! collection. Items in the overlap with the old range are kept; only the
//! uncovered sub-ranges are fetched. Everything outside the new range is
//! evicted.
//!
//! # Asynchronous commit
//!
//! `update` is `begin_update` + loader + `commit` in one call. Remote loaders
//! split those steps: `begin_update` records the intent and returns a
//! [`LoadRequest`] tagged with a [`LoadTicket`]; the fetched chunks are
//! handed to `commit` later. Any `begin_update` issued in between supersedes
//! the request and its result is discarded on commit. `get_data` only ever
//! sees committed state.

mod request;
mod stats;
mod store;

pub use request::{LoadRequest, LoadTicket, UpdateOutcome, UpdatePlan};
pub use stats::CacheStats;

use crate::error::CacheError;
use crate::loader::RangeLoader;
use crate::range::IndexRange;
use crate::viewport::{TotalCount, ViewportInfo};
use store::EntryStore;
use tracing::{debug, warn};

/// Default number of rows prefetched on each side of the viewport.
pub const DEFAULT_PREFETCH_MARGIN: usize = 64;

/// Tuning for [`ViewportDataCache`].
///
/// Loaded from the `[cache]` table of the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Rows fetched beyond each edge of the viewport (default: 64).
    pub prefetch_margin: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefetch_margin: DEFAULT_PREFETCH_MARGIN,
        }
    }
}

/// Cache of the items around the visible window of an indexed collection.
///
/// `T` is the item type, `S` the caller's stamp (collection generation).
/// The cache only compares stamps for equality; callers own their
/// generation scheme.
///
/// # Invariants
/// - `get_data` answers only for the committed stamp and loaded range
/// - the loaded range is always inside `[0, total - 1]` of the last known
///   total count
/// - a failed or superseded load leaves committed state untouched
#[derive(Debug)]
pub struct ViewportDataCache<T, S = u64> {
    config: CacheConfig,
    store: EntryStore<T>,
    stamp: Option<S>,
    total: TotalCount,
    issued: u64,
    pending: Option<LoadTicket>,
    stats: CacheStats,
}

impl<T, S> ViewportDataCache<T, S>
where
    S: Clone + Eq + std::fmt::Debug,
{
    /// Create an empty cache with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create an empty cache with the given configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            config,
            store: EntryStore::new(),
            stamp: None,
            total: TotalCount::Unknown,
            issued: 0,
            pending: None,
            stats: CacheStats::default(),
        }
    }

    /// Create an empty cache prefetching `margin` rows on each side.
    pub fn with_prefetch_margin(margin: usize) -> Self {
        Self::with_config(CacheConfig {
            prefetch_margin: margin,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Synchronize with a new viewport, fetching synchronously.
    ///
    /// Blocks on `loader` when a fetch is needed and commits the result
    /// before returning.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the loader fails or returns the wrong
    /// number of items. Committed range, contents and stamp are unchanged
    /// in that case.
    pub fn update<L>(
        &mut self,
        viewport: ViewportInfo,
        total: TotalCount,
        stamp: S,
        loader: &mut L,
    ) -> Result<UpdateOutcome, CacheError<L::Error>>
    where
        L: RangeLoader<Item = T>,
    {
        match self.begin_update(viewport, total, stamp) {
            UpdatePlan::Settled(outcome) => Ok(outcome),
            UpdatePlan::Load(request) => {
                let fetched = request.load_with(loader);
                self.commit(request, fetched)
            }
        }
    }

    /// Record a new viewport and decide what must be fetched.
    ///
    /// Supersedes any request still pending. Committed state changes here
    /// only to stay inside the collection: the cache is emptied for an
    /// unknown or zero total count, and rows past a shrunken total are
    /// trimmed whatever the stamp.
    pub fn begin_update(
        &mut self,
        viewport: ViewportInfo,
        total: TotalCount,
        stamp: S,
    ) -> UpdatePlan<S> {
        self.stats.updates += 1;
        let ticket = self.issue_ticket();
        self.total = total;

        let Some(count) = total.known() else {
            self.reset(stamp);
            return UpdatePlan::Settled(UpdateOutcome::Cleared);
        };
        let Some(visible) = viewport.clamp_to(count) else {
            self.reset(stamp);
            return UpdatePlan::Settled(UpdateOutcome::Cleared);
        };

        // Rows past the new end go now, whatever the stamp.
        let trimmed = self.store.truncate_to(count);
        if trimmed > 0 {
            self.stats.items_evicted += trimmed as u64;
            debug!(trimmed, total = count, "trimmed rows past end of collection");
        }

        let same_stamp = self.stamp.as_ref() == Some(&stamp);
        let loaded = self.store.range();
        let target = visible
            .expand(self.config.prefetch_margin)
            .clamp_to(count)
            .unwrap_or(visible);
        if same_stamp && loaded.is_some_and(|range| covers(range, visible, target, count)) {
            self.stats.fast_path_hits += 1;
            return UpdatePlan::Settled(UpdateOutcome::Unchanged);
        }

        let retained = if same_stamp {
            loaded.and_then(|range| range.intersection(&target))
        } else {
            None
        };
        let fetch = match retained {
            Some(keep) => {
                let (before, after) = target.difference(&keep);
                before.into_iter().chain(after).collect()
            }
            None => vec![target],
        };

        debug!(
            ticket = ticket.get(),
            ?stamp,
            %visible,
            %target,
            retained = ?retained,
            "viewport left loaded range, load requested"
        );

        self.pending = Some(ticket);
        UpdatePlan::Load(LoadRequest {
            ticket,
            stamp,
            target,
            retained,
            fetch,
        })
    }

    /// Install the result of a load started by `begin_update`.
    ///
    /// A request that is no longer the latest one is discarded and reported
    /// as [`UpdateOutcome::Superseded`]; that is not an error, even when the
    /// fetch itself failed.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or a contract violation
    /// ([`CacheError::ChunkCountMismatch`], [`CacheError::LengthMismatch`]),
    /// when the request is still current. Committed state is unchanged and
    /// the request is no longer pending.
    pub fn commit<E>(
        &mut self,
        request: LoadRequest<S>,
        fetched: Result<Vec<Vec<T>>, CacheError<E>>,
    ) -> Result<UpdateOutcome, CacheError<E>> {
        if self.pending != Some(request.ticket) {
            self.stats.superseded_commits += 1;
            debug!(
                ticket = request.ticket.get(),
                target = %request.target,
                "discarding superseded load"
            );
            return Ok(UpdateOutcome::Superseded);
        }
        self.pending = None;

        let chunks = fetched
            .and_then(|chunks| validate_chunks(&request.fetch, chunks))
            .inspect_err(|_| {
                self.stats.failed_loads += 1;
                warn!(
                    ticket = request.ticket.get(),
                    target = %request.target,
                    "load failed, keeping previously committed range"
                );
            })?;

        let fetched = request.items_to_fetch();
        let retained = request.retained.map_or(0, |range| range.len());
        let evicted = self.store.rebuild(
            request.target,
            request.retained,
            request.fetch.iter().copied().zip(chunks),
        );
        self.stamp = Some(request.stamp);

        self.stats.loads_committed += 1;
        self.stats.items_fetched += fetched as u64;
        self.stats.items_retained += retained as u64;
        self.stats.items_evicted += evicted as u64;

        debug!(
            ticket = request.ticket.get(),
            range = %request.target,
            fetched,
            retained,
            evicted,
            "load committed"
        );

        Ok(UpdateOutcome::Loaded {
            range: request.target,
            fetched,
            retained,
            evicted,
        })
    }

    /// Drop a request without committing it, e.g. when its fetch was
    /// cancelled. Returns `true` if it was still pending.
    pub fn abandon(&mut self, request: &LoadRequest<S>) -> bool {
        if self.pending == Some(request.ticket) {
            self.pending = None;
            debug!(ticket = request.ticket.get(), "load abandoned");
            true
        } else {
            false
        }
    }

    /// Item at `index`, if loaded under `stamp`.
    ///
    /// Never loads. Any index outside the loaded range, and any stamp other
    /// than the committed one, yields `None`.
    pub fn get_data(&self, index: usize, stamp: &S) -> Option<&T> {
        if self.stamp.as_ref() != Some(stamp) {
            return None;
        }
        self.store.get(index)
    }

    /// Every loaded `(index, item)` pair visible under `stamp`, in order.
    pub fn entries<'a>(&'a self, stamp: &S) -> impl Iterator<Item = (usize, &'a T)> + 'a {
        let visible = self.stamp.as_ref() == Some(stamp);
        self.store.iter().filter(move |_| visible)
    }

    /// Currently loaded range, if any.
    pub fn loaded_range(&self) -> Option<IndexRange> {
        self.store.range()
    }

    /// Stamp of the committed data.
    pub fn stamp(&self) -> Option<&S> {
        self.stamp.as_ref()
    }

    /// Total count recorded by the last update.
    pub fn total_count(&self) -> TotalCount {
        self.total
    }

    /// Check if a load is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Ticket of the in-flight load, if any.
    pub fn pending_ticket(&self) -> Option<LoadTicket> {
        self.pending
    }

    /// Number of items held.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the cache holds no items.
    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Counters since creation or the last `reset_stats`.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Zero all counters.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    fn issue_ticket(&mut self) -> LoadTicket {
        self.issued += 1;
        self.pending = None;
        LoadTicket::new(self.issued)
    }

    fn reset(&mut self, stamp: S) {
        let evicted = self.store.clear();
        self.stamp = Some(stamp);
        self.stats.resets += 1;
        self.stats.items_evicted += evicted as u64;
        debug!(evicted, total = ?self.total, "collection not ready, cache cleared");
    }
}

impl<T, S> Default for ViewportDataCache<T, S>
where
    S: Clone + Eq + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `loaded` can serve `visible` without a load.
///
/// The viewport must lie inside `loaded`. Where the prefetch window
/// `target` is cut off at either end of the collection, `loaded` must
/// reach that end too.
fn covers(loaded: IndexRange, visible: IndexRange, target: IndexRange, total: usize) -> bool {
    let last = total.saturating_sub(1);
    loaded.contains_range(&visible)
        && (target.start() > 0 || loaded.start() == 0)
        && (target.end_inclusive() < last || loaded.end_inclusive() == last)
}

fn validate_chunks<T, E>(
    ranges: &[IndexRange],
    chunks: Vec<Vec<T>>,
) -> Result<Vec<Vec<T>>, CacheError<E>> {
    if chunks.len() != ranges.len() {
        return Err(CacheError::ChunkCountMismatch {
            expected: ranges.len(),
            actual: chunks.len(),
        });
    }
    if let Some((range, chunk)) = ranges
        .iter()
        .zip(&chunks)
        .find(|(range, chunk)| range.len() != chunk.len())
    {
        return Err(CacheError::LengthMismatch {
            range: *range,
            expected: range.len(),
            actual: chunk.len(),
        });
    }
    Ok(chunks)
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
