//! Counters describing how the cache has been exercised.

use std::fmt;

/// Running totals since creation or the last `reset_stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct CacheStats {
    /// `update`/`begin_update` calls.
    pub updates: u64,
    /// Updates answered without fetching or evicting.
    pub fast_path_hits: u64,
    /// Loads whose results were committed.
    pub loads_committed: u64,
    /// Items produced by the loader and committed.
    pub items_fetched: u64,
    /// Items carried over from the previous range by a commit.
    pub items_retained: u64,
    /// Items dropped by commits, trims and resets.
    pub items_evicted: u64,
    /// Commits discarded because a newer update overtook them.
    pub superseded_commits: u64,
    /// Loads that failed or broke the loader contract.
    pub failed_loads: u64,
    /// Times the cache was emptied for an unknown or zero total count.
    pub resets: u64,
}

impl CacheStats {
    /// Fraction of updates served by the fast path, in `[0, 1]`.
    pub fn fast_path_ratio(&self) -> f64 {
        if self.updates == 0 {
            0.0
        } else {
            self.fast_path_hits as f64 / self.updates as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "updates:            {}", self.updates)?;
        writeln!(
            f,
            "fast path hits:     {} ({:.1}%)",
            self.fast_path_hits,
            self.fast_path_ratio() * 100.0
        )?;
        writeln!(f, "loads committed:    {}", self.loads_committed)?;
        writeln!(f, "items fetched:      {}", self.items_fetched)?;
        writeln!(f, "items retained:     {}", self.items_retained)?;
        writeln!(f, "items evicted:      {}", self.items_evicted)?;
        writeln!(f, "superseded commits: {}", self.superseded_commits)?;
        writeln!(f, "failed loads:       {}", self.failed_loads)?;
        write!(f, "resets:             {}", self.resets)
    }
}
