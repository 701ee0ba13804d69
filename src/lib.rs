//! Viewport data cache
//!
//! In-memory cache of the items around the visible window of a very large,
//! sequentially indexed collection (debugger variable views, huge output
//! panes, search-result lists). A virtualized view calls
//! [`ViewportDataCache::update`] when its visible range, the collection
//! size or the collection generation changes, and
//! [`ViewportDataCache::get_data`] per painted row.
//!
//! ```
//! use std::convert::Infallible;
//! use viewport_cache::{IndexRange, TotalCount, ViewportDataCache, ViewportInfo};
//!
//! let mut cache: ViewportDataCache<String> = ViewportDataCache::with_prefetch_margin(8);
//! let mut loader = |range: IndexRange| -> Result<Vec<String>, Infallible> {
//!     Ok(range.iter().map(|i| format!("row {i}")).collect())
//! };
//!
//! cache
//!     .update(ViewportInfo::new(100, 119), TotalCount::Known(10_000), 0, &mut loader)
//!     .unwrap();
//! assert_eq!(cache.get_data(100, &0).map(String::as_str), Some("row 100"));
//! assert_eq!(cache.get_data(100, &1), None); // other generation
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod range;
pub mod sim;
pub mod viewport;

pub use cache::{
    CacheConfig, CacheStats, LoadRequest, LoadTicket, UpdateOutcome, UpdatePlan,
    ViewportDataCache, DEFAULT_PREFETCH_MARGIN,
};
pub use error::CacheError;
pub use loader::{AsyncRangeLoader, CountingLoader, RangeLoader};
pub use range::IndexRange;
pub use viewport::{TotalCount, ViewportInfo};
