//! Scroll simulation over a synthetic collection.
//!
//! Drives a [`ViewportDataCache`] the way a virtualized view would: a
//! fixed-height viewport sweeps down the collection and back up, and the
//! collection generation is optionally bumped every few steps. Every
//! visible row is read back and checked against the synthetic loader.

use crate::cache::{CacheConfig, CacheStats, ViewportDataCache};
use crate::error::CacheError;
use crate::range::IndexRange;
use crate::viewport::{TotalCount, ViewportInfo};
use std::convert::Infallible;
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Row produced by the synthetic loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticRow {
    /// Absolute index of the row.
    pub index: usize,
    /// Generation the row was produced for.
    pub generation: u64,
}

impl SyntheticRow {
    /// The row the loader produces for `index` under `generation`.
    pub fn new(index: usize, generation: u64) -> Self {
        Self { index, generation }
    }
}

/// Shape of a simulated scroll session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SimulationParams {
    /// Collection size.
    pub total: usize,
    /// Visible rows per frame.
    pub viewport_height: usize,
    /// Number of viewport updates.
    pub steps: usize,
    /// Rows scrolled between updates.
    pub step_size: usize,
    /// Bump the generation every this many steps.
    pub restamp_every: Option<usize>,
}

impl SimulationParams {
    /// First visible row at `step`.
    ///
    /// The viewport bounces between the top and the last full page.
    pub fn first_visible(&self, step: usize) -> usize {
        let max_first = self.total.saturating_sub(self.viewport_height);
        let period = max_first.saturating_mul(2);
        if period == 0 {
            return 0;
        }
        let position = step.wrapping_mul(self.step_size) % period;
        if position <= max_first {
            position
        } else {
            period - position
        }
    }

    /// Generation in effect at `step`.
    pub fn generation(&self, step: usize) -> u64 {
        match self.restamp_every {
            Some(every) if every > 0 => (step / every) as u64,
            _ => 0,
        }
    }
}

/// Outcome of a completed simulation.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SimulationReport {
    /// Parameters the simulation ran with.
    pub params: SimulationParams,
    /// Prefetch margin in effect.
    pub prefetch_margin: usize,
    /// Cache counters at the end of the run.
    pub stats: CacheStats,
    /// Loaded range after the last step.
    pub final_range: Option<IndexRange>,
    /// Visible rows read back and verified.
    pub rows_checked: u64,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "simulated {} steps over {} rows (viewport {}, step {}, margin {})",
            self.params.steps,
            self.params.total,
            self.params.viewport_height,
            self.params.step_size,
            self.prefetch_margin
        )?;
        writeln!(f, "rows checked:       {}", self.rows_checked)?;
        match self.final_range {
            Some(range) => writeln!(f, "final range:        {}", range)?,
            None => writeln!(f, "final range:        none")?,
        }
        write!(f, "{}", self.stats)
    }
}

/// Simulation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    /// The cache reported an error.
    #[error(transparent)]
    Cache(#[from] CacheError<Infallible>),

    /// A visible row was absent after its update completed.
    #[error("row {index} missing at step {step}")]
    MissingRow {
        /// Row index.
        index: usize,
        /// Simulation step.
        step: usize,
    },

    /// A visible row came from the wrong index or generation.
    #[error("row {index} at step {step} holds {found:?}")]
    WrongRow {
        /// Row index.
        index: usize,
        /// Simulation step.
        step: usize,
        /// Row actually returned.
        found: SyntheticRow,
    },
}

/// Run a scroll simulation.
///
/// # Errors
///
/// Returns [`SimulationError`] as soon as a visible row is absent or wrong.
pub fn run(
    params: &SimulationParams,
    config: CacheConfig,
) -> Result<SimulationReport, SimulationError> {
    info!(?params, ?config, "starting scroll simulation");

    let mut cache: ViewportDataCache<SyntheticRow> = ViewportDataCache::with_config(config);
    let mut rows_checked = 0u64;

    for step in 0..params.steps {
        let generation = params.generation(step);
        let viewport = ViewportInfo::with_height(params.first_visible(step), params.viewport_height);
        let mut loader = |range: IndexRange| -> Result<Vec<SyntheticRow>, Infallible> {
            Ok(range
                .iter()
                .map(|index| SyntheticRow::new(index, generation))
                .collect())
        };

        cache.update(viewport, TotalCount::Known(params.total), generation, &mut loader)?;

        let Some(visible) = viewport.clamp_to(params.total) else {
            continue;
        };
        for index in visible {
            let row = cache
                .get_data(index, &generation)
                .ok_or(SimulationError::MissingRow { index, step })?;
            if *row != SyntheticRow::new(index, generation) {
                return Err(SimulationError::WrongRow {
                    index,
                    step,
                    found: *row,
                });
            }
            rows_checked += 1;
        }
    }

    let report = SimulationReport {
        params: params.clone(),
        prefetch_margin: config.prefetch_margin,
        stats: *cache.stats(),
        final_range: cache.loaded_range(),
        rows_checked,
    };
    info!(stats = ?report.stats, rows_checked, "scroll simulation finished");
    Ok(report)
}
