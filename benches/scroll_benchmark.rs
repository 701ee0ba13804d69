//! Scroll benchmarks for the viewport data cache.
//!
//! Measures the cost of a single `update` at different scroll distances
//! over a 10M-row collection, plus a full simulated session.
//!
//! Run with: cargo bench --bench scroll_benchmark

#![allow(missing_docs)] // criterion macros generate undocumented items

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::convert::Infallible;
use viewport_cache::sim::{self, SimulationParams};
use viewport_cache::{CacheConfig, IndexRange, TotalCount, ViewportDataCache, ViewportInfo};

const TOTAL: usize = 10_000_000;
const VIEWPORT_HEIGHT: usize = 60;
const MARGIN: usize = 64;

/// How far the viewport moves between two updates.
#[derive(Debug, Clone, Copy)]
enum ScrollDistance {
    /// Stays inside the loaded range.
    Line,
    /// Leaves the loaded range but still overlaps it.
    Page,
    /// Lands far away; nothing is retained.
    Jump,
}

impl ScrollDistance {
    fn name(&self) -> &'static str {
        match self {
            ScrollDistance::Line => "line",
            ScrollDistance::Page => "page",
            ScrollDistance::Jump => "jump",
        }
    }

    fn rows(&self) -> usize {
        match self {
            ScrollDistance::Line => 1,
            ScrollDistance::Page => VIEWPORT_HEIGHT + MARGIN,
            ScrollDistance::Jump => TOTAL / 2,
        }
    }
}

fn loader(range: IndexRange) -> Result<Vec<u64>, Infallible> {
    Ok(range.iter().map(|i| i as u64).collect())
}

/// Cache already holding the window around row `first`.
fn warmed_cache(first: usize) -> ViewportDataCache<u64> {
    let mut cache = ViewportDataCache::with_prefetch_margin(MARGIN);
    let _ = cache.update(
        ViewportInfo::with_height(first, VIEWPORT_HEIGHT),
        TotalCount::Known(TOTAL),
        0,
        &mut loader,
    );
    cache
}

/// Benchmark one update after scrolling by each distance.
fn benchmark_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_after_scroll");

    for distance in [ScrollDistance::Line, ScrollDistance::Page, ScrollDistance::Jump] {
        group.bench_with_input(
            BenchmarkId::new("distance", distance.name()),
            &distance,
            |b, &distance| {
                b.iter_batched(
                    || warmed_cache(1_000),
                    |mut cache| {
                        let outcome = cache.update(
                            ViewportInfo::with_height(1_000 + distance.rows(), VIEWPORT_HEIGHT),
                            TotalCount::Known(TOTAL),
                            0,
                            &mut loader,
                        );
                        black_box((outcome, cache))
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark reading every visible row, as a renderer would per frame.
fn benchmark_get_data(c: &mut Criterion) {
    let cache = warmed_cache(5_000);

    c.bench_function("get_data_visible_page", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for i in 5_000..5_000 + VIEWPORT_HEIGHT {
                sum += cache.get_data(black_box(i), &0).copied().unwrap_or_default();
            }
            black_box(sum)
        })
    });
}

/// Benchmark a whole simulated scroll session.
fn benchmark_session(c: &mut Criterion) {
    let params = SimulationParams {
        total: 1_000_000,
        viewport_height: VIEWPORT_HEIGHT,
        steps: 1_000,
        step_size: 7,
        restamp_every: Some(250),
    };
    let config = CacheConfig {
        prefetch_margin: MARGIN,
    };

    c.bench_function("simulated_session_1000_steps", |b| {
        b.iter(|| black_box(sim::run(&params, config)))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(std::time::Duration::from_secs(5));
    targets =
        benchmark_update,
        benchmark_get_data,
        benchmark_session
}

criterion_main!(benches);
