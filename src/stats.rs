//! Folds a per-iteration sample stream into a [`BenchResult`].

use crate::error::BenchError;
use crate::harness::{BenchConfig, Sample};
use crate::schema::{BenchResult, CounterStats, DbStats, MetricStats};

fn fold_metric(values: impl Iterator<Item = f64> + Clone, count: u64) -> MetricStats {
    let sum: f64 = values.clone().sum();
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    MetricStats {
        avg: sum / count as f64,
        min,
        max,
    }
}

fn fold_counter(values: impl Iterator<Item = i64> + Clone) -> CounterStats {
    let total: i64 = values.clone().sum();
    let min = values.clone().min().unwrap_or(0);
    let max = values.max().unwrap_or(0);
    CounterStats { total, min, max }
}

/// Aggregate one benchmark's sample stream under the configuration it was
/// collected with.
///
/// Averages are arithmetic means in f64, preserving sub-millisecond
/// resolution. Disabled families stay `None` in the result; an empty sample
/// stream is an error rather than a NaN-filled result.
pub fn aggregate(
    name: &str,
    samples: &[Sample],
    cfg: &BenchConfig,
) -> Result<BenchResult, BenchError> {
    if samples.is_empty() {
        return Err(BenchError::NoSamples(name.to_string()));
    }
    let count = samples.len() as u64;

    let wall_ms = fold_metric(samples.iter().map(|s| s.wall_ms), count);
    let cpu_ms = fold_metric(samples.iter().map(|s| s.cpu_ms), count);

    let heap_kb = cfg
        .track_heap
        .then(|| fold_metric(samples.iter().filter_map(|s| s.heap_kb), count));

    let db = cfg.track_db.then(|| DbStats {
        writes: fold_counter(samples.iter().filter_map(|s| s.db).map(|d| d.writes)),
        reads: fold_counter(samples.iter().filter_map(|s| s.db).map(|d| d.reads)),
    });

    Ok(BenchResult {
        name: name.to_string(),
        iters: count,
        wall_ms,
        cpu_ms,
        heap_kb,
        db,
    })
}
