use serde::{Deserialize, Serialize};

/// Scan statistics for one metric family, in that family's unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Operation-count statistics: per-run total plus per-iteration extrema.
/// Signed so that a misbehaving provider's negative deltas survive into the
/// report instead of being clamped away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterStats {
    pub total: i64,
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbStats {
    pub writes: CounterStats,
    pub reads: CounterStats,
}

/// Aggregated outcome of one benchmark run. Terminal value object: produced
/// once, never mutated.
///
/// Optional families are either fully populated or absent. Absent means "not
/// tracked"; an all-zero entry means "tracked, and nothing happened" — the
/// two are deliberately distinguishable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchResult {
    pub name: String,
    /// Measured iterations contributing samples; warmup passes never count.
    pub iters: u64,
    pub wall_ms: MetricStats,
    pub cpu_ms: MetricStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heap_kb: Option<MetricStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db: Option<DbStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub harness_version: String,
    pub warmup_iters: u64,
    pub iters: u64,
    pub tracking: Vec<String>,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub run: RunMeta,
    pub results: Vec<BenchResult>,
}
