use clap::ValueEnum;

pub mod compare;
pub mod error;
pub mod harness;
pub mod provider;
pub mod report;
pub mod schema;
pub mod stats;
pub mod suite;
pub mod workloads;

pub use error::BenchError;
pub use harness::{BenchConfig, Benchmark, Sample};
pub use provider::{MetricsProvider, ScriptedMetrics, StdMetrics};
pub use schema::BenchResult;
pub use suite::Suite;

/// Optional metric family collected alongside timing.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum TrackingFamily {
    /// Per-iteration heap-usage deltas (KB).
    Heap,
    /// Per-iteration database read/write operation counts.
    Database,
}
