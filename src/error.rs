use std::io;

use thiserror::Error;

/// Boxed error type surfaced by benchmark lifecycle calls.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Lifecycle phase in which a benchmark failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Run,
    Teardown,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Run => "run",
            Phase::Teardown => "teardown",
        }
    }
}

#[derive(Debug, Error)]
pub enum BenchError {
    /// Measurement-iteration count below 1 is a configuration error, raised
    /// before any benchmark code executes.
    #[error("iteration count must be at least 1 (got {0})")]
    InvalidIterations(u64),

    /// Aggregating an empty sample stream would produce NaN statistics.
    #[error("no samples to aggregate for benchmark `{0}`")]
    NoSamples(String),

    /// A benchmark's setup/run/teardown call failed. Propagated as-is; a
    /// partial run never yields a result.
    #[error("benchmark `{name}` failed during {}: {source}", .phase.as_str())]
    Benchmark {
        name: String,
        phase: Phase,
        #[source]
        source: BoxError,
    },

    #[error("report I/O: {0}")]
    Io(#[from] io::Error),

    #[error("report serialization: {0}")]
    Json(#[from] serde_json::Error),
}
