use log::{debug, trace};

use crate::error::{BenchError, BoxError, Phase};
use crate::provider::MetricsProvider;

/// A named unit of measurable work.
///
/// `setup` and `teardown` run exactly once per benchmark, outside all
/// measurement; `run` is called `warmup + iters` times in total. Any failure
/// propagates to the caller unwrapped: a failing benchmark aborts its run
/// rather than contributing misleading statistics.
pub trait Benchmark {
    fn setup(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    fn run(&mut self) -> Result<(), BoxError>;

    fn teardown(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Shared run configuration. One instance covers every benchmark in a suite;
/// no per-benchmark overrides exist, so ranked results are always produced
/// under identical conditions.
#[derive(Clone, Debug)]
pub struct BenchConfig {
    /// Unmeasured run() calls before measurement starts.
    pub warmup_iters: u64,
    /// Measured run() calls; each contributes one [`Sample`].
    pub iters: u64,
    pub track_heap: bool,
    pub track_db: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            warmup_iters: 10,
            iters: 100,
            track_heap: false,
            track_db: false,
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.iters < 1 {
            return Err(BenchError::InvalidIterations(self.iters));
        }
        Ok(())
    }
}

/// Per-iteration database-operation deltas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DbDelta {
    pub writes: i64,
    pub reads: i64,
}

/// Metric deltas from one measured iteration. Ephemeral: consumed by the
/// aggregator, never retained individually.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub wall_ms: f64,
    pub cpu_ms: f64,
    /// Present only when heap tracking is enabled.
    pub heap_kb: Option<f64>,
    /// Present only when database tracking is enabled.
    pub db: Option<DbDelta>,
}

fn lifecycle<F>(name: &str, phase: Phase, f: F) -> Result<(), BenchError>
where
    F: FnOnce() -> Result<(), BoxError>,
{
    f().map_err(|source| BenchError::Benchmark {
        name: name.to_string(),
        phase,
        source,
    })
}

/// Execute one benchmark: setup, warmup, measured iterations, teardown.
///
/// Samples are emitted in iteration order. Setup, warmup, and teardown cost
/// never reaches a sample; the cumulative database counters are differenced
/// around each measured pass, so per-iteration cost is a delta even though
/// the counters are process-wide and monotonic.
pub fn run_benchmark(
    name: &str,
    bench: &mut dyn Benchmark,
    cfg: &BenchConfig,
    provider: &dyn MetricsProvider,
) -> Result<Vec<Sample>, BenchError> {
    cfg.validate()?;

    lifecycle(name, Phase::Setup, || bench.setup())?;

    for i in 0..cfg.warmup_iters {
        trace!("{name}: warmup pass {i}");
        lifecycle(name, Phase::Run, || bench.run())?;
    }

    let mut samples = Vec::with_capacity(cfg.iters as usize);
    for i in 0..cfg.iters {
        let heap_before = cfg.track_heap.then(|| provider.heap_kb());
        let db_before = cfg
            .track_db
            .then(|| (provider.write_count(), provider.read_count()));
        let wall_before = provider.wall_time_ms();
        let cpu_before = provider.cpu_time_ms();

        lifecycle(name, Phase::Run, || bench.run())?;

        let wall_after = provider.wall_time_ms();
        let cpu_after = provider.cpu_time_ms();
        let heap_after = cfg.track_heap.then(|| provider.heap_kb());
        let db_after = cfg
            .track_db
            .then(|| (provider.write_count(), provider.read_count()));

        let sample = Sample {
            wall_ms: wall_after - wall_before,
            cpu_ms: cpu_after - cpu_before,
            heap_kb: heap_before
                .zip(heap_after)
                .map(|(before, after)| after - before),
            db: db_before.zip(db_after).map(|((w0, r0), (w1, r1))| DbDelta {
                writes: w1 as i64 - w0 as i64,
                reads: r1 as i64 - r0 as i64,
            }),
        };
        trace!("{name}: pass {i}: {sample:?}");
        samples.push(sample);
    }

    lifecycle(name, Phase::Teardown, || bench.teardown())?;

    debug!(
        "{name}: collected {} samples ({} warmup passes discarded)",
        samples.len(),
        cfg.warmup_iters
    );
    Ok(samples)
}

impl<B: Benchmark + ?Sized> Benchmark for Box<B> {
    fn setup(&mut self) -> Result<(), BoxError> {
        (**self).setup()
    }

    fn run(&mut self) -> Result<(), BoxError> {
        (**self).run()
    }

    fn teardown(&mut self) -> Result<(), BoxError> {
        (**self).teardown()
    }
}

/// Adapter running a closure as a benchmark, for one-off measurements that
/// need no setup or teardown.
pub struct FnBenchmark<F: FnMut() -> Result<(), BoxError>>(pub F);

impl<F: FnMut() -> Result<(), BoxError>> Benchmark for FnBenchmark<F> {
    fn run(&mut self) -> Result<(), BoxError> {
        (self.0)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ScriptedMetrics;

    struct Counting {
        setups: u32,
        runs: u32,
        teardowns: u32,
        fail_on_run: Option<u32>,
    }

    impl Counting {
        fn new() -> Self {
            Self {
                setups: 0,
                runs: 0,
                teardowns: 0,
                fail_on_run: None,
            }
        }
    }

    impl Benchmark for Counting {
        fn setup(&mut self) -> Result<(), BoxError> {
            self.setups += 1;
            Ok(())
        }

        fn run(&mut self) -> Result<(), BoxError> {
            self.runs += 1;
            if Some(self.runs) == self.fail_on_run {
                return Err("synthetic failure".into());
            }
            Ok(())
        }

        fn teardown(&mut self) -> Result<(), BoxError> {
            self.teardowns += 1;
            Ok(())
        }
    }

    #[test]
    fn lifecycle_call_counts() {
        let mut b = Counting::new();
        let cfg = BenchConfig {
            warmup_iters: 3,
            iters: 5,
            ..Default::default()
        };
        let provider = ScriptedMetrics::new();
        let samples = run_benchmark("counting", &mut b, &cfg, &provider).unwrap();
        assert_eq!(samples.len(), 5);
        assert_eq!(b.setups, 1);
        assert_eq!(b.runs, 8);
        assert_eq!(b.teardowns, 1);
    }

    #[test]
    fn zero_iterations_rejected_before_setup() {
        let mut b = Counting::new();
        let cfg = BenchConfig {
            iters: 0,
            ..Default::default()
        };
        let err = run_benchmark("counting", &mut b, &cfg, &ScriptedMetrics::new()).unwrap_err();
        assert!(matches!(err, BenchError::InvalidIterations(0)));
        assert_eq!(b.setups, 0);
    }

    #[test]
    fn warmup_consumes_no_readings() {
        // 2 iterations consume exactly 4 cpu readings regardless of warmup.
        let provider = ScriptedMetrics::new().cpu([0.0, 1.0, 1.0, 3.0]).wall([0.0; 4]);
        let mut b = Counting::new();
        let cfg = BenchConfig {
            warmup_iters: 7,
            iters: 2,
            ..Default::default()
        };
        let samples = run_benchmark("counting", &mut b, &cfg, &provider).unwrap();
        assert_eq!(samples[0].cpu_ms, 1.0);
        assert_eq!(samples[1].cpu_ms, 2.0);
    }

    #[test]
    fn closure_adapter_runs() {
        let mut calls = 0u32;
        let cfg = BenchConfig {
            warmup_iters: 1,
            iters: 3,
            ..Default::default()
        };
        {
            let mut bench = FnBenchmark(|| {
                calls += 1;
                Ok(())
            });
            run_benchmark("closure", &mut bench, &cfg, &ScriptedMetrics::new()).unwrap();
        }
        assert_eq!(calls, 4);
    }

    #[test]
    fn disabled_families_are_absent() {
        let mut b = Counting::new();
        let cfg = BenchConfig {
            warmup_iters: 0,
            iters: 1,
            ..Default::default()
        };
        let samples = run_benchmark("counting", &mut b, &cfg, &ScriptedMetrics::new()).unwrap();
        assert!(samples[0].heap_kb.is_none());
        assert!(samples[0].db.is_none());
    }

    #[test]
    fn db_deltas_come_from_cumulative_counters() {
        let provider = ScriptedMetrics::new()
            .writes([100, 103, 103, 110])
            .reads([7, 7, 7, 9]);
        let mut b = Counting::new();
        let cfg = BenchConfig {
            warmup_iters: 0,
            iters: 2,
            track_db: true,
            ..Default::default()
        };
        let samples = run_benchmark("counting", &mut b, &cfg, &provider).unwrap();
        assert_eq!(samples[0].db.unwrap(), DbDelta { writes: 3, reads: 0 });
        assert_eq!(samples[1].db.unwrap(), DbDelta { writes: 7, reads: 2 });
    }

    #[test]
    fn run_failure_propagates_with_phase() {
        let mut b = Counting::new();
        b.fail_on_run = Some(5);
        let cfg = BenchConfig {
            warmup_iters: 0,
            iters: 10,
            ..Default::default()
        };
        let err = run_benchmark("counting", &mut b, &cfg, &ScriptedMetrics::new()).unwrap_err();
        match err {
            BenchError::Benchmark { name, phase, .. } => {
                assert_eq!(name, "counting");
                assert_eq!(phase, Phase::Run);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Aborted before teardown; no partial aggregation happens upstream.
        assert_eq!(b.teardowns, 0);
    }
}
