use log::{debug, info};

use crate::compare;
use crate::error::BenchError;
use crate::harness::{run_benchmark, BenchConfig, Benchmark};
use crate::provider::MetricsProvider;
use crate::report;
use crate::schema::BenchResult;
use crate::stats;
use crate::TrackingFamily;

/// A set of named benchmarks sharing one configuration.
///
/// Built by chaining: add benchmarks and adjust configuration in any order,
/// then call [`run_all`](Suite::run_all) or
/// [`run_and_compare`](Suite::run_and_compare). The configuration is captured
/// once per run and applied to every member identically; no per-benchmark
/// overrides exist, which is what makes the resulting ranking a fair
/// comparison.
pub struct Suite<P: MetricsProvider> {
    provider: P,
    cfg: BenchConfig,
    benchmarks: Vec<(String, Box<dyn Benchmark>)>,
}

impl<P: MetricsProvider> Suite<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            cfg: BenchConfig::default(),
            benchmarks: Vec::new(),
        }
    }

    pub fn add(mut self, name: impl Into<String>, bench: impl Benchmark + 'static) -> Self {
        self.benchmarks.push((name.into(), Box::new(bench)));
        self
    }

    pub fn warmup_iters(mut self, n: u64) -> Self {
        self.cfg.warmup_iters = n;
        self
    }

    pub fn iters(mut self, n: u64) -> Self {
        self.cfg.iters = n;
        self
    }

    pub fn track(mut self, family: TrackingFamily) -> Self {
        match family {
            TrackingFamily::Heap => self.cfg.track_heap = true,
            TrackingFamily::Database => self.cfg.track_db = true,
        }
        self
    }

    pub fn track_heap(self) -> Self {
        self.track(TrackingFamily::Heap)
    }

    pub fn track_db(self) -> Self {
        self.track(TrackingFamily::Database)
    }

    pub fn config(&self) -> &BenchConfig {
        &self.cfg
    }

    /// Run every benchmark in addition order under the shared configuration.
    ///
    /// An empty suite yields an empty list. The first benchmark failure
    /// aborts the whole call: a comparison over the survivors would be
    /// misleading, so later members do not execute.
    pub fn run_all(&mut self) -> Result<Vec<BenchResult>, BenchError> {
        self.cfg.validate()?;
        let cfg = self.cfg.clone();

        let mut results = Vec::with_capacity(self.benchmarks.len());
        for (name, bench) in &mut self.benchmarks {
            info!(
                "running `{name}` ({} warmup + {} measured iterations)",
                cfg.warmup_iters, cfg.iters
            );
            let samples = run_benchmark(name, bench.as_mut(), &cfg, &self.provider)?;
            let result = stats::aggregate(name, &samples, &cfg)?;
            debug!(
                "`{name}`: wall avg {:.3} ms, cpu avg {:.3} ms",
                result.wall_ms.avg, result.cpu_ms.avg
            );
            results.push(result);
        }
        Ok(results)
    }

    /// [`run_all`](Suite::run_all), then log the ranked comparison.
    ///
    /// Ranking is presentation only: the returned list is the same one
    /// `run_all` produced, still in addition order.
    pub fn run_and_compare(&mut self) -> Result<Vec<BenchResult>, BenchError> {
        let results = self.run_all()?;
        let ranked = compare::rank(&results);
        for line in report::render_ranked(&ranked) {
            info!("{line}");
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::provider::ScriptedMetrics;

    struct Noop;

    impl Benchmark for Noop {
        fn run(&mut self) -> Result<(), BoxError> {
            Ok(())
        }
    }

    struct Failing;

    impl Benchmark for Failing {
        fn run(&mut self) -> Result<(), BoxError> {
            Err("boom".into())
        }
    }

    #[test]
    fn empty_suite_runs_to_empty_list() {
        let mut suite = Suite::new(ScriptedMetrics::new());
        let results = suite.run_all().unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn results_keep_addition_order() {
        let mut suite = Suite::new(ScriptedMetrics::ticking(1.0, 64))
            .warmup_iters(0)
            .iters(2)
            .add("zeta", Noop)
            .add("alpha", Noop);
        let results = suite.run_all().unwrap();
        assert_eq!(results[0].name, "zeta");
        assert_eq!(results[1].name, "alpha");
    }

    #[test]
    fn shared_config_reaches_every_result() {
        let mut suite = Suite::new(ScriptedMetrics::new())
            .warmup_iters(3)
            .iters(7)
            .track_heap()
            .add("a", Noop)
            .add("b", Noop);
        let results = suite.run_all().unwrap();
        for r in &results {
            assert_eq!(r.iters, 7);
            assert!(r.heap_kb.is_some());
            assert!(r.db.is_none());
        }
    }

    #[test]
    fn failure_aborts_remaining_members() {
        let mut suite = Suite::new(ScriptedMetrics::new())
            .warmup_iters(0)
            .iters(3)
            .add("ok", Noop)
            .add("bad", Failing)
            .add("never", Noop);
        let err = suite.run_all().unwrap_err();
        assert!(matches!(err, BenchError::Benchmark { ref name, .. } if name == "bad"));
    }

    #[test]
    fn invalid_iterations_rejected_up_front() {
        let mut suite = Suite::new(ScriptedMetrics::new()).iters(0).add("a", Noop);
        assert!(matches!(
            suite.run_all().unwrap_err(),
            BenchError::InvalidIterations(0)
        ));
    }

    #[test]
    fn compare_returns_addition_order_unchanged() {
        // `fast` measures 1 ms/iter, `slow` 2 ms/iter, added slow-first.
        let cpu: Vec<f64> = vec![0.0, 2.0, 4.0, 6.0, 10.0, 11.0, 12.0, 13.0];
        let provider = ScriptedMetrics::new().cpu(cpu).wall([0.0; 8]);
        let mut suite = Suite::new(provider)
            .warmup_iters(0)
            .iters(2)
            .add("slow", Noop)
            .add("fast", Noop);
        let results = suite.run_and_compare().unwrap();
        assert_eq!(results[0].name, "slow");
        assert_eq!(results[0].cpu_ms.avg, 2.0);
        assert_eq!(results[1].name, "fast");
        assert_eq!(results[1].cpu_ms.avg, 1.0);
    }
}
