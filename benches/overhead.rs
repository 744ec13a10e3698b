//! Harness-overhead benchmarks
//!
//! Measures the cost the engine adds around the measured code:
//! - the per-iteration sampling protocol with a no-op benchmark
//! - aggregation over pre-collected sample streams
//! - ranking of a populated result list

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use combench::error::BoxError;
use combench::harness::{run_benchmark, BenchConfig, Benchmark, Sample};
use combench::provider::ScriptedMetrics;
use combench::schema::MetricStats;
use combench::{compare, stats, BenchResult};

struct Noop;

impl Benchmark for Noop {
    fn run(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

fn bench_sampling_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling_loop");

    for iters in [10u64, 100, 1_000] {
        group.bench_with_input(BenchmarkId::new("noop", iters), &iters, |b, &iters| {
            let cfg = BenchConfig {
                warmup_iters: 0,
                iters,
                ..Default::default()
            };
            b.iter(|| {
                let provider = ScriptedMetrics::new();
                let mut bench = Noop;
                run_benchmark("noop", &mut bench, &cfg, &provider).unwrap()
            })
        });
    }

    group.bench_function("noop_all_families", |b| {
        let cfg = BenchConfig {
            warmup_iters: 0,
            iters: 100,
            track_heap: true,
            track_db: true,
        };
        b.iter(|| {
            let provider = ScriptedMetrics::new();
            let mut bench = Noop;
            run_benchmark("noop", &mut bench, &cfg, &provider).unwrap()
        })
    });

    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");

    for n in [100usize, 10_000] {
        let samples: Vec<Sample> = (0..n)
            .map(|i| Sample {
                wall_ms: i as f64 * 0.001,
                cpu_ms: i as f64 * 0.001,
                heap_kb: None,
                db: None,
            })
            .collect();
        let cfg = BenchConfig::default();
        group.bench_with_input(BenchmarkId::new("time_only", n), &samples, |b, samples| {
            b.iter(|| stats::aggregate("agg", black_box(samples), &cfg).unwrap())
        });
    }

    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let results: Vec<BenchResult> = (0..64)
        .map(|i| {
            let stats = MetricStats {
                avg: (i % 7) as f64 + 1.0,
                min: 1.0,
                max: 8.0,
            };
            BenchResult {
                name: format!("bench-{i}"),
                iters: 100,
                wall_ms: stats,
                cpu_ms: stats,
                heap_kb: None,
                db: None,
            }
        })
        .collect();

    c.bench_function("rank_64", |b| b.iter(|| compare::rank(black_box(&results))));
}

criterion_group!(benches, bench_sampling_loop, bench_aggregation, bench_ranking);
criterion_main!(benches);
