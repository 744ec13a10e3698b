//! Metric sources for the harness.
//!
//! The engine never reads clocks or counters directly; everything flows
//! through [`MetricsProvider`] so a run can be driven by the real process
//! metrics ([`StdMetrics`]) or by a scripted stand-in ([`ScriptedMetrics`])
//! that makes aggregation exactly reproducible under test.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Point-in-time readings consumed by the iteration runner.
///
/// Wall time, CPU time, and the cumulative operation counters are expected to
/// be monotonic non-decreasing within one process lifetime. The engine does
/// not police this: a misbehaving provider produces negative per-iteration
/// deltas, which are surfaced as-is rather than clamped, so a provider bug
/// stays visible in the output.
pub trait MetricsProvider {
    fn wall_time_ms(&self) -> f64;
    fn cpu_time_ms(&self) -> f64;
    fn heap_kb(&self) -> f64;
    /// Cumulative database-write operations since process start.
    fn write_count(&self) -> u64;
    /// Cumulative database-read operations since process start.
    fn read_count(&self) -> u64;
}

static HEAP_IN_USE: AtomicUsize = AtomicUsize::new(0);
static DB_WRITES: AtomicU64 = AtomicU64::new(0);
static DB_READS: AtomicU64 = AtomicU64::new(0);

/// Allocator wrapper feeding [`StdMetrics::heap_kb`].
///
/// Install at crate root to enable real heap tracking:
///
/// ```ignore
/// #[global_allocator]
/// static ALLOC: combench::provider::TrackingAlloc = combench::provider::TrackingAlloc;
/// ```
pub struct TrackingAlloc;

unsafe impl GlobalAlloc for TrackingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            HEAP_IN_USE.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        HEAP_IN_USE.fetch_sub(layout.size(), Ordering::Relaxed);
    }
}

/// Record one database-write operation against the process-wide counter.
///
/// Instrumented benchmark code calls this from inside `run()`; the provider
/// only ever reads the counter.
pub fn record_write() {
    DB_WRITES.fetch_add(1, Ordering::Relaxed);
}

/// Record one database-read operation against the process-wide counter.
pub fn record_read() {
    DB_READS.fetch_add(1, Ordering::Relaxed);
}

/// Real process metrics.
///
/// Wall time comes from a monotonic clock anchored at construction. CPU time
/// is reported from the same monotonic clock: on a single-threaded,
/// non-blocking workload the two track each other at the millisecond scale
/// this harness reports, but the reading is an approximation, not a
/// scheduler-aware thread time. Precision is a property of the provider;
/// the engine reports whatever it is handed.
pub struct StdMetrics {
    anchor: Instant,
}

impl StdMetrics {
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
        }
    }
}

impl Default for StdMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for StdMetrics {
    fn wall_time_ms(&self) -> f64 {
        self.anchor.elapsed().as_secs_f64() * 1e3
    }

    fn cpu_time_ms(&self) -> f64 {
        self.anchor.elapsed().as_secs_f64() * 1e3
    }

    fn heap_kb(&self) -> f64 {
        HEAP_IN_USE.load(Ordering::Relaxed) as f64 / 1024.0
    }

    fn write_count(&self) -> u64 {
        DB_WRITES.load(Ordering::Relaxed)
    }

    fn read_count(&self) -> u64 {
        DB_READS.load(Ordering::Relaxed)
    }
}

/// A scripted reading sequence: pops front-to-back, then repeats the last
/// value once exhausted.
#[derive(Debug, Default)]
struct Script {
    readings: VecDeque<f64>,
    last: f64,
}

impl Script {
    fn next(&mut self) -> f64 {
        if let Some(v) = self.readings.pop_front() {
            self.last = v;
        }
        self.last
    }
}

/// Deterministic provider for tests and examples.
///
/// Each metric consumes its own scripted sequence, one value per call, in
/// call order. The runner samples wall and CPU before and after every
/// measured pass, so a run with N iterations consumes 2N readings per
/// enabled time metric.
#[derive(Debug, Default)]
pub struct ScriptedMetrics {
    wall: RefCell<Script>,
    cpu: RefCell<Script>,
    heap: RefCell<Script>,
    writes: RefCell<Script>,
    reads: RefCell<Script>,
}

impl ScriptedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wall(self, readings: impl IntoIterator<Item = f64>) -> Self {
        self.wall.borrow_mut().readings = readings.into_iter().collect();
        self
    }

    pub fn cpu(self, readings: impl IntoIterator<Item = f64>) -> Self {
        self.cpu.borrow_mut().readings = readings.into_iter().collect();
        self
    }

    pub fn heap(self, readings: impl IntoIterator<Item = f64>) -> Self {
        self.heap.borrow_mut().readings = readings.into_iter().collect();
        self
    }

    pub fn writes(self, readings: impl IntoIterator<Item = u64>) -> Self {
        self.writes.borrow_mut().readings = readings.into_iter().map(|v| v as f64).collect();
        self
    }

    pub fn reads(self, readings: impl IntoIterator<Item = u64>) -> Self {
        self.reads.borrow_mut().readings = readings.into_iter().map(|v| v as f64).collect();
        self
    }

    /// Script wall and CPU as the same advancing clock: reading k returns
    /// `k * step_ms`. Convenient when every iteration should cost exactly
    /// `step_ms` milliseconds.
    pub fn ticking(step_ms: f64, readings: usize) -> Self {
        let seq: Vec<f64> = (0..readings).map(|k| k as f64 * step_ms).collect();
        Self::new().wall(seq.clone()).cpu(seq)
    }
}

impl MetricsProvider for ScriptedMetrics {
    fn wall_time_ms(&self) -> f64 {
        self.wall.borrow_mut().next()
    }

    fn cpu_time_ms(&self) -> f64 {
        self.cpu.borrow_mut().next()
    }

    fn heap_kb(&self) -> f64 {
        self.heap.borrow_mut().next()
    }

    fn write_count(&self) -> u64 {
        self.writes.borrow_mut().next() as u64
    }

    fn read_count(&self) -> u64 {
        self.reads.borrow_mut().next() as u64
    }
}
