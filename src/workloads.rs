//! Built-in demonstration workloads for the CLI runner.
//!
//! Each workload is deterministic for a given seed, so two invocations on
//! the same host measure the same work. They are chosen to exercise the
//! three metric families: `sort` is CPU-bound, `strings` is allocation-heavy
//! (visible under `--track heap` with the tracking allocator installed), and
//! `kv` drives the process-wide database-operation counters.

use std::collections::HashMap;

use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::BoxError;
use crate::harness::Benchmark;
use crate::provider::{record_read, record_write};

/// Demo workload selector.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum Workload {
    /// Sort a shuffled vector of 64-bit keys.
    Sort,
    /// Build and discard formatted strings.
    Strings,
    /// Mixed reads and writes against an instrumented in-memory store.
    Kv,
}

impl Workload {
    pub fn name(&self) -> &'static str {
        match self {
            Workload::Sort => "sort",
            Workload::Strings => "strings",
            Workload::Kv => "kv",
        }
    }

    pub fn instantiate(&self, seed: u64) -> Box<dyn Benchmark> {
        match self {
            Workload::Sort => Box::new(SortVec::new(seed)),
            Workload::Strings => Box::new(StringBuild::new(seed)),
            Workload::Kv => Box::new(KvStore::new(seed)),
        }
    }
}

const SORT_LEN: usize = 8_192;
const STRING_ROUNDS: usize = 512;
const KV_KEYS: u64 = 1_024;
const KV_OPS: usize = 256;

struct SortVec {
    seed: u64,
    data: Vec<u64>,
}

impl SortVec {
    fn new(seed: u64) -> Self {
        Self {
            seed,
            data: Vec::new(),
        }
    }
}

impl Benchmark for SortVec {
    fn setup(&mut self) -> Result<(), BoxError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.data = (0..SORT_LEN).map(|_| rng.r#gen()).collect();
        Ok(())
    }

    fn run(&mut self) -> Result<(), BoxError> {
        let mut scratch = self.data.clone();
        scratch.sort_unstable();
        std::hint::black_box(scratch);
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), BoxError> {
        self.data.clear();
        Ok(())
    }
}

struct StringBuild {
    rng: ChaCha8Rng,
}

impl StringBuild {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Benchmark for StringBuild {
    fn run(&mut self) -> Result<(), BoxError> {
        let mut acc = String::new();
        for i in 0..STRING_ROUNDS {
            let v: u32 = self.rng.r#gen();
            acc.push_str(&format!("{i}:{v:08x};"));
        }
        std::hint::black_box(acc);
        Ok(())
    }
}

struct KvStore {
    rng: ChaCha8Rng,
    store: HashMap<u64, u64>,
}

impl KvStore {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            store: HashMap::new(),
        }
    }
}

impl Benchmark for KvStore {
    fn setup(&mut self) -> Result<(), BoxError> {
        for k in 0..KV_KEYS {
            self.store.insert(k, k.wrapping_mul(0x9e37_79b9));
        }
        Ok(())
    }

    fn run(&mut self) -> Result<(), BoxError> {
        for _ in 0..KV_OPS {
            let key = self.rng.gen_range(0..KV_KEYS);
            if self.rng.gen_bool(0.25) {
                self.store.insert(key, self.rng.r#gen());
                record_write();
            } else {
                std::hint::black_box(self.store.get(&key));
                record_read();
            }
        }
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), BoxError> {
        self.store.clear();
        Ok(())
    }
}
