//! Ranking of completed results against the fastest entry.
//!
//! Ordering uses average CPU time rather than wall time: CPU time is
//! insensitive to host scheduling noise, so a loaded machine reorders
//! nothing. The caller's result list is never touched; ranking is a derived
//! view of borrowed results.

use crate::schema::BenchResult;

/// One entry of a ranked view: the borrowed result plus its slowdown ratio
/// relative to the fastest entry (1.0 for the fastest itself).
#[derive(Debug, Clone, Copy)]
pub struct Ranked<'a> {
    pub result: &'a BenchResult,
    pub ratio: f64,
}

impl Ranked<'_> {
    /// Whether this entry is the comparison baseline.
    pub fn is_fastest(&self) -> bool {
        self.ratio == 1.0
    }
}

/// Sort results by average CPU time ascending and annotate each with its
/// slowdown ratio. The sort is stable: results with equal CPU averages keep
/// their input order.
pub fn rank(results: &[BenchResult]) -> Vec<Ranked<'_>> {
    let mut ordered: Vec<&BenchResult> = results.iter().collect();
    ordered.sort_by(|a, b| a.cpu_ms.avg.total_cmp(&b.cpu_ms.avg));

    let fastest = match ordered.first() {
        Some(r) => r.cpu_ms.avg,
        None => return Vec::new(),
    };

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, result)| Ranked {
            result,
            ratio: if i == 0 {
                1.0
            } else {
                result.cpu_ms.avg / fastest
            },
        })
        .collect()
}
