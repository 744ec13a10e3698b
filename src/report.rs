//! Human-readable and JSON rendering of results.

use std::fs;
use std::path::Path;

use crate::compare::Ranked;
use crate::error::BenchError;
use crate::harness::BenchConfig;
use crate::schema::{BenchReport, BenchResult, RunMeta};

/// Render one result as a single report line.
pub fn render_result(r: &BenchResult) -> String {
    let mut line = format!(
        "{}: {} iters | wall avg {:.3} ms ({:.3}..{:.3}) | cpu avg {:.3} ms ({:.3}..{:.3})",
        r.name,
        r.iters,
        r.wall_ms.avg,
        r.wall_ms.min,
        r.wall_ms.max,
        r.cpu_ms.avg,
        r.cpu_ms.min,
        r.cpu_ms.max,
    );
    if let Some(heap) = &r.heap_kb {
        line.push_str(&format!(
            " | heap avg {:.1} KB ({:.1}..{:.1})",
            heap.avg, heap.min, heap.max
        ));
    }
    if let Some(db) = &r.db {
        line.push_str(&format!(
            " | writes {} ({}..{}) | reads {} ({}..{})",
            db.writes.total, db.writes.min, db.writes.max, db.reads.total, db.reads.min, db.reads.max
        ));
    }
    line
}

/// Render a ranked view, slowest last. The fastest entry carries no ratio
/// annotation; every other entry ends with its slowdown, e.g. `2.00x`.
pub fn render_ranked(ranked: &[Ranked<'_>]) -> Vec<String> {
    ranked
        .iter()
        .map(|entry| {
            let base = render_result(entry.result);
            if entry.is_fastest() {
                base
            } else {
                format!("{base} | {:.2}x", entry.ratio)
            }
        })
        .collect()
}

fn now_utc() -> String {
    // Good enough for report stamps without a chrono dependency.
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn git_sha_short() -> Option<String> {
    // Best-effort: read from environment set by CI/build scripts.
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

/// Assemble the JSON report envelope for a finished run.
pub fn build_report(cfg: &BenchConfig, results: Vec<BenchResult>) -> BenchReport {
    let mut tracking = vec!["time".to_string()];
    if cfg.track_heap {
        tracking.push("heap".to_string());
    }
    if cfg.track_db {
        tracking.push("database".to_string());
    }
    BenchReport {
        run: RunMeta {
            schema_version: 1,
            harness_version: env!("CARGO_PKG_VERSION").to_string(),
            warmup_iters: cfg.warmup_iters,
            iters: cfg.iters,
            tracking,
            timestamp_utc: now_utc(),
            git_sha: git_sha_short(),
        },
        results,
    }
}

/// Serialize a report to pretty JSON at `path`.
pub fn write_report(path: &Path, report: &BenchReport) -> Result<(), BenchError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}
