use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use combench::workloads::Workload;
use combench::{compare, report, BenchError, StdMetrics, Suite, TrackingFamily};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};

// Real heap readings require the tracking allocator to be the process
// allocator, so the CLI installs it unconditionally.
#[global_allocator]
static ALLOC: combench::provider::TrackingAlloc = combench::provider::TrackingAlloc;

#[derive(Subcommand, Debug)]
enum Command {
    /// Run workloads and print one result line per benchmark.
    Run {
        /// Workloads to run; all of them when omitted.
        #[arg(long, value_enum, num_args = 1..)]
        workload: Vec<Workload>,
    },

    /// Run workloads and print the ranked comparison, fastest first.
    Compare {
        /// Workloads to compare; all of them when omitted.
        #[arg(long, value_enum, num_args = 1..)]
        workload: Vec<Workload>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "combench")]
#[command(about = "Comparative micro-benchmark runner (optional JSON report)")]
struct Args {
    /// Unmeasured warmup iterations per benchmark.
    #[arg(long, default_value_t = 10, global = true)]
    warmup: u64,

    /// Measured iterations per benchmark.
    #[arg(long, default_value_t = 100, global = true)]
    iters: u64,

    /// Optional metric families to collect (time is always collected).
    #[arg(long, value_enum, global = true)]
    track: Vec<TrackingFamily>,

    /// Seed for the deterministic demo workloads.
    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Where to write the JSON report; omitted for console-only output.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[arg(long, default_value = "info", global = true)]
    log_level: LevelFilter,

    #[command(subcommand)]
    cmd: Command,
}

fn init_logging(level: LevelFilter) -> Result<(), BenchError> {
    let stderr = ConsoleAppender::builder().target(Target::Stderr).build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(io::Error::other)?;
    log4rs::init_config(config).map_err(io::Error::other)?;
    Ok(())
}

fn selected(workloads: &[Workload]) -> Vec<Workload> {
    if workloads.is_empty() {
        vec![Workload::Sort, Workload::Strings, Workload::Kv]
    } else {
        workloads.to_vec()
    }
}

fn build_suite(args: &Args, workloads: &[Workload]) -> Suite<StdMetrics> {
    let mut suite = Suite::new(StdMetrics::new())
        .warmup_iters(args.warmup)
        .iters(args.iters);
    for family in &args.track {
        suite = suite.track(*family);
    }
    for w in workloads {
        suite = suite.add(w.name(), w.instantiate(args.seed));
    }
    suite
}

fn main() -> Result<(), BenchError> {
    let args = Args::parse();
    init_logging(args.log_level)?;

    let (results, cfg) = match &args.cmd {
        Command::Run { workload } => {
            let mut suite = build_suite(&args, &selected(workload));
            let results = suite.run_all()?;
            for r in &results {
                println!("{}", report::render_result(r));
            }
            (results, suite.config().clone())
        }
        Command::Compare { workload } => {
            let mut suite = build_suite(&args, &selected(workload));
            let results = suite.run_and_compare()?;
            for line in report::render_ranked(&compare::rank(&results)) {
                println!("{line}");
            }
            (results, suite.config().clone())
        }
    };

    if let Some(out) = &args.out {
        let bench_report = report::build_report(&cfg, results);
        report::write_report(out, &bench_report)?;
    }

    Ok(())
}
