//! bubble-ist: build the independent spanning trees of `B_n` from the command line

use anyhow::Context as _;
use bubble_ist::export::{export_dot, RunReport};
use bubble_ist::utils::timing::Timer;
use bubble_ist::verify::verify_forest;
use bubble_ist::{Context, PartitionPolicy, RunConfig, TreeAssembler};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Independent spanning trees of the bubble-sort network
#[derive(Parser, Debug)]
#[command(name = "bubble-ist", author, version, about, long_about = None)]
struct Cli {
    /// Network size, 2 to 10
    n: usize,

    /// Number of worker units; worker 0 coordinates
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Concurrent lanes per worker [default: available parallelism]
    #[arg(long)]
    lanes: Option<usize>,

    /// How trees are assigned to workers
    #[arg(long, value_name = "POLICY", default_value = "contiguous")]
    partition: PartitionPolicy,

    /// Seconds the coordinator waits for outstanding trees
    #[arg(long, value_name = "S", default_value_t = 300)]
    deadline_secs: u64,

    /// Directory for the DOT files
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Skip writing DOT files
    #[arg(long)]
    no_export: bool,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Check spanning, adjacency and independence after construction
    #[arg(long)]
    verify: bool,

    /// Vertices sampled by the independence check; all of them when larger than n!
    #[arg(long, value_name = "K", default_value_t = 1000)]
    verify_samples: usize,

    /// Seed for the sampled independence check
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        let mut config = RunConfig::for_n(self.n)
            .with_workers(self.workers)
            .with_partition(self.partition)
            .with_deadline(Duration::from_secs(self.deadline_secs));
        if let Some(lanes) = self.lanes {
            config = config.with_lanes(lanes);
        }
        config.output_dir = self.output_dir;
        config.export_dot = !self.no_export;
        config.report = self.report;
        config.verify = self.verify;
        config.verify_samples = self.verify_samples;
        config.seed = self.seed;
        config
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bubble_ist=info".into()),
        )
        .with_target(false)
        .init();
}

fn run() -> anyhow::Result<()> {
    let config = Cli::parse().into_config();
    init_tracing();
    config.validate().context("invalid arguments")?;

    let _total = Timer::new("Total execution time");
    info!(
        "Bubble-sort network B_{}: {} workers, {} lanes each, {} partition",
        config.n, config.workers, config.lanes, config.partition
    );

    let start = Instant::now();
    let ctx = Arc::new(Context::build(config.n).context("building the permutation universe")?);
    info!("Universe ready: {} vertices, {} trees", ctx.vertex_count(), ctx.tree_count());

    let forest = TreeAssembler::new(Arc::clone(&ctx), config.clone())?
        .run()
        .context("constructing the spanning trees")?;
    let elapsed = start.elapsed();

    if config.export_dot {
        let paths = export_dot(&ctx, &forest, &config.output_dir)
            .with_context(|| format!("writing DOT files to {}", config.output_dir.display()))?;
        info!("Wrote {} DOT files", paths.len());
    }

    let verification = if config.verify {
        Some(
            verify_forest(&ctx, &forest, Some(config.verify_samples), config.seed)
                .context("verifying the spanning trees")?,
        )
    } else {
        None
    };

    if let Some(path) = &config.report {
        let mut report = RunReport::new(&config, &forest, elapsed);
        if let Some(verification) = verification {
            report = report.with_verification(verification);
        }
        report
            .save(path)
            .with_context(|| format!("writing report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}
