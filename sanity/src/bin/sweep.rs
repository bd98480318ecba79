use sanity::*;
use fixfit::{reference_layout, KiloBytes, PartitionSpec, REFERENCE_JOBS, REFERENCE_MAX, REFERENCE_MIN};
use clap::Parser;
use rayon::prelude::*;
use log::{info, warn};

/// Verifies many seeded First-Fit runs against
/// an independent reference implementation.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of runs
    #[arg(short, long, default_value_t = 1000)]
    runs:       u64,

    /// Jobs per run
    #[arg(short, long, default_value_t = REFERENCE_JOBS)]
    jobs:       usize,

    /// Smallest job size (KB)
    #[arg(long, default_value_t = REFERENCE_MIN)]
    min:        KiloBytes,

    /// Largest job size (KB)
    #[arg(long, default_value_t = REFERENCE_MAX)]
    max:        KiloBytes,

    /// First seed; run `i` uses `seed + i`. Random if absent.
    #[arg(short, long)]
    seed:       Option<u64>,

    /// Partition as ID=CAPACITY (KB); repeat in scan order
    #[arg(short, long = "partition", value_parser = clap::value_parser!(PartitionSpec))]
    partitions: Vec<PartitionSpec>,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Args::parse();
    let layout = if cli.partitions.is_empty() {
        reference_layout()
    } else {
        cli.partitions
    };
    let base = cli.seed.unwrap_or_else(rand::random);
    info!("Sweeping {} runs from seed {}.", cli.runs, base);

    let outcomes = (0..cli.runs)
        .into_par_iter()
        .map(|i| run_seeded(&layout, cli.jobs, cli.min..=cli.max, base.wrapping_add(i)))
        .collect::<Result<Vec<_>, _>>()?;
    let report = SweepReport::collect(outcomes);
    for (seed, why) in &report.failures {
        warn!("Seed {} failed: {}", seed, why);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    anyhow::ensure!(report.failures.is_empty(), "{} of {} runs did not verify", report.failures.len(), report.runs);

    Ok(())
}
