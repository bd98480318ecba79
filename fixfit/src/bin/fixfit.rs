use fixfit::*;
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// First-Fit allocation over fixed memory partitions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Partition as ID=CAPACITY (KB); repeat in scan order.
    /// Defaults to P1=3000 P2=5000 P3=4000 P4=6000 P5=7000
    #[arg(short, long = "partition", value_parser = clap::value_parser!(PartitionSpec))]
    partitions: Vec<PartitionSpec>,

    /// Number of randomly sized jobs
    #[arg(short, long, default_value_t = REFERENCE_JOBS)]
    jobs:       usize,

    /// Smallest random job size (KB)
    #[arg(long, default_value_t = REFERENCE_MIN)]
    min:        KiloBytes,

    /// Largest random job size (KB)
    #[arg(long, default_value_t = REFERENCE_MAX)]
    max:        KiloBytes,

    /// Seed for the job size generator
    #[arg(short, long)]
    seed:       Option<u64>,

    /// Explicit job sizes (KB), comma separated
    #[arg(long, value_delimiter = ',', conflicts_with = "input")]
    sizes:      Option<Vec<KiloBytes>>,

    /// Path to an `id,size` CSV of jobs
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    input:      Option<PathBuf>,

    /// Print the run log as JSON instead of text
    #[arg(long)]
    json:       bool,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Args::parse();

    let layout = if cli.partitions.is_empty() {
        reference_layout()
    } else {
        cli.partitions
    };
    let allocator = Allocator::from_layout(&layout)?;

    let mut source: Box<dyn JobGen> = match (cli.sizes, cli.input) {
        (Some(sizes), _)    => { Box::new(ExplicitSizes(sizes)) },
        (None, Some(path))  => {
            anyhow::ensure!(path.is_file(), "Invalid input path {}", path.display());
            Box::new(CsvJobs::new(path))
        },
        (None, None)        => {
            Box::new(UniformSizes::new(cli.jobs, cli.min..=cli.max, cli.seed))
        }
    };
    let jobs = source.read_jobs()?;
    info!("Submitting {} jobs to {} partitions.", jobs.len(), allocator.len());

    let log = Simulation::new(allocator).run(&jobs)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        for line in render::report(&log) {
            println!("{}", line);
        }
    }

    Ok(())
}
