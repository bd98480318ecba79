use sanity::*;
use fixfit::RunLog;
use clap::Parser;

/// Checks a JSON run log (as printed by `fixfit --json`)
/// against the First-Fit rule.
#[derive(Parser, Debug)]
struct Arg {
    /// Path to the run log
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    input:  PathBuf,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Arg::parse();
    anyhow::ensure!(cli.input.is_file(), "File does not exist");
    let log: RunLog = serde_json::from_reader(std::io::BufReader::new(std::fs::File::open(&cli.input)?))?;
    verify_log(&log)?;
    let summary = log.summary();
    println!("Verified:\t{} jobs\nPlaced:\t\t{}\nRejected:\t{}\nUtilization:\t{:.2}%",
        log.steps.len(),
        summary.placed,
        summary.rejected,
        summary.utilization
    );

    Ok(())
}
