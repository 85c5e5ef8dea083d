//! `<prog> <config.yaml>` (§6): the thin command-line surface around
//! `dispatch_runner`. Mirrors `xtask::Cli`'s `#[derive(Parser)]` style, cut
//! down to §6's single-positional-argument surface.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "dispatch", about = "Run a batch-dispatcher scenario from a YAML config file")]
struct Cli {
    /// Path to the YAML scenario configuration.
    config: PathBuf,

    /// Grid side length for the built-in demo router.
    #[arg(long, default_value_t = 20)]
    grid_side: usize,

    /// Demand arrival rate, requests per millisecond.
    #[arg(long, default_value_t = 0.01)]
    demand_rate_per_ms: f64,

    /// RNG seed for the demo demand generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Append one JSON line per epoch to this file instead of discarding it.
    #[arg(long)]
    datalog: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match dispatch_runner::config::load(&cli.config) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("dispatch: {error}");
            return ExitCode::FAILURE;
        }
    };

    let mut scenario = dispatch_runner::build_scenario(config, cli.grid_side, cli.demand_rate_per_ms, cli.seed);

    let mut datalog_file = match cli.datalog.as_ref() {
        Some(path) => match std::fs::File::create(path) {
            Ok(file) => Some(file),
            Err(error) => {
                eprintln!("dispatch: failed to open datalog file {}: {error}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let result = match datalog_file.as_mut() {
        Some(file) => dispatch_runner::run(&mut scenario, Some(file)),
        None => dispatch_runner::run(&mut scenario, None),
    };

    match result {
        Ok(summaries) => {
            println!("dispatch: ran {} epochs", summaries.len());
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("dispatch: {error}");
            ExitCode::FAILURE
        }
    }
}
