use std::process::ExitCode;

use clap::{Parser, Subcommand};
use runway::{generate::WorkloadGenerator, logging, simulation::Simulate};
use tracing::error;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct RunwayTools {
    #[command(subcommand)]
    command: Command,
    /// Enable debug output
    #[clap(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    Generate(WorkloadGenerator),
    Simulate(Simulate)
}

fn main() -> ExitCode {
    let cli = RunwayTools::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Command::Generate(generate) => match generate.generate() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            },
        },
        Command::Simulate(simulate) => match simulate.simulate() {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e}");
                ExitCode::from(e.exit_code())
            },
        },
    }
}
