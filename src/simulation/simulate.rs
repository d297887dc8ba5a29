use std::{fs::File, io::BufWriter};

use clap::Args;
use tracing::info;

use crate::{seed::seeded_rng, workload::Workload};
use super::{config::RunwayConfig, orchestrator::{fleet, Orchestrator, SimulationReport}, SimulationError};

#[derive(Debug, Args)]
pub struct Simulate {
    /// The path to the workload file
    #[clap(short, long)]
    pub workload: String,
    /// An optional JSON file overriding the runway rules and timings
    #[clap(short, long)]
    pub config: Option<String>,
    /// An optional seed for the fuel reserves
    #[clap(short, long)]
    pub seed: Option<u128>,
    /// Wall-clock length of one time unit, in milliseconds
    #[clap(short, long)]
    pub time_unit_ms: Option<u64>,
    /// If present, the path where to write the run report (JSON)
    #[clap(short, long)]
    pub output: Option<String>,
    /// If present, the path where to write the recorded events (JSON)
    #[clap(short, long)]
    pub events: Option<String>,
}

impl Simulate {
    pub fn simulate(&self) -> Result<SimulationReport, SimulationError> {
        let config = self.config()?;
        let workload = Workload::from_file(&self.workload, config.max_aircraft)?;
        info!(path = %self.workload, aircraft = workload.entries.len(), "workload loaded");
        let fleet = fleet(&workload, &config, &mut seeded_rng(self.seed));

        let (orchestrator, report) = Orchestrator::run(config, fleet)?;

        println!("aircraft            {}", report.aircraft);
        println!("admitted            {}", report.admitted());
        println!("fuel emergencies    {}", report.fuel_emergencies);
        println!("controller breaks   {}", report.breaks);
        println!("direction switches  {}", report.direction_switches);
        println!("mean wait (ms)      {}", report.mean_wait_ms);
        println!("max wait (ms)       {}", report.max_wait_ms);

        if let Some(output) = self.output.as_ref() {
            serde_json::to_writer_pretty(BufWriter::new(File::create(output)?), &report)
                .map_err(std::io::Error::from)?;
        }
        if let Some(events) = self.events.as_ref() {
            serde_json::to_writer_pretty(BufWriter::new(File::create(events)?), &orchestrator.runway().events().snapshot())
                .map_err(std::io::Error::from)?;
        }

        Ok(report)
    }

    fn config(&self) -> Result<RunwayConfig, SimulationError> {
        let mut config = match self.config.as_ref() {
            Some(path) => RunwayConfig::from_file(path)?,
            None => RunwayConfig::default(),
        };
        if let Some(time_unit_ms) = self.time_unit_ms {
            config.time_unit_ms = time_unit_ms;
        }
        config.validate()?;
        Ok(config)
    }
}
