pub mod admission;
pub mod aircraft;
pub mod config;
pub mod controller;
pub mod event;
pub mod orchestrator;
pub mod runway;
pub mod simulate;
pub mod state;


use thiserror::Error;

use crate::workload::WorkloadError;
use config::ConfigError;

pub use simulate::Simulate;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Workload(#[from] WorkloadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot start thread: {0}")]
    Spawn(std::io::Error),

    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),
}

impl SimulationError {
    /// Process exit status, distinct per kind of startup failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            SimulationError::Workload(WorkloadError::Unreadable { .. }) => 1,
            SimulationError::Workload(WorkloadError::Empty | WorkloadError::TooMany { .. }) => 3,
            SimulationError::Config(_) => 4,
            SimulationError::Spawn(_) | SimulationError::Output(_) => 5,
        }
    }
}
