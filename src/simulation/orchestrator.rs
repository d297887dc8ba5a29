//! Runs a workload: one controller thread plus one thread per aircraft,
//! launched at their arrival offsets.

use std::{
    panic,
    sync::Arc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::Serialize;
use tracing::info;

use super::{
    aircraft::{Aircraft, Flight},
    config::RunwayConfig,
    controller::{Controller, ControllerStats},
    runway::Runway,
    SimulationError,
};
use crate::workload::{AircraftClass, Workload};

/// Turns workload records into aircraft, drawing a fuel reserve for each.
pub fn fleet(workload: &Workload, config: &RunwayConfig, rng: &mut impl Rng) -> Vec<Aircraft> {
    let rand_fuel = Uniform::new_inclusive(config.fuel_min, config.fuel_max);
    workload.entries.iter().enumerate()
        .map(|(id, entry)| Aircraft {
            id,
            class: entry.class,
            arrival: config.units(entry.arrival),
            runway_time: config.units(entry.runway_time),
            fuel_reserve: config.units(rand_fuel.sample(rng)),
        })
        .collect()
}

pub struct Orchestrator {
    runway: Arc<Runway>,
    controller: Option<Controller>,
    flights: Vec<JoinHandle<Flight>>,
    started: Instant,
}

impl Orchestrator {
    pub fn new(config: RunwayConfig) -> Self {
        Self {
            runway: Arc::new(Runway::new(config)),
            controller: None,
            flights: vec![],
            started: Instant::now(),
        }
    }

    pub fn runway(&self) -> &Arc<Runway> {
        &self.runway
    }

    /// Starts the controller, then launches every aircraft after its arrival delay.
    /// Returns once the last aircraft has been launched.
    pub fn start(&mut self, fleet: Vec<Aircraft>) -> Result<(), SimulationError> {
        self.started = Instant::now();
        self.controller = Some(Controller::spawn(self.runway.clone()).map_err(SimulationError::Spawn)?);

        for aircraft in fleet {
            thread::sleep(aircraft.arrival);
            let runway = self.runway.clone();
            let handle = thread::Builder::new()
                .name(format!("aircraft-{}", aircraft.id))
                .spawn(move || aircraft.fly(&runway))
                .map_err(SimulationError::Spawn)?;
            self.flights.push(handle);
        }
        Ok(())
    }

    /// Waits for every launched aircraft to clear the runway.
    /// A panicking aircraft aborts the whole run.
    pub fn join_all(&mut self) -> Vec<Flight> {
        self.flights.drain(..)
            .map(|handle| match handle.join() {
                Ok(flight) => flight,
                Err(payload) => panic::resume_unwind(payload),
            })
            .collect()
    }

    pub fn stop_controller(&mut self) -> ControllerStats {
        self.controller.take().map(Controller::stop).unwrap_or_default()
    }

    pub fn run(config: RunwayConfig, fleet: Vec<Aircraft>) -> Result<(Self, SimulationReport), SimulationError> {
        let mut orchestrator = Orchestrator::new(config);
        let aircraft = fleet.len();
        info!(aircraft, "starting runway simulation");

        orchestrator.start(fleet)?;
        let flights = orchestrator.join_all();
        let stats = orchestrator.stop_controller();

        let report = SimulationReport::new(aircraft, &flights, stats, orchestrator.started.elapsed());
        info!(elapsed = ?report.elapsed(), "runway simulation done");
        Ok((orchestrator, report))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub aircraft: usize,
    pub class: AircraftClass,
    pub waited_ms: u128,
    pub fuel_emergency: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub aircraft: usize,
    pub commercial: usize,
    pub cargo: usize,
    pub emergency: usize,
    pub fuel_emergencies: usize,
    pub breaks: usize,
    pub direction_switches: usize,
    pub mean_wait_ms: u128,
    pub max_wait_ms: u128,
    pub elapsed_ms: u64,
    pub flights: Vec<FlightSummary>,
}

impl SimulationReport {
    fn new(aircraft: usize, flights: &[Flight], stats: ControllerStats, elapsed: Duration) -> Self {
        let of_class = |class| flights.iter().filter(|f| f.class == class).count();
        let waits: Vec<u128> = flights.iter().map(|f| f.waited.as_millis()).collect();
        let mean_wait_ms = if waits.is_empty() { 0 } else { waits.iter().sum::<u128>() / waits.len() as u128 };

        SimulationReport {
            aircraft,
            commercial: of_class(AircraftClass::Commercial),
            cargo: of_class(AircraftClass::Cargo),
            emergency: of_class(AircraftClass::Emergency),
            fuel_emergencies: flights.iter().filter(|f| f.fuel_emergency).count(),
            breaks: stats.breaks,
            direction_switches: stats.direction_switches,
            mean_wait_ms,
            max_wait_ms: waits.iter().copied().max().unwrap_or(0),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            flights: flights.iter().map(|f| FlightSummary {
                aircraft: f.aircraft,
                class: f.class,
                waited_ms: f.waited.as_millis(),
                fuel_emergency: f.fuel_emergency,
            }).collect(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    pub fn admitted(&self) -> usize {
        self.commercial + self.cargo + self.emergency
    }
}
