//! Observability events.
//!
//! Every event is recorded in emission order together with a copy of the
//! runway state taken at the same instant. The returned record is logged
//! through `tracing` by the caller once it has released the runway.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use super::state::{Direction, RunwayState};
use crate::workload::AircraftClass;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunwayEvent {
    Admitted { aircraft: usize, class: AircraftClass, direction: Direction, fuel_emergency: bool },
    FuelEmergency { aircraft: usize, class: AircraftClass },
    Departed { aircraft: usize, class: AircraftClass },
    BreakStarted,
    BreakEnded,
    SwitchStarted { from: Direction, to: Direction },
    SwitchEnded { direction: Direction },
}

impl RunwayEvent {
    fn log(&self, state: &RunwayState) {
        let (on_runway, since_break, consecutive) = (state.on_runway, state.since_break, state.consecutive);
        match self {
            RunwayEvent::Admitted { aircraft, class, direction, fuel_emergency } => info!(
                aircraft, %class, %direction, fuel_emergency, on_runway, since_break, consecutive,
                "aircraft is now on the runway"
            ),
            RunwayEvent::FuelEmergency { aircraft, class } => info!(
                aircraft, %class, waiting_emergencies = state.fuel_emergencies,
                "aircraft has declared a FUEL EMERGENCY"
            ),
            RunwayEvent::Departed { aircraft, class } => info!(
                aircraft, %class, on_runway, "aircraft has cleared the runway"
            ),
            RunwayEvent::BreakStarted => info!(since_break, "controller is taking a break"),
            RunwayEvent::BreakEnded => info!("controller is back from the break"),
            RunwayEvent::SwitchStarted { from, to } => info!(%from, %to, consecutive, "switching runway direction"),
            RunwayEvent::SwitchEnded { direction } => info!(%direction, "runway direction switched"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedEvent {
    /// Time since the log was created
    pub at: Duration,
    pub event: RunwayEvent,
    pub state: RunwayState,
}

impl RecordedEvent {
    pub fn log(&self) {
        self.event.log(&self.state);
    }
}

/// Append-only event record shared by every task of a run.
#[derive(Debug)]
pub struct EventLog {
    started: Instant,
    events: Mutex<Vec<RecordedEvent>>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self { started: Instant::now(), events: Mutex::new(vec![]) }
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "recorded events are only logged through `RecordedEvent::log`"]
    pub fn record(&self, event: RunwayEvent, state: &RunwayState) -> RecordedEvent {
        let record = RecordedEvent { at: self.started.elapsed(), event, state: state.clone() };
        self.events.lock().push(record.clone());
        record
    }

    pub fn snapshot(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&RunwayEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|r| pred(&r.event)).count()
    }
}
