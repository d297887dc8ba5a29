//! Aircraft descriptors and the per-aircraft task.
//!
//! The three classes share one protocol and differ only in the direction they
//! ask for, whether they count as regular traffic, and which class they must
//! never share the runway with.

use std::{thread, time::{Duration, Instant}};

use tracing::{debug, info};

use super::{runway::Runway, state::Direction};
use crate::workload::AircraftClass;

impl AircraftClass {
    /// Commercial traffic lands northbound and cargo southbound; emergencies have no preference.
    pub fn preferred_direction(self) -> Option<Direction> {
        match self {
            AircraftClass::Commercial => Some(Direction::North),
            AircraftClass::Cargo => Some(Direction::South),
            AircraftClass::Emergency => None,
        }
    }

    /// Emergencies take whatever direction is active so they never force a switch.
    pub fn desired_direction(self, active: Direction) -> Direction {
        self.preferred_direction().unwrap_or(active)
    }

    pub fn is_regular(self) -> bool {
        self.other_regular().is_some()
    }

    pub fn other_regular(self) -> Option<AircraftClass> {
        match self {
            AircraftClass::Commercial => Some(AircraftClass::Cargo),
            AircraftClass::Cargo => Some(AircraftClass::Commercial),
            AircraftClass::Emergency => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aircraft {
    pub id: usize,
    pub class: AircraftClass,
    /// Delay since the previous launch
    pub arrival: Duration,
    pub runway_time: Duration,
    /// Wait after which the aircraft declares a fuel emergency
    pub fuel_reserve: Duration,
}

/// Where an aircraft is in its life, as seen by the runway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    OnRunway,
    Departed,
}

/// A registered aircraft: what the runway needs to evaluate it on every retry.
#[derive(Debug)]
pub struct Clearance {
    pub aircraft: usize,
    pub class: AircraftClass,
    pub fuel_reserve: Duration,
    pub registered_at: Instant,
    pub fuel_emergency: bool,
    pub phase: Phase,
}

impl Clearance {
    pub fn waited(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.registered_at)
    }

    /// Escalates once the fuel reserve is exhausted; returns whether this call escalated.
    pub fn escalate_if_due(&mut self, now: Instant) -> bool {
        if self.fuel_emergency || self.waited(now) < self.fuel_reserve {
            return false;
        }
        self.fuel_emergency = true;
        true
    }
}

/// Outcome of one aircraft's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flight {
    pub aircraft: usize,
    pub class: AircraftClass,
    pub waited: Duration,
    pub fuel_emergency: bool,
}

impl Aircraft {
    /// Body of an aircraft task: wait for clearance, hold the runway, leave.
    pub fn fly(&self, runway: &Runway) -> Flight {
        let mut clearance = runway.register(self);
        runway.enter(&mut clearance);
        let waited = clearance.waited(Instant::now());

        info!(aircraft = self.id, class = %self.class, duration = ?self.runway_time, "begins runway operations");
        occupy(self.runway_time);
        debug!(aircraft = self.id, "completes runway operations and prepares to depart");

        runway.leave(&mut clearance);

        Flight { aircraft: self.id, class: self.class, waited, fuel_emergency: clearance.fuel_emergency }
    }
}

/// Holds the runway; touches no shared state.
fn occupy(duration: Duration) {
    thread::sleep(duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clearance(fuel_reserve: Duration, registered_at: Instant) -> Clearance {
        Clearance {
            aircraft: 0,
            class: AircraftClass::Cargo,
            fuel_reserve,
            registered_at,
            fuel_emergency: false,
            phase: Phase::Waiting,
        }
    }

    #[test]
    fn class_variants() {
        assert_eq!(AircraftClass::Commercial.desired_direction(Direction::South), Direction::North);
        assert_eq!(AircraftClass::Cargo.desired_direction(Direction::North), Direction::South);
        assert_eq!(AircraftClass::Emergency.desired_direction(Direction::South), Direction::South);
        assert!(AircraftClass::Commercial.is_regular());
        assert!(!AircraftClass::Emergency.is_regular());
        assert_eq!(AircraftClass::Cargo.other_regular(), Some(AircraftClass::Commercial));
    }

    #[test]
    fn escalation_happens_exactly_once() {
        let start = Instant::now();
        let mut c = clearance(Duration::from_secs(20), start);

        assert!(!c.escalate_if_due(start + Duration::from_secs(19)));
        assert!(c.escalate_if_due(start + Duration::from_secs(20)));
        assert!(c.fuel_emergency);
        assert!(!c.escalate_if_due(start + Duration::from_secs(21)));
        assert!(!c.escalate_if_due(start + Duration::from_secs(90)));
    }

    #[test]
    fn waited_never_goes_negative() {
        let start = Instant::now();
        let c = clearance(Duration::from_secs(1), start + Duration::from_secs(5));
        assert_eq!(c.waited(start), Duration::ZERO);
    }
}
