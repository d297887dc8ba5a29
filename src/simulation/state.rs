//! Shared runway state.
//!
//! A single [`RunwayState`] holds every counter the admission rules read. It is
//! only ever touched through the critical section owned by
//! [`Runway`](super::runway::Runway); the methods here assume the caller holds
//! it and re-check the cross-field invariants after every mutation.

use std::fmt;

use serde::Serialize;

use crate::workload::AircraftClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::North => write!(f, "NORTH"),
            Direction::South => write!(f, "SOUTH"),
        }
    }
}

/// Controller work that keeps the runway closed while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Maintenance {
    Break,
    DirectionSwitch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunwayState {
    pub on_runway: usize,
    pub on_runway_by_class: [usize; 3],
    pub direction: Direction,
    /// Admissions since the direction last changed
    pub consecutive: usize,
    /// Admissions since the controller's last break
    pub since_break: usize,
    pub waiting_by_class: [usize; 3],
    /// Regular aircraft only; emergencies follow whatever direction is active
    pub waiting_by_direction: [usize; 2],
    /// Waiting aircraft that have declared a fuel emergency
    pub fuel_emergencies: usize,
    pub last_regular: Option<AircraftClass>,
    pub regular_run: usize,
    pub maintenance: Option<Maintenance>,
}

impl Default for RunwayState {
    fn default() -> Self {
        Self {
            on_runway: 0,
            on_runway_by_class: [0; 3],
            direction: Direction::North,
            consecutive: 0,
            since_break: 0,
            waiting_by_class: [0; 3],
            waiting_by_direction: [0; 2],
            fuel_emergencies: 0,
            last_regular: None,
            regular_run: 0,
            maintenance: None,
        }
    }
}

impl RunwayState {
    pub fn on_runway_of(&self, class: AircraftClass) -> usize {
        self.on_runway_by_class[class.index()]
    }

    pub fn waiting_of(&self, class: AircraftClass) -> usize {
        self.waiting_by_class[class.index()]
    }

    pub fn waiting_towards(&self, direction: Direction) -> usize {
        self.waiting_by_direction[direction.index()]
    }

    pub fn is_idle(&self) -> bool {
        self.on_runway == 0
    }

    pub fn add_waiting(&mut self, class: AircraftClass) {
        self.waiting_by_class[class.index()] += 1;
        if let Some(direction) = class.preferred_direction() {
            self.waiting_by_direction[direction.index()] += 1;
        }
    }

    pub fn declare_fuel_emergency(&mut self) {
        self.fuel_emergencies += 1;
    }

    /// Moves an aircraft from the wait set onto the runway.
    pub fn admit(&mut self, class: AircraftClass, fuel_emergency: bool) {
        self.waiting_by_class[class.index()] = decrement(self.waiting_by_class[class.index()], "waiting class");
        if let Some(direction) = class.preferred_direction() {
            self.waiting_by_direction[direction.index()] =
                decrement(self.waiting_by_direction[direction.index()], "waiting direction");
        }
        if fuel_emergency {
            self.fuel_emergencies = decrement(self.fuel_emergencies, "fuel emergencies");
        }

        self.on_runway += 1;
        self.on_runway_by_class[class.index()] += 1;
        self.since_break += 1;
        self.consecutive += 1;

        if class.is_regular() {
            if self.last_regular == Some(class) {
                self.regular_run += 1;
            } else {
                self.last_regular = Some(class);
                self.regular_run = 1;
            }
        }
    }

    pub fn depart(&mut self, class: AircraftClass) {
        self.on_runway = decrement(self.on_runway, "aircraft on runway");
        self.on_runway_by_class[class.index()] = decrement(self.on_runway_by_class[class.index()], "class on runway");
    }

    pub fn finish_break(&mut self) {
        self.since_break = 0;
    }

    pub fn finish_switch(&mut self) {
        self.direction = self.direction.opposite();
        self.consecutive = 0;
    }

    /// Panics when the counters no longer describe a reachable state.
    pub fn assert_invariants(&self, capacity: usize) {
        assert!(
            self.on_runway <= capacity,
            "runway over capacity: {} aircraft for capacity {} ({:?})",
            self.on_runway, capacity, self
        );
        assert_eq!(
            self.on_runway,
            self.on_runway_by_class.iter().sum::<usize>(),
            "runway total disagrees with per-class counts ({:?})", self
        );
        assert!(
            self.on_runway_of(AircraftClass::Commercial) == 0 || self.on_runway_of(AircraftClass::Cargo) == 0,
            "commercial and cargo aircraft share the runway ({:?})", self
        );
        if let Some(maintenance) = self.maintenance {
            assert!(self.is_idle(), "{:?} in progress with an occupied runway ({:?})", maintenance, self);
        }
    }
}

fn decrement(value: usize, what: &str) -> usize {
    match value.checked_sub(1) {
        Some(v) => v,
        None => panic!("{what} counter would drop below zero"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admit_and_depart_keep_counters_balanced() {
        let mut state = RunwayState::default();
        state.add_waiting(AircraftClass::Commercial);
        state.add_waiting(AircraftClass::Emergency);
        assert_eq!(state.waiting_towards(Direction::North), 1);
        assert_eq!(state.waiting_towards(Direction::South), 0);

        state.admit(AircraftClass::Emergency, false);
        state.admit(AircraftClass::Commercial, false);
        state.assert_invariants(2);
        assert_eq!(state.on_runway, 2);
        assert_eq!(state.since_break, 2);
        assert_eq!(state.consecutive, 2);
        assert_eq!(state.waiting_by_class, [0, 0, 0]);
        assert_eq!(state.waiting_by_direction, [0, 0]);

        state.depart(AircraftClass::Commercial);
        state.depart(AircraftClass::Emergency);
        state.assert_invariants(2);
        assert!(state.is_idle());
    }

    #[test]
    fn emergencies_do_not_touch_the_regular_run() {
        let mut state = RunwayState::default();
        for class in [AircraftClass::Cargo, AircraftClass::Cargo, AircraftClass::Emergency, AircraftClass::Cargo] {
            state.add_waiting(class);
            state.admit(class, false);
            state.depart(class);
        }
        assert_eq!(state.last_regular, Some(AircraftClass::Cargo));
        assert_eq!(state.regular_run, 3);

        state.add_waiting(AircraftClass::Commercial);
        state.admit(AircraftClass::Commercial, false);
        assert_eq!(state.last_regular, Some(AircraftClass::Commercial));
        assert_eq!(state.regular_run, 1);
    }

    #[test]
    fn escalated_admission_clears_the_emergency() {
        let mut state = RunwayState::default();
        state.add_waiting(AircraftClass::Cargo);
        state.declare_fuel_emergency();
        state.admit(AircraftClass::Cargo, true);
        assert_eq!(state.fuel_emergencies, 0);
    }

    #[test]
    fn switch_flips_direction_and_resets_run() {
        let mut state = RunwayState { consecutive: 3, ..Default::default() };
        state.finish_switch();
        assert_eq!(state.direction, Direction::South);
        assert_eq!(state.consecutive, 0);
    }

    #[test]
    #[should_panic(expected = "share the runway")]
    fn mixed_regular_classes_violate_invariants() {
        let state = RunwayState { on_runway: 2, on_runway_by_class: [1, 1, 0], ..Default::default() };
        state.assert_invariants(2);
    }

    #[test]
    #[should_panic(expected = "occupied runway")]
    fn maintenance_requires_an_empty_runway() {
        let state = RunwayState {
            on_runway: 1,
            on_runway_by_class: [0, 0, 1],
            maintenance: Some(Maintenance::Break),
            ..Default::default()
        };
        state.assert_invariants(2);
    }

    #[test]
    #[should_panic(expected = "below zero")]
    fn departing_an_empty_runway_panics() {
        RunwayState::default().depart(AircraftClass::Cargo);
    }
}
