//! Admission rules.
//!
//! [`check`] evaluates the rules in a fixed order and reports the first one
//! that refuses the candidate. All rules must hold for an admission, so the
//! order only decides which [`Denial`] is reported. The caller must hold the
//! runway critical section and apply the admission in that same section.

use std::fmt;

use super::{config::RunwayConfig, state::{Direction, RunwayState}};
use crate::workload::AircraftClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// A break or direction switch is in progress
    Maintenance,
    /// The runway already holds `capacity` aircraft
    Capacity,
    /// The controller is owed a break
    BreakDue,
    /// A regular aircraft asked for the inactive direction
    WrongDirection,
    /// The other regular class is on the runway
    ClassConflict,
    /// Someone else has declared a fuel emergency
    FuelEmergencyWaiting,
    /// An emergency aircraft is waiting
    EmergencyWaiting,
    /// This class has had its run while the other class waits
    FairnessTurn,
    /// The active direction has had its run while the opposite one waits
    DirectionQuota,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Denial::Maintenance => "controller maintenance in progress",
            Denial::Capacity => "runway at capacity",
            Denial::BreakDue => "controller break due",
            Denial::WrongDirection => "runway set to the opposite direction",
            Denial::ClassConflict => "other regular class on the runway",
            Denial::FuelEmergencyWaiting => "fuel emergency waiting",
            Denial::EmergencyWaiting => "emergency aircraft waiting",
            Denial::FairnessTurn => "other regular class has the turn",
            Denial::DirectionQuota => "direction quota used up",
        };
        f.write_str(reason)
    }
}

pub fn check(
    state: &RunwayState,
    config: &RunwayConfig,
    class: AircraftClass,
    desired: Direction,
    fuel_emergency: bool,
) -> Result<(), Denial> {
    if state.maintenance.is_some() {
        return Err(Denial::Maintenance);
    }

    if state.on_runway >= config.capacity {
        return Err(Denial::Capacity);
    }

    if state.since_break >= config.break_limit {
        return Err(Denial::BreakDue);
    }

    if class.is_regular() && desired != state.direction {
        return Err(Denial::WrongDirection);
    }

    if let Some(other) = class.other_regular() {
        if state.on_runway_of(other) > 0 {
            return Err(Denial::ClassConflict);
        }
    }

    if state.fuel_emergencies > 0 && !fuel_emergency {
        return Err(Denial::FuelEmergencyWaiting);
    }

    if class.is_regular() && state.waiting_of(AircraftClass::Emergency) > 0 {
        return Err(Denial::EmergencyWaiting);
    }

    if let Some(other) = class.other_regular() {
        if state.last_regular == Some(class)
            && state.regular_run >= config.fairness_run_limit
            && state.waiting_of(other) > 0
        {
            return Err(Denial::FairnessTurn);
        }
    }

    if desired == state.direction
        && state.consecutive >= config.direction_limit
        && state.waiting_towards(state.direction.opposite()) > 0
    {
        return Err(Denial::DirectionQuota);
    }

    Ok(())
}

pub fn can_enter(
    state: &RunwayState,
    config: &RunwayConfig,
    class: AircraftClass,
    desired: Direction,
    fuel_emergency: bool,
) -> bool {
    check(state, config, class, desired, fuel_emergency).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::state::Maintenance;

    use crate::simulation::state::Direction::*;
    use crate::workload::AircraftClass::*;

    fn config() -> RunwayConfig {
        RunwayConfig::default()
    }

    fn waiting(classes: &[AircraftClass]) -> RunwayState {
        let mut state = RunwayState::default();
        for class in classes {
            state.add_waiting(*class);
        }
        state
    }

    #[test]
    fn empty_runway_admits_matching_direction() {
        let state = waiting(&[Commercial]);
        assert_eq!(check(&state, &config(), Commercial, North, false), Ok(()));
        assert!(can_enter(&state, &config(), Commercial, North, false));
    }

    #[test]
    fn maintenance_blocks_everyone() {
        let mut state = waiting(&[Emergency]);
        state.maintenance = Some(Maintenance::DirectionSwitch);
        assert_eq!(check(&state, &config(), Emergency, North, true), Err(Denial::Maintenance));
    }

    #[test]
    fn capacity_is_checked_first() {
        let mut state = waiting(&[Commercial, Commercial, Commercial]);
        state.admit(Commercial, false);
        state.admit(Commercial, false);
        state.since_break = 8;
        assert_eq!(check(&state, &config(), Commercial, North, false), Err(Denial::Capacity));
    }

    #[test]
    fn break_gate_blocks_even_fuel_emergencies() {
        let mut state = waiting(&[Cargo]);
        state.direction = South;
        state.since_break = 8;
        state.declare_fuel_emergency();
        assert_eq!(check(&state, &config(), Cargo, South, true), Err(Denial::BreakDue));
    }

    #[test]
    fn regular_class_needs_the_active_direction() {
        let state = waiting(&[Cargo]);
        assert_eq!(check(&state, &config(), Cargo, South, false), Err(Denial::WrongDirection));
    }

    #[test]
    fn cargo_waits_for_commercial_to_vacate_despite_free_capacity() {
        let mut state = waiting(&[Commercial, Cargo]);
        state.admit(Commercial, false);
        // take the direction rule out of the way so only class exclusivity can refuse
        state.direction = South;
        assert_eq!(check(&state, &config(), Cargo, South, false), Err(Denial::ClassConflict));

        state.depart(Commercial);
        assert_eq!(check(&state, &config(), Cargo, South, false), Ok(()));
    }

    #[test]
    fn emergency_ignores_class_exclusivity() {
        let mut state = waiting(&[Commercial, Emergency]);
        state.admit(Commercial, false);
        assert_eq!(check(&state, &config(), Emergency, North, false), Ok(()));
    }

    #[test]
    fn fuel_emergency_preempts_everyone_else() {
        let mut state = waiting(&[Commercial, Commercial]);
        state.declare_fuel_emergency();
        assert_eq!(check(&state, &config(), Commercial, North, false), Err(Denial::FuelEmergencyWaiting));
        assert_eq!(check(&state, &config(), Commercial, North, true), Ok(()));
    }

    #[test]
    fn fuel_emergency_outranks_waiting_emergency_class() {
        let mut state = waiting(&[Emergency, Commercial]);
        state.declare_fuel_emergency();
        assert_eq!(check(&state, &config(), Emergency, North, false), Err(Denial::FuelEmergencyWaiting));
    }

    #[test]
    fn waiting_emergency_blocks_regular_classes() {
        let state = waiting(&[Emergency, Commercial]);
        assert_eq!(check(&state, &config(), Commercial, North, false), Err(Denial::EmergencyWaiting));
        assert_eq!(check(&state, &config(), Emergency, North, false), Ok(()));
    }

    #[test]
    fn escalated_regular_still_yields_to_waiting_emergency() {
        let mut state = waiting(&[Emergency, Commercial]);
        state.declare_fuel_emergency();
        assert_eq!(check(&state, &config(), Commercial, North, true), Err(Denial::EmergencyWaiting));
    }

    #[test]
    fn fairness_forces_alternation_after_a_run() {
        let mut state = waiting(&[Commercial, Cargo]);
        state.last_regular = Some(Commercial);
        state.regular_run = 4;
        assert_eq!(check(&state, &config(), Commercial, North, false), Err(Denial::FairnessTurn));

        state.regular_run = 3;
        assert_eq!(check(&state, &config(), Commercial, North, false), Ok(()));
    }

    #[test]
    fn fairness_only_applies_when_the_other_class_waits() {
        let mut state = waiting(&[Commercial]);
        state.last_regular = Some(Commercial);
        state.regular_run = 6;
        state.consecutive = 0;
        assert_eq!(check(&state, &config(), Commercial, North, false), Ok(()));
    }

    #[test]
    fn direction_quota_applies_with_opposite_demand() {
        let mut state = waiting(&[Commercial, Cargo]);
        state.consecutive = 3;
        assert_eq!(check(&state, &config(), Commercial, North, false), Err(Denial::DirectionQuota));

        let mut alone = waiting(&[Commercial]);
        alone.consecutive = 3;
        assert_eq!(check(&alone, &config(), Commercial, North, false), Ok(()));
    }

    #[test]
    fn direction_quota_also_holds_back_emergencies() {
        let mut state = waiting(&[Emergency, Cargo]);
        state.consecutive = 3;
        assert_eq!(check(&state, &config(), Emergency, North, false), Err(Denial::DirectionQuota));
    }
}
