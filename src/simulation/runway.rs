//! The runway critical section.
//!
//! [`Runway`] owns the shared state behind one mutex and a condition variable
//! that is broadcast on every state change. Aircraft re-run the admission
//! rules each time they wake, either from a broadcast or from the wait
//! timeout, so time-based fuel escalation is noticed without an explicit
//! wake. Nothing blocks while the mutex is held, and events are only logged
//! once it is released.

use std::{sync::Arc, time::Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::trace;

use super::{
    admission::{self, Denial},
    aircraft::{Aircraft, Clearance, Phase},
    config::RunwayConfig,
    controller,
    event::{EventLog, RecordedEvent, RunwayEvent},
    state::{Maintenance, RunwayState},
};

#[derive(Debug)]
pub struct Runway {
    config: RunwayConfig,
    state: Mutex<RunwayState>,
    changed: Condvar,
    events: Arc<EventLog>,
}

impl Runway {
    pub fn new(config: RunwayConfig) -> Self {
        Self::with_events(config, Arc::new(EventLog::new()))
    }

    pub fn with_events(config: RunwayConfig, events: Arc<EventLog>) -> Self {
        Self { config, state: Mutex::new(RunwayState::default()), changed: Condvar::new(), events }
    }

    pub fn config(&self) -> &RunwayConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventLog> {
        &self.events
    }

    pub fn snapshot(&self) -> RunwayState {
        self.state.lock().clone()
    }

    /// Adds the aircraft to the wait set and starts its fuel clock.
    pub fn register(&self, aircraft: &Aircraft) -> Clearance {
        let mut state = self.state.lock();
        state.add_waiting(aircraft.class);
        state.assert_invariants(self.config.capacity);
        Clearance {
            aircraft: aircraft.id,
            class: aircraft.class,
            fuel_reserve: aircraft.fuel_reserve,
            registered_at: Instant::now(),
            fuel_emergency: false,
            phase: Phase::Waiting,
        }
    }

    /// Blocks until the aircraft is cleared onto the runway.
    pub fn enter(&self, clearance: &mut Clearance) {
        let mut state = self.state.lock();
        loop {
            let mut emitted = vec![];
            match self.attempt(&mut state, clearance, Instant::now(), &mut emitted) {
                Ok(()) => {
                    drop(state);
                    emitted.iter().for_each(RecordedEvent::log);
                    return;
                },
                // the state may move while unlocked, so re-check before waiting
                Err(_) if !emitted.is_empty() => {
                    MutexGuard::unlocked(&mut state, || emitted.iter().for_each(RecordedEvent::log));
                },
                Err(denial) => {
                    trace!(aircraft = clearance.aircraft, %denial, "holding");
                    self.changed.wait_for(&mut state, self.config.wait_time());
                },
            }
        }
    }

    /// A single admission attempt evaluated at `now`, without waiting.
    #[cfg(test)]
    pub(crate) fn try_enter(&self, clearance: &mut Clearance, now: Instant) -> Result<(), Denial> {
        let mut emitted = vec![];
        let outcome = self.attempt(&mut self.state.lock(), clearance, now, &mut emitted);
        emitted.iter().for_each(RecordedEvent::log);
        outcome
    }

    pub fn leave(&self, clearance: &mut Clearance) {
        assert_eq!(clearance.phase, Phase::OnRunway, "aircraft {} left without being on the runway", clearance.aircraft);
        let record = {
            let mut state = self.state.lock();
            state.depart(clearance.class);
            state.assert_invariants(self.config.capacity);
            clearance.phase = Phase::Departed;
            self.changed.notify_all();
            self.events.record(RunwayEvent::Departed { aircraft: clearance.aircraft, class: clearance.class }, &state)
        };
        record.log();
    }

    /// Closes the runway for a break or a direction switch when one is due.
    pub fn begin_maintenance(&self) -> Option<Maintenance> {
        let (maintenance, record) = {
            let mut state = self.state.lock();
            let maintenance = controller::plan(&state, &self.config)?;
            state.maintenance = Some(maintenance);
            state.assert_invariants(self.config.capacity);
            let event = match maintenance {
                Maintenance::Break => RunwayEvent::BreakStarted,
                Maintenance::DirectionSwitch => RunwayEvent::SwitchStarted {
                    from: state.direction,
                    to: state.direction.opposite(),
                },
            };
            (maintenance, self.events.record(event, &state))
        };
        record.log();
        Some(maintenance)
    }

    pub fn finish_maintenance(&self, maintenance: Maintenance) {
        let record = {
            let mut state = self.state.lock();
            assert_eq!(state.maintenance, Some(maintenance), "finishing maintenance that was not started");
            state.assert_invariants(self.config.capacity);
            let event = match maintenance {
                Maintenance::Break => {
                    state.finish_break();
                    RunwayEvent::BreakEnded
                },
                Maintenance::DirectionSwitch => {
                    state.finish_switch();
                    RunwayEvent::SwitchEnded { direction: state.direction }
                },
            };
            state.maintenance = None;
            state.assert_invariants(self.config.capacity);
            self.changed.notify_all();
            self.events.record(event, &state)
        };
        record.log();
    }

    /// Events emitted by the attempt are pushed to `emitted` for the caller to
    /// log once the runway is released.
    fn attempt(
        &self,
        state: &mut RunwayState,
        clearance: &mut Clearance,
        now: Instant,
        emitted: &mut Vec<RecordedEvent>,
    ) -> Result<(), Denial> {
        assert_eq!(clearance.phase, Phase::Waiting, "aircraft {} is not waiting", clearance.aircraft);

        if clearance.escalate_if_due(now) {
            state.declare_fuel_emergency();
            emitted.push(self.events.record(RunwayEvent::FuelEmergency { aircraft: clearance.aircraft, class: clearance.class }, state));
        }

        let desired = clearance.class.desired_direction(state.direction);
        admission::check(state, &self.config, clearance.class, desired, clearance.fuel_emergency)?;

        state.admit(clearance.class, clearance.fuel_emergency);
        state.assert_invariants(self.config.capacity);
        clearance.phase = Phase::OnRunway;
        emitted.push(self.events.record(RunwayEvent::Admitted {
            aircraft: clearance.aircraft,
            class: clearance.class,
            direction: state.direction,
            fuel_emergency: clearance.fuel_emergency,
        }, state));
        self.changed.notify_all();
        Ok(())
    }
}
