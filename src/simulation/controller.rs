//! The air traffic controller task.
//!
//! Polls the runway and, whenever it is empty, either takes a break once the
//! admission budget is spent or turns the runway around when the opposite
//! direction has been starved. Both keep the runway closed for a fixed time
//! and then wake every waiting aircraft.

use std::{
    io,
    panic,
    sync::{mpsc::{self, RecvTimeoutError}, Arc},
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{debug, info};

use super::{config::RunwayConfig, runway::Runway, state::{Direction, Maintenance, RunwayState}};

/// Decides what, if anything, the controller should do with the runway now.
pub fn plan(state: &RunwayState, config: &RunwayConfig) -> Option<Maintenance> {
    if !state.is_idle() || state.maintenance.is_some() {
        return None;
    }

    if state.since_break >= config.break_limit {
        return Some(Maintenance::Break);
    }

    let opposite_waiting = state.waiting_towards(state.direction.opposite());
    let same_waiting = if turn_passed(state, config, state.direction) {
        0
    } else {
        state.waiting_towards(state.direction)
    };
    if opposite_waiting > 0 && (state.consecutive >= config.direction_limit || same_waiting == 0) {
        return Some(Maintenance::DirectionSwitch);
    }

    None
}

/// Whether the regular class flying `direction` has used up its run while the
/// other class waits. Its waiters are then refused until the other class lands,
/// and that class only ever asks for the opposite direction.
fn turn_passed(state: &RunwayState, config: &RunwayConfig, direction: Direction) -> bool {
    state.last_regular.is_some_and(|class| {
        class.preferred_direction() == Some(direction)
            && state.regular_run >= config.fairness_run_limit
            && class.other_regular().is_some_and(|other| state.waiting_of(other) > 0)
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    pub breaks: usize,
    pub direction_switches: usize,
}

pub struct Controller {
    stop: mpsc::Sender<()>,
    handle: JoinHandle<ControllerStats>,
}

impl Controller {
    pub fn spawn(runway: Arc<Runway>) -> io::Result<Self> {
        let (stop, stopped) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("controller".to_string())
            .spawn(move || run(&runway, &stopped))?;
        Ok(Self { stop, handle })
    }

    /// Asks the controller to finish its current tick and waits for it.
    pub fn stop(self) -> ControllerStats {
        // the controller may already be gone if it panicked; join reports that
        let _ = self.stop.send(());
        match self.handle.join() {
            Ok(stats) => stats,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

fn run(runway: &Runway, stopped: &mpsc::Receiver<()>) -> ControllerStats {
    info!("the air traffic controller arrived and is beginning operations");
    let mut stats = ControllerStats::default();

    loop {
        if let Some(maintenance) = runway.begin_maintenance() {
            thread::sleep(duration_of(maintenance, runway.config()));
            runway.finish_maintenance(maintenance);
            match maintenance {
                Maintenance::Break => stats.breaks += 1,
                Maintenance::DirectionSwitch => stats.direction_switches += 1,
            }
        }

        match stopped.recv_timeout(runway.config().poll_period()) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    debug!(breaks = stats.breaks, switches = stats.direction_switches, "controller stopped");
    stats
}

fn duration_of(maintenance: Maintenance, config: &RunwayConfig) -> Duration {
    match maintenance {
        Maintenance::Break => config.break_time(),
        Maintenance::DirectionSwitch => config.switch_time(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::AircraftClass;

    fn config() -> RunwayConfig {
        RunwayConfig::default()
    }

    #[test]
    fn nothing_to_do_on_a_quiet_runway() {
        assert_eq!(plan(&RunwayState::default(), &config()), None);
    }

    #[test]
    fn break_waits_for_an_empty_runway() {
        let mut state = RunwayState { since_break: 8, ..Default::default() };
        assert_eq!(plan(&state, &config()), Some(Maintenance::Break));

        state.on_runway = 1;
        state.on_runway_by_class = [0, 0, 1];
        assert_eq!(plan(&state, &config()), None);
    }

    #[test]
    fn break_takes_precedence_over_a_switch() {
        let mut state = RunwayState { since_break: 8, consecutive: 3, ..Default::default() };
        state.add_waiting(AircraftClass::Cargo);
        assert_eq!(plan(&state, &config()), Some(Maintenance::Break));
    }

    #[test]
    fn switches_when_only_the_opposite_direction_waits() {
        let mut state = RunwayState::default();
        state.add_waiting(AircraftClass::Cargo);
        assert_eq!(plan(&state, &config()), Some(Maintenance::DirectionSwitch));
    }

    #[test]
    fn switches_after_the_direction_quota() {
        let mut state = RunwayState { consecutive: 2, ..Default::default() };
        state.add_waiting(AircraftClass::Commercial);
        state.add_waiting(AircraftClass::Cargo);
        assert_eq!(plan(&state, &config()), None);

        state.consecutive = 3;
        assert_eq!(plan(&state, &config()), Some(Maintenance::DirectionSwitch));
    }

    #[test]
    fn emergencies_never_trigger_a_switch() {
        let mut state = RunwayState { direction: Direction::South, consecutive: 5, ..Default::default() };
        state.add_waiting(AircraftClass::Emergency);
        assert_eq!(plan(&state, &config()), None);
    }

    #[test]
    fn switches_when_the_active_class_has_had_its_turn() {
        let mut state = RunwayState {
            consecutive: 2,
            since_break: 7,
            last_regular: Some(AircraftClass::Commercial),
            regular_run: 3,
            ..Default::default()
        };
        state.add_waiting(AircraftClass::Commercial);
        state.add_waiting(AircraftClass::Cargo);
        assert_eq!(plan(&state, &config()), None);

        state.regular_run = 4;
        assert_eq!(plan(&state, &config()), Some(Maintenance::DirectionSwitch));
    }

    #[test]
    fn no_second_maintenance_while_one_runs() {
        let mut state = RunwayState { since_break: 8, ..Default::default() };
        state.maintenance = Some(Maintenance::Break);
        assert_eq!(plan(&state, &config()), None);
    }

    #[test]
    fn stop_returns_the_work_done() {
        let runway = Arc::new(Runway::new(RunwayConfig {
            break_limit: 1,
            time_unit_ms: 5,
            controller_poll_ms: 2,
            ..Default::default()
        }));
        let controller = Controller::spawn(runway.clone()).unwrap();
        thread::sleep(Duration::from_millis(20));
        let stats = controller.stop();
        assert_eq!(stats, ControllerStats::default());
        assert!(runway.events().snapshot().is_empty());
    }
}
