//! Runway admission control: aircraft threads competing for one shared
//! runway under capacity, class, direction, priority and fairness rules, with
//! a controller thread that takes breaks and turns the runway around.

pub mod generate;
pub mod logging;
pub mod seed;
pub mod simulation;
pub mod workload;
