//! Flight crate consolidating maneuver planning, burn timing and the mission phase controller.

pub mod error;
pub mod mission;
pub mod planner;
pub mod timing;

pub use facade::*;
pub use pilot_impulsive as impulsive;
pub use pilot_orbits as orbits;
pub use pilot_propulsion as propulsion;
pub use pilot_telemetry as telemetry;

mod facade;
