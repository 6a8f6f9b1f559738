//! Closed-loop autopilot for a single vessel flying a patched-conic transfer: gravity-turn
//! ascent, parking-orbit circularization, Hohmann transfer to a moon and capture.
//!
//! The flight logic lives in the workspace crates; this package re-exports them and hosts the
//! offline transfer [`plan`] used by the `mission` binary.

pub mod plan;

pub use pilot_config as config;
pub use pilot_flight as flight;
pub use pilot_impulsive as impulsive;
pub use pilot_orbits as orbits;
pub use pilot_propulsion as propulsion;
pub use pilot_telemetry as telemetry;

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
