//! Boundary between the flight controller and the simulation it flies.
//!
//! The transport (RPC connection, streams, session setup) lives outside this workspace. The
//! controller only sees the [`Vessel`] capability trait: pollable readouts that never block and
//! fire-and-forget commands whose effects are observed by polling again.

use std::fmt;

use pilot_core::vector::Vector3;
use pilot_orbits::OrbitState;
use pilot_propulsion::{StagePropellant, VehicleState};
use thiserror::Error;

/// Errors surfaced by a telemetry/control transport.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TelemetryError {
    #[error("telemetry link lost: {0}")]
    LinkLost(String),
    #[error("unknown celestial body `{0}`")]
    UnknownBody(String),
    #[error("maneuver node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("command `{command}` rejected: {reason}")]
    Rejected { command: &'static str, reason: String },
}

/// Handle of a maneuver node created on the vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Attitude the vessel should hold.
///
/// `PitchHeading` is flown by the autopilot; the other modes belong to the stability assist
/// system, with `Free` switching it off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttitudeHold {
    Free,
    Stability,
    Prograde,
    Retrograde,
    PitchHeading { pitch_deg: f64, heading_deg: f64 },
}

/// Object whose position can be sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRef<'a> {
    ActiveVessel,
    Body(&'a str),
}

/// Telemetry readouts and commands of the single active vessel.
///
/// Reads take `&self` and must return the latest sample without waiting. Commands take
/// `&mut self`; their effect shows up in later reads.
pub trait Vessel {
    fn universal_time(&self) -> Result<f64, TelemetryError>;
    fn mean_altitude(&self) -> Result<f64, TelemetryError>;
    fn apoapsis_altitude(&self) -> Result<f64, TelemetryError>;
    fn time_to_apoapsis(&self) -> Result<f64, TelemetryError>;
    fn time_to_periapsis(&self) -> Result<f64, TelemetryError>;
    fn time_to_soi_change(&self) -> Result<f64, TelemetryError>;
    /// Amount of `resource` held in the parts that decouple in `stage` (non-cumulative).
    fn resource_in_stage(&self, resource: &str, stage: u32) -> Result<f64, TelemetryError>;
    fn mass(&self) -> Result<f64, TelemetryError>;
    fn available_thrust(&self) -> Result<f64, TelemetryError>;
    fn specific_impulse(&self) -> Result<f64, TelemetryError>;
    /// Orbit of the active vessel around its current primary.
    fn orbit(&self) -> Result<OrbitState, TelemetryError>;
    /// Orbit of a named body around its own primary.
    fn body_orbit(&self, body: &str) -> Result<OrbitState, TelemetryError>;
    /// Name of the body whose sphere of influence the vessel is in.
    fn primary_body(&self) -> Result<String, TelemetryError>;
    /// Position in the non-rotating frame centred on the vessel's primary.
    fn position(&self, target: BodyRef<'_>) -> Result<Vector3, TelemetryError>;
    /// Normal of the vessel's orbital plane in the same frame as [`Vessel::position`].
    fn orbit_normal(&self) -> Result<Vector3, TelemetryError>;

    fn set_throttle(&mut self, throttle: f64) -> Result<(), TelemetryError>;
    fn set_attitude_hold(&mut self, hold: AttitudeHold) -> Result<(), TelemetryError>;
    fn set_rcs(&mut self, enabled: bool) -> Result<(), TelemetryError>;
    fn engage_autopilot(&mut self) -> Result<(), TelemetryError>;
    fn disengage_autopilot(&mut self) -> Result<(), TelemetryError>;
    fn activate_next_stage(&mut self) -> Result<(), TelemetryError>;
    fn add_node(&mut self, ut: f64, prograde_m_s: f64) -> Result<NodeId, TelemetryError>;
    fn remove_node(&mut self, node: NodeId) -> Result<(), TelemetryError>;
    /// Request a time warp ending at `ut`. Completion is observed through [`Vessel::universal_time`].
    fn warp_to(&mut self, ut: f64) -> Result<(), TelemetryError>;
}

/// Read the vehicle's mass properties plus the propellant left in each tracked stage.
pub fn vehicle_snapshot<V: Vessel + ?Sized>(
    vessel: &V,
    resource: &str,
    tracked_stages: &[u32],
) -> Result<VehicleState, TelemetryError> {
    let propellant = tracked_stages
        .iter()
        .map(|&stage| {
            vessel
                .resource_in_stage(resource, stage)
                .map(|amount| StagePropellant { stage, amount })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(VehicleState {
        mass_kg: vessel.mass()?,
        available_thrust_n: vessel.available_thrust()?,
        specific_impulse_s: vessel.specific_impulse()?,
        propellant,
    })
}
