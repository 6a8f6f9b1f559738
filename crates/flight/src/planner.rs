//! Maneuver planner: turns orbit and vehicle snapshots into burn descriptors.
//!
//! Planning is side-effect free. Nothing here talks to the vessel; the phase controller
//! commits the resulting [`Maneuver`] as a node and flies it.

use std::fmt;

use pilot_impulsive::{HohmannResult, hohmann};
use pilot_orbits::{
    OrbitMathError, OrbitState, circular_velocity_delta, hohmann_transfer_phase_angle,
    time_until_phase,
};
use pilot_propulsion::{PropulsionError, VehicleState};
use thiserror::Error;
use tracing::debug;

/// Orbital apsis a burn is centred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apsis {
    Apoapsis,
    Periapsis,
}

impl fmt::Display for Apsis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Apsis::Apoapsis => f.write_str("apoapsis"),
            Apsis::Periapsis => f.write_str("periapsis"),
        }
    }
}

/// What a burn is meant to do to the orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurnIntent {
    Raise,
    Lower,
}

impl fmt::Display for BurnIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurnIntent::Raise => f.write_str("raise"),
            BurnIntent::Lower => f.write_str("lower"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurnDirection {
    Prograde,
    Retrograde,
}

/// Orbital event a maneuver node is anchored to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManeuverReference {
    Apsis(Apsis),
    /// Departure window of a Hohmann transfer at the given target phase angle (rad).
    TransferWindow { target_phase_rad: f64 },
}

/// Planned burn, consumed exactly once by the phase controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Maneuver {
    /// Signed prograde delta-v (m/s); negative burns retrograde.
    pub delta_v_m_s: f64,
    pub intent: BurnIntent,
    pub node_ut: f64,
    pub burn_start_ut: f64,
    pub burn_duration_s: f64,
    pub reference: ManeuverReference,
}

impl Maneuver {
    pub fn direction(&self) -> BurnDirection {
        if self.delta_v_m_s < 0.0 {
            BurnDirection::Retrograde
        } else {
            BurnDirection::Prograde
        }
    }

    pub fn half_burn_s(&self) -> f64 {
        self.burn_duration_s / 2.0
    }
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Orbit(#[from] OrbitMathError),
    #[error(transparent)]
    Propulsion(#[from] PropulsionError),
    #[error("direction mismatch: a {intent} burn needs the opposite sign of {delta_v_m_s} m/s")]
    DirectionMismatch { intent: BurnIntent, delta_v_m_s: f64 },
    #[error("burn of {duration_s} s exceeds the {limit_s} s limit")]
    BurnTooLong { duration_s: f64, limit_s: f64 },
}

/// Fail fast when the delta-v sign contradicts the burn intent. Zero passes either way.
pub fn check_direction(intent: BurnIntent, delta_v_m_s: f64) -> Result<(), PlanError> {
    let consistent = match intent {
        BurnIntent::Raise => delta_v_m_s >= 0.0,
        BurnIntent::Lower => delta_v_m_s <= 0.0,
    };
    if consistent {
        Ok(())
    } else {
        Err(PlanError::DirectionMismatch {
            intent,
            delta_v_m_s,
        })
    }
}

/// Refuse burns that are not finite or longer than `limit_s`; a thrust reading close to zero
/// otherwise turns into a burn that never ends.
pub fn check_burn_duration(duration_s: f64, limit_s: f64) -> Result<(), PlanError> {
    if duration_s.is_finite() && duration_s <= limit_s {
        Ok(())
    } else {
        Err(PlanError::BurnTooLong {
            duration_s,
            limit_s,
        })
    }
}

/// Circularize at the given apsis: the target orbit is circular at the apsis radius and the
/// burn straddles the apsis.
pub fn plan_circularization(
    orbit: &OrbitState,
    vehicle: &VehicleState,
    apsis: Apsis,
    intent: BurnIntent,
    now_ut: f64,
    g0: f64,
) -> Result<Maneuver, PlanError> {
    let (radius, time_to_apsis) = match apsis {
        Apsis::Apoapsis => (orbit.apoapsis_radius_m, orbit.time_to_apoapsis_s),
        Apsis::Periapsis => (orbit.periapsis_radius_m, orbit.time_to_periapsis_s),
    };

    let delta_v = circular_velocity_delta(orbit.mu_m3_s2, radius, orbit.semi_major_axis_m, radius)?;
    check_direction(intent, delta_v)?;
    let duration = vehicle.burn_duration(g0, delta_v)?;

    let node_ut = now_ut + time_to_apsis;
    debug!(%apsis, %intent, delta_v, duration, node_ut, "planned circularization");
    Ok(Maneuver {
        delta_v_m_s: delta_v,
        intent,
        node_ut,
        burn_start_ut: node_ut - duration / 2.0,
        burn_duration_s: duration,
        reference: ManeuverReference::Apsis(apsis),
    })
}

/// Circularize the parking orbit at apoapsis after ascent.
pub fn plan_departure_circularization(
    orbit: &OrbitState,
    vehicle: &VehicleState,
    now_ut: f64,
    g0: f64,
) -> Result<Maneuver, PlanError> {
    plan_circularization(orbit, vehicle, Apsis::Apoapsis, BurnIntent::Raise, now_ut, g0)
}

/// Capture into a circular orbit at periapsis of the arrival trajectory. The burn must lower
/// the orbit; a positive delta-v means the inputs are wrong and is rejected.
pub fn plan_arrival(
    orbit: &OrbitState,
    vehicle: &VehicleState,
    now_ut: f64,
    g0: f64,
) -> Result<Maneuver, PlanError> {
    plan_circularization(orbit, vehicle, Apsis::Periapsis, BurnIntent::Lower, now_ut, g0)
}

/// Transfer maneuver plus the geometry that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    pub maneuver: Maneuver,
    pub current_phase_rad: f64,
    pub target_phase_rad: f64,
    pub wait_s: f64,
    pub hohmann: HohmannResult,
}

/// Hohmann transfer from the vessel's (near circular) orbit to a body sharing its primary.
///
/// The node sits at the next time the live phase angle reaches the transfer phase angle; the
/// burn starts on the node.
pub fn plan_transfer(
    vessel_orbit: &OrbitState,
    target_orbit: &OrbitState,
    current_phase_rad: f64,
    now_ut: f64,
    vehicle: &VehicleState,
    g0: f64,
) -> Result<TransferPlan, PlanError> {
    let r1 = vessel_orbit.semi_major_axis_m;
    let r2 = target_orbit.semi_major_axis_m;
    let target_phase = hohmann_transfer_phase_angle(r1, r2)?;
    let wait = time_until_phase(
        current_phase_rad,
        target_phase,
        vessel_orbit.angular_rate()?,
        target_orbit.angular_rate()?,
    )?;

    let transfer = hohmann(r1, r2, vessel_orbit.mu_m3_s2)?;
    check_direction(BurnIntent::Raise, transfer.dv1_m_s)?;
    let duration = vehicle.burn_duration(g0, transfer.dv1_m_s)?;

    let node_ut = now_ut + wait;
    debug!(
        current_phase_rad,
        target_phase,
        wait,
        delta_v = transfer.dv1_m_s,
        duration,
        "planned transfer"
    );
    Ok(TransferPlan {
        maneuver: Maneuver {
            delta_v_m_s: transfer.dv1_m_s,
            intent: BurnIntent::Raise,
            node_ut,
            burn_start_ut: node_ut,
            burn_duration_s: duration,
            reference: ManeuverReference::TransferWindow {
                target_phase_rad: target_phase,
            },
        },
        current_phase_rad,
        target_phase_rad: target_phase,
        wait_s: wait,
        hohmann: transfer,
    })
}
