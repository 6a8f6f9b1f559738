//! Offline transfer plan from catalog data, without a live vessel.
//!
//! Mirrors what the controller computes in flight, with circular orbits standing in for
//! telemetry snapshots.

use pilot_config::{BodyConfig, VehicleConfig};
use pilot_impulsive::{HohmannResult, hohmann};
use pilot_orbits::{
    OrbitMathError, angular_rate, capture_delta_v, hohmann_transfer_phase_angle, time_until_phase,
    vis_viva_speed,
};
use pilot_propulsion::{PropulsionError, mass_after_burn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanningError {
    #[error(transparent)]
    Orbit(#[from] OrbitMathError),
    #[error(transparent)]
    Propulsion(#[from] PropulsionError),
    #[error("body `{body}` has no {field} in the catalog")]
    MissingField { body: String, field: &'static str },
    #[error("`{target}` does not orbit `{primary}`")]
    NotASatellite { target: String, primary: String },
}

/// Inputs for [`plan_transfer`].
#[derive(Debug, Clone)]
pub struct PlanRequest<'a> {
    pub primary: &'a BodyConfig,
    pub target: &'a BodyConfig,
    pub vehicle: &'a VehicleConfig,
    /// Parking orbit altitude above the primary (m).
    pub parking_altitude_m: f64,
    /// Capture orbit altitude above the target (m).
    pub capture_altitude_m: f64,
    /// Live phase angle (rad); when given the wait until the window is computed.
    pub current_phase_rad: Option<f64>,
    pub g0: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlanSummary {
    pub parking_radius_m: f64,
    pub parking_speed_m_s: f64,
    pub target_orbit_radius_m: f64,
    pub phase_angle_rad: f64,
    pub hohmann: HohmannResult,
    pub burn_duration_s: f64,
    pub mass_after_transfer_kg: f64,
    pub wait_s: Option<f64>,
    /// Hyperbolic excess speed relative to the target on arrival.
    pub arrival_v_inf_m_s: f64,
    pub capture_delta_v_m_s: f64,
}

pub fn plan_transfer(request: &PlanRequest<'_>) -> Result<TransferPlanSummary, PlanningError> {
    let primary = request.primary;
    let target = request.target;
    if target.parent.as_deref() != Some(primary.name.as_str()) {
        return Err(PlanningError::NotASatellite {
            target: target.name.clone(),
            primary: primary.name.clone(),
        });
    }
    let r2 = target.orbit_radius_m.ok_or_else(|| PlanningError::MissingField {
        body: target.name.clone(),
        field: "orbit_radius_m",
    })?;

    let mu = primary.mu_m3_s2;
    let r1 = primary.radius_m + request.parking_altitude_m;
    let parking_speed = vis_viva_speed(mu, r1, r1)?;
    let phase_angle = hohmann_transfer_phase_angle(r1, r2)?;
    let transfer = hohmann(r1, r2, mu)?;

    let vehicle = request.vehicle;
    let burn_duration_s = pilot_propulsion::burn_duration(
        vehicle.thrust_n,
        vehicle.isp_s,
        request.g0,
        vehicle.mass_kg,
        transfer.dv1_m_s,
    )?;
    let mass_after_transfer_kg =
        mass_after_burn(vehicle.isp_s, request.g0, vehicle.mass_kg, transfer.dv1_m_s)?;

    let wait_s = match request.current_phase_rad {
        Some(current) => {
            let rate_parking = angular_rate(circular_period(mu, r1))?;
            let rate_target = angular_rate(circular_period(mu, r2))?;
            Some(time_until_phase(current, phase_angle, rate_parking, rate_target)?)
        }
        None => None,
    };

    // speed relative to the target at transfer apoapsis
    let arrival_v_inf = transfer.dv2_m_s.abs();
    let capture_radius = target.radius_m + request.capture_altitude_m;
    let capture = capture_delta_v(target.mu_m3_s2, capture_radius, arrival_v_inf);

    Ok(TransferPlanSummary {
        parking_radius_m: r1,
        parking_speed_m_s: parking_speed,
        target_orbit_radius_m: r2,
        phase_angle_rad: phase_angle,
        hohmann: transfer,
        burn_duration_s,
        mass_after_transfer_kg,
        wait_s,
        arrival_v_inf_m_s: arrival_v_inf,
        capture_delta_v_m_s: capture,
    })
}

fn circular_period(mu: f64, r: f64) -> f64 {
    std::f64::consts::TAU * (r.powi(3) / mu).sqrt()
}
