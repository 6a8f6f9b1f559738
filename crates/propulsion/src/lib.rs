//! Vehicle mass properties and rocket-equation burn estimates.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropulsionError {
    #[error("available thrust must be positive to plan a burn, got {0} N")]
    InsufficientThrust(f64),
    #[error("invalid vehicle parameters: {0}")]
    InvalidVehicle(String),
}

/// Propellant remaining in one tracked decouple stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StagePropellant {
    pub stage: u32,
    pub amount: f64,
}

/// Snapshot of the vehicle's mass properties as read from telemetry.
///
/// Staging and burning change every field; take a new snapshot before each estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    pub mass_kg: f64,
    pub available_thrust_n: f64,
    pub specific_impulse_s: f64,
    pub propellant: Vec<StagePropellant>,
}

impl VehicleState {
    /// Remaining propellant for the given decouple stage, if tracked.
    pub fn propellant_in_stage(&self, stage: u32) -> Option<f64> {
        self.propellant
            .iter()
            .find(|p| p.stage == stage)
            .map(|p| p.amount)
    }

    /// Burn duration for `delta_v` using this snapshot's thrust, Isp and mass.
    pub fn burn_duration(&self, g0: f64, delta_v: f64) -> Result<f64, PropulsionError> {
        burn_duration(
            self.available_thrust_n,
            self.specific_impulse_s,
            g0,
            self.mass_kg,
            delta_v,
        )
    }
}

fn check_mass_and_isp(isp_s: f64, g0: f64, m0: f64) -> Result<f64, PropulsionError> {
    if !(m0.is_finite() && m0 > 0.0) {
        return Err(PropulsionError::InvalidVehicle(format!(
            "initial mass must be positive, got {m0} kg"
        )));
    }
    let exhaust_velocity = isp_s * g0;
    if !(exhaust_velocity.is_finite() && exhaust_velocity > 0.0) {
        return Err(PropulsionError::InvalidVehicle(format!(
            "effective exhaust velocity must be positive, got {exhaust_velocity} m/s"
        )));
    }
    Ok(exhaust_velocity)
}

/// Mass remaining after expending `delta_v` (sign ignored) from initial mass `m0`.
pub fn mass_after_burn(isp_s: f64, g0: f64, m0: f64, delta_v: f64) -> Result<f64, PropulsionError> {
    let exhaust_velocity = check_mass_and_isp(isp_s, g0, m0)?;
    Ok(m0 / (delta_v.abs() / exhaust_velocity).exp())
}

/// Tsiolkovsky burn time: seconds of full thrust needed to expend `delta_v`.
///
/// Uses the magnitude of `delta_v`, so retrograde burns give the same duration as prograde
/// ones of equal size.
pub fn burn_duration(
    thrust_n: f64,
    isp_s: f64,
    g0: f64,
    m0: f64,
    delta_v: f64,
) -> Result<f64, PropulsionError> {
    if !(thrust_n.is_finite() && thrust_n > 0.0) {
        return Err(PropulsionError::InsufficientThrust(thrust_n));
    }
    let exhaust_velocity = check_mass_and_isp(isp_s, g0, m0)?;
    let m1 = mass_after_burn(isp_s, g0, m0, delta_v)?;
    let flow_rate = thrust_n / exhaust_velocity;
    Ok((m0 - m1) / flow_rate)
}
