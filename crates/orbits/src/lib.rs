//! Orbit utility helpers for patched-conic flight planning.
//!
//! Everything in this crate is a pure function of its inputs. Distances are metres, speeds
//! metres per second, angles radians, gravitational parameters m³/s².

use std::f64::consts::{PI, TAU};

use pilot_core::vector::{self, Vector3};
use thiserror::Error;

/// Failures raised by the closed-form orbital mechanics helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitMathError {
    #[error("invalid orbit parameters: {0}")]
    InvalidOrbitParameters(String),
    #[error("relative angular rate is zero; the target phase is never reached")]
    NoConvergence,
}

/// Snapshot of an orbit sampled from telemetry at one instant.
///
/// Snapshots go stale as soon as they are taken; sample again after every wait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub semi_major_axis_m: f64,
    pub apoapsis_radius_m: f64,
    pub periapsis_radius_m: f64,
    pub apoapsis_altitude_m: f64,
    pub periapsis_altitude_m: f64,
    pub period_s: f64,
    pub mu_m3_s2: f64,
    pub time_to_apoapsis_s: f64,
    pub time_to_periapsis_s: f64,
}

impl OrbitState {
    /// Mean angular rate (rad/s) of the orbit.
    pub fn angular_rate(&self) -> Result<f64, OrbitMathError> {
        angular_rate(self.period_s)
    }
}

fn invalid(msg: impl Into<String>) -> OrbitMathError {
    OrbitMathError::InvalidOrbitParameters(msg.into())
}

/// Orbital speed at radius `r` on an orbit of semi-major axis `a` (negative for hyperbolas).
pub fn vis_viva_speed(mu: f64, r: f64, a: f64) -> Result<f64, OrbitMathError> {
    if !(mu.is_finite() && mu > 0.0) {
        return Err(invalid(format!("gravitational parameter must be positive, got {mu}")));
    }
    if !(r.is_finite() && r > 0.0) {
        return Err(invalid(format!("radius must be positive, got {r}")));
    }
    if !a.is_finite() || a == 0.0 {
        return Err(invalid(format!("semi-major axis must be finite and non-zero, got {a}")));
    }
    let radicand = mu * (2.0 / r - 1.0 / a);
    if radicand <= 0.0 {
        return Err(invalid(format!(
            "radius {r} lies outside an orbit with semi-major axis {a}"
        )));
    }
    Ok(radicand.sqrt())
}

/// Signed velocity change at radius `r` to move from orbit `a_before` to orbit `a_after`.
///
/// Positive when the burn raises the orbit, negative when it lowers it. `a_before` may be
/// negative (hyperbolic approach); `a_after` must describe a closed orbit.
pub fn circular_velocity_delta(
    mu: f64,
    r: f64,
    a_before: f64,
    a_after: f64,
) -> Result<f64, OrbitMathError> {
    if !(a_after.is_finite() && a_after > 0.0) {
        return Err(invalid(format!(
            "target semi-major axis must be positive, got {a_after}"
        )));
    }
    let v_before = vis_viva_speed(mu, r, a_before)?;
    let v_after = vis_viva_speed(mu, r, a_after)?;
    Ok(v_after - v_before)
}

/// Mean angular rate (rad/s) for an orbital period in seconds.
pub fn angular_rate(period_s: f64) -> Result<f64, OrbitMathError> {
    if !(period_s.is_finite() && period_s > 0.0) {
        return Err(invalid(format!("orbital period must be positive, got {period_s}")));
    }
    Ok(TAU / period_s)
}

/// Wrap an angle into (-π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Signed angle from `pos_a` to `pos_b` about `reference_normal`, in (-π, π].
///
/// Right-handed convention: the result is positive when B leads A in the direction of
/// rotation about the normal (counter-clockwise seen from the tip of the normal). Swapping
/// the two positions negates the result.
pub fn relative_phase_angle(
    pos_a: &Vector3,
    pos_b: &Vector3,
    reference_normal: &Vector3,
) -> Result<f64, OrbitMathError> {
    let a = vector::normalize(pos_a).ok_or_else(|| invalid("first position has zero length"))?;
    let b = vector::normalize(pos_b).ok_or_else(|| invalid("second position has zero length"))?;
    let n = vector::normalize(reference_normal)
        .ok_or_else(|| invalid("reference normal has zero length"))?;

    let sin_part = vector::dot(&n, &vector::cross(&a, &b));
    let cos_part = vector::dot(&a, &b);
    let angle = sin_part.atan2(cos_part);
    Ok(if angle <= -PI { PI } else { angle })
}

/// Seconds until the phase angle reaches `target_phase`, given both bodies' angular rates.
///
/// The raw difference is shifted by whole turns until it has the sign of the relative rate,
/// so the result is always a strictly positive wait to the next opportunity. Being exactly on
/// the target counts as one full synodic period away.
pub fn time_until_phase(
    current_angle: f64,
    target_phase: f64,
    rate_a: f64,
    rate_b: f64,
) -> Result<f64, OrbitMathError> {
    if !(current_angle.is_finite() && target_phase.is_finite()) {
        return Err(invalid("phase angles must be finite"));
    }
    let relative_rate = rate_b - rate_a;
    if !relative_rate.is_finite() {
        return Err(invalid("angular rates must be finite"));
    }
    if relative_rate == 0.0 {
        return Err(OrbitMathError::NoConvergence);
    }

    let raw = normalize_angle(target_phase) - normalize_angle(current_angle);
    let delta = if relative_rate > 0.0 {
        let d = raw.rem_euclid(TAU);
        if d == 0.0 { TAU } else { d }
    } else {
        let d = -(-raw).rem_euclid(TAU);
        if d == 0.0 { -TAU } else { d }
    };
    Ok(delta / relative_rate)
}

/// Phase angle (rad) the target must lead the vessel by at departure of a Hohmann transfer
/// from circular radius `r1` out to circular radius `r2`.
pub fn hohmann_transfer_phase_angle(r1: f64, r2: f64) -> Result<f64, OrbitMathError> {
    if !(r1.is_finite() && r1 > 0.0) {
        return Err(invalid(format!("departure radius must be positive, got {r1}")));
    }
    if !(r2.is_finite() && r2 > r1) {
        return Err(invalid(format!(
            "outbound transfer requires target radius {r2} above departure radius {r1}"
        )));
    }
    Ok(PI * (1.0 - ((r1 + r2) / (2.0 * r2)).powf(1.5)))
}

/// Patched-conic escape delta-v from a circular parking orbit.
pub fn escape_delta_v(mu: f64, parking_radius: f64, v_inf: f64) -> f64 {
    let circular_speed = (mu / parking_radius).sqrt();
    let hyperbolic_speed = (v_inf * v_inf + 2.0 * mu / parking_radius).sqrt();
    (hyperbolic_speed - circular_speed).max(0.0)
}

/// Patched-conic capture delta-v for a rendezvous into a circular parking orbit.
pub fn capture_delta_v(mu: f64, parking_radius: f64, v_inf: f64) -> f64 {
    escape_delta_v(mu, parking_radius, v_inf)
}
