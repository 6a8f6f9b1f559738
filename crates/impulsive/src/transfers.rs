//! Analytic estimator for impulsive transfers in the coplanar, circular limit.
//!
//! Returns signed delta-v components and time of flight for two-body Keplerian motion with
//! a specified central gravitational parameter.

use pilot_orbits::{OrbitMathError, circular_velocity_delta};

/// Result for a Hohmann transfer between circular, coplanar orbits of radii r1 and r2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HohmannResult {
    pub transfer_sma_m: f64,
    pub dv1_m_s: f64,      // signed: negative for inward (retro) burn
    pub dv2_m_s: f64,      // signed: negative for retro capture when arriving inward
    pub dv_total_m_s: f64, // |dv1| + |dv2|
    pub tof_seconds: f64,
}

/// Compute the classical Hohmann transfer between two circular coplanar orbits.
///
/// Inputs:
/// - `r1_m`: initial circular orbit radius (m)
/// - `r2_m`: target circular orbit radius (m)
/// - `mu_m3_s2`: gravitational parameter of central body (m^3/s^2)
pub fn hohmann(r1_m: f64, r2_m: f64, mu_m3_s2: f64) -> Result<HohmannResult, OrbitMathError> {
    let a_t = 0.5 * (r1_m + r2_m);

    // Departure burn at r1 leaves the circular orbit for the transfer ellipse; the arrival burn
    // at r2 matches the circular orbit there.
    let dv1 = circular_velocity_delta(mu_m3_s2, r1_m, r1_m, a_t)?;
    let dv2 = circular_velocity_delta(mu_m3_s2, r2_m, a_t, r2_m)?;
    let tof = std::f64::consts::PI * (a_t.powi(3) / mu_m3_s2).sqrt();

    Ok(HohmannResult {
        transfer_sma_m: a_t,
        dv1_m_s: dv1,
        dv2_m_s: dv2,
        dv_total_m_s: dv1.abs() + dv2.abs(),
        tof_seconds: tof,
    })
}
