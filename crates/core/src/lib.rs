//! Core units, constants, and shared primitives for the orbit_pilot workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Gravity constant the flight simulation uses to convert specific impulse to exhaust velocity (m/s²).
    pub const SIM_G0: f64 = 9.82;
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
    /// Seconds in a simulation day (six-hour days).
    pub const SECONDS_PER_SIM_DAY: f64 = 6.0 * SECONDS_PER_HOUR;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert kilometres to metres.
    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(v: f64) -> f64 {
        v.to_radians()
    }

    /// Convert radians to degrees.
    #[inline]
    pub fn rad_to_deg(v: f64) -> f64 {
        v.to_degrees()
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    use super::constants::{SECONDS_PER_HOUR, SECONDS_PER_SIM_DAY};

    /// Split a duration in seconds into (days, hours, minutes, seconds) using six-hour days.
    pub fn split_sim_duration(seconds: f64) -> (i64, i64, i64, f64) {
        let total = seconds.max(0.0);
        let days = (total / SECONDS_PER_SIM_DAY).floor();
        let remaining = total - days * SECONDS_PER_SIM_DAY;
        let hours = (remaining / SECONDS_PER_HOUR).floor();
        let remaining = remaining - hours * SECONDS_PER_HOUR;
        let minutes = (remaining / 60.0).floor();
        let secs = remaining - minutes * 60.0;
        (days as i64, hours as i64, minutes as i64, secs)
    }

    /// Human readable `1d 2h 3m 4.5s` rendering of a duration.
    pub fn format_sim_duration(seconds: f64) -> String {
        let (d, h, m, s) = split_sim_duration(seconds);
        format!("{d}d {h}h {m}m {s:.1}s")
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in metres or m/s depending on context.
    pub type Vector3 = [f64; 3];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Unit vector in the direction of `v`, or `None` for a zero-length input.
    pub fn normalize(v: &Vector3) -> Option<Vector3> {
        let n = norm(v);
        if n > 0.0 && n.is_finite() {
            Some(scale(v, 1.0 / n))
        } else {
            None
        }
    }
}
