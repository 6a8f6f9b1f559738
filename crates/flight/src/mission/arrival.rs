//! Capture burn at periapsis of the arrival trajectory, then payload separation.

use pilot_telemetry::{AttitudeHold, Vessel};
use tracing::info;

use super::burn::BurnReport;
use super::{FlightContext, seconds};
use crate::error::FlightError;
use crate::planner::{Apsis, plan_arrival};
use crate::timing::Clock;

#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalReport {
    pub capture: BurnReport,
    pub final_periapsis_altitude_m: f64,
    pub final_apoapsis_altitude_m: f64,
    pub separations: u32,
}

pub fn fly<V: Vessel, C: Clock>(
    ctx: &mut FlightContext<V, C>,
) -> Result<ArrivalReport, FlightError> {
    let phase = ctx.phase;
    let timing = ctx.config.timing.clone();

    // plan before touching any control so a bad trajectory leaves the vessel untouched
    let orbit = ctx.vessel.orbit()?;
    let vehicle = ctx.vehicle_state()?;
    let now = ctx.vessel.universal_time()?;
    let maneuver = plan_arrival(&orbit, &vehicle, now, ctx.config.burn.standard_gravity_m_s2)?;
    info!(
        periapsis = orbit.periapsis_altitude_m,
        sma = orbit.semi_major_axis_m,
        delta_v = maneuver.delta_v_m_s,
        "capture planned"
    );

    let burn = ctx.commit(maneuver)?;
    let decision = ctx.warp_to_burn(&burn, timing.arrival_lead_time_s)?;
    ctx.vessel.set_attitude_hold(AttitudeHold::Retrograde)?;
    ctx.poller.hold(phase, seconds(timing.attitude_settle_s)?)?;
    let capture = ctx.burn_at_apsis(burn, Apsis::Periapsis, decision, timing.capture_settle_s)?;

    let separations = ctx.config.staging.final_staging_events;
    for _ in 0..separations {
        ctx.vessel.activate_next_stage()?;
    }

    let captured = ctx.vessel.orbit()?;
    info!(
        periapsis = captured.periapsis_altitude_m,
        apoapsis = captured.apoapsis_altitude_m,
        separations,
        "captured"
    );
    Ok(ArrivalReport {
        capture,
        final_periapsis_altitude_m: captured.periapsis_altitude_m,
        final_apoapsis_altitude_m: captured.apoapsis_altitude_m,
        separations,
    })
}
