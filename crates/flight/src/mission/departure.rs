//! Parking-orbit circularization at the first apoapsis after ascent.

use pilot_telemetry::{AttitudeHold, Vessel};
use tracing::info;

use super::burn::BurnReport;
use super::{FlightContext, seconds};
use crate::error::FlightError;
use crate::planner::{Apsis, plan_departure_circularization};
use crate::timing::Clock;

pub fn fly<V: Vessel, C: Clock>(ctx: &mut FlightContext<V, C>) -> Result<BurnReport, FlightError> {
    let phase = ctx.phase;
    let orbit = ctx.vessel.orbit()?;
    let vehicle = ctx.vehicle_state()?;
    let now = ctx.vessel.universal_time()?;
    let maneuver = plan_departure_circularization(
        &orbit,
        &vehicle,
        now,
        ctx.config.burn.standard_gravity_m_s2,
    )?;

    let burn = ctx.commit(maneuver)?;
    ctx.vessel.disengage_autopilot()?;
    ctx.vessel.set_attitude_hold(AttitudeHold::Stability)?;
    ctx.poller
        .hold(phase, seconds(ctx.config.timing.attitude_settle_s)?)?;
    ctx.vessel.set_attitude_hold(AttitudeHold::Prograde)?;

    let lead = ctx.config.timing.departure_lead_time_s;
    let settle = ctx.config.timing.attitude_settle_s;
    let report = ctx.execute_apsis_burn(burn, Apsis::Apoapsis, lead, settle)?;
    ctx.vessel.set_attitude_hold(AttitudeHold::Prograde)?;

    let parked = ctx.vessel.orbit()?;
    info!(
        apoapsis = parked.apoapsis_altitude_m,
        periapsis = parked.periapsis_altitude_m,
        delta_v = report.delta_v_m_s,
        "parking orbit circularized"
    );
    Ok(report)
}
