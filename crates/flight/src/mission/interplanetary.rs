//! Transfer leg: wait for the Hohmann phase window, burn onto the transfer ellipse and coast
//! into the target's sphere of influence.

use pilot_core::vector::Vector3;
use pilot_orbits::relative_phase_angle;
use pilot_telemetry::{BodyRef, Vessel};
use tracing::{info, warn};

use super::{FlightContext, seconds};
use crate::error::FlightError;
use crate::planner::{TransferPlan, check_burn_duration, plan_transfer};
use crate::timing::{Clock, WarpDecision};

#[derive(Debug, Clone, PartialEq)]
pub struct TransferReport {
    pub current_phase_rad: f64,
    pub target_phase_rad: f64,
    pub wait_s: f64,
    pub delta_v_m_s: f64,
    pub node_ut: f64,
    pub ignition_ut: f64,
    /// Open-loop burn length actually flown, from a fresh vehicle snapshot at ignition.
    pub open_loop_s: f64,
    pub cutoff_ut: f64,
    pub apoapsis_radius_m: f64,
    pub time_to_soi_s: f64,
    pub arrival_ut: f64,
}

/// Signed phase angle from the vessel to `target`, positive when the target leads.
pub fn current_phase_angle<V: Vessel + ?Sized>(
    vessel: &V,
    target: &str,
) -> Result<f64, FlightError> {
    let own: Vector3 = vessel.position(BodyRef::ActiveVessel)?;
    let other = vessel.position(BodyRef::Body(target))?;
    let normal = vessel.orbit_normal()?;
    Ok(relative_phase_angle(&own, &other, &normal)?)
}

pub fn fly<V: Vessel, C: Clock>(
    ctx: &mut FlightContext<V, C>,
) -> Result<TransferReport, FlightError> {
    let phase = ctx.phase;
    let target = ctx.config.target.body.clone();
    let g0 = ctx.config.burn.standard_gravity_m_s2;

    let vessel_orbit = ctx.vessel.orbit()?;
    let target_orbit = ctx.vessel.body_orbit(&target)?;
    let current_phase = current_phase_angle(&ctx.vessel, &target)?;
    let now = ctx.vessel.universal_time()?;
    let vehicle = ctx.vehicle_state()?;
    let TransferPlan {
        maneuver,
        current_phase_rad,
        target_phase_rad,
        wait_s,
        ..
    } = plan_transfer(&vessel_orbit, &target_orbit, current_phase, now, &vehicle, g0)?;
    info!(
        %target,
        current_phase_deg = current_phase_rad.to_degrees(),
        target_phase_deg = target_phase_rad.to_degrees(),
        wait_s,
        "transfer window"
    );

    let burn = ctx.commit(maneuver)?;
    ctx.warp_to_burn(&burn, ctx.config.timing.transfer_lead_time_s)?;
    ctx.await_ignition_time(&burn)?;

    // mass has changed since planning; size the open-loop part from a fresh snapshot
    let fresh = ctx.vehicle_state()?;
    let duration = fresh.burn_duration(g0, burn.maneuver().delta_v_m_s)?;
    check_burn_duration(duration, ctx.config.burn.max_burn_duration_s)?;
    let open_loop_s = duration * ctx.config.burn.open_loop_fraction;
    let ignition_ut = ctx.vessel.universal_time()?;
    info!(ignition_ut, open_loop_s, "transfer ignition");
    ctx.burn_for(ctx.config.burn.full_throttle, open_loop_s)?;

    ctx.vessel.set_throttle(ctx.config.burn.trim_throttle)?;
    let cutoff_radius = target_orbit.semi_major_axis_m + ctx.config.target.apoapsis_margin_m;
    {
        let vessel = &ctx.vessel;
        let limit = seconds(ctx.config.watchdog.transfer_trim_s)?;
        ctx.poller
            .wait_until(phase, "transfer apoapsis at target orbit", limit, || {
                Ok((vessel.orbit()?.apoapsis_radius_m >= cutoff_radius).into())
            })?;
    }
    ctx.vessel.set_throttle(0.0)?;
    let cutoff_ut = ctx.vessel.universal_time()?;
    let node_ut = burn.maneuver().node_ut;
    let delta_v = burn.maneuver().delta_v_m_s;
    ctx.discard(burn)?;
    let apoapsis_radius_m = ctx.vessel.orbit()?.apoapsis_radius_m;
    info!(cutoff_ut, apoapsis_radius_m, "transfer burn complete");

    let time_to_soi_s = ctx.vessel.time_to_soi_change()?;
    if !(time_to_soi_s.is_finite() && time_to_soi_s > 0.0) {
        return Err(FlightError::TransferTrajectory { time_to_soi_s });
    }

    let soi_ut = ctx.vessel.universal_time()? + time_to_soi_s;
    let decision = ctx.warp.approach(
        &mut ctx.vessel,
        &mut ctx.poller,
        phase,
        soi_ut + ctx.config.timing.soi_margin_s,
        0.0,
    )?;
    if decision == WarpDecision::RealTime {
        warn!(time_to_soi_s, "SOI change too close to warp");
    }

    let transition = {
        let vessel = &ctx.vessel;
        let limit = seconds(ctx.config.watchdog.soi_transition_s)?;
        ctx.poller
            .wait_until(phase, "sphere of influence transition", limit, || {
                Ok((vessel.primary_body()? == target).into())
            })
    };
    if let Err(FlightError::PhaseTimeout { .. }) = transition {
        let actual = ctx.vessel.primary_body()?;
        return Err(FlightError::UnexpectedPrimary {
            expected: target,
            actual,
        });
    }
    transition?;
    let arrival_ut = ctx.vessel.universal_time()?;
    info!(%target, arrival_ut, "entered target sphere of influence");

    Ok(TransferReport {
        current_phase_rad,
        target_phase_rad,
        wait_s,
        delta_v_m_s: delta_v,
        node_ut,
        ignition_ut,
        open_loop_s,
        cutoff_ut,
        apoapsis_radius_m,
        time_to_soi_s,
        arrival_ut,
    })
}
