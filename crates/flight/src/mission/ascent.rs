//! Ascent phase: gravity turn from the pad until the apoapsis sits at the target altitude
//! and the vessel has left the atmosphere.

use pilot_config::AscentConfig;
use pilot_telemetry::{AttitudeHold, Vessel};
use tracing::{debug, info};

use super::{FlightContext, seconds};
use crate::error::FlightError;
use crate::timing::Clock;

/// Staging event fired because a tracked stage ran dry.
#[derive(Debug, Clone, PartialEq)]
pub struct DepletionStaging {
    pub stage: u32,
    pub ut: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AscentReport {
    pub depletion_stagings: Vec<DepletionStaging>,
    /// Universal time at which the full-throttle climb ended.
    pub throttle_up_cutoff_ut: f64,
    pub engine_cutoff_ut: f64,
    pub final_pitch_deg: f64,
}

/// Pitch above the horizon (deg) for `altitude_m`: 90° below the turn band, 0° above it,
/// linear in between.
pub fn pitch_target(profile: &AscentConfig, altitude_m: f64) -> f64 {
    let span = profile.turn_end_altitude_m - profile.turn_start_altitude_m;
    let frac = ((altitude_m - profile.turn_start_altitude_m) / span).clamp(0.0, 1.0);
    90.0 - frac * 90.0
}

/// Steering filter that only re-commands the pitch once it moved past the hysteresis.
#[derive(Debug, Clone)]
pub struct PitchSteering {
    commanded_deg: f64,
    hysteresis_deg: f64,
}

impl PitchSteering {
    pub fn new(initial_deg: f64, hysteresis_deg: f64) -> Self {
        Self {
            commanded_deg: initial_deg,
            hysteresis_deg,
        }
    }

    pub fn commanded_deg(&self) -> f64 {
        self.commanded_deg
    }

    /// New pitch to command, if the target drifted far enough from the last one. The ends of
    /// the program (90° and 0°) are always commanded once reached.
    pub fn update(&mut self, target_deg: f64) -> Option<f64> {
        let delta = (target_deg - self.commanded_deg).abs();
        let at_edge = target_deg == 0.0 || target_deg == 90.0;
        if delta > self.hysteresis_deg || (at_edge && delta > 0.0) {
            self.commanded_deg = target_deg;
            Some(target_deg)
        } else {
            None
        }
    }
}

/// Watches the tracked stages in order and reports each one once as it runs dry.
#[derive(Debug, Clone)]
pub struct DepletionMonitor {
    pending: Vec<u32>,
    threshold: f64,
}

impl DepletionMonitor {
    pub fn new(tracked_stages: &[u32], threshold: f64) -> Self {
        let mut pending = tracked_stages.to_vec();
        pending.reverse();
        Self { pending, threshold }
    }

    /// Returns the stage that just ran dry, at most one per call.
    pub fn poll<V: Vessel + ?Sized>(
        &mut self,
        vessel: &V,
        resource: &str,
    ) -> Result<Option<u32>, FlightError> {
        let Some(&stage) = self.pending.last() else {
            return Ok(None);
        };
        if vessel.resource_in_stage(resource, stage)? < self.threshold {
            self.pending.pop();
            return Ok(Some(stage));
        }
        Ok(None)
    }
}

pub fn fly<V: Vessel, C: Clock>(ctx: &mut FlightContext<V, C>) -> Result<AscentReport, FlightError> {
    let phase = ctx.phase;
    let profile = ctx.config.ascent.clone();
    let staging = ctx.config.staging.clone();
    let watchdog = ctx.config.watchdog.clone();
    let heading = profile.heading_deg;

    info!(
        target_apoapsis = profile.target_apoapsis_m,
        turn_start = profile.turn_start_altitude_m,
        turn_end = profile.turn_end_altitude_m,
        "launch sequence"
    );
    ctx.vessel.set_attitude_hold(AttitudeHold::Free)?;
    ctx.vessel.set_rcs(false)?;
    ctx.vessel.set_throttle(ctx.config.burn.full_throttle)?;
    ctx.poller.hold(phase, seconds(ctx.config.timing.launch_settle_s)?)?;

    // ignition, then clamp release
    ctx.vessel.activate_next_stage()?;
    ctx.vessel.engage_autopilot()?;
    ctx.vessel.set_attitude_hold(AttitudeHold::PitchHeading {
        pitch_deg: 90.0,
        heading_deg: heading,
    })?;
    ctx.vessel.activate_next_stage()?;

    let mut steering = PitchSteering::new(90.0, profile.pitch_hysteresis_deg);
    let mut depletion = DepletionMonitor::new(&staging.tracked_stages, staging.depletion_threshold);
    let mut depletion_stagings = Vec::new();
    let throttle_up_limit = profile.target_apoapsis_m * profile.throttle_up_fraction;

    {
        let limit = seconds(watchdog.ascent_s)?;
        let vessel = &mut ctx.vessel;
        ctx.poller
            .wait_until(phase, "apoapsis above throttle-up fraction", limit, || {
                let altitude = vessel.mean_altitude()?;
                if let Some(pitch) = steering.update(pitch_target(&profile, altitude)) {
                    debug!(altitude, pitch, "pitch program");
                    vessel.set_attitude_hold(AttitudeHold::PitchHeading {
                        pitch_deg: pitch,
                        heading_deg: heading,
                    })?;
                }
                if let Some(stage) = depletion.poll(&*vessel, &staging.propellant_resource)? {
                    vessel.activate_next_stage()?;
                    let ut = vessel.universal_time()?;
                    info!(stage, ut, altitude, "stage depleted; separated");
                    depletion_stagings.push(DepletionStaging { stage, ut });
                }
                Ok((vessel.apoapsis_altitude()? > throttle_up_limit).into())
            })?;
    }
    let throttle_up_cutoff_ut = ctx.vessel.universal_time()?;
    info!(ut = throttle_up_cutoff_ut, "throttle-up complete; trimming apoapsis");

    ctx.vessel.set_throttle(profile.coast_throttle)?;
    {
        let vessel = &ctx.vessel;
        let target = profile.target_apoapsis_m;
        let limit = seconds(watchdog.apoapsis_trim_s)?;
        ctx.poller
            .wait_until(phase, "apoapsis at target", limit, || {
                Ok((vessel.apoapsis_altitude()? >= target).into())
            })?;
    }
    ctx.vessel.set_throttle(0.0)?;
    let engine_cutoff_ut = ctx.vessel.universal_time()?;
    ctx.poller
        .hold(phase, seconds(ctx.config.timing.attitude_settle_s)?)?;
    ctx.vessel.activate_next_stage()?;
    info!(ut = engine_cutoff_ut, "ascent stage jettisoned; coasting out of the atmosphere");

    {
        let vessel = &ctx.vessel;
        let exit = profile.atmosphere_exit_altitude_m;
        let limit = seconds(watchdog.atmosphere_exit_s)?;
        ctx.poller
            .wait_until(phase, "atmosphere exit", limit, || {
                Ok((vessel.mean_altitude()? > exit).into())
            })?;
    }

    Ok(AscentReport {
        depletion_stagings,
        throttle_up_cutoff_ut,
        engine_cutoff_ut,
        final_pitch_deg: steering.commanded_deg(),
    })
}
