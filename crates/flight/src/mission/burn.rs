//! Maneuver node lifecycle and burn execution shared by the burn phases.

use pilot_telemetry::{NodeId, Vessel, vehicle_snapshot};
use pilot_propulsion::VehicleState;
use tracing::info;

use super::{FlightContext, seconds};
use crate::error::FlightError;
use crate::planner::{Apsis, Maneuver, check_burn_duration};
use crate::timing::{Clock, WarpDecision};

/// A maneuver whose node exists on the vessel.
///
/// Only [`FlightContext::commit`] creates one and only [`FlightContext::discard`] ends it, so a
/// warp keyed to a burn can never precede its node and a node cannot outlive its burn unnoticed.
#[derive(Debug)]
pub struct ScheduledBurn {
    maneuver: Maneuver,
    node: NodeId,
}

impl ScheduledBurn {
    pub fn maneuver(&self) -> &Maneuver {
        &self.maneuver
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

/// What actually happened during a burn.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnReport {
    pub delta_v_m_s: f64,
    pub planned_duration_s: f64,
    pub node_ut: f64,
    pub ignition_ut: f64,
    pub cutoff_ut: f64,
    pub warped: bool,
}

impl<V: Vessel, C: Clock> FlightContext<V, C> {
    /// Create the maneuver node for `maneuver`. Only one node may be outstanding at a time,
    /// and the planned burn must fit the configured burn limit.
    pub fn commit(&mut self, maneuver: Maneuver) -> Result<ScheduledBurn, FlightError> {
        if let Some(existing) = self.active_node {
            return Err(FlightError::NodeLifecycle(format!(
                "node {existing} is still outstanding"
            )));
        }
        check_burn_duration(maneuver.burn_duration_s, self.config.burn.max_burn_duration_s)?;
        let node = self
            .vessel
            .add_node(maneuver.node_ut, maneuver.delta_v_m_s)?;
        self.active_node = Some(node);
        info!(
            phase = %self.phase,
            %node,
            node_ut = maneuver.node_ut,
            delta_v = maneuver.delta_v_m_s,
            burn_s = maneuver.burn_duration_s,
            "maneuver node created"
        );
        Ok(ScheduledBurn { maneuver, node })
    }

    /// Remove the node of a finished burn.
    pub fn discard(&mut self, burn: ScheduledBurn) -> Result<Maneuver, FlightError> {
        if self.active_node != Some(burn.node) {
            return Err(FlightError::NodeLifecycle(format!(
                "node {} is not the outstanding node",
                burn.node
            )));
        }
        self.vessel.remove_node(burn.node)?;
        self.active_node = None;
        Ok(burn.maneuver)
    }

    /// Fresh vehicle snapshot with the configured propellant tracking.
    pub fn vehicle_state(&self) -> Result<VehicleState, FlightError> {
        let staging = &self.config.staging;
        Ok(vehicle_snapshot(
            &self.vessel,
            &staging.propellant_resource,
            &staging.tracked_stages,
        )?)
    }

    /// Warp to `lead_s` before the burn starts.
    pub fn warp_to_burn(
        &mut self,
        burn: &ScheduledBurn,
        lead_s: f64,
    ) -> Result<WarpDecision, FlightError> {
        let phase = self.phase;
        self.warp.approach(
            &mut self.vessel,
            &mut self.poller,
            phase,
            burn.maneuver.burn_start_ut,
            lead_s,
        )
    }

    /// Poll the live countdown to `apsis` until half the burn remains before it.
    pub fn await_apsis_ignition(
        &mut self,
        burn: &ScheduledBurn,
        apsis: Apsis,
    ) -> Result<(), FlightError> {
        let phase = self.phase;
        let half_burn = burn.maneuver.half_burn_s();
        let limit = seconds(self.config.watchdog.burn_alignment_s)?;
        let vessel = &self.vessel;
        self.poller
            .wait_until(phase, "burn start at apsis", limit, || {
                let countdown = match apsis {
                    Apsis::Apoapsis => vessel.time_to_apoapsis()?,
                    Apsis::Periapsis => vessel.time_to_periapsis()?,
                };
                Ok((countdown - half_burn <= 0.0).into())
            })
    }

    /// Poll universal time until the burn's start time.
    pub fn await_ignition_time(&mut self, burn: &ScheduledBurn) -> Result<(), FlightError> {
        let phase = self.phase;
        let start = burn.maneuver.burn_start_ut;
        let limit = seconds(self.config.watchdog.burn_alignment_s)?;
        let vessel = &self.vessel;
        self.poller
            .wait_until(phase, "burn start time", limit, || {
                Ok((vessel.universal_time()? >= start).into())
            })
    }

    /// Burn at `throttle` for `duration_s`, then cut the engine.
    pub fn burn_for(&mut self, throttle: f64, duration_s: f64) -> Result<(), FlightError> {
        let phase = self.phase;
        let duration = seconds(duration_s)?;
        self.vessel.set_throttle(throttle)?;
        self.poller.hold(phase, duration)?;
        self.vessel.set_throttle(0.0)?;
        Ok(())
    }

    /// Warp to `lead_s` before a committed circularization burn, then fly it.
    pub fn execute_apsis_burn(
        &mut self,
        burn: ScheduledBurn,
        apsis: Apsis,
        lead_s: f64,
        settle_s: f64,
    ) -> Result<BurnReport, FlightError> {
        let decision = self.warp_to_burn(&burn, lead_s)?;
        self.burn_at_apsis(burn, apsis, decision, settle_s)
    }

    /// Fly a committed burn centred on `apsis` once the warp is done, then release its node.
    pub fn burn_at_apsis(
        &mut self,
        burn: ScheduledBurn,
        apsis: Apsis,
        decision: WarpDecision,
        settle_s: f64,
    ) -> Result<BurnReport, FlightError> {
        self.await_apsis_ignition(&burn, apsis)?;

        let ignition_ut = self.vessel.universal_time()?;
        info!(phase = %self.phase, %apsis, ignition_ut, burn_s = burn.maneuver.burn_duration_s, "ignition");
        self.burn_for(self.config.burn.full_throttle, burn.maneuver.burn_duration_s)?;
        let cutoff_ut = self.vessel.universal_time()?;
        let phase = self.phase;
        self.poller.hold(phase, seconds(settle_s)?)?;

        let maneuver = self.discard(burn)?;
        info!(phase = %self.phase, cutoff_ut, "burn complete");
        Ok(BurnReport {
            delta_v_m_s: maneuver.delta_v_m_s,
            planned_duration_s: maneuver.burn_duration_s,
            node_ut: maneuver.node_ut,
            ignition_ut,
            cutoff_ut,
            warped: matches!(decision, WarpDecision::Warp { .. }),
        })
    }
}
