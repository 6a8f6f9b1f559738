//! Mission phase controller that sequences ascent, parking-orbit circularization, the
//! interplanetary transfer, and arrival capture.
//!
//! Each phase is a free function over a [`FlightContext`], so it can be flown on its own.
//! [`MissionController`] strings them together through the transition table below.

pub mod arrival;
pub mod ascent;
pub mod burn;
pub mod departure;
pub mod interplanetary;

use std::fmt;
use std::time::Duration;

use pilot_config::MissionConfig;
use pilot_telemetry::{AttitudeHold, NodeId, Vessel};
use tracing::{error, info, warn};

use crate::error::FlightError;
use crate::timing::{AbortHandle, Clock, Poller, WarpCoordinator};

use self::arrival::ArrivalReport;
use self::ascent::AscentReport;
use self::burn::BurnReport;
use self::interplanetary::TransferReport;

/// Mission phases in flight order, plus the terminal `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissionPhase {
    Ascent,
    KerbinCircularization,
    InterplanetaryTransfer,
    ArrivalCircularization,
    Complete,
    Aborted,
}

/// Forward transitions. `Aborted` is additionally reachable from every non-terminal phase.
const TRANSITIONS: &[(MissionPhase, MissionPhase)] = &[
    (MissionPhase::Ascent, MissionPhase::KerbinCircularization),
    (
        MissionPhase::KerbinCircularization,
        MissionPhase::InterplanetaryTransfer,
    ),
    (
        MissionPhase::InterplanetaryTransfer,
        MissionPhase::ArrivalCircularization,
    ),
    (MissionPhase::ArrivalCircularization, MissionPhase::Complete),
];

impl MissionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, MissionPhase::Complete | MissionPhase::Aborted)
    }

    /// Phase entered when this one finishes normally.
    pub fn next(self) -> Option<MissionPhase> {
        TRANSITIONS
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, to)| *to)
    }

    pub fn can_transition_to(self, to: MissionPhase) -> bool {
        if to == MissionPhase::Aborted {
            return !self.is_terminal();
        }
        TRANSITIONS.contains(&(self, to))
    }
}

impl fmt::Display for MissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissionPhase::Ascent => "ascent",
            MissionPhase::KerbinCircularization => "parking-orbit circularization",
            MissionPhase::InterplanetaryTransfer => "transfer",
            MissionPhase::ArrivalCircularization => "arrival circularization",
            MissionPhase::Complete => "complete",
            MissionPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Everything a phase needs: the vessel link, the poll driver, warp policy and configuration.
#[derive(Debug)]
pub struct FlightContext<V: Vessel, C: Clock> {
    pub vessel: V,
    pub poller: Poller<C>,
    pub warp: WarpCoordinator,
    pub config: MissionConfig,
    phase: MissionPhase,
    active_node: Option<NodeId>,
}

impl<V: Vessel, C: Clock> FlightContext<V, C> {
    /// Build a context starting in `phase`. The configuration is validated first.
    pub fn new(
        vessel: V,
        clock: C,
        config: MissionConfig,
        abort: AbortHandle,
        phase: MissionPhase,
    ) -> Result<Self, FlightError> {
        config.validate()?;
        let poller = Poller::new(clock, config.timing.poll_interval()?, abort);
        let warp = WarpCoordinator {
            min_warp_span_s: config.timing.min_warp_span_s,
            tolerance_s: config.timing.warp_tolerance_s,
            limit: seconds(config.watchdog.warp_s)?,
        };
        Ok(Self {
            vessel,
            poller,
            warp,
            config,
            phase,
            active_node: None,
        })
    }

    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    /// Node created by a committed burn and not yet removed.
    pub fn active_node(&self) -> Option<NodeId> {
        self.active_node
    }

    pub fn into_vessel(self) -> V {
        self.vessel
    }

    /// Throttle to zero, drop any outstanding node, release the autopilot and hold attitude.
    ///
    /// Runs on every failure path. Individual command failures are logged and the remaining
    /// steps still run.
    pub fn safe_idle(&mut self) {
        if let Err(err) = self.vessel.set_throttle(0.0) {
            error!(%err, "safe idle: throttle cut failed");
        }
        if let Some(node) = self.active_node.take() {
            if let Err(err) = self.vessel.remove_node(node) {
                error!(%err, %node, "safe idle: node removal failed");
            }
        }
        if let Err(err) = self.vessel.disengage_autopilot() {
            error!(%err, "safe idle: autopilot disengage failed");
        }
        if let Err(err) = self.vessel.set_attitude_hold(AttitudeHold::Stability) {
            error!(%err, "safe idle: stability hold failed");
        }
    }
}

/// Convert a wait in seconds; negative waits collapse to zero.
pub(crate) fn seconds(value: f64) -> Result<Duration, FlightError> {
    Duration::try_from_secs_f64(value.max(0.0))
        .map_err(|_| FlightError::DurationOutOfRange { seconds: value })
}

/// Per-phase results collected over a mission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissionReport {
    pub ascent: Option<AscentReport>,
    pub departure: Option<BurnReport>,
    pub transfer: Option<TransferReport>,
    pub arrival: Option<ArrivalReport>,
}

/// Drives the mission state machine from `Ascent` to `Complete` (or `Aborted`).
#[derive(Debug)]
pub struct MissionController<V: Vessel, C: Clock> {
    ctx: FlightContext<V, C>,
    history: Vec<MissionPhase>,
    report: MissionReport,
}

impl<V: Vessel, C: Clock> MissionController<V, C> {
    pub fn new(
        vessel: V,
        clock: C,
        config: MissionConfig,
        abort: AbortHandle,
    ) -> Result<Self, FlightError> {
        Self::starting_at(vessel, clock, config, abort, MissionPhase::Ascent)
    }

    /// Resume a mission at a later phase, e.g. when the vessel is already in its parking orbit.
    pub fn starting_at(
        vessel: V,
        clock: C,
        config: MissionConfig,
        abort: AbortHandle,
        phase: MissionPhase,
    ) -> Result<Self, FlightError> {
        let ctx = FlightContext::new(vessel, clock, config, abort, phase)?;
        Ok(Self {
            ctx,
            history: vec![phase],
            report: MissionReport::default(),
        })
    }

    pub fn phase(&self) -> MissionPhase {
        self.ctx.phase
    }

    /// Every phase entered so far, in order.
    pub fn history(&self) -> &[MissionPhase] {
        &self.history
    }

    pub fn report(&self) -> &MissionReport {
        &self.report
    }

    pub fn into_vessel(self) -> V {
        self.ctx.into_vessel()
    }

    /// Fly phases until the mission completes or fails.
    pub fn run(&mut self) -> Result<&MissionReport, FlightError> {
        while !self.ctx.phase.is_terminal() {
            self.step()?;
        }
        Ok(&self.report)
    }

    /// Fly the current phase to its exit condition and move to the next one.
    ///
    /// On failure the vehicle is put in safe idle and the mission ends in `Aborted`.
    pub fn step(&mut self) -> Result<MissionPhase, FlightError> {
        let phase = self.ctx.phase;
        let outcome = match phase {
            MissionPhase::Ascent => {
                ascent::fly(&mut self.ctx).map(|r| self.report.ascent = Some(r))
            }
            MissionPhase::KerbinCircularization => {
                departure::fly(&mut self.ctx).map(|r| self.report.departure = Some(r))
            }
            MissionPhase::InterplanetaryTransfer => {
                interplanetary::fly(&mut self.ctx).map(|r| self.report.transfer = Some(r))
            }
            MissionPhase::ArrivalCircularization => {
                arrival::fly(&mut self.ctx).map(|r| self.report.arrival = Some(r))
            }
            MissionPhase::Complete | MissionPhase::Aborted => return Ok(phase),
        };

        let result = outcome.and_then(|()| match phase.next() {
            Some(next) => self.transition(next),
            None => Err(FlightError::IllegalTransition {
                from: phase,
                to: phase,
            }),
        });

        match result {
            Ok(()) => Ok(self.ctx.phase),
            Err(err) => {
                error!(%phase, kind = ?err.kind(), %err, "phase failed; entering safe idle");
                self.ctx.safe_idle();
                if let Err(transition_err) = self.transition(MissionPhase::Aborted) {
                    warn!(%transition_err, "abort transition rejected");
                }
                Err(err)
            }
        }
    }

    fn transition(&mut self, to: MissionPhase) -> Result<(), FlightError> {
        let from = self.ctx.phase;
        if !from.can_transition_to(to) {
            return Err(FlightError::IllegalTransition { from, to });
        }
        info!(%from, %to, "phase transition");
        self.ctx.phase = to;
        self.history.push(to);
        Ok(())
    }
}
