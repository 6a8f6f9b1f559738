//! Poll-tick scheduling, watchdogs, abort signalling and time-warp coordination.
//!
//! Every wait in the controller is a cooperative loop: check the abort flag, probe the
//! condition once, check the watchdog, then suspend for one tick on the [`Clock`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use pilot_telemetry::Vessel;
use tracing::{debug, info, warn};

use crate::error::FlightError;
use crate::mission::MissionPhase;

/// Source of monotonic time and suspension for the poll loops.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn elapsed(&self) -> Duration;
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by [`Instant`] and thread sleeps.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Shared abort flag. Clones observe the same flag; any holder may request an abort.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one probe of a wait condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Ready,
    Pending,
}

impl From<bool> for PollStatus {
    fn from(ready: bool) -> Self {
        if ready {
            PollStatus::Ready
        } else {
            PollStatus::Pending
        }
    }
}

/// Bounded poll loop driver.
#[derive(Debug)]
pub struct Poller<C: Clock> {
    clock: C,
    interval: Duration,
    abort: AbortHandle,
}

impl<C: Clock> Poller<C> {
    pub fn new(clock: C, interval: Duration, abort: AbortHandle) -> Self {
        Self {
            clock,
            interval,
            abort,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn abort_handle(&self) -> &AbortHandle {
        &self.abort
    }

    pub fn check_abort(&self, phase: MissionPhase) -> Result<(), FlightError> {
        if self.abort.is_requested() {
            warn!(%phase, "abort signal observed");
            return Err(FlightError::Aborted { phase });
        }
        Ok(())
    }

    /// Poll `probe` once per tick until it reports ready.
    ///
    /// Fails with [`FlightError::PhaseTimeout`] once `limit` has passed without the condition
    /// holding, and with [`FlightError::Aborted`] as soon as an abort is requested.
    pub fn wait_until<F>(
        &mut self,
        phase: MissionPhase,
        condition: &'static str,
        limit: Duration,
        mut probe: F,
    ) -> Result<(), FlightError>
    where
        F: FnMut() -> Result<PollStatus, FlightError>,
    {
        let start = self.clock.elapsed();
        loop {
            self.check_abort(phase)?;
            if probe()? == PollStatus::Ready {
                return Ok(());
            }
            let waited = self.clock.elapsed().saturating_sub(start);
            if waited >= limit {
                return Err(FlightError::PhaseTimeout {
                    phase,
                    condition,
                    waited,
                    limit,
                });
            }
            self.clock.sleep(self.interval);
        }
    }

    /// Let `duration` pass in ticks, still honouring abort requests.
    pub fn hold(&mut self, phase: MissionPhase, duration: Duration) -> Result<(), FlightError> {
        let start = self.clock.elapsed();
        loop {
            self.check_abort(phase)?;
            let waited = self.clock.elapsed().saturating_sub(start);
            let Some(remaining) = duration.checked_sub(waited).filter(|r| !r.is_zero()) else {
                return Ok(());
            };
            self.clock.sleep(remaining.min(self.interval));
        }
    }
}

/// Whether an upcoming event is reached by warping or by real-time polling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WarpDecision {
    Warp { until_ut: f64 },
    RealTime,
}

/// Decides when simulated time is accelerated and confirms warp arrival by polling.
#[derive(Debug, Clone)]
pub struct WarpCoordinator {
    pub min_warp_span_s: f64,
    pub tolerance_s: f64,
    pub limit: Duration,
}

impl WarpCoordinator {
    /// Warp to `lead_s` before `event_ut` when that is more than the minimum span away;
    /// otherwise leave the approach to real-time polling.
    pub fn decide(&self, now_ut: f64, event_ut: f64, lead_s: f64) -> WarpDecision {
        let until_ut = event_ut - lead_s;
        if until_ut - now_ut > self.min_warp_span_s {
            WarpDecision::Warp { until_ut }
        } else {
            WarpDecision::RealTime
        }
    }

    /// Issue the warp request (if any) and poll universal time until it has arrived.
    pub fn approach<V, C>(
        &self,
        vessel: &mut V,
        poller: &mut Poller<C>,
        phase: MissionPhase,
        event_ut: f64,
        lead_s: f64,
    ) -> Result<WarpDecision, FlightError>
    where
        V: Vessel + ?Sized,
        C: Clock,
    {
        let now = vessel.universal_time()?;
        let decision = self.decide(now, event_ut, lead_s);
        match decision {
            WarpDecision::Warp { until_ut } => {
                info!(%phase, from_ut = now, until_ut, "warping");
                vessel.warp_to(until_ut)?;
                let arrived_at = until_ut - self.tolerance_s;
                poller.wait_until(phase, "time warp arrival", self.limit, || {
                    Ok((vessel.universal_time()? >= arrived_at).into())
                })?;
            }
            WarpDecision::RealTime => {
                debug!(%phase, now_ut = now, event_ut, "event too close to warp");
            }
        }
        Ok(decision)
    }
}
