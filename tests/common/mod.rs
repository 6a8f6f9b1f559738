#![allow(dead_code)]

//! Scripted Kerbin to Mun flight shared by the controller tests.
//!
//! The vessel and the clock share one [`Sim`]. Sleeping on the clock advances wall time one
//! tick and integrates the burn; time warps shift universal time only, so watchdogs measure
//! wall time the way they do in flight.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;
use std::time::Duration;

use orbit_pilot::flight::{
    AbortHandle, AttitudeHold, BodyRef, Clock, MissionConfig, NodeId, TelemetryError, Vessel,
};
use orbit_pilot::orbits::OrbitState;
use pilot_core::constants::SIM_G0;

pub const KERBIN_MU: f64 = 3.5316e12;
pub const KERBIN_RADIUS: f64 = 600_000.0;
pub const MUN_MU: f64 = 6.513_839_8e10;
pub const MUN_RADIUS: f64 = 200_000.0;
pub const MUN_SMA: f64 = 12_000_000.0;
pub const MUN_CAPTURE_RADIUS: f64 = 230_000.0;

/// Mission configuration used by the tests: reference values without the launch settle.
pub fn test_config() -> MissionConfig {
    let mut config = MissionConfig::default();
    config.timing.launch_settle_s = 0.0;
    config
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Ascent,
    /// Engine off after ascent, climbing to the first apoapsis.
    Coast,
    Parking,
    Transfer,
    Mun,
    Captured,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Throttle(f64),
    Hold(AttitudeHold),
    Rcs(bool),
    Autopilot(bool),
    Stage,
    AddNode { node: NodeId, ut: f64, prograde: f64 },
    RemoveNode(NodeId),
    Warp { from_ut: f64, to_ut: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Logged {
    pub tick: u64,
    pub ut: f64,
    pub command: Command,
}

#[derive(Debug)]
pub struct Sim {
    pub wall: Duration,
    pub interval: Duration,
    pub warp_offset: f64,
    pub regime: Regime,
    pub throttle: f64,
    pub log: Vec<Logged>,
    pub nodes: Vec<NodeId>,
    next_node: u64,

    pub mass_kg: f64,
    pub thrust_n: f64,
    pub isp_s: f64,
    pub tracked_stage: u32,
    pub depletion_tick: u64,

    pub climb_per_tick_m: f64,
    pub target_apoapsis_m: f64,
    frozen_apoapsis_m: Option<f64>,

    pub orbit: OrbitState,
    pub apoapsis_ut: f64,
    pub periapsis_ut: f64,
    pub primary: String,
    pub burned_dv: f64,
    pub parking_radius_m: f64,

    pub vessel_angle0: f64,
    pub mun_angle0: f64,
    pub soi_delay_s: f64,
    pub soi_ut: f64,
    pub mun_periapsis_delay_s: f64,
    /// Warp requests are logged but universal time keeps running at real speed.
    pub warp_stalled: bool,

    /// Abort requested once this much delta-v has been burned in the given regime.
    pub abort_trigger: Option<(Regime, f64, AbortHandle)>,
}

pub type SharedSim = Rc<RefCell<Sim>>;

impl Sim {
    pub fn new(interval: Duration) -> Self {
        Self {
            wall: Duration::ZERO,
            interval,
            warp_offset: 0.0,
            regime: Regime::Ascent,
            throttle: 0.0,
            log: Vec::new(),
            nodes: Vec::new(),
            next_node: 1,
            mass_kg: 6_400.0,
            thrust_n: 60_000.0,
            isp_s: 345.0,
            tracked_stage: 2,
            depletion_tick: 50,
            climb_per_tick_m: 800.0,
            target_apoapsis_m: 150_000.0,
            frozen_apoapsis_m: None,
            orbit: circular(KERBIN_MU, KERBIN_RADIUS, KERBIN_RADIUS + 1.0),
            apoapsis_ut: 0.0,
            periapsis_ut: 0.0,
            primary: "Kerbin".to_string(),
            burned_dv: 0.0,
            parking_radius_m: KERBIN_RADIUS + 150_000.0,
            vessel_angle0: 0.0,
            mun_angle0: 1.0,
            soi_delay_s: 3_000.0,
            soi_ut: f64::INFINITY,
            mun_periapsis_delay_s: 4_000.0,
            warp_stalled: false,
            abort_trigger: None,
        }
    }

    pub fn shared(self) -> SharedSim {
        Rc::new(RefCell::new(self))
    }

    pub fn tick(&self) -> u64 {
        (self.wall.as_nanos() / self.interval.as_nanos()) as u64
    }

    pub fn ut(&self) -> f64 {
        self.wall.as_secs_f64() + self.warp_offset
    }

    /// Put the vessel in a circular parking orbit, as if ascent and circularization had flown.
    pub fn enter_parking(&mut self) {
        self.regime = Regime::Parking;
        self.orbit = circular(KERBIN_MU, KERBIN_RADIUS, self.parking_radius_m);
        self.burned_dv = 0.0;
    }

    /// Put the vessel on a hyperbolic approach inside the Mun's sphere of influence.
    pub fn enter_mun(&mut self) {
        self.regime = Regime::Mun;
        self.primary = "Mun".to_string();
        self.orbit = OrbitState {
            semi_major_axis_m: -500_000.0,
            apoapsis_radius_m: f64::INFINITY,
            periapsis_radius_m: MUN_CAPTURE_RADIUS,
            apoapsis_altitude_m: f64::INFINITY,
            periapsis_altitude_m: MUN_CAPTURE_RADIUS - MUN_RADIUS,
            period_s: f64::INFINITY,
            mu_m3_s2: MUN_MU,
            time_to_apoapsis_s: f64::NAN,
            time_to_periapsis_s: 0.0,
        };
        self.periapsis_ut = self.ut() + self.mun_periapsis_delay_s;
        self.burned_dv = 0.0;
    }

    pub fn mun_orbit(&self) -> OrbitState {
        circular(KERBIN_MU, KERBIN_RADIUS, MUN_SMA)
    }

    fn rate(mu: f64, r: f64) -> f64 {
        (mu / r.powi(3)).sqrt()
    }

    pub fn vessel_angle(&self, ut: f64) -> f64 {
        self.vessel_angle0 + Self::rate(KERBIN_MU, self.parking_radius_m) * ut
    }

    pub fn mun_angle(&self, ut: f64) -> f64 {
        self.mun_angle0 + Self::rate(KERBIN_MU, MUN_SMA) * ut
    }

    fn record(&mut self, command: Command) {
        let entry = Logged {
            tick: self.tick(),
            ut: self.ut(),
            command,
        };
        self.log.push(entry);
    }

    pub fn commands(&self) -> impl DoubleEndedIterator<Item = &Command> {
        self.log.iter().map(|entry| &entry.command)
    }

    pub fn stage_ticks(&self) -> Vec<u64> {
        self.log
            .iter()
            .filter(|entry| entry.command == Command::Stage)
            .map(|entry| entry.tick)
            .collect()
    }

    fn advance(&mut self, dt: Duration) {
        self.wall += dt;
        self.step(dt.as_secs_f64());
    }

    fn step(&mut self, dt: f64) {
        match self.regime {
            Regime::Coast | Regime::Mun if self.throttle > 0.0 => self.burn(dt),
            Regime::Parking if self.throttle > 0.0 => {
                self.burn(dt);
                let r = self.parking_radius_m;
                let speed = (KERBIN_MU / r).sqrt() + self.burned_dv;
                let sma = 1.0 / (2.0 / r - speed * speed / KERBIN_MU);
                let apoapsis = 2.0 * sma - r;
                self.orbit.semi_major_axis_m = sma;
                self.orbit.apoapsis_radius_m = apoapsis;
                self.orbit.apoapsis_altitude_m = apoapsis - KERBIN_RADIUS;
            }
            Regime::Transfer if self.ut() >= self.soi_ut => self.enter_mun(),
            _ => {}
        }
        if let Some((regime, dv, handle)) = &self.abort_trigger {
            if *regime == self.regime && self.burned_dv >= *dv {
                handle.request();
            }
        }
    }

    fn burn(&mut self, dt: f64) {
        let thrust = self.thrust_n * self.throttle;
        self.burned_dv += thrust / self.mass_kg * dt;
        self.mass_kg -= thrust / (self.isp_s * SIM_G0) * dt;
    }

    /// Engine cutoff: the orbit the burn was aiming for takes effect.
    fn cutoff(&mut self) {
        match self.regime {
            Regime::Ascent => {
                let apoapsis = self.apoapsis_altitude_now();
                if apoapsis >= self.target_apoapsis_m {
                    self.frozen_apoapsis_m = Some(apoapsis);
                    self.regime = Regime::Coast;
                    let apo_r = KERBIN_RADIUS + apoapsis;
                    let peri_r = 400_000.0;
                    self.parking_radius_m = apo_r;
                    self.orbit = OrbitState {
                        semi_major_axis_m: (apo_r + peri_r) / 2.0,
                        apoapsis_radius_m: apo_r,
                        periapsis_radius_m: peri_r,
                        apoapsis_altitude_m: apoapsis,
                        periapsis_altitude_m: peri_r - KERBIN_RADIUS,
                        period_s: TAU * (((apo_r + peri_r) / 2.0).powi(3) / KERBIN_MU).sqrt(),
                        mu_m3_s2: KERBIN_MU,
                        time_to_apoapsis_s: 0.0,
                        time_to_periapsis_s: 0.0,
                    };
                    self.apoapsis_ut = self.ut() + 60.0;
                }
            }
            Regime::Coast if self.burned_dv > 0.0 => self.enter_parking(),
            // the open-loop part of the transfer burn pauses short of the target orbit
            Regime::Parking if self.orbit.apoapsis_radius_m >= MUN_SMA => {
                self.regime = Regime::Transfer;
                self.soi_ut = self.ut() + self.soi_delay_s;
            }
            Regime::Mun if self.burned_dv > 0.0 => {
                self.regime = Regime::Captured;
                self.orbit = circular(MUN_MU, MUN_RADIUS, MUN_CAPTURE_RADIUS);
            }
            _ => {}
        }
    }

    fn apoapsis_altitude_now(&self) -> f64 {
        match self.regime {
            Regime::Ascent => self
                .frozen_apoapsis_m
                .unwrap_or(2.0 * self.climb_per_tick_m * self.tick() as f64),
            Regime::Coast => self.frozen_apoapsis_m.unwrap_or(0.0),
            _ => self.orbit.apoapsis_altitude_m,
        }
    }
}

pub fn circular(mu: f64, body_radius: f64, r: f64) -> OrbitState {
    OrbitState {
        semi_major_axis_m: r,
        apoapsis_radius_m: r,
        periapsis_radius_m: r,
        apoapsis_altitude_m: r - body_radius,
        periapsis_altitude_m: r - body_radius,
        period_s: TAU * (r.powi(3) / mu).sqrt(),
        mu_m3_s2: mu,
        time_to_apoapsis_s: 0.0,
        time_to_periapsis_s: 0.0,
    }
}

#[derive(Debug, Clone)]
pub struct SimClock(pub SharedSim);

impl Clock for SimClock {
    fn elapsed(&self) -> Duration {
        self.0.borrow().wall
    }

    fn sleep(&mut self, duration: Duration) {
        self.0.borrow_mut().advance(duration);
    }
}

#[derive(Debug, Clone)]
pub struct SimVessel(pub SharedSim);

impl Vessel for SimVessel {
    fn universal_time(&self) -> Result<f64, TelemetryError> {
        Ok(self.0.borrow().ut())
    }

    fn mean_altitude(&self) -> Result<f64, TelemetryError> {
        let sim = self.0.borrow();
        Ok(match sim.regime {
            Regime::Ascent | Regime::Coast => sim.climb_per_tick_m * sim.tick() as f64,
            _ => sim.orbit.periapsis_altitude_m,
        })
    }

    fn apoapsis_altitude(&self) -> Result<f64, TelemetryError> {
        Ok(self.0.borrow().apoapsis_altitude_now())
    }

    fn time_to_apoapsis(&self) -> Result<f64, TelemetryError> {
        Ok(self.orbit()?.time_to_apoapsis_s)
    }

    fn time_to_periapsis(&self) -> Result<f64, TelemetryError> {
        Ok(self.orbit()?.time_to_periapsis_s)
    }

    fn time_to_soi_change(&self) -> Result<f64, TelemetryError> {
        let sim = self.0.borrow();
        Ok(match sim.regime {
            Regime::Transfer => sim.soi_ut - sim.ut(),
            _ => f64::NAN,
        })
    }

    fn resource_in_stage(&self, resource: &str, stage: u32) -> Result<f64, TelemetryError> {
        let sim = self.0.borrow();
        if resource != "LiquidFuel" || stage != sim.tracked_stage {
            return Ok(0.0);
        }
        Ok(if sim.tick() >= sim.depletion_tick { 0.0 } else { 100.0 })
    }

    fn mass(&self) -> Result<f64, TelemetryError> {
        Ok(self.0.borrow().mass_kg)
    }

    fn available_thrust(&self) -> Result<f64, TelemetryError> {
        Ok(self.0.borrow().thrust_n)
    }

    fn specific_impulse(&self) -> Result<f64, TelemetryError> {
        Ok(self.0.borrow().isp_s)
    }

    fn orbit(&self) -> Result<OrbitState, TelemetryError> {
        let sim = self.0.borrow();
        let ut = sim.ut();
        let mut orbit = sim.orbit;
        orbit.time_to_apoapsis_s = sim.apoapsis_ut - ut;
        orbit.time_to_periapsis_s = sim.periapsis_ut - ut;
        Ok(orbit)
    }

    fn body_orbit(&self, body: &str) -> Result<OrbitState, TelemetryError> {
        match body {
            "Mun" => Ok(self.0.borrow().mun_orbit()),
            other => Err(TelemetryError::UnknownBody(other.to_string())),
        }
    }

    fn primary_body(&self) -> Result<String, TelemetryError> {
        Ok(self.0.borrow().primary.clone())
    }

    fn position(&self, target: BodyRef<'_>) -> Result<[f64; 3], TelemetryError> {
        let sim = self.0.borrow();
        let ut = sim.ut();
        let (radius, angle) = match target {
            BodyRef::ActiveVessel => (sim.parking_radius_m, sim.vessel_angle(ut)),
            BodyRef::Body("Mun") => (MUN_SMA, sim.mun_angle(ut)),
            BodyRef::Body(other) => return Err(TelemetryError::UnknownBody(other.to_string())),
        };
        Ok([radius * angle.cos(), radius * angle.sin(), 0.0])
    }

    fn orbit_normal(&self) -> Result<[f64; 3], TelemetryError> {
        Ok([0.0, 0.0, 1.0])
    }

    fn set_throttle(&mut self, throttle: f64) -> Result<(), TelemetryError> {
        let mut sim = self.0.borrow_mut();
        sim.record(Command::Throttle(throttle));
        let was_burning = sim.throttle > 0.0;
        sim.throttle = throttle;
        if was_burning && throttle == 0.0 {
            sim.cutoff();
        }
        Ok(())
    }

    fn set_attitude_hold(&mut self, hold: AttitudeHold) -> Result<(), TelemetryError> {
        self.0.borrow_mut().record(Command::Hold(hold));
        Ok(())
    }

    fn set_rcs(&mut self, enabled: bool) -> Result<(), TelemetryError> {
        self.0.borrow_mut().record(Command::Rcs(enabled));
        Ok(())
    }

    fn engage_autopilot(&mut self) -> Result<(), TelemetryError> {
        self.0.borrow_mut().record(Command::Autopilot(true));
        Ok(())
    }

    fn disengage_autopilot(&mut self) -> Result<(), TelemetryError> {
        self.0.borrow_mut().record(Command::Autopilot(false));
        Ok(())
    }

    fn activate_next_stage(&mut self) -> Result<(), TelemetryError> {
        self.0.borrow_mut().record(Command::Stage);
        Ok(())
    }

    fn add_node(&mut self, ut: f64, prograde_m_s: f64) -> Result<NodeId, TelemetryError> {
        let mut sim = self.0.borrow_mut();
        let node = NodeId(sim.next_node);
        sim.next_node += 1;
        sim.nodes.push(node);
        sim.record(Command::AddNode {
            node,
            ut,
            prograde: prograde_m_s,
        });
        Ok(node)
    }

    fn remove_node(&mut self, node: NodeId) -> Result<(), TelemetryError> {
        let mut sim = self.0.borrow_mut();
        let Some(index) = sim.nodes.iter().position(|n| *n == node) else {
            return Err(TelemetryError::UnknownNode(node));
        };
        sim.nodes.remove(index);
        sim.record(Command::RemoveNode(node));
        Ok(())
    }

    fn warp_to(&mut self, ut: f64) -> Result<(), TelemetryError> {
        let mut sim = self.0.borrow_mut();
        let from_ut = sim.ut();
        sim.record(Command::Warp { from_ut, to_ut: ut });
        if ut > from_ut && !sim.warp_stalled {
            sim.warp_offset += ut - from_ut;
        }
        sim.step(0.0);
        Ok(())
    }
}

/// Fresh sim with its vessel and clock, ticking at the configured poll interval.
pub fn scripted_flight(config: &MissionConfig) -> (SharedSim, SimVessel, SimClock) {
    let sim = Sim::new(config.timing.poll_interval().unwrap()).shared();
    (sim.clone(), SimVessel(sim.clone()), SimClock(sim))
}
