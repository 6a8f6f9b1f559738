//! Configuration models and loaders for orbit_pilot.
//!
//! Every mission section carries serde defaults that reproduce the reference Kerbin to Mun
//! flight, so an empty file is a valid mission.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pilot_core::constants::SIM_G0;
use serde::Deserialize;
use thiserror::Error;

/// Complete flight configuration handed to the mission controller.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MissionConfig {
    pub name: String,
    pub target: TargetConfig,
    pub ascent: AscentConfig,
    pub staging: StagingConfig,
    pub burn: BurnConfig,
    pub timing: TimingConfig,
    pub watchdog: WatchdogConfig,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            name: "Mun transfer".to_string(),
            target: TargetConfig::default(),
            ascent: AscentConfig::default(),
            staging: StagingConfig::default(),
            burn: BurnConfig::default(),
            timing: TimingConfig::default(),
            watchdog: WatchdogConfig::default(),
        }
    }
}

/// Destination of the transfer leg.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TargetConfig {
    /// Body name as known to the flight simulation.
    pub body: String,
    /// Extra apoapsis radius (m) beyond the body's orbital radius before the transfer burn cuts off.
    pub apoapsis_margin_m: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            body: "Mun".to_string(),
            apoapsis_margin_m: 0.0,
        }
    }
}

/// Gravity-turn ascent profile.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AscentConfig {
    pub turn_start_altitude_m: f64,
    pub turn_end_altitude_m: f64,
    pub target_apoapsis_m: f64,
    /// Fraction of the target apoapsis that ends the full-throttle climb.
    pub throttle_up_fraction: f64,
    /// Throttle held while the apoapsis is trimmed up to the target.
    pub coast_throttle: f64,
    pub atmosphere_exit_altitude_m: f64,
    /// Minimum pitch change (deg) before a new steering target is commanded.
    pub pitch_hysteresis_deg: f64,
    pub heading_deg: f64,
}

impl Default for AscentConfig {
    fn default() -> Self {
        Self {
            turn_start_altitude_m: 250.0,
            turn_end_altitude_m: 45_000.0,
            target_apoapsis_m: 150_000.0,
            throttle_up_fraction: 0.9,
            coast_throttle: 0.25,
            atmosphere_exit_altitude_m: 70_500.0,
            pitch_hysteresis_deg: 0.5,
            heading_deg: 90.0,
        }
    }
}

/// Staging behaviour: which stages are watched for depletion and how many separations end the flight.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StagingConfig {
    pub propellant_resource: String,
    /// Decouple stages watched during ascent, in the order they are expected to burn out.
    pub tracked_stages: Vec<u32>,
    pub depletion_threshold: f64,
    /// Staging events fired after arrival circularization (payload separation).
    pub final_staging_events: u32,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            propellant_resource: "LiquidFuel".to_string(),
            tracked_stages: vec![2],
            depletion_threshold: 0.1,
            final_staging_events: 2,
        }
    }
}

/// Burn execution tuning.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BurnConfig {
    /// Gravity constant used to turn specific impulse into exhaust velocity (m/s²).
    pub standard_gravity_m_s2: f64,
    pub full_throttle: f64,
    /// Throttle used while a closed-loop cutoff is trimming the transfer orbit.
    pub trim_throttle: f64,
    /// Share of the estimated transfer burn flown open loop before trimming.
    pub open_loop_fraction: f64,
    /// Longest burn a plan may ask for; anything longer is refused before a node is created.
    pub max_burn_duration_s: f64,
}

impl Default for BurnConfig {
    fn default() -> Self {
        Self {
            standard_gravity_m_s2: SIM_G0,
            full_throttle: 1.0,
            trim_throttle: 0.25,
            open_loop_fraction: 0.95,
            max_burn_duration_s: 1_800.0,
        }
    }
}

/// Poll cadence, warp lead times and settle delays (seconds).
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub poll_interval_s: f64,
    pub departure_lead_time_s: f64,
    pub transfer_lead_time_s: f64,
    pub arrival_lead_time_s: f64,
    pub soi_margin_s: f64,
    /// Shortest span worth a warp request; closer events are approached in real time.
    pub min_warp_span_s: f64,
    /// Universal time may undershoot a warp target by this much and still count as arrived.
    pub warp_tolerance_s: f64,
    pub launch_settle_s: f64,
    pub attitude_settle_s: f64,
    pub capture_settle_s: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_s: 0.05,
            departure_lead_time_s: 5.0,
            transfer_lead_time_s: 5.0,
            arrival_lead_time_s: 15.0,
            soi_margin_s: 10.0,
            min_warp_span_s: 1.0,
            warp_tolerance_s: 0.5,
            launch_settle_s: 1.0,
            attitude_settle_s: 1.0,
            capture_settle_s: 2.0,
        }
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.poll_interval_s)
            .ok()
            .filter(|interval| !interval.is_zero())
            .ok_or_else(|| invalid(format!("poll interval {} s is unusable", self.poll_interval_s)))
    }
}

/// Upper bounds (wall-clock seconds) on every polling wait.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WatchdogConfig {
    pub ascent_s: f64,
    pub apoapsis_trim_s: f64,
    pub atmosphere_exit_s: f64,
    pub warp_s: f64,
    pub burn_alignment_s: f64,
    pub transfer_trim_s: f64,
    pub soi_transition_s: f64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            ascent_s: 600.0,
            apoapsis_trim_s: 300.0,
            atmosphere_exit_s: 600.0,
            warp_s: 300.0,
            burn_alignment_s: 120.0,
            transfer_trim_s: 120.0,
            soi_transition_s: 300.0,
        }
    }
}

impl MissionConfig {
    /// Reject configurations the controller could not fly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.ascent;
        for (label, value) in [
            ("ascent.turn_start_altitude_m", a.turn_start_altitude_m),
            ("ascent.atmosphere_exit_altitude_m", a.atmosphere_exit_altitude_m),
            ("ascent.pitch_hysteresis_deg", a.pitch_hysteresis_deg),
            ("staging.depletion_threshold", self.staging.depletion_threshold),
            ("target.apoapsis_margin_m", self.target.apoapsis_margin_m),
        ] {
            non_negative(label, value)?;
        }
        if !(a.turn_end_altitude_m.is_finite() && a.turn_end_altitude_m > a.turn_start_altitude_m)
        {
            return Err(invalid(format!(
                "gravity turn band [{}, {}] is empty",
                a.turn_start_altitude_m, a.turn_end_altitude_m
            )));
        }
        for (label, value) in [
            ("ascent.target_apoapsis_m", a.target_apoapsis_m),
            ("burn.standard_gravity_m_s2", self.burn.standard_gravity_m_s2),
        ] {
            positive(label, value)?;
        }
        if !a.heading_deg.is_finite() {
            return Err(invalid("ascent.heading_deg must be a finite number"));
        }
        for (label, fraction) in [
            ("ascent.throttle_up_fraction", a.throttle_up_fraction),
            ("ascent.coast_throttle", a.coast_throttle),
            ("burn.full_throttle", self.burn.full_throttle),
            ("burn.trim_throttle", self.burn.trim_throttle),
            ("burn.open_loop_fraction", self.burn.open_loop_fraction),
        ] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(invalid(format!("{label} must lie in (0, 1], got {fraction}")));
            }
        }
        if self.staging.propellant_resource.trim().is_empty() {
            return Err(invalid("propellant resource name is empty"));
        }
        if self.target.body.trim().is_empty() {
            return Err(invalid("target body name is empty"));
        }

        let t = &self.timing;
        let w = &self.watchdog;
        for (label, value) in [
            ("timing.departure_lead_time_s", t.departure_lead_time_s),
            ("timing.transfer_lead_time_s", t.transfer_lead_time_s),
            ("timing.arrival_lead_time_s", t.arrival_lead_time_s),
            ("timing.soi_margin_s", t.soi_margin_s),
            ("timing.min_warp_span_s", t.min_warp_span_s),
            ("timing.warp_tolerance_s", t.warp_tolerance_s),
            ("timing.launch_settle_s", t.launch_settle_s),
            ("timing.attitude_settle_s", t.attitude_settle_s),
            ("timing.capture_settle_s", t.capture_settle_s),
        ] {
            duration(label, value, false)?;
        }
        for (label, value) in [
            ("timing.poll_interval_s", t.poll_interval_s),
            ("burn.max_burn_duration_s", self.burn.max_burn_duration_s),
            ("watchdog.ascent_s", w.ascent_s),
            ("watchdog.apoapsis_trim_s", w.apoapsis_trim_s),
            ("watchdog.atmosphere_exit_s", w.atmosphere_exit_s),
            ("watchdog.warp_s", w.warp_s),
            ("watchdog.burn_alignment_s", w.burn_alignment_s),
            ("watchdog.transfer_trim_s", w.transfer_trim_s),
            ("watchdog.soi_transition_s", w.soi_transition_s),
        ] {
            duration(label, value, true)?;
        }
        Ok(())
    }
}

fn non_negative(label: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{label} must be a non-negative number, got {value}")))
    }
}

fn positive(label: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{label} must be a positive number, got {value}")))
    }
}

/// Seconds that must also fit a [`Duration`].
fn duration(label: &str, value: f64, strictly_positive: bool) -> Result<(), ConfigError> {
    if strictly_positive {
        positive(label, value)?;
    } else {
        non_negative(label, value)?;
    }
    Duration::try_from_secs_f64(value)
        .map(|_| ())
        .map_err(|_| invalid(format!("{label} is too long, got {value} s")))
}

/// Celestial body catalog entry used by the planning CLI.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub mu_m3_s2: f64,
    pub radius_m: f64,
    #[serde(default)]
    pub soi_radius_m: Option<f64>,
    /// Semi-major axis of the body's own orbit around its parent.
    #[serde(default)]
    pub orbit_radius_m: Option<f64>,
    #[serde(default)]
    pub atmosphere_height_m: Option<f64>,
    pub default_parking_altitude_m: f64,
}

/// Vehicle catalog entry used by the planning CLI.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct VehicleConfig {
    pub name: String,
    pub mass_kg: f64,
    pub thrust_n: f64,
    pub isp_s: f64,
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

/// Load and validate a mission configuration from a TOML or YAML file.
pub fn load_mission_config<P: AsRef<Path>>(path: P) -> Result<MissionConfig, ConfigError> {
    let path = path.as_ref();
    let config: MissionConfig = if is_toml(path) {
        toml::from_str(&std::fs::read_to_string(path)?)?
    } else {
        serde_yaml::from_reader(File::open(path)?)?
    };
    config.validate()?;
    Ok(config)
}

/// Load body catalog entries from a YAML list, a single TOML file or a directory of TOML files.
pub fn load_bodies<P: AsRef<Path>>(path: P) -> Result<Vec<BodyConfig>, ConfigError> {
    load_records(path)
}

/// Load vehicle catalog entries from a YAML list, a single TOML file or a directory of TOML files.
pub fn load_vehicle_configs<P: AsRef<Path>>(path: P) -> Result<Vec<VehicleConfig>, ConfigError> {
    load_records(path)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}
