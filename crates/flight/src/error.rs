//! Flight error taxonomy.

use std::time::Duration;

use pilot_config::ConfigError;
use pilot_orbits::OrbitMathError;
use pilot_propulsion::PropulsionError;
use pilot_telemetry::TelemetryError;

use crate::mission::MissionPhase;
use crate::planner::PlanError;

/// Top-level flight error. Every variant is fatal for the mission: the controller puts the
/// vehicle into a safe idle configuration and stops instead of retrying or re-planning.
#[derive(Debug, thiserror::Error)]
pub enum FlightError {
    #[error("orbital math failed: {0}")]
    Orbit(#[from] OrbitMathError),
    #[error("burn estimate failed: {0}")]
    Propulsion(#[from] PropulsionError),
    #[error("maneuver planning failed: {0}")]
    Plan(#[from] PlanError),
    #[error("telemetry failure: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{phase} timed out after {waited:?} (limit {limit:?}) waiting for {condition}")]
    PhaseTimeout {
        phase: MissionPhase,
        condition: &'static str,
        waited: Duration,
        limit: Duration,
    },
    #[error("transfer trajectory is wrong: time to SOI change is {time_to_soi_s} s")]
    TransferTrajectory { time_to_soi_s: f64 },
    #[error("vessel is orbiting {actual} after the SOI transition, expected {expected}")]
    UnexpectedPrimary { expected: String, actual: String },
    #[error("wait of {seconds} s cannot be scheduled")]
    DurationOutOfRange { seconds: f64 },
    #[error("maneuver node lifecycle violated: {0}")]
    NodeLifecycle(String),
    #[error("illegal phase transition {from} -> {to}")]
    IllegalTransition { from: MissionPhase, to: MissionPhase },
    #[error("abort requested during {phase}")]
    Aborted { phase: MissionPhase },
}

/// Coarse classification of a [`FlightError`] for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    InvalidOrbitParameters,
    InvalidVehicle,
    InsufficientThrust,
    NoConvergence,
    DirectionMismatch,
    PhaseTimeout,
    TransferTrajectory,
    NodeLifecycle,
    IllegalTransition,
    Telemetry,
    Configuration,
    Aborted,
}

impl FlightError {
    pub fn kind(&self) -> FaultKind {
        match self {
            FlightError::Orbit(err) | FlightError::Plan(PlanError::Orbit(err)) => match err {
                OrbitMathError::InvalidOrbitParameters(_) => FaultKind::InvalidOrbitParameters,
                OrbitMathError::NoConvergence => FaultKind::NoConvergence,
            },
            FlightError::Propulsion(err) | FlightError::Plan(PlanError::Propulsion(err)) => {
                match err {
                    PropulsionError::InsufficientThrust(_) => FaultKind::InsufficientThrust,
                    PropulsionError::InvalidVehicle(_) => FaultKind::InvalidVehicle,
                }
            }
            FlightError::Plan(PlanError::DirectionMismatch { .. }) => FaultKind::DirectionMismatch,
            FlightError::Plan(PlanError::BurnTooLong { .. }) => FaultKind::InsufficientThrust,
            FlightError::Telemetry(_) => FaultKind::Telemetry,
            FlightError::Config(_) => FaultKind::Configuration,
            FlightError::PhaseTimeout { .. } => FaultKind::PhaseTimeout,
            FlightError::DurationOutOfRange { .. } => FaultKind::Configuration,
            FlightError::TransferTrajectory { .. } | FlightError::UnexpectedPrimary { .. } => {
                FaultKind::TransferTrajectory
            }
            FlightError::NodeLifecycle(_) => FaultKind::NodeLifecycle,
            FlightError::IllegalTransition { .. } => FaultKind::IllegalTransition,
            FlightError::Aborted { .. } => FaultKind::Aborted,
        }
    }
}
