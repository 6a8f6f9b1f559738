//! Re-exported APIs for consumers of the flight crate.

pub use crate::error::{FaultKind, FlightError};
pub use crate::mission::arrival::ArrivalReport;
pub use crate::mission::ascent::AscentReport;
pub use crate::mission::burn::{BurnReport, ScheduledBurn};
pub use crate::mission::interplanetary::TransferReport;
pub use crate::mission::{FlightContext, MissionController, MissionPhase, MissionReport};
pub use crate::planner::{
    Apsis, BurnDirection, BurnIntent, Maneuver, ManeuverReference, PlanError, TransferPlan,
};
pub use crate::timing::{AbortHandle, Clock, PollStatus, Poller, SystemClock, WarpCoordinator, WarpDecision};
pub use pilot_config::MissionConfig;
pub use pilot_telemetry::{AttitudeHold, BodyRef, NodeId, TelemetryError, Vessel};
