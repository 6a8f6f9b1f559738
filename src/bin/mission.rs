use std::path::PathBuf;

use clap::Parser;
use orbit_pilot::config::{
    BodyConfig, MissionConfig, VehicleConfig, load_bodies, load_mission_config,
    load_vehicle_configs,
};
use orbit_pilot::plan::{PlanRequest, plan_transfer};
use pilot_core::time::format_sim_duration;
use pilot_core::units::{deg_to_rad, km_to_m, m_to_km, rad_to_deg};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Transfer planner for parking orbit to moon missions"
)]
struct Cli {
    /// Body the parking orbit is around (case-insensitive)
    #[arg(long, default_value = "Kerbin")]
    from: String,

    /// Moon to transfer to (defaults to the mission config's target)
    #[arg(long)]
    to: Option<String>,

    /// Vehicle name from the catalog (defaults to the first entry)
    #[arg(long)]
    vehicle: Option<String>,

    /// Parking altitude in km (defaults to catalog)
    #[arg(long)]
    parking_altitude: Option<f64>,

    /// Capture altitude at the destination in km (defaults to catalog)
    #[arg(long)]
    capture_altitude: Option<f64>,

    /// Current phase angle to the target in degrees; prints the wait until the window
    #[arg(long, allow_hyphen_values = true)]
    phase: Option<f64>,

    /// Mission configuration (TOML or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Body catalog file or directory
    #[arg(long, default_value = "configs/bodies")]
    bodies: PathBuf,

    /// Vehicle catalog file or directory
    #[arg(long, default_value = "configs/vehicles")]
    vehicles: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "mission=info,orbit_pilot=info,pilot_flight=info,warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mission = match &cli.config {
        Some(path) => load_mission_config(path)?,
        None => MissionConfig::default(),
    };
    let bodies = load_bodies(&cli.bodies)?;
    let vehicles = load_vehicle_configs(&cli.vehicles)?;
    debug!(bodies = bodies.len(), vehicles = vehicles.len(), "catalogs loaded");

    let primary = find_body(&bodies, &cli.from)?;
    let target_name = cli.to.as_deref().unwrap_or(&mission.target.body);
    let target = find_body(&bodies, target_name)?;
    let vehicle = choose_vehicle(&vehicles, cli.vehicle.as_deref())?;
    info!(mission = %mission.name, vehicle = %vehicle.name, "planning transfer");

    let request = PlanRequest {
        primary,
        target,
        vehicle,
        parking_altitude_m: cli
            .parking_altitude
            .map(km_to_m)
            .unwrap_or(primary.default_parking_altitude_m),
        capture_altitude_m: cli
            .capture_altitude
            .map(km_to_m)
            .unwrap_or(target.default_parking_altitude_m),
        current_phase_rad: cli.phase.map(deg_to_rad),
        g0: mission.burn.standard_gravity_m_s2,
    };
    let plan = plan_transfer(&request)?;

    println!("=== Transfer Plan: {} -> {} ===", primary.name, target.name);
    println!(
        "Parking orbit: r = {:.1} km, v = {:.1} m/s",
        m_to_km(plan.parking_radius_m),
        plan.parking_speed_m_s
    );
    println!(
        "Phase angle at departure: {:.2} deg",
        rad_to_deg(plan.phase_angle_rad)
    );
    println!(
        "Transfer burn: dv = {:.1} m/s, burn time = {:.1} s, mass after = {:.0} kg",
        plan.hohmann.dv1_m_s, plan.burn_duration_s, plan.mass_after_transfer_kg
    );
    println!(
        "Transfer time: {}",
        format_sim_duration(plan.hohmann.tof_seconds)
    );
    if let Some(wait) = plan.wait_s {
        println!("Wait for window: {}", format_sim_duration(wait));
    }
    println!(
        "Capture: v_inf = {:.1} m/s, dv = {:.1} m/s",
        plan.arrival_v_inf_m_s, plan.capture_delta_v_m_s
    );

    Ok(())
}

fn find_body<'a>(bodies: &'a [BodyConfig], name: &str) -> anyhow::Result<&'a BodyConfig> {
    bodies
        .iter()
        .find(|b| b.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow::anyhow!("Body '{}' not found in catalog", name))
}

fn choose_vehicle<'a>(
    vehicles: &'a [VehicleConfig],
    requested: Option<&str>,
) -> anyhow::Result<&'a VehicleConfig> {
    match requested {
        Some(name) => {
            let upper = name.to_uppercase();
            vehicles
                .iter()
                .find(|v| v.name.to_uppercase().contains(&upper))
                .ok_or_else(|| anyhow::anyhow!("Vehicle '{}' not found", name))
        }
        None => vehicles
            .first()
            .ok_or_else(|| anyhow::anyhow!("Vehicle catalog is empty")),
    }
}
