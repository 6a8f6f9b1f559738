use std::fs;

use orbit_pilot::config::{
    ConfigError, MissionConfig, load_bodies, load_mission_config, load_vehicle_configs,
};
use tempfile::tempdir;

#[test]
fn empty_mission_file_takes_reference_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mission.toml");
    fs::write(&path, "").unwrap();

    let config = load_mission_config(&path).unwrap();
    assert_eq!(config, MissionConfig::default());
    assert_eq!(config.target.body, "Mun");
    assert_eq!(config.ascent.turn_start_altitude_m, 250.0);
    assert_eq!(config.ascent.turn_end_altitude_m, 45_000.0);
    assert_eq!(config.staging.tracked_stages, vec![2]);
    assert_eq!(config.staging.final_staging_events, 2);
    assert_eq!(config.burn.standard_gravity_m_s2, 9.82);
    assert_eq!(config.burn.max_burn_duration_s, 1_800.0);
    assert_eq!(config.timing.arrival_lead_time_s, 15.0);
}

#[test]
fn shipped_configs_match_between_formats() {
    let root = env!("CARGO_MANIFEST_DIR");
    let reference = load_mission_config(format!("{root}/configs/mission.toml")).unwrap();
    assert_eq!(reference, MissionConfig::default());

    let minmus = load_mission_config(format!("{root}/configs/minmus.yaml")).unwrap();
    assert_eq!(minmus.target.body, "Minmus");
    assert_eq!(minmus.staging.tracked_stages, vec![3, 2]);
    assert_eq!(minmus.ascent.target_apoapsis_m, 120_000.0);
    // untouched sections keep their defaults
    assert_eq!(minmus.timing, MissionConfig::default().timing);
}

#[test]
fn partial_yaml_overrides_single_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mission.yaml");
    fs::write(
        &path,
        "timing:\n  poll_interval_s: 0.1\nwatchdog:\n  warp_s: 60.0\n",
    )
    .unwrap();

    let config = load_mission_config(&path).unwrap();
    assert_eq!(config.timing.poll_interval_s, 0.1);
    assert_eq!(config.timing.soi_margin_s, 10.0);
    assert_eq!(config.watchdog.warp_s, 60.0);
    assert_eq!(config.watchdog.ascent_s, 600.0);
}

#[test]
fn inconsistent_values_are_rejected() {
    let dir = tempdir().unwrap();
    for (name, body) in [
        ("band.toml", "[ascent]\nturn_start_altitude_m = 50000.0\n"),
        ("throttle.toml", "[burn]\ntrim_throttle = 1.5\n"),
        ("poll.toml", "[timing]\npoll_interval_s = 0.0\n"),
        ("watchdog.toml", "[watchdog]\nsoi_transition_s = -1.0\n"),
        ("target.toml", "[target]\nbody = \" \"\n"),
        ("nan_poll.yaml", "timing:\n  poll_interval_s: .nan\n"),
        ("inf_poll.toml", "[timing]\npoll_interval_s = inf\n"),
        ("huge_watchdog.toml", "[watchdog]\nwarp_s = 1e30\n"),
        ("margin.toml", "[target]\napoapsis_margin_m = nan\n"),
        ("gravity.toml", "[burn]\nstandard_gravity_m_s2 = inf\n"),
        ("apoapsis.toml", "[ascent]\ntarget_apoapsis_m = nan\n"),
        ("depletion.yaml", "staging:\n  depletion_threshold: -.inf\n"),
        ("burn_limit.toml", "[burn]\nmax_burn_duration_s = 0.0\n"),
    ] {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        let err = load_mission_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{name}: {err}");
    }
}

#[test]
fn unusable_poll_interval_is_an_error_not_a_panic() {
    let mut config = MissionConfig::default();
    for interval in [f64::NAN, f64::INFINITY, 0.0] {
        config.timing.poll_interval_s = interval;
        assert!(matches!(config.timing.poll_interval(), Err(ConfigError::Invalid(_))));
    }
    config.timing.poll_interval_s = 0.1;
    assert_eq!(config.timing.poll_interval().unwrap().as_millis(), 100);
}

#[test]
fn malformed_files_report_parse_errors() {
    let dir = tempdir().unwrap();
    let toml_path = dir.path().join("broken.toml");
    fs::write(&toml_path, "[ascent\n").unwrap();
    assert!(matches!(
        load_mission_config(&toml_path),
        Err(ConfigError::Toml(_))
    ));

    let yaml_path = dir.path().join("broken.yaml");
    fs::write(&yaml_path, "ascent: [1, 2\n").unwrap();
    assert!(matches!(
        load_mission_config(&yaml_path),
        Err(ConfigError::Parse(_))
    ));

    assert!(matches!(
        load_mission_config(dir.path().join("missing.toml")),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn catalogs_load_from_directories_and_yaml_lists() {
    let root = env!("CARGO_MANIFEST_DIR");
    let bodies = load_bodies(format!("{root}/configs/bodies")).unwrap();
    let names: Vec<_> = bodies.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Kerbin", "Minmus", "Mun"]);
    let mun = bodies.iter().find(|b| b.name == "Mun").unwrap();
    assert_eq!(mun.parent.as_deref(), Some("Kerbin"));
    assert_eq!(mun.orbit_radius_m, Some(12_000_000.0));

    let vehicles = load_vehicle_configs(format!("{root}/configs/vehicles")).unwrap();
    assert_eq!(vehicles[0].name, "Lunae Lumen");

    let dir = tempdir().unwrap();
    let list = dir.path().join("vehicles.yaml");
    fs::write(
        &list,
        "- name: Tug\n  mass_kg: 1000.0\n  thrust_n: 5000.0\n  isp_s: 300.0\n\
         - name: Lander\n  mass_kg: 800.0\n  thrust_n: 4000.0\n  isp_s: 310.0\n",
    )
    .unwrap();
    let listed = load_vehicle_configs(&list).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].name, "Lander");
}
