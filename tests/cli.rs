use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn catalog(dir: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("configs").join(dir)
}

fn mission() -> Command {
    let mut cmd = Command::cargo_bin("mission").expect("mission binary");
    cmd.arg("--bodies")
        .arg(catalog("bodies"))
        .arg("--vehicles")
        .arg(catalog("vehicles"));
    cmd
}

#[test]
fn plans_reference_mun_transfer() {
    mission()
        .assert()
        .success()
        .stdout(predicate::str::contains("Transfer Plan: Kerbin -> Mun"))
        .stdout(predicate::str::contains("Phase angle at departure: 110.30 deg"))
        .stdout(predicate::str::contains("dv = 807.2 m/s"))
        .stdout(predicate::str::contains("Wait for window").not());
}

#[test]
fn prints_wait_when_phase_is_given() {
    mission()
        .args(["--to", "minmus", "--phase", "-45", "--vehicle", "spark"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kerbin -> Minmus"))
        .stdout(predicate::str::contains("Wait for window:"));
}

#[test]
fn mission_config_selects_target() {
    let config = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("configs/minmus.yaml");
    mission()
        .arg("--config")
        .arg(config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Kerbin -> Minmus"));
}

#[test]
fn unknown_body_fails() {
    mission()
        .args(["--to", "Eeloo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Eeloo"));
}
