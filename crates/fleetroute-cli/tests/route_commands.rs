use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures")
        .join(name)
        .canonicalize()
        .expect("fixture present")
}

fn prepare_command() -> Command {
    let mut cmd = cargo_bin_cmd!("fleetroute-cli");
    cmd.env("RUST_LOG", "error")
        .arg("--model")
        .arg(fixture_path("minimal_plant.json"));
    cmd
}

fn route(cmd: &mut Command, vehicle: &str, from: &str, to: &str) {
    cmd.arg("route")
        .arg("--vehicle")
        .arg(vehicle)
        .arg("--from")
        .arg(from)
        .arg("--to")
        .arg(to);
}

#[test]
fn default_configuration_routes_by_distance() {
    let mut cmd = prepare_command();
    route(&mut cmd, "Vehicle-01", "A", "C");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Route for Vehicle-01 from A to C (2 steps; algorithm: DIJKSTRA):",
        ))
        .stdout(predicate::str::contains("A -> B via A--B (forward, cost 10)"))
        .stdout(predicate::str::contains("B -> C via B--C (forward, cost 5)"))
        .stdout(predicate::str::contains("Total costs: 15"));
}

#[test]
fn avoiding_a_point_takes_the_detour() {
    let mut cmd = prepare_command();
    route(&mut cmd, "Vehicle-01", "A", "C");
    cmd.arg("--avoid").arg("B");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("via A--D"))
        .stdout(predicate::str::contains("Avoiding: B"))
        .stdout(predicate::str::contains("Total costs: 60"));
}

#[test]
fn reverse_travel_is_reported_as_backward() {
    let mut cmd = prepare_command();
    route(&mut cmd, "Vehicle-01", "C", "A");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("C -> D via D--C (backward, cost 30)"))
        .stdout(predicate::str::contains("Total costs: 60"));
}

#[test]
fn config_file_selects_algorithm_and_evaluators() {
    let mut cmd = prepare_command();
    cmd.arg("--config")
        .arg(fixture_path("routing_config.json"));
    route(&mut cmd, "Vehicle-01", "A", "C");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("algorithm: FLOYD_WARSHALL"))
        .stdout(predicate::str::contains("Total costs: 4"));
}

#[test]
fn command_line_overrides_configuration() {
    let mut cmd = prepare_command();
    cmd.arg("--config")
        .arg(fixture_path("routing_config.json"))
        .arg("--algorithm")
        .arg("bellman-ford")
        .arg("--evaluator")
        .arg("hops");
    route(&mut cmd, "Vehicle-01", "A", "C");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("algorithm: BELLMAN_FORD"))
        .stdout(predicate::str::contains("Total costs: 2"));
}

#[test]
fn unreachable_destination_is_not_an_error() {
    let mut cmd = prepare_command();
    route(&mut cmd, "Vehicle-01", "A", "Island");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No route from A to Island for Vehicle-01"));
}

#[test]
fn same_point_yields_stationary_route() {
    let mut cmd = prepare_command();
    route(&mut cmd, "Vehicle-01", "B", "B");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("stay at B"))
        .stdout(predicate::str::contains("Total costs: 0"));
}

#[test]
fn json_route_output_is_machine_readable() {
    let mut cmd = prepare_command();
    cmd.arg("--format").arg("json");
    route(&mut cmd, "Vehicle-01", "A", "C");

    let output = cmd.assert().success().get_output().stdout.clone();
    let report: serde_json::Value = serde_json::from_slice(&output).expect("valid json");

    assert_eq!(report["algorithm"], "DIJKSTRA");
    assert_eq!(report["costs"], 15);
    assert_eq!(report["steps"][0]["path"], "A--B");
    assert_eq!(report["steps"][1]["destination_point"], "C");
    assert_eq!(report["steps"][1]["vehicle_orientation"], "forward");
}

#[test]
fn unknown_point_error_is_friendly() {
    let mut cmd = prepare_command();
    route(&mut cmd, "Vehicle-01", "A", "Islnd");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown point: Islnd"))
        .stderr(predicate::str::contains("Did you mean 'Island'?"));
}

#[test]
fn unknown_vehicle_error_suggests_names() {
    let mut cmd = prepare_command();
    route(&mut cmd, "Vehicle-1", "A", "C");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown vehicle: Vehicle-1"))
        .stderr(predicate::str::contains("Did you mean"));
}
