//! Integration tests for the `tripdesk` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a backend; the data commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `tripdesk` binary with env isolation.
///
/// Clears all `TRIPDESK_*` env vars and points config directories at a
/// fresh temp dir so tests never touch the user's real configuration.
fn tripdesk_cmd(home: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("tripdesk");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("TRIPDESK_PROFILE")
        .env_remove("TRIPDESK_BASE_URL")
        .env_remove("TRIPDESK_OUTPUT")
        .env_remove("TRIPDESK_TIMEOUT")
        .env_remove("TRIPDESK_PASSWORD")
        .env_remove("TRIPDESK_ADMIN_TOKEN")
        .env_remove("TRIPDESK_USER_TOKEN");
    cmd
}

fn home() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn trip_doc(id: &str, destination: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "destination": destination,
        "description": "Guided tour",
        "debutDate": "2030-05-01",
        "endDate": "2030-05-08",
        "price": 900,
        "reduction": 0,
        "isActive": true,
        "tripType": "Adventure",
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = home();
    let output = tripdesk_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_resources() {
    let home = home();
    tripdesk_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("trips")
            .and(predicate::str::contains("reservations"))
            .and(predicate::str::contains("surveys"))
            .and(predicate::str::contains("dashboard")),
    );
}

#[test]
fn test_version_flag() {
    let home = home();
    tripdesk_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tripdesk"));
}

#[test]
fn test_completions_zsh() {
    let home = home();
    tripdesk_cmd(&home)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    let home = home();
    tripdesk_cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Argument errors ─────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = home();
    let output = tripdesk_cmd(&home).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_reservation_status() {
    let home = home();
    let output = tripdesk_cmd(&home)
        .args(["reservations", "set-status", "r1", "refunded"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_reservations_subcommands_exist() {
    let home = home();
    tripdesk_cmd(&home)
        .args(["reservations", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("get"))
                .and(predicate::str::contains("set-status")),
        );
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_without_file() {
    let home = home();
    tripdesk_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile = \"default\""));
}

#[test]
fn test_config_use_unknown_profile() {
    let home = home();
    tripdesk_cmd(&home)
        .args(["config", "use", "staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

// ── Validation happens before any request ───────────────────────────

#[test]
fn test_trip_create_validates_locally() {
    let home = home();
    let output = tripdesk_cmd(&home)
        .args([
            "--base-url",
            "http://127.0.0.1:9",
            "trips",
            "create",
            "--destination",
            "Tozeur",
            "--price",
            "0",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Price must be greater than 0"), "{text}");
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test]
async fn test_trips_list_plain_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trip/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [trip_doc("t1", "Tozeur"), trip_doc("t2", "Djerba")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = home();
    tripdesk_cmd(&home)
        .args(["--base-url", &server.uri(), "--output", "plain", "trips", "list"])
        .assert()
        .success()
        .stdout("t1\nt2\n");
}

#[tokio::test]
async fn test_reward_list_sends_admin_token_from_env() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reward/get"))
        .and(header("authorization", "Bearer env-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "rewards": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = home();
    tripdesk_cmd(&home)
        .env("TRIPDESK_ADMIN_TOKEN", "env-token")
        .args(["--base-url", &server.uri(), "--output", "json", "rewards", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })),
        )
        .mount(&server)
        .await;

    let home = home();
    let output = tripdesk_cmd(&home)
        .env("TRIPDESK_ADMIN_TOKEN", "stale")
        .args(["--base-url", &server.uri(), "whoami"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Token expired"));
}

#[tokio::test]
async fn test_missing_trip_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trip/get/t404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": null,
        })))
        .mount(&server)
        .await;

    let home = home();
    let output = tripdesk_cmd(&home)
        .args(["--base-url", &server.uri(), "trips", "get", "t404"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("trip 't404' not found"));
}
