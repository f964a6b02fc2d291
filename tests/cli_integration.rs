mod common;

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `fairfare` against the seeded mock source, isolated from the user's
/// session and any Gemini key in the environment
fn fairfare(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fairfare").unwrap();
    cmd.arg("--config")
        .arg(dir.join("missing.yaml"))
        .env("FAIRFARE_SESSION_DB", dir.join("session"))
        .env("FAIRFARE_MOCK_LATENCY_MS", "0")
        .env("NO_COLOR", "1")
        .env_remove("FAIRFARE_TIP_SOURCE")
        .env_remove("FAIRFARE_API_BASE")
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .env_remove("FAIRFARE_GOOGLE_CLIENT_ID")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_tips_list_shows_seed() {
    let dir = TempDir::new().unwrap();
    fairfare(dir.path())
        .args(["tips", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MetroManMohan"))
        .stdout(predicate::str::contains("Connaught Place → Chandni Chowk"));
}

#[test]
fn test_tips_list_search_without_match() {
    let dir = TempDir::new().unwrap();
    fairfare(dir.path())
        .args(["tips", "list", "--search", "Kolkata"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tips match your search."));
}

#[test]
fn test_leaderboard_orders_by_score() {
    let dir = TempDir::new().unwrap();
    fairfare(dir.path())
        .args(["leaderboard", "--top", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MetroManMohan"))
        .stdout(predicate::str::contains("DelhiExplorerPriya"))
        .stdout(predicate::str::contains("LocalSaverRavi").not());
}

#[test]
fn test_rate_reports_reward() {
    let dir = TempDir::new().unwrap();
    fairfare(dir.path())
        .args(["rate", "2", "--up"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tip 2 is now rated 26"))
        .stdout(predicate::str::contains("earns 5 points"));
}

#[test]
fn test_rate_requires_direction() {
    let dir = TempDir::new().unwrap();
    fairfare(dir.path()).args(["rate", "2"]).assert().failure();
}

#[test]
fn test_add_tip_requires_login() {
    let dir = TempDir::new().unwrap();
    fairfare(dir.path())
        .args([
            "tips",
            "add",
            "--origin",
            "Gateway of India",
            "--destination",
            "Elephanta Caves",
            "--mode",
            "ferry",
            "--cost",
            "₹260",
            "--time",
            "1 hour",
            "--advice",
            "Take the first ferry.",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Please log in first"));
}

#[test]
fn test_login_persists_between_runs() {
    let dir = TempDir::new().unwrap();
    let credential = common::google_credential("Asha", "asha@example.com");

    fairfare(dir.path())
        .args(["login", &credential])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as"));

    fairfare(dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("asha@example.com"));

    fairfare(dir.path()).arg("logout").assert().success();

    fairfare(dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in."));
}

#[test]
fn test_invalid_tip_source_fails_validation() {
    let dir = TempDir::new().unwrap();
    fairfare(dir.path())
        .args(["--source", "carrier-pigeon", "tips", "list"])
        .assert()
        .failure();
}
