//! CLI contract tests
//!
//! Runs the attackpath binary against the fixture inventory with an
//! isolated artifact store and checks exit codes and JSON output.

use std::path::{Path, PathBuf};
use std::process::Command;

fn attackpath_bin() -> String {
    env!("CARGO_BIN_EXE_attackpath").to_string()
}

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/vehicle.json")
}

/// Run the binary with an isolated project dir and store, returning (exit code, stdout, stderr)
fn run(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(attackpath_bin())
        .arg("--project")
        .arg(dir)
        .arg("--store")
        .arg(dir.join("store"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run attackpath");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

fn analyze_json(dir: &Path, extra: &[&str]) -> serde_json::Value {
    let inventory = fixture();
    let mut args = vec![
        "analyze",
        "-i",
        inventory.to_str().expect("utf-8 path"),
        "-p",
        "tcu",
        "--format",
        "json",
    ];
    args.extend_from_slice(extra);
    let (code, stdout, stderr) = run(dir, &args);
    assert_eq!(code, 0, "analyze failed: {}", stderr);
    serde_json::from_str(&stdout).expect("Invalid JSON")
}

#[test]
fn test_analyze_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = analyze_json(dir.path(), &["--analysis-id", "cli-run"]);

    let summary = &outcome["summary"];
    assert_eq!(summary["analysis_id"], "cli-run");
    assert_eq!(summary["component_count"], 4);
    assert_eq!(summary["total_paths"], 3);
    assert_eq!(summary["total_chains"], 1);
    assert_eq!(summary["persisted"], true);

    let entries: Vec<&str> = summary["entry_points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(entries, vec!["tcu", "ivi"]);
}

#[test]
fn test_stored_paths_can_be_paged() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = analyze_json(dir.path(), &["--analysis-id", "paged"]);
    let first_id = outcome["paths"][0]["id"].as_str().unwrap().to_string();

    let (code, stdout, _) = run(
        dir.path(),
        &["paths", "paged", "--limit", "2", "--format", "json"],
    );
    assert_eq!(code, 0);
    let page: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["id"], first_id.as_str());

    let (code, stdout, _) = run(dir.path(), &["path", &first_id, "--format", "json"]);
    assert_eq!(code, 0);
    let path: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(path["steps"][0]["vulnerability_ids"].as_array().unwrap().len(), 0);
}

#[test]
fn test_vulnerabilities_attach_to_steps() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = analyze_json(dir.path(), &["--vuln", "CVE-2024-31001"]);
    let first_step = &outcome["paths"][0]["steps"][0];
    assert_eq!(first_step["component_id"], "tcu");
    assert_eq!(first_step["vulnerability_ids"][0], "CVE-2024-31001");
}

#[test]
fn test_no_chains_flag() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = analyze_json(dir.path(), &["--no-chains"]);
    assert_eq!(outcome["summary"]["total_chains"], 0);
    assert!(outcome["chains"].as_array().unwrap().is_empty());
}

#[test]
fn test_primary_outside_selection_fails() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = fixture();
    let (code, _, stderr) = run(
        dir.path(),
        &[
            "analyze",
            "-i",
            inventory.to_str().unwrap(),
            "-p",
            "tcu",
            "-c",
            "gw,brake",
        ],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("not part of component_ids"), "stderr: {}", stderr);
}

#[test]
fn test_reused_analysis_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    analyze_json(dir.path(), &["--analysis-id", "twice"]);

    let inventory = fixture();
    let (code, _, stderr) = run(
        dir.path(),
        &[
            "analyze",
            "-i",
            inventory.to_str().unwrap(),
            "-p",
            "tcu",
            "--analysis-id",
            "twice",
        ],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("already in use"), "stderr: {}", stderr);
}

#[test]
fn test_delete_removes_analysis() {
    let dir = tempfile::tempdir().unwrap();
    analyze_json(dir.path(), &["--analysis-id", "doomed"]);

    let (code, _, _) = run(dir.path(), &["delete", "doomed"]);
    assert_eq!(code, 0);

    let (code, _, _) = run(dir.path(), &["paths", "doomed"]);
    assert_ne!(code, 0, "paths of a deleted analysis should fail");

    let (code, _, _) = run(dir.path(), &["delete", "doomed"]);
    assert_ne!(code, 0, "second delete should report a missing analysis");
}

#[test]
fn test_list_shows_stored_analyses() {
    let dir = tempfile::tempdir().unwrap();
    analyze_json(dir.path(), &["--analysis-id", "listed"]);

    let (code, stdout, _) = run(dir.path(), &["list", "--format", "json"]);
    assert_eq!(code, 0);
    let analyses: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0]["analysis_id"], "listed");
}

#[test]
fn test_init_writes_config() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run(dir.path(), &["init"]);
    assert_eq!(code, 0);
    let config = std::fs::read_to_string(dir.path().join("attackpath.toml")).unwrap();
    assert!(config.contains("[analysis]"));
    assert!(config.contains("max_depth = 5"));
}
