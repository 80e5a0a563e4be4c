//! CLI integration tests for uatree
//!
//! Runs the uatree binary end-to-end against address space snapshots, so no
//! OPC UA server is needed.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use uatree_core::node::NodeRef;
use uatree_core::snapshot::SnapshotClient;

/// Command with its own empty config directory
#[allow(deprecated)]
fn uatree_cmd(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("uatree").unwrap();
    cmd.env("UATREE_CONFIG_DIR", config_dir);
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Root -> [Objects -> [Server -> [ServerStatus]], Types]
fn write_snapshot(dir: &TempDir) -> PathBuf {
    let objects = NodeRef::numeric(0, 85);
    let server = NodeRef::numeric(0, 2253);
    let snapshot = SnapshotClient::new()
        .with_root(NodeRef::root_folder())
        .with_children(
            NodeRef::root_folder(),
            [(objects.clone(), "Objects"), (NodeRef::numeric(0, 86), "Types")],
        )
        .with_children(objects, [(server.clone(), "Server")])
        .with_children(server, [(NodeRef::numeric(0, 2256), "ServerStatus")]);

    let path = dir.path().join("space.json");
    snapshot.save(&path).unwrap();
    path
}

#[test]
fn test_browse_full_tree() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    uatree_cmd(dir.path())
        .args(["browse", "--snapshot"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout("Objects: {\n  Server: {\n    ServerStatus: {}\n  }\n},\nTypes: {}\n");
}

#[test]
fn test_browse_depth_limit() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    uatree_cmd(dir.path())
        .args(["browse", "-d", "1", "--snapshot"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout("Objects: {...},\nTypes: {}\n");

    uatree_cmd(dir.path())
        .args(["browse", "-d", "2", "--snapshot"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout("Objects: {\n  Server: {...}\n},\nTypes: {}\n");
}

#[test]
fn test_browse_verbose_and_root() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    uatree_cmd(dir.path())
        .args(["browse", "-v", "-r", "0,85", "--snapshot"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout("Server[0,2253]: {\n  ServerStatus[0,2256]: {}\n}\n");
}

#[test]
fn test_browse_failed_branch_keeps_going() {
    let dir = TempDir::new().unwrap();
    let snapshot = SnapshotClient::new()
        .with_children(
            NodeRef::root_folder(),
            [(NodeRef::numeric(0, 85), "Objects"), (NodeRef::numeric(0, 86), "Types")],
        )
        .with_failure(NodeRef::numeric(0, 85), "timeout");
    let path = dir.path().join("failing.json");
    snapshot.save(&path).unwrap();

    uatree_cmd(dir.path())
        .args(["browse", "--snapshot"])
        .arg(&path)
        .assert()
        .success()
        .stdout("Objects: {\n  Browsing node i=85 failed: timeout\n},\nTypes: {}\n");
}

#[test]
fn test_browse_root_failure_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let snapshot = SnapshotClient::new().with_failure(NodeRef::root_folder(), "BadNodeIdUnknown");
    let path = dir.path().join("broken.json");
    snapshot.save(&path).unwrap();

    uatree_cmd(dir.path())
        .args(["browse", "--snapshot"])
        .arg(&path)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("E200"))
        .stderr(predicate::str::contains("BadNodeIdUnknown"));
}

#[test]
fn test_browse_to_file() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);
    let out = dir.path().join("tree.txt");

    uatree_cmd(dir.path())
        .args(["browse", "-d", "1", "-t", "--snapshot"])
        .arg(&snapshot)
        .arg("--file")
        .arg(&out)
        .assert()
        .success()
        .stdout("");

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("Objects: {...},\nTypes: {}\n"));
    assert!(written.contains("Time spent: "));
    assert!(written.trim_end().ends_with("seconds"));
}

#[test]
fn test_browse_missing_snapshot() {
    let dir = TempDir::new().unwrap();

    uatree_cmd(dir.path())
        .args(["browse", "--snapshot"])
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("E400"));
}

#[test]
fn test_browse_rejects_zero_depth() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    uatree_cmd(dir.path())
        .args(["browse", "--depth", "0", "--snapshot"])
        .arg(&snapshot)
        .assert()
        .failure();
}

#[test]
fn test_configured_depth_is_used() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    uatree_cmd(dir.path())
        .args(["config", "set", "browse.max_depth", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set browse.max_depth = 1"));

    uatree_cmd(dir.path())
        .args(["browse", "--snapshot"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout("Objects: {...},\nTypes: {}\n");

    // command line wins over config
    uatree_cmd(dir.path())
        .args(["browse", "-d", "5", "--snapshot"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("ServerStatus: {}"));
}

#[test]
fn test_config_roundtrip() {
    let dir = TempDir::new().unwrap();

    uatree_cmd(dir.path())
        .args(["config", "get", "session.server_url"])
        .assert()
        .success()
        .stdout("opc.tcp://milo.digitalpetri.com:62541/milo\n");

    uatree_cmd(dir.path())
        .args(["config", "set", "session.server_url", "opc.tcp://localhost:4840"])
        .assert()
        .success();

    uatree_cmd(dir.path())
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("session.server_url = opc.tcp://localhost:4840"))
        .stdout(predicate::str::contains("browse.root = i=84"));

    uatree_cmd(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    uatree_cmd(dir.path())
        .args(["config", "reset"])
        .assert()
        .success();

    uatree_cmd(dir.path())
        .args(["config", "get", "session.server_url"])
        .assert()
        .success()
        .stdout("opc.tcp://milo.digitalpetri.com:62541/milo\n");
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = TempDir::new().unwrap();

    uatree_cmd(dir.path())
        .args(["config", "set", "session.server_url", "http://localhost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid server URL"));

    uatree_cmd(dir.path())
        .args(["config", "get", "no.such.key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}
