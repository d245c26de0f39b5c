//! Integration tests for the command-line binary
//!
//! Only paths that fail before a broker connection is attempted are
//! exercised here.

use assert_cmd::Command;
use predicates::prelude::*;

use super::common::store_fixtures::TestStore;

fn recorder() -> Command {
    let mut cmd = Command::cargo_bin("mqtt-recorder").expect("binary should build");
    for var in [
        "MQTT_RECORDER_CONFIG",
        "MQTT_RECORDER_MESSAGES_DIR",
        "MQTT_RECORDER_HOST",
        "MQTT_RECORDER_PORT",
        "MQTT_RECORDER_USERNAME",
        "MQTT_RECORDER_PASSWORD",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_both_modes() {
    recorder()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("collect"))
        .stdout(predicate::str::contains("replay"));
}

#[test]
fn test_replay_requires_broker_flags() {
    recorder()
        .arg("replay")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--host"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let store = TestStore::new();
    let config = store.write_raw("../config.toml", b"keep_alive_secs = \"soon\"\n");

    recorder()
        .arg("--config")
        .arg(&config)
        .args([
            "collect",
            "--host",
            "localhost",
            "--port",
            "1883",
            "--username",
            "u",
            "--password",
            "p",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}
