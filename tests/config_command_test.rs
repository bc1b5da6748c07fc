use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn config_command_emits_json() {
    let mut cmd = cargo_bin_cmd!("ssdiff");
    cmd.args(["config", "--json"])
        .env("SQL_SERVER", "env-host")
        .env("SQL_DATABASE", "env-db")
        .env("SQL_USER", "env-user")
        .env("SQL_PASSWORD", "env-pass")
        .env("SQL_SCHEMA", "web");

    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("json");

    assert_eq!(value["connection"]["server"], "env-host");
    assert_eq!(value["connection"]["database"], "env-db");
    assert_eq!(value["connection"]["user"], "env-user");
    assert_eq!(value["connection"]["password"], "env-pass");
    assert_eq!(value["connection"]["defaultSchema"], "web");
}

#[test]
fn missing_config_path_fails_with_message() {
    let mut cmd = cargo_bin_cmd!("ssdiff");
    cmd.args(["config", "--config", "/nonexistent/ssdiff-config.yaml"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
