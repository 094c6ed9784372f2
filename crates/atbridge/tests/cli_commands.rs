#![cfg(all(unix, feature = "cli"))]

use std::process::Command;

fn atbridge() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_atbridge"));
    cmd.env_remove("ATBRIDGE_PORT").env_remove("ATBRIDGE_BAUD");
    cmd
}

#[test]
fn version_prints_package_version() {
    let output = atbridge()
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("atbridge {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn extended_version_reports_build_target() {
    let output = atbridge()
        .args(["version", "--extended"])
        .output()
        .expect("version --extended should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: atbridge"));
    assert!(stdout.contains("target: "));
    assert!(stdout.contains("max_payload: 65535 bytes"));
}

#[test]
fn missing_port_exits_with_transport_error() {
    let output = atbridge()
        .args(["--no-boot-wait", "--port", "/dev/atbridge-missing", "ping"])
        .output()
        .expect("ping should run");

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/dev/atbridge-missing"), "stderr: {stderr}");
}

#[test]
fn invalid_timeout_is_a_usage_error() {
    let output = atbridge()
        .args(["--timeout", "soon", "--port", "/dev/atbridge-missing", "ping"])
        .output()
        .expect("ping should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn unknown_subcommand_fails() {
    let output = atbridge()
        .arg("frobnicate")
        .output()
        .expect("binary should run");

    assert!(!output.status.success());
}
