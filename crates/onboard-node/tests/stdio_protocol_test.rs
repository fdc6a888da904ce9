//! # Stdio Protocol Tests
//!
//! Runs the built `onboard-node` binary and checks the stream split:
//! responses on stdout, logs on stderr.

use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::Value;

fn run_node(input: &str, extra_env: &[(&str, &str)]) -> (String, String) {
    let mut command = Command::new(env!("CARGO_BIN_EXE_onboard-node"));
    command
        .env_remove("RUST_LOG")
        .env("ONBOARD_DEPLOYMENT_MODE", "development")
        .env("ONBOARD_LOG_LEVEL", "debug")
        .env("ONBOARD_PURGE_INTERVAL_SECS", "0")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in extra_env {
        command.env(key, value);
    }

    let mut child = command.spawn().expect("spawn onboard-node");
    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(input.as_bytes())
        .expect("write requests");

    let output = child.wait_with_output().expect("node exits");
    assert!(output.status.success(), "node failed: {:?}", output);
    (
        String::from_utf8(output.stdout).expect("utf8 stdout"),
        String::from_utf8(output.stderr).expect("utf8 stderr"),
    )
}

#[test]
fn test_stdout_carries_only_responses() {
    let input = concat!(
        r#"{"op":"issue","destinationKind":"EMAIL","destination":"a@b.com"}"#,
        "\n",
        r#"{"op":"verify","destinationKind":"EMAIL","destination":"a@b.com","code":"12a45"}"#,
        "\n",
    );
    let (stdout, stderr) = run_node(input, &[]);

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "stdout was: {stdout}");
    for line in &lines {
        let value: Value = serde_json::from_str(line).expect("every stdout line is JSON");
        assert!(value.get("success").is_some());
    }

    // Startup, per-request and shutdown logs all land on stderr.
    assert!(stderr.contains("[otp] Issued verification code"));
    assert!(stderr.contains("onboard_otp_codes_issued_total"));
}

#[test]
fn test_json_logs_stay_off_stdout() {
    let input = concat!(
        r#"{"op":"issue","destinationKind":"PHONE","destination":"(555) 123-4567"}"#,
        "\n"
    );
    let (stdout, stderr) = run_node(input, &[("ONBOARD_JSON_LOGS", "true")]);

    assert_eq!(stdout.lines().count(), 1);
    let response: Value = serde_json::from_str(stdout.trim()).expect("response is JSON");
    assert_eq!(response["success"], true);
    assert!(stderr.lines().any(|l| l.contains("\"level\"")));
}
