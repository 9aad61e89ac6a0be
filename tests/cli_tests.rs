//! Integration tests for the tfreport CLI
//!
//! These run the built binary end-to-end.

use std::io::Write;
use std::process::{Command, Stdio};

/// Get the path to the tfreport binary
fn tfreport_binary() -> std::path::PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test executable name
    path.pop(); // Remove deps directory

    path.push("tfreport");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    path
}

/// Run tfreport in an empty directory so no local config is picked up
fn run_tfreport(args: &[&str], stdin: &str) -> std::process::Output {
    let dir = tempfile::TempDir::new().unwrap();

    let mut child = Command::new(tfreport_binary())
        .args(args)
        .current_dir(dir.path())
        .env_remove("GITHUB_ACTIONS")
        .env_remove("GITLAB_CI")
        .env_remove("JENKINS_URL")
        .env_remove("CIRCLECI")
        .env_remove("TFREPORT_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute tfreport");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();

    child.wait_with_output().unwrap()
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_tfreport_version() {
    let output = run_tfreport(&["--version"], "");

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tfreport"));
}

#[test]
fn test_tfreport_help() {
    let output = run_tfreport(&["--help"], "");

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("plan"));
    assert!(stdout.contains("apply"));
    assert!(stdout.contains("parse"));
}

#[test]
fn test_parse_plan_from_stdin() {
    let plan = "\
Terraform will perform the following actions:

  # aws_s3_bucket.logs will be created
  + resource \"aws_s3_bucket\" \"logs\" {}

  # aws_instance.web must be replaced
-/+ resource \"aws_instance\" \"web\" {}

Plan: 2 to add, 0 to change, 1 to destroy.
";
    let output = run_tfreport(&["parse", "--kind", "plan"], plan);

    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["result"], "Plan: 2 to add, 0 to change, 1 to destroy.");
    assert_eq!(json["has_destroy"], true);
    assert_eq!(json["has_add_or_update_only"], false);
    assert_eq!(json["exit_code"], 0);
    assert_eq!(json["created_resources"][0], "  # aws_s3_bucket.logs will be created");
    assert_eq!(json["replaced_resources"][0], "  # aws_instance.web must be replaced");
}

#[test]
fn test_parse_plan_error_exits_one() {
    let output = run_tfreport(
        &["parse", "--kind", "plan"],
        "Error: Unsupported argument\n\n  on main.tf line 4\n",
    );

    assert_eq!(output.status.code(), Some(1));

    let json = stdout_json(&output);
    assert_eq!(json["has_plan_error"], true);
    assert_eq!(json["result"], "Error: Unsupported argument");
}

#[test]
fn test_parse_unrecognized_output() {
    let output = run_tfreport(&["parse", "--kind", "apply"], "Refreshing state...\n");

    assert_eq!(output.status.code(), Some(1));

    let json = stdout_json(&output);
    assert_eq!(json["has_parse_error"], true);
    assert_eq!(json["error"], "cannot parse apply result");
}

#[test]
fn test_parse_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("apply.log");
    std::fs::write(
        &path,
        "aws_s3_bucket.logs: Creating...\nApply complete! Resources: 1 added, 0 changed, 0 destroyed.\n",
    )
    .unwrap();

    let output = run_tfreport(
        &["parse", "--kind", "apply", "--file", path.to_str().unwrap()],
        "",
    );

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output)["result"],
        "Apply complete! Resources: 1 added, 0 changed, 0 destroyed."
    );
}

#[test]
fn test_parse_invalid_kind() {
    let output = run_tfreport(&["parse", "--kind", "destroy"], "");

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown parser kind"));
}

#[cfg(unix)]
#[test]
fn test_apply_wraps_command_as_json() {
    let output = run_tfreport(
        &[
            "apply",
            "--format",
            "json",
            "--ci",
            "local",
            "--",
            "sh",
            "-c",
            "printf 'Apply complete! Resources: 0 added, 1 changed, 0 destroyed.\\n'",
        ],
        "",
    );

    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(
        json["result"],
        "Apply complete! Resources: 0 added, 1 changed, 0 destroyed."
    );
}

#[cfg(unix)]
#[test]
fn test_plan_propagates_exit_code() {
    let output = run_tfreport(
        &[
            "plan",
            "--format",
            "json",
            "--",
            "sh",
            "-c",
            "printf 'Error: No configuration files\\n'; exit 3",
        ],
        "",
    );

    assert_eq!(output.status.code(), Some(3));

    let json = stdout_json(&output);
    assert_eq!(json["has_plan_error"], true);
    assert_eq!(json["exit_code"], 1);
}

#[cfg(unix)]
#[test]
fn test_plan_text_output_echoes_command() {
    let output = run_tfreport(
        &[
            "plan",
            "--",
            "sh",
            "-c",
            "printf 'No changes. Infrastructure is up-to-date.\\n'",
        ],
        "",
    );

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Plan Result"));
    assert!(stdout.contains("No changes. Infrastructure is up-to-date."));
}
