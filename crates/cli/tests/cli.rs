//! End-to-end checks of the `hostkit` binary

use assert_cmd::Command;
use serde_json::Value;

fn hostkit(log_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("hostkit").unwrap();
    cmd.env("HOSTKIT_LOG_DIR", log_dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_run_prints_json_result() {
    let dir = tempfile::tempdir().unwrap();
    let output = hostkit(dir.path())
        .args(["run", "echo hello", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["stdout"], "hello");
    assert_eq!(result["stderr"], "");
    assert_eq!(result["return_code"], 0);

    // Lifecycle notices end up in the rotating log file
    let log = std::fs::read_to_string(dir.path().join("hostkit.log")).unwrap();
    assert!(log.contains("Executing command: echo hello"));
}

#[test]
fn test_run_timeout_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let output = hostkit(dir.path())
        .args(["run", "sleep 5", "--timeout", "0.5", "--concurrent", "--json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(124));
    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["stderr"], "Command timeout");
    assert_eq!(result["return_code"], -1);
    assert_eq!(result["failure"], "timeout");
}

#[test]
fn test_run_propagates_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    hostkit(dir.path())
        .args(["run", "sh -c 'exit 3'"])
        .assert()
        .code(3);
}

#[test]
fn test_run_missing_binary() {
    let dir = tempfile::tempdir().unwrap();
    hostkit(dir.path())
        .args(["run", "nonexistent-binary-xyz"])
        .assert()
        .code(127);
}

#[test]
fn test_file_json_roundtrip_through_cli() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let path_str = path.to_str().unwrap();

    hostkit(dir.path())
        .args(["file", "write-json", path_str, r#"{"arch":"x86_64"}"#])
        .assert()
        .success();

    let output = hostkit(dir.path())
        .args(["file", "read-json", path_str])
        .output()
        .unwrap();
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["arch"], "x86_64");

    hostkit(dir.path())
        .args(["file", "exists", path_str])
        .assert()
        .success();
    hostkit(dir.path())
        .args(["file", "rm", path_str])
        .assert()
        .success();
    hostkit(dir.path())
        .args(["file", "exists", path_str])
        .assert()
        .code(1);
}

#[test]
fn test_monitor_single_json_sample() {
    let dir = tempfile::tempdir().unwrap();
    let output = hostkit(dir.path())
        .args(["monitor", "--count", "1", "--interval", "1", "--json", "--mount", "/"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);

    let sample: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(sample["mount_point"], "/");
    for field in ["cpu_usage_percent", "memory_usage_percent", "disk_usage_percent"] {
        let percent = sample[field].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&percent), "{} = {}", field, percent);
    }
    assert!(sample["network"]["bytes_recv"].is_u64());
}

#[test]
fn test_monitor_table_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = hostkit(dir.path())
        .args(["monitor", "--count", "1", "--interval", "1"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CPU %"));
    assert!(stdout.contains("Memory %"));
}

#[test]
fn test_monitor_unknown_mount_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = hostkit(dir.path())
        .args(["monitor", "--count", "1", "--json", "--mount", "not-a-mounted-path"])
        .output()
        .unwrap();

    // Unknown mount point is reported, not silently zeroed
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not-a-mounted-path"));
}

#[test]
fn test_run_rejects_oversized_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let output = hostkit(dir.path())
        .args(["run", "true", "--timeout", "1e20"])
        .output()
        .unwrap();

    // clap usage error, not a panic
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("too large"));
}

#[test]
fn test_run_accepts_huge_timeout() {
    let dir = tempfile::tempdir().unwrap();
    hostkit(dir.path())
        .args(["run", "true", "--timeout", "1e19"])
        .assert()
        .success();
}
