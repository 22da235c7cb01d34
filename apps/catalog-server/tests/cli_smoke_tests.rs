#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the catalog-server binary
//!
//! These tests verify configuration loading and validation, help output,
//! and that `run` actually serves HTTP.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};

/// Helper to run the catalog-server binary with given arguments
fn run_catalog_server(args: &[&str]) -> std::process::Output {
    run_catalog_server_with_env(args, &[])
}

fn run_catalog_server_with_env(args: &[&str], env: &[(&str, &str)]) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_catalog-server"));
    cmd.args(args)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to execute catalog-server")
}

/// Minimal config whose `home_dir` stays inside the temp dir.
fn write_config(dir: &Path, extra: &str) -> String {
    let config_path = dir.join("config.yaml");
    let content = format!(
        "server:\n  bind_addr: \"127.0.0.1:0\"\n  home_dir: \"{}\"\n{extra}",
        dir.join("home").display()
    );
    std::fs::write(&config_path, content).expect("Failed to write config");
    config_path.to_str().unwrap().to_owned()
}

#[test]
fn test_cli_help_command() {
    let output = run_catalog_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("catalog-server"), "Should contain binary name");
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--mock"), "Should mention mock option");
}

#[test]
fn test_cli_version_command() {
    let output = run_catalog_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("catalog-server"), "Should contain binary name");
    assert!(
        stdout.chars().any(|c| c.is_ascii_digit()),
        "Should contain version numbers"
    );
}

#[test]
fn test_cli_invalid_command() {
    let output = run_catalog_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("unrecognized"),
        "Should contain error message about invalid command"
    );
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_catalog_server(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(
        !output.status.success(),
        "Should fail when config file doesn't exist"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("does not exist"),
        "Should indicate config file not found: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_catalog_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("yaml") || stderr.contains("configuration"),
        "Should mention YAML parsing issue: {stderr}"
    );
}

#[test]
fn test_cli_config_rejects_unknown_keys() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), "listings:\n  gadgets: { backend: document, store: content }\n");

    let output = run_catalog_server(&["-c", &config, "check"]);

    assert!(!output.status.success(), "Unknown listing kind should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("gadgets"), "Should name the unknown key: {stderr}");
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(
        temp_dir.path(),
        r#"
logging:
  level: warn
  format: json
database:
  relational:
    main:
      dsn: "sqlite::memory:"
      pool: { max_conns: 4, acquire_timeout: "5s" }
  document:
    content:
      engine: memory
listings:
  jobs: { backend: relational, store: main, default_limit: 20, max_limit: 50 }
  media:
    dir: media
    base_url: "https://cdn.example.com/media"
"#,
    );

    let output = run_catalog_server(&["--config", &config, "check"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "Valid config should pass: {stderr}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration is valid"));
    assert!(stdout.contains("cdn.example.com"));
    assert!(stdout.contains("max_limit"));
}

#[test]
fn test_cli_print_config_with_mock() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), "");

    let output = run_catalog_server(&["-c", &config, "--mock", "--print-config"]);

    assert!(output.status.success(), "print-config should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Effective configuration:"));
    assert!(stdout.contains("sqlite::memory:"), "Mock DSN expected: {stdout}");
    assert!(stdout.contains("content"), "Mock document backend expected");
}

#[test]
fn test_cli_config_precedence() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), "logging:\n  level: warn\n");

    // env beats yaml
    let output = run_catalog_server_with_env(
        &["-c", &config, "--print-config"],
        &[("CATALOG__LOGGING__LEVEL", "debug")],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("debug"), "{stdout}");

    // CLI beats env
    let output = run_catalog_server_with_env(
        &["-c", &config, "-p", "9999", "-vvv", "--print-config"],
        &[("CATALOG__LOGGING__LEVEL", "debug")],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("127.0.0.1:9999"), "{stdout}");
    assert!(stdout.contains("trace"), "{stdout}");
}

#[test]
fn test_cli_subcommand_help() {
    for sub in ["run", "check"] {
        let output = run_catalog_server(&[sub, "--help"]);
        assert!(output.status.success(), "{sub} --help should succeed");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Usage:"), "{sub}: {stdout}");
    }
}

async fn get_health(port: u16) -> Option<String> {
    let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port)).await.ok()?;
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .ok()?;
    let mut response = String::new();
    stream.read_to_string(&mut response).await.ok()?;
    Some(response)
}

#[tokio::test]
async fn test_cli_run_serves_health() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), "");
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_catalog-server"))
        .args(["-c", &config, "--mock", "-p", &port.to_string(), "run"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn catalog-server");

    let mut response = None;
    for _ in 0..100 {
        if let Some(r) = get_health(port).await {
            response = Some(r);
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    child.kill().await.ok();

    let response = response.expect("server never answered /health");
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.to_ascii_lowercase().contains("x-request-id"), "{response}");
    assert!(response.contains(r#""status":"ok""#), "{response}");
}
