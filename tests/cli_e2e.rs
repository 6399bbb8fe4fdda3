//! End-to-end CLI tests for the gdfetch binary.

// `Command::cargo_bin` is deprecated in assert_cmd >=2.0.17 in favor of
// `cargo::cargo_bin_cmd!` macro. Suppressed until migration to the new API.
#![allow(deprecated)]

use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_file(path_str: &str, content: &[u8]) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(&mock_server)
        .await;
    mock_server
}

/// Runs the binary off the async runtime so the mock server keeps serving.
async fn run_blocking(mut cmd: Command) -> assert_cmd::assert::Assert {
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .expect("command thread should not panic")
        .expect("binary should start");
    output.assert()
}

#[test]
fn test_binary_version_prints_version_and_location() {
    let mut cmd = Command::cargo_bin("gdfetch").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "gdfetch {} at ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_binary_short_version_ignores_url() {
    let mut cmd = Command::cargo_bin("gdfetch").unwrap();
    cmd.args(["-V", "http://127.0.0.1:1/never-fetched"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gdfetch"));
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("gdfetch").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download a file from a URL"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_binary_missing_url_is_usage_error() {
    let mut cmd = Command::cargo_bin("gdfetch").unwrap();
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("<URL>"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("gdfetch").unwrap();
    cmd.args(["--invalid-flag", "https://example.com/a.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_download_prints_status_block() {
    let mock_server = serve_file("/data/report.csv", b"a,b\n1,2\n").await;
    let temp_dir = TempDir::new().unwrap();
    let url = format!("{}/data/report.csv", mock_server.uri());

    let mut cmd = Command::cargo_bin("gdfetch").unwrap();
    cmd.current_dir(temp_dir.path()).arg(&url);

    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Downloading..."))
        .stdout(predicate::str::contains(format!("From: {url}")))
        .stdout(predicate::str::contains("To: "))
        .stdout(predicate::str::contains("report.csv"));

    let saved = std::fs::read(temp_dir.path().join("report.csv")).unwrap();
    assert_eq!(saved, b"a,b\n1,2\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_quiet_suppresses_stdout() {
    let mock_server = serve_file("/quiet.bin", &[7u8; 4096]).await;
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.bin");

    let mut cmd = Command::cargo_bin("gdfetch").unwrap();
    cmd.args(["-q", "-O"])
        .arg(&output)
        .arg(format!("{}/quiet.bin", mock_server.uri()));

    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());

    assert_eq!(std::fs::read(&output).unwrap(), vec![7u8; 4096]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_output_flag_sets_destination() {
    let mock_server = serve_file("/named-by-url.txt", b"payload").await;
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("custom.txt");

    let mut cmd = Command::cargo_bin("gdfetch").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("--output")
        .arg(&output)
        .arg(format!("{}/named-by-url.txt", mock_server.uri()));

    run_blocking(cmd).await.success();

    assert_eq!(std::fs::read(&output).unwrap(), b"payload");
    assert!(!temp_dir.path().join("named-by-url.txt").exists());
}

#[test]
fn test_binary_network_failure_exits_one() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("gdfetch").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("-q")
        .arg(format!("http://127.0.0.1:{port}/file.bin"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to download"));
}
