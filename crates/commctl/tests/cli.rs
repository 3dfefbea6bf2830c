//! End-to-end binary tests: exit codes, stdout/stderr discipline, and
//! the local-only passhash path.
//!
//! Every invocation pins `--config` to a nonexistent path and clears the
//! environment so the suite cannot pick up a developer's real
//! `~/.commissaire.json` or `COMMCTL_*` variables.

use assert_cmd::Command;
use predicates::prelude::*;

fn commctl() -> Command {
    let mut cmd = Command::cargo_bin("commctl").expect("binary");
    cmd.env_clear()
        .args(["--config", "/nonexistent/commissaire.json"]);
    cmd
}

#[test]
fn passhash_prints_bcrypt_hash_to_stdout() {
    commctl()
        .args(["--format", "table", "create", "passhash", "-r", "4", "secret"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$2"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn passhash_json_output_carries_cost() {
    let output = commctl()
        .args(["create", "passhash", "-r", "4", "secret"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(parsed["cost"], 4);
    assert!(parsed["passhash"].as_str().expect("string").starts_with("$2"));
}

#[test]
fn passhash_reads_stdin_when_file_is_dash() {
    commctl()
        .args(["--format", "table", "create", "passhash", "-r", "4", "--file", "-"])
        .write_stdin("piped-secret\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$2"));
}

#[test]
fn passhash_rejects_out_of_range_rounds() {
    commctl()
        .args(["create", "passhash", "-r", "99", "secret"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn missing_credentials_exit_1_before_any_network() {
    commctl()
        .args(["hosts", "list"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn invalid_server_url_exits_1() {
    commctl()
        .args(["--server", "ftp://example.com", "--token", "t", "clusters", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn invalid_cluster_name_exits_1_without_contacting_server() {
    // The URL points nowhere; a network attempt would exit 2 instead.
    commctl()
        .args([
            "--server",
            "http://127.0.0.1:9",
            "--token",
            "t",
            "clusters",
            "get",
            "bad name",
        ])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid argument"));
}

#[test]
fn unreachable_server_exits_2() {
    commctl()
        .args([
            "--server",
            "http://127.0.0.1:9",
            "--token",
            "t",
            "--timeout",
            "1",
            "clusters",
            "list",
        ])
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unreachable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn hosts_list_renders_json_from_a_live_server() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"address": "10.0.0.1", "status": "available", "cluster": "prod"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    // The binary is a separate process, so the blocking spawn is fine
    // alongside the mock server's worker threads.
    let output = tokio::task::spawn_blocking(move || {
        commctl()
            .args(["--server", &uri, "--token", "t", "hosts", "list"])
            .output()
            .expect("run")
    })
    .await
    .expect("join");

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(parsed[0]["address"], "10.0.0.1");
    assert_eq!(parsed[0]["status"], "available");
}

#[tokio::test(flavor = "multi_thread")]
async fn clusters_delete_reports_success_from_a_live_server() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v0/cluster/prod"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        commctl()
            .args(["--server", &uri, "--token", "t", "clusters", "delete", "prod"])
            .output()
            .expect("run")
    })
    .await
    .expect("join");

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(parsed["message"], "cluster prod deleted");
}

#[cfg(unix)]
#[test]
fn sigint_exits_130_with_nothing_rendered() {
    use std::process::{Command as StdCommand, Stdio};
    use std::thread;
    use std::time::Duration;

    // A non-routable address keeps the connect attempt (and its
    // retries) pending long enough to interrupt.
    let mut child = StdCommand::new(assert_cmd::cargo::cargo_bin("commctl"))
        .env_clear()
        .args([
            "--config",
            "/nonexistent/commissaire.json",
            "--server",
            "http://10.255.255.1:8080",
            "--token",
            "t",
            "--timeout",
            "30",
            "hosts",
            "list",
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");

    // Let the runtime install its signal handler and start the call.
    thread::sleep(Duration::from_millis(500));
    let kill = StdCommand::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("send SIGINT");
    assert!(kill.success());

    let output = child.wait_with_output().expect("wait");
    assert_eq!(output.status.code(), Some(130));
    assert!(output.stdout.is_empty());
}

#[test]
fn help_lists_subcommands() {
    commctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hosts"))
        .stdout(predicate::str::contains("clusters"))
        .stdout(predicate::str::contains("create"));
}
