//! Explorer commands against a scripted duffle.
#![cfg(unix)]

use duffle_explorer::test_utils::{FakeDuffle, index_json};
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{explorer_cmd, write_config};

/// Serve `entries` as `/index.json`; returns the server and its repository name.
async fn index_server(entries: &[(&str, &str)]) -> (MockServer, String) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_json(entries)))
        .mount(&server)
        .await;
    let repository = server.uri().trim_start_matches("http://").to_string();
    (server, repository)
}

#[test]
fn test_bundles_tree() {
    let fake = FakeDuffle::new().with_output(&["list"], "hello\nweb\n").install().unwrap();
    let config = write_config(&fake, Vec::new(), false);

    explorer_cmd()
        .arg("--config")
        .arg(&config)
        .arg("bundles")
        .assert()
        .success()
        .stdout("Bundles\n├── hello\n└── web\n");
}

#[test]
fn test_bundles_json() {
    let fake = FakeDuffle::new().with_output(&["list"], "hello\n").install().unwrap();
    let config = write_config(&fake, Vec::new(), false);

    let output = explorer_cmd()
        .arg("--config")
        .arg(&config)
        .args(["bundles", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["explorer"], "Bundles");
    assert_eq!(json["nodes"][0]["label"], "hello");
    assert_eq!(json["nodes"][0]["context"], "duffle.bundle");
}

#[test]
fn test_empty_listing() {
    let fake = FakeDuffle::new().with_output(&["claims", "list"], "").install().unwrap();
    let config = write_config(&fake, Vec::new(), false);

    explorer_cmd()
        .arg("--config")
        .arg(&config)
        .arg("claims")
        .assert()
        .success()
        .stdout("No installations found.\n");
}

#[test]
fn test_failing_duffle_shows_error_node() {
    let fake = FakeDuffle::new()
        .with_failure(&["claims", "list"], "claim storage unavailable")
        .install()
        .unwrap();
    let config = write_config(&fake, Vec::new(), false);

    explorer_cmd()
        .arg("--config")
        .arg(&config)
        .args(["claims", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Error ("))
        .stdout(predicate::str::contains("claim storage unavailable"));
}

#[test]
fn test_missing_duffle_shows_error_node() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    let absent = temp.path().join("absent");
    std::fs::write(&config, format!("duffle-path = \"{}\"\n", absent.display())).unwrap();

    explorer_cmd()
        .arg("--config")
        .arg(&config)
        .arg("bundles")
        .assert()
        .success()
        .stdout(predicate::str::contains("Error (duffle is not installed or not found in PATH)"));
}

#[test]
fn test_credentials_text_shows_files() {
    let home = TempDir::new().unwrap();
    let fake = FakeDuffle::new().with_output(&["credentials", "list"], "prod\nstaging\n").install().unwrap();
    let config = write_config(&fake, Vec::new(), false);
    let prod = home.path().join("credentials").join("prod.yaml");

    explorer_cmd()
        .env("DUFFLE_HOME", home.path())
        .arg("--config")
        .arg(&config)
        .args(["credentials", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!("prod ({})\n", prod.display())))
        .stdout(predicate::str::contains("staging ("));
}

#[test]
fn test_repos_path_tree_without_fetching() {
    let fake = FakeDuffle::new()
        .with_output(&["repo", "list"], "hub.example.com/team\nhub.example.com/ops\n")
        .install()
        .unwrap();
    let config = write_config(&fake, Vec::new(), false);

    explorer_cmd()
        .arg("--config")
        .arg(&config)
        .args(["repos", "--format", "text", "--depth", "2"])
        .assert()
        .success()
        .stdout("hub.example.com\n  team\n  ops\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_repos_expand_into_bundles() {
    let (_server, repository) = index_server(&[("hello", "0.1.0"), ("ns/web", "1.0"), ("ns/web", "latest")]).await;
    let fake = FakeDuffle::new().with_output(&["repo", "list"], &format!("{repository}\n")).install().unwrap();
    let config = write_config(&fake, Vec::new(), true);

    explorer_cmd()
        .arg("--config")
        .arg(&config)
        .args(["repos", "--format", "text", "--depth", "3"])
        .assert()
        .success()
        .stdout(format!(
            "{repository}\n  ns\n    web (web:latest (+ 1 other version(s)))\n  hello (hello:0.1.0)\n"
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_repo_bundles_for_selected_repositories() {
    let (_first, first) = index_server(&[("ns/a", "1.0")]).await;
    let (_second, second) = index_server(&[("ns/b", "2.0"), ("c", "1.0"), ("c", "latest")]).await;
    let temp = TempDir::new().unwrap();

    explorer_cmd()
        .args(["repo-bundles", "--format", "text", "--repo", &first, "--repo", &second])
        .arg("--config")
        .arg(http_only_config(&temp))
        .assert()
        .success()
        .stdout(format!(
            "ns\n  a (a:1.0)\n  b (b:2.0)\nc (c:latest (+ 1 other version(s)))\n  1.0 ({second}/c:1.0)\n  latest ({second}/c:latest)\n"
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_repo_bundles_lists_failures_last() {
    let (_good, good) = index_server(&[("app", "1.0")]).await;
    let bad = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&bad).await;
    let bad_repo = bad.uri().trim_start_matches("http://").to_string();
    let temp = TempDir::new().unwrap();

    let output = explorer_cmd()
        .args(["repo-bundles", "--format", "json", "--repo", &bad_repo, "--repo", &good])
        .arg("--config")
        .arg(http_only_config(&temp))
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["label"], "app");
    assert_eq!(nodes[1]["label"], "Error");
    assert!(nodes[1]["tooltip"].as_str().unwrap().contains(&bad_repo));
}

/// A config reading indexes over HTTP with no duffle involved.
fn http_only_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "index-scheme = \"http\"\n").unwrap();
    path
}
