use assert_cmd::prelude::*;
use predicates::ord::eq;
use predicates::str::{contains, PredicateStrExt};
use std::process::Command;
use tempfile::TempDir;

/// runs `urlstore add <url>` in `dir` and returns the printed key
fn add(dir: &TempDir, url: &str) -> String {
    let output = Command::cargo_bin("urlstore")
        .unwrap()
        .args(&["add", url])
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap().trim().to_owned()
}

// `urlstore` with no args should exit with a non-zero code.
#[test]
fn cli_no_args() {
    Command::cargo_bin("urlstore").unwrap().assert().failure();
}

// `urlstore -V` should print the version
#[test]
fn cli_version() {
    Command::cargo_bin("urlstore")
        .unwrap()
        .args(&["-V"])
        .assert()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

// `urlstore add <URL>` should print the first key, `urlstore get <KEY>` should print the url
#[test]
fn cli_add_then_get() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");

    assert_eq!(add(&temp_dir, "http://a.com"), "a");
    assert_eq!(add(&temp_dir, "http://b.com"), "b");

    Command::cargo_bin("urlstore")
        .unwrap()
        .args(&["get", "a"])
        .current_dir(&temp_dir)
        .assert()
        .success()
        .stdout(eq("http://a.com").trim());

    Command::cargo_bin("urlstore")
        .unwrap()
        .args(&["count"])
        .current_dir(&temp_dir)
        .assert()
        .success()
        .stdout(eq("2").trim());
}

// `urlstore get <KEY>` should print "Key not found" for an unknown key
#[test]
fn cli_get_missing_key() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    Command::cargo_bin("urlstore")
        .unwrap()
        .args(&["get", "zzz"])
        .current_dir(&temp_dir)
        .assert()
        .success()
        .stdout(eq("Key not found").trim());
}

// `--file` should select the record log to use
#[test]
fn cli_file_option() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let log = temp_dir.path().join("other").join("links.log");
    let log = log.to_str().unwrap();

    Command::cargo_bin("urlstore")
        .unwrap()
        .args(&["--file", log, "add", "http://a.com"])
        .assert()
        .success()
        .stdout(eq("a").trim());
    Command::cargo_bin("urlstore")
        .unwrap()
        .args(&["--file", log, "--strict", "--sync", "get", "a"])
        .assert()
        .success()
        .stdout(eq("http://a.com").trim());

    // the default log in the working directory is untouched
    assert!(!temp_dir.path().join("urls.log").exists());
}

// a log file that can not be opened should exit with a non-zero code
#[test]
fn cli_unusable_log_file() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    Command::cargo_bin("urlstore")
        .unwrap()
        .args(&["--file", temp_dir.path().to_str().unwrap(), "count"])
        .assert()
        .failure()
        .stderr(contains("could not open record log"));
}

// `get` and `add` with missing arguments should fail
#[test]
fn cli_invalid_args() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    for args in [vec!["add"], vec!["get"], vec!["get", "a", "extra"], vec!["unknown"]] {
        Command::cargo_bin("urlstore")
            .unwrap()
            .args(&args)
            .current_dir(&temp_dir)
            .assert()
            .failure();
    }
}
