use assert_cmd::Command;
use harscope_cli::commands::filter::{FilterOptions, execute};
use harscope_core::har::HarReader;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get path to test fixtures
fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(filename)
}

#[allow(deprecated)]
fn harscope() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin("harscope"))
}

/// Test filtering by exact host match
#[test]
fn test_filter_exact_host_match() {
    // Arrange
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("filtered.har");
    let options = FilterOptions {
        hosts: vec!["api.example.com".to_string()],
        output: Some(output.clone()),
        ..Default::default()
    };

    // Act
    let result = execute(&fixture_path("baseline.har"), &options);

    // Assert
    assert!(result.is_ok(), "Should successfully filter HAR file");
    let filtered = HarReader::from_file(&output).unwrap();
    assert_eq!(filtered.log.entries.len(), 1);
    assert_eq!(
        filtered.log.entries[0].request.url,
        "https://api.example.com/v1/items"
    );
}

/// Test filtering with a glob and a comma-separated host list
#[test]
fn test_filter_glob_and_comma_separated_hosts() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("filtered.har");
    let options = FilterOptions {
        hosts: vec!["*.example.com, www.google-analytics.com".to_string()],
        output: Some(output.clone()),
        ..Default::default()
    };

    execute(&fixture_path("baseline.har"), &options).unwrap();

    let filtered = HarReader::from_file(&output).unwrap();
    assert_eq!(filtered.log.entries.len(), 4);
}

/// Test combined status and method criteria, with metadata preserved
#[test]
fn test_filter_combined_criteria_preserves_pages() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("filtered.har");
    let options = FilterOptions {
        status: Some("2xx".to_string()),
        method: Some("get".to_string()),
        content_type: Some("javascript".to_string()),
        output: Some(output.clone()),
        ..Default::default()
    };

    execute(&fixture_path("baseline.har"), &options).unwrap();

    let filtered = HarReader::from_file(&output).unwrap();
    assert_eq!(filtered.log.entries.len(), 1);
    assert_eq!(filtered.log.pages.len(), 1);
    assert_eq!(filtered.page_on_load(), Some(2500.0));
    assert_eq!(filtered.log.creator.name, "harscope-fixtures");
}

/// Test that no matching entries is an error
#[test]
fn test_filter_no_matches_fails() {
    let options = FilterOptions {
        search: Some("no-such-resource".to_string()),
        ..Default::default()
    };

    let result = execute(&fixture_path("baseline.har"), &options);

    assert!(result.is_err());
}

/// Test that an invalid host pattern is rejected
#[test]
fn test_filter_invalid_host_pattern() {
    let options = FilterOptions {
        hosts: vec!["*.[example".to_string()],
        ..Default::default()
    };

    assert!(execute(&fixture_path("baseline.har"), &options).is_err());
}

/// Test filtered HAR written to stdout
#[test]
fn test_filter_to_stdout() {
    let output = harscope()
        .args(["filter", "--status", "500"])
        .arg(fixture_path("baseline.har"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let har = HarReader::from_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(har.log.entries.len(), 1);
    assert_eq!(har.log.entries[0].response.status, 500);
}

#[test]
fn test_filter_output_file_from_cli() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("scripts.har");

    harscope()
        .args(["filter", "--search", "app.js", "-o"])
        .arg(&output)
        .arg(fixture_path("baseline.har"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let filtered = HarReader::from_file(&output).unwrap();
    assert_eq!(filtered.log.entries.len(), 1);
}
