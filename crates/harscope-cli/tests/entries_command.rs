use assert_cmd::Command;
use harscope_cli::commands::EntryFilter;
use harscope_cli::commands::entries::{entry_at, list_entries};
use harscope_core::analysis::ResourceType;
use predicates::prelude::*;
use std::path::PathBuf;

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

#[test]
fn test_list_all_entries() {
    let report = list_entries(&fixture_path("baseline.har"), &EntryFilter::default()).unwrap();

    assert_eq!(report.total_entries, 4);
    assert_eq!(report.rows.len(), 4);
    assert_eq!(report.rows[0].resource_type, ResourceType::Html);
    assert_eq!(report.rows[1].size, 51200);
}

#[test]
fn test_list_filtered_entries_keep_file_positions() {
    let filter = EntryFilter {
        method: Some("post".to_string()),
        ..Default::default()
    };

    let report = list_entries(&fixture_path("baseline.har"), &filter).unwrap();

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].index, 3);
    assert_eq!(report.rows[0].status, 500);
}

#[test]
fn test_entry_at_index() {
    let entry = entry_at(&fixture_path("baseline.har"), 1).unwrap();
    assert_eq!(entry.request.url, "https://cdn.example.com/static/app.js");

    assert!(entry_at(&fixture_path("baseline.har"), 4).is_err());
}

#[test]
fn test_entries_table_output() {
    harscope()
        .args(["entries", "--format", "table", "--status", "5xx"])
        .arg(fixture_path("baseline.har"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Index,Method,Status,Time (ms),Size (bytes),Type,URL",
        ))
        .stdout(predicate::str::contains(
            "3,POST,500,400.0,512,json,https://api.example.com/v1/items",
        ));
}

#[test]
fn test_entries_detail_view() {
    harscope()
        .args(["entries", "--index", "0"])
        .arg(fixture_path("baseline.har"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Request Details #0"))
        .stdout(predicate::str::contains("URL:           https://www.example.com/"))
        .stdout(predicate::str::contains("Wait (TTFB):   250.0ms"));
}

#[test]
fn test_entries_detail_out_of_range_fails() {
    harscope()
        .args(["entries", "--index", "9"])
        .arg(fixture_path("baseline.har"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Entry 9 not found"));
}

#[test]
fn test_entries_index_conflicts_with_filters() {
    harscope()
        .args(["entries", "--index", "0", "--search", "app.js"])
        .arg(fixture_path("baseline.har"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
