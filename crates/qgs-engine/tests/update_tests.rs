//! Self-update tests against an in-memory fetcher

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;
use std::collections::HashMap;

use qgs_core::errors::{ExError, ExErrorKind};
use qgs_core::Severity;
use qgs_engine::commands::update::{run_update, Fetch, UpdateOutcome, Version};
use qgs_engine::config::UpdaterConfig;
use qgs_engine::Result;
use tempfile::TempDir;

/// Serves fixed bodies keyed by URL without the cache-busting query
struct FakeFetcher {
    bodies: HashMap<String, Vec<u8>>,
    requested: RefCell<Vec<String>>,
}

impl FakeFetcher {
    fn new(version: &str, source: &str) -> Self {
        let mut bodies = HashMap::new();
        bodies.insert("https://h/version.txt".to_string(), version.as_bytes().to_vec());
        bodies.insert("https://h/qgs.py".to_string(), source.as_bytes().to_vec());
        Self {
            bodies,
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl Fetch for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requested.borrow_mut().push(url.to_string());
        let base = url.split('?').next().unwrap_or(url);
        self.bodies.get(base).cloned().ok_or_else(|| {
            ExError::new(ExErrorKind::ExternalService).with_message(format!("404 for {}", url))
        })
    }
}

fn config(dir: &TempDir) -> UpdaterConfig {
    UpdaterConfig {
        version_url: "https://h/version.txt".to_string(),
        source_url: "https://h/qgs.py".to_string(),
        install_path: Some(dir.path().join("qgs.py")),
    }
}

#[test]
fn test_newer_version_overwrites_installed_file() {
    // GIVEN an installed file and a newer published version
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    std::fs::write(dir.path().join("qgs.py"), "old").unwrap();
    let fetcher = FakeFetcher::new("0.9.0\n", "new");

    // WHEN running the update
    let outcome = run_update(&fetcher, &config, &"0.8.6".parse().unwrap());

    // THEN the file holds the fetched bytes and the report names the version
    assert_eq!(outcome, UpdateOutcome::Updated("0.9.0".parse().unwrap()));
    assert!(outcome.message().contains("0.9.0"));
    assert_eq!(std::fs::read_to_string(dir.path().join("qgs.py")).unwrap(), "new");
    let requested = fetcher.requested.borrow();
    assert_eq!(requested.len(), 2);
    assert!(requested.iter().all(|url| url.contains("?t=")));
}

#[test]
fn test_same_version_is_up_to_date() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    std::fs::write(dir.path().join("qgs.py"), "old").unwrap();
    let fetcher = FakeFetcher::new("0.8.6", "new");

    let outcome = run_update(&fetcher, &config, &Version::current());

    assert_eq!(outcome, UpdateOutcome::UpToDate);
    assert_eq!(outcome.to_report().severity, Severity::Info);
    assert_eq!(std::fs::read_to_string(dir.path().join("qgs.py")).unwrap(), "old");
    assert_eq!(fetcher.requested.borrow().len(), 1);
}

#[test]
fn test_older_published_version_is_not_installed() {
    let dir = TempDir::new().unwrap();
    let fetcher = FakeFetcher::new("0.8.5", "older");

    let outcome = run_update(&fetcher, &config(&dir), &"0.8.6".parse().unwrap());

    assert_eq!(outcome, UpdateOutcome::UpToDate);
    assert!(!dir.path().join("qgs.py").exists());
}

#[test]
fn test_unreachable_source_reports_failure() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir);
    config.source_url = "https://h/missing.py".to_string();
    let fetcher = FakeFetcher::new("1.0.0", "new");

    let outcome = run_update(&fetcher, &config, &"0.8.6".parse().unwrap());

    assert!(matches!(outcome, UpdateOutcome::Failed(_)));
    assert_eq!(outcome.to_report().severity, Severity::Error);
    assert!(!dir.path().join("qgs.py").exists());
}

#[test]
fn test_missing_install_path_reports_failure() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir);
    config.install_path = None;
    let fetcher = FakeFetcher::new("1.0.0", "new");

    let outcome = run_update(&fetcher, &config, &"0.8.6".parse().unwrap());

    match outcome {
        UpdateOutcome::Failed(reason) => assert!(reason.contains("no install path")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}
