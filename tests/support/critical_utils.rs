//! Shared utilities for critical tests (corrupted stores, seeded stores).
//!
//! Used by tests under `tests/critical/` to build store files in states a
//! crash or a hostile writer could leave behind.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tempfile::TempDir;

/// Writes `entries` as a plaintext store file and returns its path.
///
/// The `TempDir` must be kept alive for the path to remain valid.
pub fn seeded_store_file(entries: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("cookies.json");
    let map: BTreeMap<&str, &str> = entries.iter().copied().collect();
    let payload = serde_json::to_vec(&map).expect("serialize seeded store");
    std::fs::write(&path, payload).expect("Failed to write seeded store");
    (temp_dir, path)
}

/// Creates a store file with garbage content, as a torn write might leave.
pub fn corrupted_store_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("cookies.json");
    std::fs::write(&path, b"{\"names\": \"a,b\", \"cookie_a\": \"7B22").expect("write");
    (temp_dir, path)
}
