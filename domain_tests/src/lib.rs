//! Shared fixtures for the integration tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Parses a JSON file into a generic value.
pub fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Sorted entries of `dir`, or nothing if it does not exist.
pub fn list_dir(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut out = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    out.sort();
    Ok(out)
}
