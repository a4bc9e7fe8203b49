//! Harness commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::Local;
use domain_shared::prelude::*;
use tracing::info;

use crate::config::HarnessConfig;

/// Creates `<experiments_dir>/experiment-<timestamp>/domain_configs/` and binds
/// the configured preset to a file inside it.
///
/// Fails if the experiment directory already exists.
pub fn init(cfg: &HarnessConfig, registry: &PresetRegistry) -> anyhow::Result<DomainConfig> {
    let mut config = registry
        .instantiate(&cfg.env_name, cfg.cache_name.as_deref())
        .with_context(|| format!("no preset for {:?}", cfg.env_name))?;

    let root = PathBuf::from(&cfg.experiments_dir);
    fs::create_dir_all(&root).with_context(|| format!("create {}", root.display()))?;

    let experiment_dir = root.join(format!("experiment-{}", Local::now().format("%Y%m%d%H%M%S")));
    fs::create_dir(&experiment_dir)
        .with_context(|| format!("create {}", experiment_dir.display()))?;
    let config_dir = experiment_dir.join("domain_configs");
    fs::create_dir(&config_dir).with_context(|| format!("create {}", config_dir.display()))?;

    config
        .bind(config_dir.join(&cfg.config_file_name))
        .context("bind configuration")?;
    info!(env = %cfg.env_name, experiment = %experiment_dir.display(), "Experiment initialized");
    Ok(config)
}

pub fn show(path: &Path) -> anyhow::Result<DomainConfig> {
    DomainConfig::restore_any(path).with_context(|| format!("restore {}", path.display()))
}

/// Applies `key=value` assignments to the configuration at `path`.
pub fn set(path: &Path, assignments: &[String], cache: bool) -> anyhow::Result<UpdateReport> {
    let partial = parse_assignments(assignments)?;
    let mut config = show(path)?;
    let report = config.update(partial, cache).context("update configuration")?;
    info!(
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        "Configuration updated"
    );
    Ok(report)
}

pub fn validate(path: &Path) -> anyhow::Result<Vec<Violation>> {
    Ok(show(path)?.schema().validate())
}

fn parse_assignments(assignments: &[String]) -> anyhow::Result<Vec<(String, FieldValue)>> {
    let mut out = Vec::with_capacity(assignments.len());
    for raw in assignments {
        let Some((key, value)) = raw.split_once('=') else {
            bail!("expected key=value, got {raw:?}");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("empty key in {raw:?}");
        }
        let value = match value.parse::<FieldValue>() {
            Ok(v) => v,
            Err(never) => match never {},
        };
        out.push((key.to_string(), value));
    }
    Ok(out)
}
