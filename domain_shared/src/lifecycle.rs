//! Configuration lifecycle: path binding, persistence, and versioned updates.
//!
//! A [`DomainConfig`] starts unbound. [`DomainConfig::bind`] ties it to a file
//! and provisions a cache directory next to that file. From then on every
//! [`DomainConfig::update`] can snapshot the pre-update state into the cache
//! directory before rewriting the bound file.
//!
//! On-disk layout:
//! ```text
//! <dir>/test_config.json
//! <dir>/<cache_name>/config-<update_timestamp>.json
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DomainError, Result};
use crate::schema::{DomainKind, DomainSchema, SetFieldError};
use crate::value::FieldValue;

/// On-disk form. Never carries the cache name.
#[derive(Debug, Serialize, Deserialize)]
struct Persisted {
    #[serde(default)]
    game: Option<String>,
    #[serde(default)]
    update_timestamp: Option<i64>,
    #[serde(default)]
    bound_path: Option<PathBuf>,
    #[serde(default)]
    cache_directory: Option<PathBuf>,
    #[serde(flatten)]
    fields: BTreeMap<String, FieldValue>,
}

/// Outcome of [`DomainConfig::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Keys that were written.
    pub applied: Vec<String>,
    /// Keys that were ignored (unknown name or wrong value type).
    pub skipped: Vec<String>,
    /// Snapshot of the pre-update state, if one was written.
    pub snapshot: Option<PathBuf>,
}

/// A schema plus its persistence state.
#[derive(Debug, Clone)]
pub struct DomainConfig {
    schema: DomainSchema,
    /// Keys read from disk that the schema does not declare.
    extras: BTreeMap<String, FieldValue>,
    /// Milliseconds since the Unix epoch.
    update_timestamp: i64,
    bound_path: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    cache_name: String,
}

impl DomainConfig {
    /// Creates an unbound configuration with a timestamp-derived cache name.
    pub fn new(schema: impl Into<DomainSchema>) -> Self {
        let cache_name = format!("cache-{}", Utc::now().format("%Y%m%d%H%M%S%3f"));
        Self::with_cache_name(schema, cache_name)
    }

    /// Creates an unbound configuration whose snapshots go to `cache_name`.
    pub fn with_cache_name(schema: impl Into<DomainSchema>, cache_name: impl Into<String>) -> Self {
        DomainConfig {
            schema: schema.into(),
            extras: BTreeMap::new(),
            update_timestamp: now_ms(),
            bound_path: None,
            cache_dir: None,
            cache_name: cache_name.into(),
        }
    }

    pub fn schema(&self) -> &DomainSchema {
        &self.schema
    }

    /// Direct schema access. Does not touch the timestamp or the bound file.
    pub fn schema_mut(&mut self) -> &mut DomainSchema {
        &mut self.schema
    }

    pub fn kind(&self) -> DomainKind {
        self.schema.kind()
    }

    pub fn domain_name(&self) -> &'static str {
        self.schema.domain_name()
    }

    /// Declared field or extra by name.
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.schema
            .get(name)
            .or_else(|| self.extras.get(name).cloned())
    }

    pub fn extras(&self) -> &BTreeMap<String, FieldValue> {
        &self.extras
    }

    pub fn update_timestamp(&self) -> i64 {
        self.update_timestamp
    }

    pub fn bound_path(&self) -> Option<&Path> {
        self.bound_path.as_deref()
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    /// Pretty JSON of everything except the cache name.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.persisted())?)
    }

    /// Binds to `path` and writes the current state there.
    ///
    /// Binding to the path already bound is a no-op. Any other path becomes
    /// the new bound path, gets a fresh cache directory next to it, and is
    /// written immediately.
    pub fn bind(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = absolutize(path.as_ref())?;
        if self.bound_path.as_deref() == Some(path.as_path()) {
            debug!(path = %path.display(), "Already bound");
            return Ok(());
        }

        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let cache_dir = parent.join(&self.cache_name);

        // The written file records its own path and cache dir, so both are set
        // first and put back if provisioning fails.
        let previous_path = self.bound_path.replace(path.clone());
        let previous_cache = self.cache_dir.replace(cache_dir.clone());
        if let Err(e) = self.provision(&path, &cache_dir) {
            self.bound_path = previous_path;
            self.cache_dir = previous_cache;
            return Err(e);
        }

        info!(
            domain = self.domain_name(),
            path = %path.display(),
            cache_dir = %cache_dir.display(),
            "Configuration bound"
        );
        Ok(())
    }

    /// Reads a `kind` configuration from `path`.
    ///
    /// Declared fields found in the file overwrite the defaults. Undeclared
    /// keys are kept as extras and logged. The cache directory recorded in the
    /// file is taken as-is and not created.
    pub fn restore(kind: DomainKind, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let persisted = read_persisted(path)?;
        Self::from_persisted(kind, persisted, path)
    }

    /// Like [`DomainConfig::restore`], picking the variant from the `game` key.
    pub fn restore_any(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let persisted = read_persisted(path)?;
        let kind = match persisted.game.as_deref() {
            Some(game) => game.parse::<DomainKind>()?,
            None => {
                return Err(DomainError::MissingDomain {
                    path: path.to_path_buf(),
                })
            }
        };
        Self::from_persisted(kind, persisted, path)
    }

    fn from_persisted(kind: DomainKind, persisted: Persisted, path: &Path) -> Result<Self> {
        if let Some(game) = persisted.game {
            if game != kind.name() {
                return Err(DomainError::DomainMismatch {
                    expected: kind.name().to_string(),
                    found: game,
                });
            }
        }

        let mut config = DomainConfig::new(DomainSchema::defaults(kind));
        for (name, value) in persisted.fields {
            match config.schema.set(&name, &value) {
                Ok(()) => {}
                Err(SetFieldError::Unknown) => {
                    warn!(field = %name, path = %path.display(), "Unrecognized field kept as extra");
                    config.extras.insert(name, value);
                }
                Err(SetFieldError::WrongType { expected }) => {
                    return Err(DomainError::FieldType {
                        field: name,
                        expected,
                    });
                }
            }
        }

        if let Some(ts) = persisted.update_timestamp {
            config.update_timestamp = ts;
        }
        if let Some(name) = persisted
            .cache_directory
            .as_deref()
            .and_then(Path::file_name)
        {
            config.cache_name = name.to_string_lossy().into_owned();
        }
        config.cache_dir = persisted.cache_directory;
        config.bound_path = Some(absolutize(path)?);
        Ok(config)
    }

    /// Applies `partial` to the configuration.
    ///
    /// With `cache` set and a bound path, the pre-update state is first written
    /// to `config-<old timestamp>.json` in the cache directory. Unknown keys
    /// and values of the wrong type are logged and skipped; the remaining keys
    /// still apply. A bound configuration is rewritten afterwards.
    ///
    /// There is no rollback: if the final write fails the in-memory changes
    /// stay applied.
    pub fn update<I, K, V>(&mut self, partial: I, cache: bool) -> Result<UpdateReport>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut report = UpdateReport::default();

        if cache && self.bound_path.is_some() {
            report.snapshot = Some(self.write_snapshot()?);
        }

        self.touch();

        for (name, value) in partial {
            let name = name.into();
            let value = value.into();
            match self.schema.set(&name, &value) {
                Ok(()) => report.applied.push(name),
                Err(SetFieldError::Unknown) if self.extras.contains_key(&name) => {
                    self.extras.insert(name.clone(), value);
                    report.applied.push(name);
                }
                Err(SetFieldError::Unknown) => {
                    warn!(field = %name, domain = self.domain_name(), "Ignoring update for unknown field");
                    report.skipped.push(name);
                }
                Err(SetFieldError::WrongType { expected }) => {
                    warn!(
                        field = %name,
                        expected,
                        got = value.type_name(),
                        "Ignoring update with wrong value type"
                    );
                    report.skipped.push(name);
                }
            }
        }

        if let Some(path) = self.bound_path.clone() {
            self.write_to(&path)?;
        }

        Ok(report)
    }

    fn provision(&self, path: &Path, cache_dir: &Path) -> Result<()> {
        fs::create_dir_all(cache_dir).map_err(|e| DomainError::io(cache_dir, e))?;
        self.write_to(path)
    }

    /// Never moves backwards, and always moves forward by at least 1ms so
    /// consecutive snapshots get distinct names.
    fn touch(&mut self) {
        self.update_timestamp = now_ms().max(self.update_timestamp.saturating_add(1));
    }

    /// Creates the cache directory, deriving it from the bound path if a
    /// restored file carried none.
    fn ensure_cache_dir(&mut self) -> Result<PathBuf> {
        let dir = match (&self.cache_dir, &self.bound_path) {
            (Some(dir), _) => dir.clone(),
            (None, Some(bound)) => bound
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
                .join(&self.cache_name),
            (None, None) => PathBuf::from(&self.cache_name),
        };
        fs::create_dir_all(&dir).map_err(|e| DomainError::io(&dir, e))?;
        self.cache_dir = Some(dir.clone());
        Ok(dir)
    }

    fn write_snapshot(&mut self) -> Result<PathBuf> {
        let dir = self.ensure_cache_dir()?;
        let path = dir.join(format!("config-{}.json", self.update_timestamp));
        self.write_to(&path)?;
        debug!(path = %path.display(), "Wrote snapshot");
        Ok(path)
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json_string()?;
        fs::write(path, json).map_err(|e| DomainError::io(path, e))?;
        debug!(path = %path.display(), timestamp = self.update_timestamp, "Wrote configuration");
        Ok(())
    }

    fn persisted(&self) -> Persisted {
        let mut fields: BTreeMap<String, FieldValue> = self
            .schema
            .fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        for (name, value) in &self.extras {
            fields.entry(name.clone()).or_insert_with(|| value.clone());
        }
        Persisted {
            game: Some(self.domain_name().to_string()),
            update_timestamp: Some(self.update_timestamp),
            bound_path: self.bound_path.clone(),
            cache_directory: self.cache_dir.clone(),
            fields,
        }
    }
}

impl fmt::Display for DomainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DomainConfig({}) {{", self.domain_name())?;
        for (name, value) in self.schema.fields() {
            writeln!(f, "   {}: {}", name, value)?;
        }
        for (name, value) in &self.extras {
            writeln!(f, "   {}: {} (unrecognized)", name, value)?;
        }
        writeln!(f, "   update_timestamp: {}", self.update_timestamp)?;
        if let Some(path) = &self.bound_path {
            writeln!(f, "   bound_path: {}", path.display())?;
        }
        if let Some(dir) = &self.cache_dir {
            writeln!(f, "   cache_directory: {}", dir.display())?;
        }
        write!(f, "}}")
    }
}

fn read_persisted(path: &Path) -> Result<Persisted> {
    let text = fs::read_to_string(path).map_err(|e| DomainError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| DomainError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| DomainError::io(path, e))
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
