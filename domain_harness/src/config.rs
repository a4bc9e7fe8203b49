//! Harness configuration.
//!
//! Loads harness settings from JSON strings (file IO left to the binary);
//! command-line flags override individual fields.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Root under which `experiment-<timestamp>` directories are created.
    #[serde(default = "default_experiments_dir")]
    pub experiments_dir: String,
    /// Preset to instantiate on `init`.
    #[serde(default = "default_env_name")]
    pub env_name: String,
    /// File name of the bound configuration inside `domain_configs/`.
    #[serde(default = "default_config_file_name")]
    pub config_file_name: String,
    /// Snapshot directory name; timestamp-derived when absent.
    #[serde(default)]
    pub cache_name: Option<String>,
}

fn default_experiments_dir() -> String {
    "interactive_test_experiments".to_string()
}

fn default_env_name() -> String {
    "dc_bossfight".to_string()
}

fn default_config_file_name() -> String {
    "test_config.json".to_string()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            experiments_dir: default_experiments_dir(),
            env_name: default_env_name(),
            config_file_name: default_config_file_name(),
            cache_name: None,
        }
    }
}

impl HarnessConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let cfg = HarnessConfig::from_json_str(r#"{"cache_name": "shared"}"#).unwrap();
        assert_eq!(cfg.env_name, "dc_bossfight");
        assert_eq!(cfg.config_file_name, "test_config.json");
        assert_eq!(cfg.cache_name.as_deref(), Some("shared"));
    }

    #[test]
    fn empty_object_equals_default() {
        assert_eq!(HarnessConfig::from_json_str("{}").unwrap(), HarnessConfig::default());
    }
}
