//! Named configuration presets.
//!
//! A registry is an ordinary value owned by whoever needs presets; nothing is
//! process-global.

use std::collections::BTreeMap;

use crate::bossfight::BossfightConfig;
use crate::error::{DomainError, Result};
use crate::lifecycle::DomainConfig;
use crate::schema::{DomainKind, DomainSchema};

#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: BTreeMap<String, DomainSchema>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presets used by the interactive harness, keyed by domain name.
    pub fn interactive() -> Self {
        let mut registry = Self::new();
        registry.register(
            DomainKind::Bossfight.name(),
            BossfightConfig {
                min_n_rounds: 3,
                max_n_rounds: 3,
                min_n_barriers: 3,
                max_n_barriers: 3,
                min_boss_round_health: 5,
                max_boss_round_health: 5,
                min_boss_invulnerable_duration: 1,
                max_boss_invulnerable_duration: 1,
                n_boss_attack_modes: 4,
                min_boss_bullet_velocity: 0.2,
                max_boss_bullet_velocity: 0.2,
                boss_rand_fire_prob: 0.1,
                boss_scale: 1.0,
            },
        );
        registry
    }

    /// Adds or replaces a preset.
    pub fn register(&mut self, name: impl Into<String>, schema: impl Into<DomainSchema>) {
        self.presets.insert(name.into(), schema.into());
    }

    pub fn get(&self, name: &str) -> Option<&DomainSchema> {
        self.presets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Fresh, unbound configuration from a preset.
    pub fn instantiate(&self, name: &str, cache_name: Option<&str>) -> Result<DomainConfig> {
        let schema = self
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::UnknownDomain(name.to_string()))?;
        Ok(match cache_name {
            Some(cache_name) => DomainConfig::with_cache_name(schema, cache_name),
            None => DomainConfig::new(schema),
        })
    }
}
