//! Boss-fight generation parameters (`dc_bossfight`).
//!
//! Integer `min_*`/`max_*` pairs are sampled uniformly per level; the bullet
//! velocity is sampled from a continuous range.

use crate::schema::{field_table, Violation};

#[derive(Debug, Clone, PartialEq)]
pub struct BossfightConfig {
    pub min_n_rounds: i64,
    pub max_n_rounds: i64,

    pub min_n_barriers: i64,
    pub max_n_barriers: i64,

    pub min_boss_round_health: i64,
    pub max_boss_round_health: i64,
    pub min_boss_invulnerable_duration: i64,
    pub max_boss_invulnerable_duration: i64,
    pub n_boss_attack_modes: i64,
    pub min_boss_bullet_velocity: f64,
    pub max_boss_bullet_velocity: f64,
    /// Base probability that the boss fires on a given step.
    pub boss_rand_fire_prob: f64,
    /// Multiplier on the boss radius.
    pub boss_scale: f64,
}

impl Default for BossfightConfig {
    fn default() -> Self {
        Self {
            min_n_rounds: 1,
            max_n_rounds: 6,
            min_n_barriers: 1,
            max_n_barriers: 4,
            min_boss_round_health: 1,
            max_boss_round_health: 10,
            min_boss_invulnerable_duration: 3,
            max_boss_invulnerable_duration: 3,
            n_boss_attack_modes: 4,
            min_boss_bullet_velocity: 0.5,
            max_boss_bullet_velocity: 0.75,
            boss_rand_fire_prob: 0.1,
            boss_scale: 1.0,
        }
    }
}

field_table!(BossfightConfig {
    min_n_rounds,
    max_n_rounds,
    min_n_barriers,
    max_n_barriers,
    min_boss_round_health,
    max_boss_round_health,
    min_boss_invulnerable_duration,
    max_boss_invulnerable_duration,
    n_boss_attack_modes,
    min_boss_bullet_velocity,
    max_boss_bullet_velocity,
    boss_rand_fire_prob,
    boss_scale,
});

impl BossfightConfig {
    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        let int_ranges = [
            ("min_n_rounds", "max_n_rounds", self.min_n_rounds, self.max_n_rounds),
            ("min_n_barriers", "max_n_barriers", self.min_n_barriers, self.max_n_barriers),
            (
                "min_boss_round_health",
                "max_boss_round_health",
                self.min_boss_round_health,
                self.max_boss_round_health,
            ),
            (
                "min_boss_invulnerable_duration",
                "max_boss_invulnerable_duration",
                self.min_boss_invulnerable_duration,
                self.max_boss_invulnerable_duration,
            ),
        ];
        for (min_name, max_name, min, max) in int_ranges {
            positive_int(&mut out, min_name, min);
            positive_int(&mut out, max_name, max);
            if max < min {
                out.push(Violation {
                    field: max_name,
                    message: format!("{} is below {} ({})", max, min_name, min),
                });
            }
        }

        positive_int(&mut out, "n_boss_attack_modes", self.n_boss_attack_modes);

        unit_interval(&mut out, "min_boss_bullet_velocity", self.min_boss_bullet_velocity);
        unit_interval(&mut out, "max_boss_bullet_velocity", self.max_boss_bullet_velocity);
        if self.max_boss_bullet_velocity < self.min_boss_bullet_velocity {
            out.push(Violation {
                field: "max_boss_bullet_velocity",
                message: format!(
                    "{} is below min_boss_bullet_velocity ({})",
                    self.max_boss_bullet_velocity, self.min_boss_bullet_velocity
                ),
            });
        }

        unit_interval(&mut out, "boss_rand_fire_prob", self.boss_rand_fire_prob);

        if !(self.boss_scale > 0.0) {
            out.push(Violation {
                field: "boss_scale",
                message: format!("{} must be positive", self.boss_scale),
            });
        }

        out
    }
}

fn positive_int(out: &mut Vec<Violation>, field: &'static str, v: i64) {
    if v <= 0 {
        out.push(Violation {
            field,
            message: format!("{} must be positive", v),
        });
    }
}

fn unit_interval(out: &mut Vec<Violation>, field: &'static str, v: f64) {
    if !(v > 0.0 && v <= 1.0) {
        out.push(Violation {
            field,
            message: format!("{} must be in (0, 1]", v),
        });
    }
}
