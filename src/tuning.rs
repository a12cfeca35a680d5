//! Game balance values
//!
//! Every number the combat core depends on lives here so a round can be
//! re-tuned from JSON without touching the simulation. Missing fields fall
//! back to the shipped defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::fighter::{Buff, StatPath, Stats, WeaponKind};

/// Timed buff parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuffTuning {
    /// Duration in ms
    pub duration_ms: f32,
    /// Multiplier or bonus fraction (meaning depends on the buff)
    pub magnitude: f32,
}

/// Balance table for a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Movement ===
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Maximum fall speed (px/s)
    pub terminal_velocity: f32,
    /// Upward launch speed (px/s, negative is up)
    pub jump_velocity: f32,
    /// Extra downward acceleration while holding down in the air (px/s²)
    pub fast_fall_accel: f32,
    /// Horizontal velocity kept per frame with no input
    pub friction: f32,
    /// Downward speed given when dropping through a platform
    pub drop_nudge: f32,
    /// Standing tolerance on a platform top (px)
    pub platform_snap: f32,
    /// Distance above the floor that still counts as "on the floor" (px)
    pub floor_tolerance: f32,
    /// Vertical landing window for span grounds (px)
    pub span_landing_tolerance: f32,
    /// Fallback elimination depth (px, screen space)
    pub death_boundary_y: f32,

    // === Dash ===
    pub dash_distance: f32,
    pub dash_duration_ms: f32,
    pub dash_cooldown_ms: f32,
    pub dash_step: f32,
    pub double_tap_window_ms: f32,

    // === Attacks ===
    pub attack_cooldown_ms: f32,
    pub attack_window_ms: f32,
    pub hitbox_offset: f32,
    pub hitbox_width: f32,
    pub hitbox_height: f32,
    pub knockback_lock_ms: f32,
    pub knockback_sword: f32,
    pub knockback_gun: f32,
    pub knockback_punch: f32,
    pub sword_multiplier: f32,
    pub rage_multiplier: f32,

    // === Projectiles ===
    pub bullet_speed: f32,
    pub sacrifice_bullet_speed: f32,
    pub bullet_lifespan_ms: f32,
    pub bullet_hit_radius: f32,

    // === Risk abilities ===
    /// Minimum absolute health to start a sacrifice attack (exclusive)
    pub sacrifice_min_health: i32,
    pub sacrifice_penalty: i32,
    pub sacrifice_multiplier: f32,
    /// Fraction of max health that must be exceeded to gamble
    pub gambit_threshold: f32,
    /// Fraction of max health paid for a gambit
    pub gambit_cost: f32,
    pub berserker: BuffTuning,
    pub swift: BuffTuning,
    pub iron: BuffTuning,
    pub vampiric: BuffTuning,

    // === Passives ===
    pub passive_threshold: f32,
    pub regen_amount: i32,
    pub regen_ticks: u32,
    pub regen_interval_ms: f32,

    // === Field weapons ===
    pub pickup_radius: f32,
    pub potion_heal: i32,
    pub spawn_interval_ms: f32,
    pub weapon_lifespan_ms: f32,

    // === Match clock ===
    pub round_seconds: u32,
    pub countdown_ticks: u32,
    pub tick_ms: f32,
    pub overtime_drain: i32,
    pub sudden_death_intro_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 800.0,
            terminal_velocity: 1500.0,
            jump_velocity: -550.0,
            fast_fall_accel: 600.0,
            friction: 0.8,
            drop_nudge: 100.0,
            platform_snap: 5.0,
            floor_tolerance: 10.0,
            span_landing_tolerance: 20.0,
            death_boundary_y: 820.0,

            dash_distance: 240.0,
            dash_duration_ms: 150.0,
            dash_cooldown_ms: 1000.0,
            dash_step: 10.0,
            double_tap_window_ms: 300.0,

            attack_cooldown_ms: 500.0,
            attack_window_ms: 200.0,
            hitbox_offset: 50.0,
            hitbox_width: 60.0,
            hitbox_height: 40.0,
            knockback_lock_ms: 300.0,
            knockback_sword: 400.0,
            knockback_gun: 150.0,
            knockback_punch: 200.0,
            sword_multiplier: 2.0,
            rage_multiplier: 1.5,

            bullet_speed: 600.0,
            sacrifice_bullet_speed: 800.0,
            bullet_lifespan_ms: 2000.0,
            bullet_hit_radius: 25.0,

            sacrifice_min_health: 30,
            sacrifice_penalty: 30,
            sacrifice_multiplier: 2.0,
            gambit_threshold: 0.3,
            gambit_cost: 0.3,
            berserker: BuffTuning { duration_ms: 8000.0, magnitude: 1.5 },
            swift: BuffTuning { duration_ms: 8000.0, magnitude: 0.6 },
            iron: BuffTuning { duration_ms: 6000.0, magnitude: 0.5 },
            vampiric: BuffTuning { duration_ms: 8000.0, magnitude: 10.0 },

            passive_threshold: 0.3,
            regen_amount: 5,
            regen_ticks: 4,
            regen_interval_ms: 750.0,

            pickup_radius: 30.0,
            potion_heal: 20,
            spawn_interval_ms: 5000.0,
            weapon_lifespan_ms: 5000.0,

            round_seconds: 30,
            countdown_ticks: 4,
            tick_ms: 1000.0,
            overtime_drain: 5,
            sudden_death_intro_ms: 2000.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning table
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning = serde_json::from_str(json)?;
        Ok(tuning)
    }

    /// Serialize the full table
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Base stats for a build
    pub fn stats_for(&self, path: StatPath) -> Stats {
        match path {
            StatPath::Fury => Stats {
                max_health: 80,
                damage: 25,
                speed: 200.0,
            },
            StatPath::Endurance => Stats {
                max_health: 120,
                damage: 15,
                speed: 200.0,
            },
        }
    }

    /// Parameters of a gambit buff
    pub fn buff(&self, buff: Buff) -> BuffTuning {
        match buff {
            Buff::Berserker => self.berserker,
            Buff::Swift => self.swift,
            Buff::Iron => self.iron,
            Buff::Vampiric => self.vampiric,
        }
    }

    /// Knockback speed dealt by a weapon (None = bare hands)
    pub fn knockback_for(&self, weapon: Option<WeaponKind>) -> f32 {
        match weapon {
            Some(WeaponKind::Sword) => self.knockback_sword,
            Some(WeaponKind::Gun) => self.knockback_gun,
            _ => self.knockback_punch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 1000.0, "round_seconds": 60 }"#).unwrap();
        assert_eq!(tuning.gravity, 1000.0);
        assert_eq!(tuning.round_seconds, 60);
        assert_eq!(tuning.attack_cooldown_ms, 500.0);
    }

    #[test]
    fn test_roundtrip_json() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            Tuning::from_json("{ gravity: "),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_build_stats() {
        let tuning = Tuning::default();
        let fury = tuning.stats_for(StatPath::Fury);
        assert_eq!((fury.max_health, fury.damage), (80, 25));
        let endurance = tuning.stats_for(StatPath::Endurance);
        assert_eq!((endurance.max_health, endurance.damage), (120, 15));
    }

    #[test]
    fn test_knockback_by_weapon() {
        let tuning = Tuning::default();
        assert_eq!(tuning.knockback_for(Some(WeaponKind::Sword)), 400.0);
        assert_eq!(tuning.knockback_for(Some(WeaponKind::Gun)), 150.0);
        assert_eq!(tuning.knockback_for(Some(WeaponKind::Shield)), 200.0);
        assert_eq!(tuning.knockback_for(None), 200.0);
    }
}
