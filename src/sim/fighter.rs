//! Fighter state
//!
//! One struct per combatant with every field declared up front. A fighter is
//! built fresh at round start from its ledger entry and never carries state
//! into the next round.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::timers::TimerWheel;
use crate::consts::*;
use crate::tuning::Tuning;

/// Which corner a fighter started in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Character build chosen before the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatPath {
    /// Path of Fury: glass cannon, gets Rage when low
    #[default]
    #[serde(rename = "damage")]
    Fury,
    /// Path of Endurance: bulky, regenerates once when low
    #[serde(rename = "health")]
    Endurance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub max_health: i32,
    pub damage: i32,
    /// Walk speed (px/s)
    pub speed: f32,
}

/// Horizontal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// Kinematic body (position is the top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub grounded: bool,
    pub facing_right: bool,
}

impl Body {
    pub fn new(pos: Vec2, facing_right: bool) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: Vec2::new(FIGHTER_WIDTH, FIGHTER_HEIGHT),
            grounded: true,
            facing_right,
        }
    }

    /// Current bounds, or `None` if the body is in an unusable state
    pub fn bounds(&self) -> Option<Rect> {
        Rect::checked(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn facing_sign(&self) -> f32 {
        if self.facing_right { 1.0 } else { -1.0 }
    }
}

/// Field weapon types; potions are consumed on pickup and never held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    Sword,
    Gun,
    Shield,
    Potion,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Sword,
        WeaponKind::Gun,
        WeaponKind::Shield,
        WeaponKind::Potion,
    ];

    /// Kinds that can sit in the weapon slot
    pub const HELD: [WeaponKind; 3] = [WeaponKind::Sword, WeaponKind::Gun, WeaponKind::Shield];
}

/// Blood gambit buffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Buff {
    /// +50% damage
    Berserker,
    /// +60% walk speed
    Swift,
    /// Incoming damage halved
    Iron,
    /// Heal on every landed hit
    Vampiric,
}

impl Buff {
    pub const ALL: [Buff; 4] = [Buff::Berserker, Buff::Swift, Buff::Iron, Buff::Vampiric];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub kind: Buff,
    pub remaining_ms: f32,
    /// Extra walk speed while Swift is active
    pub speed_bonus: f32,
}

/// Low-health passive, one per build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Passive {
    Rage,
    Regeneration,
}

impl StatPath {
    pub fn passive(self) -> Passive {
        match self {
            StatPath::Fury => Passive::Rage,
            StatPath::Endurance => Passive::Regeneration,
        }
    }
}

/// In-flight dash: x is eased from `from_x` to `to_x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashMotion {
    pub from_x: f32,
    pub to_x: f32,
    pub elapsed_ms: f32,
    pub duration_ms: f32,
}

impl DashMotion {
    pub fn current_x(&self) -> f32 {
        let t = if self.duration_ms > 0.0 {
            self.elapsed_ms / self.duration_ms
        } else {
            1.0
        };
        self.from_x + (self.to_x - self.from_x) * crate::ease_out_quad(t)
    }
}

/// Last directional press, for double-tap detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapRecord {
    pub dir: Direction,
    pub at_ms: f64,
}

/// Delayed per-fighter effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FighterTimer {
    /// Close the melee hit window
    EndAttack,
    /// Settle a melee sacrifice attempt (miss if it never connected)
    EndSacrifice { attempt: u32 },
    /// Finish the dash motion and kill residual velocity
    EndDash,
    /// One regeneration pulse
    Regen,
}

/// Who fights, and with which build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterConfig {
    pub name: String,
    pub path: StatPath,
}

impl FighterConfig {
    pub fn new(name: impl Into<String>, path: StatPath) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }
}

/// A combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fighter {
    pub side: Side,
    pub name: String,
    pub path: StatPath,
    pub body: Body,
    pub stats: Stats,
    pub health: i32,

    // Timers counted down every frame (ms)
    pub attack_cooldown_ms: f32,
    pub dash_cooldown_ms: f32,
    /// Movement input and friction are ignored while this runs
    pub knockback_lock_ms: f32,

    /// Held weapon (never a potion)
    pub weapon: Option<WeaponKind>,
    pub is_attacking: bool,
    pub dash: Option<DashMotion>,
    pub last_tap: Option<TapRecord>,

    // Low-health passive
    pub ability_triggered: bool,
    pub ability: Option<Passive>,
    pub regen_pulses_left: u32,

    // Sacrifice attack
    pub sacrifice_used: bool,
    pub sacrifice_attacking: bool,
    pub sacrifice_hit: bool,
    pub sacrifice_attempt: u32,

    // Blood gambit
    pub gambit_used: bool,
    pub buff: Option<ActiveBuff>,

    /// Platform index being dropped through
    pub dropping_through: Option<usize>,

    pub timers: TimerWheel<FighterTimer>,
}

impl Fighter {
    pub fn new(side: Side, config: &FighterConfig, spawn: Vec2, tuning: &Tuning) -> Self {
        let stats = tuning.stats_for(config.path);
        Self {
            side,
            name: config.name.clone(),
            path: config.path,
            body: Body::new(spawn, side == Side::A),
            stats,
            health: stats.max_health,
            attack_cooldown_ms: 0.0,
            dash_cooldown_ms: 0.0,
            knockback_lock_ms: 0.0,
            weapon: None,
            is_attacking: false,
            dash: None,
            last_tap: None,
            ability_triggered: false,
            ability: None,
            regen_pulses_left: 0,
            sacrifice_used: false,
            sacrifice_attacking: false,
            sacrifice_hit: false,
            sacrifice_attempt: 0,
            gambit_used: false,
            buff: None,
            dropping_through: None,
            timers: TimerWheel::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_dashing(&self) -> bool {
        self.dash.is_some()
    }

    pub fn has_buff(&self, kind: Buff) -> bool {
        self.buff.is_some_and(|b| b.kind == kind)
    }

    pub fn has_rage(&self) -> bool {
        self.ability == Some(Passive::Rage)
    }

    /// Walk speed including the Swift bonus
    pub fn speed(&self) -> f32 {
        self.stats.speed + self.buff.map_or(0.0, |b| b.speed_bonus)
    }

    /// Restore health, capped at max. Returns the amount actually healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.stats.max_health);
        self.health - before
    }

    /// Melee hitbox in front of the fighter
    pub fn hitbox(&self, tuning: &Tuning) -> Option<Rect> {
        let bounds = self.body.bounds()?;
        let center = bounds.center() + Vec2::new(self.body.facing_sign() * tuning.hitbox_offset, 0.0);
        Some(Rect::centered(center, tuning.hitbox_width, tuning.hitbox_height))
    }

    pub fn face(&mut self, dir: Direction) {
        self.body.facing_right = dir == Direction::Right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(side: Side, path: StatPath) -> Fighter {
        Fighter::new(
            side,
            &FighterConfig::new("Player", path),
            Vec2::new(100.0, 100.0),
            &Tuning::default(),
        )
    }

    #[test]
    fn test_new_fighter_from_build() {
        let f = fighter(Side::A, StatPath::Endurance);
        assert_eq!(f.health, 120);
        assert_eq!(f.stats.damage, 15);
        assert!(f.body.facing_right);
        assert!(!fighter(Side::B, StatPath::Fury).body.facing_right);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut f = fighter(Side::A, StatPath::Fury);
        f.health = 70;
        assert_eq!(f.heal(20), 10);
        assert_eq!(f.health, 80);
    }

    #[test]
    fn test_hitbox_follows_facing() {
        let tuning = Tuning::default();
        let mut f = fighter(Side::A, StatPath::Fury);
        let center = f.body.center();
        let right = f.hitbox(&tuning).unwrap();
        assert_eq!(right.center().x, center.x + 50.0);
        f.face(Direction::Left);
        let left = f.hitbox(&tuning).unwrap();
        assert_eq!(left.center().x, center.x - 50.0);
    }

    #[test]
    fn test_swift_speed_bonus() {
        let mut f = fighter(Side::A, StatPath::Fury);
        f.buff = Some(ActiveBuff {
            kind: Buff::Swift,
            remaining_ms: 1000.0,
            speed_bonus: 120.0,
        });
        assert_eq!(f.speed(), 320.0);
    }

    #[test]
    fn test_stat_path_ledger_names() {
        assert_eq!(serde_json::to_string(&StatPath::Fury).unwrap(), "\"damage\"");
        assert_eq!(
            serde_json::from_str::<StatPath>("\"health\"").unwrap(),
            StatPath::Endurance
        );
    }

    #[test]
    fn test_dash_motion_eases_to_target() {
        let mut dash = DashMotion {
            from_x: 0.0,
            to_x: 240.0,
            elapsed_ms: 0.0,
            duration_ms: 150.0,
        };
        assert_eq!(dash.current_x(), 0.0);
        dash.elapsed_ms = 75.0;
        assert!(dash.current_x() > 120.0);
        dash.elapsed_ms = 150.0;
        assert_eq!(dash.current_x(), 240.0);
    }
}
