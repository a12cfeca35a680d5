//! Round state and the events a frame produces
//!
//! Everything the per-frame pipeline mutates lives in [`Round`]; nothing is
//! global. The round's RNG is seeded so a replay with the same inputs
//! reproduces the same round.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::{ArenaGeometry, ArenaVariant, HazardKind};
use super::fighter::{Buff, Fighter, FighterConfig, Passive, Side, WeaponKind};
use super::timers::TimerWheel;
use crate::audio::{self, AudioCommand};
use crate::error::ConfigError;
use crate::tuning::Tuning;

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// 3-2-1-Fight, nobody moves
    Countdown,
    /// Regular time with the 30 second clock running
    Active,
    /// Clock ran out on equal health; both fighters drain
    Overtime,
    /// Both at 1 HP, next landed hit wins
    SuddenDeath,
    /// Winner decided, simulation stopped
    Resolved,
}

impl MatchPhase {
    /// Phases where fighters can move and fight
    pub fn is_combat(&self) -> bool {
        matches!(
            self,
            MatchPhase::Active | MatchPhase::Overtime | MatchPhase::SuddenDeath
        )
    }
}

/// Why the loser lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Health reached zero from a hit
    Knockout,
    /// Touched a hazard
    Hazard(HazardKind),
    /// Fell past the arena's death boundary
    Fall,
    /// Lower health when the clock ran out
    Timeout,
    /// Drained to zero in overtime
    OvertimeDrain,
    /// Killed by their own sacrifice penalty
    SacrificeBacklash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: Side,
    pub loser: Side,
    pub cause: DeathCause,
}

/// How a hit was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitSource {
    Melee,
    Bullet,
    Sacrifice,
    SacrificeBullet,
}

impl HitSource {
    pub fn is_sacrifice(&self) -> bool {
        matches!(self, HitSource::Sacrifice | HitSource::SacrificeBullet)
    }
}

/// What a blood gambit paid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GambitReward {
    Buff(Buff),
    Weapon(WeaponKind),
}

/// Something that happened during a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Countdown number shown (3, 2, 1)
    Countdown { remaining: u32 },
    /// "FIGHT!" banner, one tick before the fighters are released
    Fight,
    /// Countdown over: fighters unfrozen, round clock running
    ClockStarted,
    /// Round clock ticked
    ClockTick { remaining: u32 },
    AttackStarted { side: Side },
    ShotFired { side: Side, sacrifice: bool },
    Hit {
        attacker: Side,
        target: Side,
        damage: i32,
        source: HitSource,
    },
    Dashed { side: Side, from_x: f32, to_x: f32 },
    SacrificeStarted { side: Side },
    SacrificeMissed { side: Side, penalty: i32 },
    GambitActivated {
        side: Side,
        cost: i32,
        reward: GambitReward,
    },
    BuffExpired { side: Side, buff: Buff },
    PassiveTriggered { side: Side, passive: Passive },
    Healed { side: Side, amount: i32 },
    WeaponSpawned { kind: WeaponKind, pos: Vec2 },
    WeaponExpired { kind: WeaponKind },
    WeaponPickedUp { side: Side, kind: WeaponKind },
    OvertimeStarted,
    OvertimeDrain { health: [i32; 2] },
    SuddenDeath,
    SuddenDeathFight,
    RoundOver(Outcome),
}

/// Events and sound requests produced by one `update`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameEvents {
    pub events: Vec<GameEvent>,
    pub audio: Vec<AudioCommand>,
}

impl FrameEvents {
    /// Record an event and the sounds it implies
    pub fn push(&mut self, event: GameEvent) {
        self.audio.extend(audio::commands_for(&event));
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The round result, if it was decided this frame
    pub fn outcome(&self) -> Option<Outcome> {
        self.events.iter().find_map(|e| match e {
            GameEvent::RoundOver(outcome) => Some(*outcome),
            _ => None,
        })
    }

    /// Events and audio requests for a JS host
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Replay the sound requests into an audio backend
    pub fn forward_audio(&self, sink: &mut impl audio::AudioSink) {
        for command in &self.audio {
            command.apply(sink);
        }
    }
}

/// A bullet in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub shooter: Side,
    /// Center point
    pub pos: Vec2,
    /// Horizontal speed (px/s, signed)
    pub vel_x: f32,
    pub lifespan_ms: f32,
    pub sacrifice: bool,
    /// Set once the bullet has been settled (hit or miss)
    pub resolved: bool,
}

/// The weapon lying on the field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldWeapon {
    pub kind: WeaponKind,
    pub pos: Vec2,
    pub lifespan_ms: f32,
}

/// Delayed match-level effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTimer {
    /// Countdown step `n` of `countdown_ticks`; step 0 fires on the first frame
    Countdown { step: u32 },
    /// One second of round clock
    Clock,
    /// One overtime drain pulse
    Drain,
    /// Sudden-death banner finished, fighting resumes
    SuddenDeathStart,
}

/// Read-only view for HUDs and tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub phase: MatchPhase,
    pub health: [i32; 2],
    pub max_health: [i32; 2],
    /// Seconds left on the round clock
    pub timer: u32,
    pub winner: Option<Side>,
    pub elapsed_ms: f64,
}

/// The bracket match a round is played for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// 1-based bracket round
    pub bracket_round: u32,
    pub match_index: usize,
    /// Player ids on sides A and B
    pub players: [u32; 2],
}

/// One round between two fighters
#[derive(Debug, Clone)]
pub struct Round {
    pub tuning: Tuning,
    pub arena: ArenaGeometry,
    pub fighters: [Fighter; 2],
    pub phase: MatchPhase,
    /// Seconds left on the round clock
    pub timer: u32,
    /// Total simulated time (ms)
    pub elapsed_ms: f64,
    /// Fighting paused (countdown, sudden-death banner)
    pub frozen: bool,
    pub clock: TimerWheel<MatchTimer>,
    pub projectiles: Vec<Projectile>,
    pub field_weapon: Option<FieldWeapon>,
    /// Combat time since the last spawn attempt (ms)
    pub spawn_elapsed_ms: f32,
    pub outcome: Option<Outcome>,
    pub seed: u64,
    pub rng: Pcg32,
    /// Set when the round was started from a tournament ledger
    pub fixture: Option<Fixture>,
    next_id: u32,
}

impl Round {
    /// Set up a round: fighters at their spawn points, countdown queued
    pub fn start(
        a: &FighterConfig,
        b: &FighterConfig,
        variant: ArenaVariant,
        tuning: Tuning,
        seed: u64,
    ) -> Self {
        let arena = ArenaGeometry::for_variant(variant);
        let fighters = [
            Fighter::new(Side::A, a, arena.spawn_points[0], &tuning),
            Fighter::new(Side::B, b, arena.spawn_points[1], &tuning),
        ];
        let mut clock = TimerWheel::new();
        for step in 0..=tuning.countdown_ticks {
            clock.schedule_at(step as f64 * tuning.tick_ms as f64, MatchTimer::Countdown { step });
        }
        log::info!(
            "Round start: {} ({:?}) vs {} ({:?}) in {}, seed {}",
            a.name,
            a.path,
            b.name,
            b.path,
            variant.as_str(),
            seed
        );
        Self {
            timer: tuning.round_seconds,
            tuning,
            arena,
            fighters,
            phase: MatchPhase::Countdown,
            elapsed_ms: 0.0,
            frozen: true,
            clock,
            projectiles: Vec::new(),
            field_weapon: None,
            spawn_elapsed_ms: 0.0,
            outcome: None,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            fixture: None,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn fighter(&self, side: Side) -> &Fighter {
        &self.fighters[side.index()]
    }

    pub fn fighter_mut(&mut self, side: Side) -> &mut Fighter {
        &mut self.fighters[side.index()]
    }

    /// Mutable access to a fighter and a shared view of its opponent
    pub fn pair_mut(&mut self, side: Side) -> (&mut Fighter, &Fighter) {
        let [a, b] = &mut self.fighters;
        match side {
            Side::A => (a, b),
            Side::B => (b, a),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.phase == MatchPhase::Resolved
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.phase,
            health: [self.fighters[0].health, self.fighters[1].health],
            max_health: [
                self.fighters[0].stats.max_health,
                self.fighters[1].stats.max_health,
            ],
            timer: self.timer,
            winner: self.outcome.map(|o| o.winner),
            elapsed_ms: self.elapsed_ms,
        }
    }

    /// End the round. Only the first call has any effect.
    ///
    /// Cancels every pending timer and clears field objects so nothing can
    /// mutate the round afterwards.
    pub fn resolve(&mut self, winner: Side, cause: DeathCause, events: &mut FrameEvents) -> bool {
        if self.is_resolved() {
            return false;
        }
        let outcome = Outcome {
            winner,
            loser: winner.other(),
            cause,
        };
        self.phase = MatchPhase::Resolved;
        self.outcome = Some(outcome);
        self.frozen = true;
        self.clock.cancel_all();
        for fighter in &mut self.fighters {
            fighter.timers.cancel_all();
            fighter.is_attacking = false;
            fighter.sacrifice_attacking = false;
        }
        self.projectiles.clear();
        self.field_weapon = None;
        log::info!(
            "Round over: {} beats {} ({:?})",
            self.fighter(winner).name,
            self.fighter(winner.other()).name,
            cause
        );
        events.push(GameEvent::RoundOver(outcome));
        true
    }
}
