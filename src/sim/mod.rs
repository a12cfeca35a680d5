//! Deterministic combat simulation
//!
//! All gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Time only advances through `Round::update`
//! - Seeded RNG only
//! - Fighter A is always resolved before fighter B
//! - No rendering, audio or platform dependencies

pub mod arena;
pub mod combat;
pub mod fighter;
pub mod geom;
pub mod input;
pub mod physics;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timers;

pub use arena::{ArenaGeometry, ArenaVariant, Ground, Hazard, HazardKind};
pub use fighter::{Buff, Fighter, FighterConfig, Passive, Side, StatPath, WeaponKind};
pub use geom::Rect;
pub use input::{Button, Buttons, FighterKeys, KeyBindings, KeyTracker, TickInput};
pub use state::{
    DeathCause, Fixture, FrameEvents, GameEvent, MatchPhase, Outcome, Round, RoundSnapshot,
};
pub use tick::tick;
pub use timers::TimerWheel;
