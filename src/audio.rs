//! Sound requests
//!
//! The combat core never synthesizes audio. It reports named cues and music
//! loops per frame, and whatever backend the host provides plays them
//! fire-and-forget.

use serde::{Deserialize, Serialize};

use crate::sim::state::GameEvent;

/// One-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cue {
    /// Countdown number
    Countdown,
    /// Round begins
    BattleStart,
    /// Melee swing
    SwordSwing,
    /// Any landed hit
    SwordHit,
    GunShot,
    Dash,
    Pickup,
    Potion,
    /// Passive ability kicked in
    Ability,
    Gambit,
    SuddenDeath,
    Victory,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Countdown => "countdown",
            Cue::BattleStart => "battleStart",
            Cue::SwordSwing => "swordSwing",
            Cue::SwordHit => "swordHit",
            Cue::GunShot => "gunShot",
            Cue::Dash => "dash",
            Cue::Pickup => "pickup",
            Cue::Potion => "potion",
            Cue::Ability => "ability",
            Cue::Gambit => "gambit",
            Cue::SuddenDeath => "suddenDeath",
            Cue::Victory => "victory",
        }
    }
}

/// Looping music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Loop {
    BattleMusic,
    VictoryMusic,
}

impl Loop {
    pub fn as_str(&self) -> &'static str {
        match self {
            Loop::BattleMusic => "battleMusic",
            Loop::VictoryMusic => "victoryMusic",
        }
    }
}

/// A request for the audio backend. Serialized under the sink method names
/// so a JS host can dispatch on the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCommand {
    #[serde(rename = "playCue")]
    Play(Cue),
    #[serde(rename = "playLoop")]
    StartLoop(Loop),
    #[serde(rename = "stopLoop")]
    StopLoop(Loop),
}

impl AudioCommand {
    pub fn apply(&self, sink: &mut impl AudioSink) {
        match *self {
            AudioCommand::Play(cue) => sink.play_cue(cue),
            AudioCommand::StartLoop(track) => sink.play_loop(track),
            AudioCommand::StopLoop(track) => sink.stop_loop(track),
        }
    }
}

/// Host audio backend
pub trait AudioSink {
    fn play_cue(&mut self, cue: Cue);
    fn play_loop(&mut self, track: Loop);
    fn stop_loop(&mut self, track: Loop);
}

/// Backend that drops everything (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_cue(&mut self, _cue: Cue) {}
    fn play_loop(&mut self, _track: Loop) {}
    fn stop_loop(&mut self, _track: Loop) {}
}

/// Backend that logs every request
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play_cue(&mut self, cue: Cue) {
        log::debug!("♪ {}", cue.as_str());
    }

    fn play_loop(&mut self, track: Loop) {
        log::debug!("♫ start {}", track.as_str());
    }

    fn stop_loop(&mut self, track: Loop) {
        log::debug!("♫ stop {}", track.as_str());
    }
}

/// Sounds implied by a game event
pub fn commands_for(event: &GameEvent) -> Vec<AudioCommand> {
    use AudioCommand::*;
    match event {
        GameEvent::Countdown { .. } => vec![Play(Cue::Countdown)],
        GameEvent::Fight => vec![Play(Cue::BattleStart), StartLoop(Loop::BattleMusic)],
        GameEvent::AttackStarted { .. } | GameEvent::SacrificeStarted { .. } => {
            vec![Play(Cue::SwordSwing)]
        }
        GameEvent::ShotFired { .. } => vec![Play(Cue::GunShot)],
        GameEvent::Hit { .. } => vec![Play(Cue::SwordHit)],
        GameEvent::Dashed { .. } => vec![Play(Cue::Dash)],
        GameEvent::WeaponPickedUp { kind, .. } => match kind {
            crate::sim::fighter::WeaponKind::Potion => vec![Play(Cue::Potion)],
            _ => vec![Play(Cue::Pickup)],
        },
        GameEvent::PassiveTriggered { .. } => vec![Play(Cue::Ability)],
        GameEvent::GambitActivated { .. } => vec![Play(Cue::Gambit)],
        GameEvent::SuddenDeath => vec![Play(Cue::SuddenDeath)],
        GameEvent::RoundOver(_) => vec![
            StopLoop(Loop::BattleMusic),
            Play(Cue::Victory),
            StartLoop(Loop::VictoryMusic),
        ],
        _ => Vec::new(),
    }
}
