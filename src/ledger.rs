//! Tournament ledger
//!
//! Players, their chosen builds and the bracket, shared by every round of a
//! session. The JSON layout is the one the bracket and menu screens read.
//! Advancing winners into the next bracket round is up to those screens.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SessionError};
use crate::sim::fighter::{FighterConfig, StatPath};

/// Smallest and largest supported tournaments
pub const MIN_PLAYERS: u32 = 2;
pub const MAX_PLAYERS: u32 = 16;

/// One entrant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: u32,
    pub name: String,
    pub stat_choice: StatPath,
    pub eliminated: bool,
}

impl PlayerRecord {
    /// Round setup for this player
    pub fn fighter_config(&self) -> FighterConfig {
        FighterConfig::new(self.name.clone(), self.stat_choice)
    }
}

/// One pairing; an empty slot is a bye
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub player1: Option<u32>,
    pub player2: Option<u32>,
    pub winner: Option<u32>,
    pub completed: bool,
}

impl MatchRecord {
    pub fn has_player(&self, id: u32) -> bool {
        self.player1 == Some(id) || self.player2 == Some(id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketRound {
    pub matches: Vec<MatchRecord>,
}

/// Whole-tournament bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub player_count: u32,
    pub players: Vec<PlayerRecord>,
    pub bracket: Vec<BracketRound>,
    /// 1-based bracket round
    pub current_round: u32,
    /// Index into the current round's matches
    pub current_match: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(MIN_PLAYERS)
    }
}

impl Ledger {
    /// Fresh tournament with `count` players, all on the default build
    pub fn new(count: u32) -> Self {
        let count = count.clamp(MIN_PLAYERS, MAX_PLAYERS);
        let players = (1..=count)
            .map(|id| PlayerRecord {
                id,
                name: format!("Player {}", id),
                stat_choice: StatPath::default(),
                eliminated: false,
            })
            .collect();
        Self {
            player_count: count,
            players,
            bracket: Vec::new(),
            current_round: 1,
            current_match: 0,
        }
    }

    /// Pair consecutive players into the first bracket round.
    ///
    /// An odd player out gets a bye, recorded as an already completed match.
    pub fn seed_first_round(&mut self) {
        let matches = self
            .players
            .chunks(2)
            .filter_map(|pair| {
                let first = pair.first()?.id;
                Some(match pair.get(1) {
                    Some(second) => MatchRecord {
                        player1: Some(first),
                        player2: Some(second.id),
                        winner: None,
                        completed: false,
                    },
                    None => MatchRecord {
                        player1: Some(first),
                        player2: None,
                        winner: Some(first),
                        completed: true,
                    },
                })
            })
            .collect();
        self.bracket = vec![BracketRound { matches }];
        self.current_round = 1;
        self.current_match = self.next_open_match().unwrap_or(0);
        log::info!("Bracket seeded for {} players", self.player_count);
    }

    pub fn player(&self, id: u32) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: u32) -> Option<&mut PlayerRecord> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Change a player's build before their round
    pub fn set_stat_choice(&mut self, id: u32, choice: StatPath) -> Result<(), SessionError> {
        let player = self.player_mut(id).ok_or(SessionError::UnknownPlayer(id))?;
        player.stat_choice = choice;
        Ok(())
    }

    fn round_index(&self) -> Option<usize> {
        (self.current_round as usize).checked_sub(1)
    }

    fn no_match(&self) -> SessionError {
        SessionError::NoMatchAvailable {
            round: self.current_round,
            index: self.current_match,
        }
    }

    /// The match at the current bracket position
    pub fn current_match(&self) -> Result<&MatchRecord, SessionError> {
        self.round_index()
            .and_then(|r| self.bracket.get(r))
            .and_then(|round| round.matches.get(self.current_match))
            .ok_or_else(|| self.no_match())
    }

    /// Both players of the current match, ready to fight
    pub fn current_pair(&self) -> Result<(&PlayerRecord, &PlayerRecord), SessionError> {
        let m = self.current_match()?;
        if m.completed {
            return Err(self.no_match());
        }
        let (Some(id1), Some(id2)) = (m.player1, m.player2) else {
            return Err(SessionError::EmptySlot);
        };
        let p1 = self.player(id1).ok_or(SessionError::UnknownPlayer(id1))?;
        let p2 = self.player(id2).ok_or(SessionError::UnknownPlayer(id2))?;
        Ok((p1, p2))
    }

    /// The match at a given bracket position
    pub fn match_at(&self, bracket_round: u32, index: usize) -> Option<&MatchRecord> {
        let r = (bracket_round as usize).checked_sub(1)?;
        self.bracket.get(r)?.matches.get(index)
    }

    fn next_open_match(&self) -> Option<usize> {
        let round = self.bracket.get(self.round_index()?)?;
        round.matches.iter().position(|m| !m.completed)
    }

    /// Write back a finished match and move to the next open one
    pub fn record_result(&mut self, winner: u32, loser: u32) -> Result<(), SessionError> {
        let m = self.current_match()?;
        for id in [winner, loser] {
            if !m.has_player(id) {
                return Err(SessionError::NotInMatch(id));
            }
        }
        let (r, i) = (self.round_index().unwrap_or(0), self.current_match);
        let m = &mut self.bracket[r].matches[i];
        m.winner = Some(winner);
        m.completed = true;
        if let Some(p) = self.player_mut(loser) {
            p.eliminated = true;
        }
        self.current_match = self.next_open_match().unwrap_or(0);
        log::info!(
            "Recorded match {} of round {}: player {} beats player {}",
            i + 1,
            self.current_round,
            winner,
            loser
        );
        Ok(())
    }

    /// Last round of the bracket with a single match left
    pub fn is_final_match(&self) -> bool {
        self.current_round as usize == self.bracket.len()
            && self
                .bracket
                .last()
                .is_some_and(|round| round.matches.len() == 1)
    }

    /// Players still in the tournament
    pub fn remaining(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.players.iter().filter(|p| !p.eliminated)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}
