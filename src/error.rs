//! Error types for the session layer
//!
//! The simulation itself never fails: everything it cannot resolve is
//! skipped for a frame. Only round setup and config loading report errors.

use thiserror::Error;

/// Problems starting or recording a round
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The ledger has no match at the current bracket position
    #[error("no match available at round {round}, match {index}")]
    NoMatchAvailable { round: u32, index: usize },
    /// The current match is missing one of its two players
    #[error("match slot is empty")]
    EmptySlot,
    /// A match references a player id the ledger does not know
    #[error("unknown player id {0}")]
    UnknownPlayer(u32),
    /// A result names a player who is not in the current match
    #[error("player {0} is not in the current match")]
    NotInMatch(u32),
    /// `finish_round` was called before the round produced a winner
    #[error("round has not been resolved yet")]
    RoundNotResolved,
    /// The round was not started from this session's ledger
    #[error("round is not bound to a bracket match")]
    UnboundRound,
    /// The round's match already has a recorded winner
    #[error("round {round}, match {index} is already recorded")]
    AlreadyRecorded { round: u32, index: usize },
    /// The ledger has moved to another match or pairing since the round started
    #[error("round {round}, match {index} is no longer the current match")]
    FixtureMismatch { round: u32, index: usize },
}

/// Problems reading or writing tuning, ledger and frame JSON
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
