//! Tournament session
//!
//! The explicit context threaded through a tournament: the ledger, the balance
//! table and the RNG that picks arenas and round seeds. Fighter A is always
//! the current match's first player.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::SessionError;
use crate::ledger::Ledger;
use crate::sim::arena::ArenaVariant;
use crate::sim::fighter::Side;
use crate::sim::state::{Fixture, Outcome, Round};
use crate::tuning::Tuning;

#[derive(Debug, Clone)]
pub struct Session {
    pub ledger: Ledger,
    pub tuning: Tuning,
    rng: Pcg32,
    rounds_played: u32,
}

impl Session {
    pub fn new(ledger: Ledger, tuning: Tuning, seed: u64) -> Self {
        Self {
            ledger,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            rounds_played: 0,
        }
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// Start the current match in a random arena
    pub fn start_round(&mut self) -> Result<Round, SessionError> {
        let variant = ArenaVariant::ALL[self.rng.random_range(0..ArenaVariant::ALL.len())];
        self.start_in(variant)
    }

    /// Start the current match in a named arena (unknown names fall back to the default)
    pub fn start_round_in(&mut self, arena: &str) -> Result<Round, SessionError> {
        self.start_in(ArenaVariant::resolve(arena))
    }

    fn start_in(&mut self, variant: ArenaVariant) -> Result<Round, SessionError> {
        let (p1, p2) = self.ledger.current_pair()?;
        let (a, b) = (p1.fighter_config(), p2.fighter_config());
        let fixture = Fixture {
            bracket_round: self.ledger.current_round,
            match_index: self.ledger.current_match,
            players: [p1.id, p2.id],
        };
        let seed: u64 = self.rng.random();
        let mut round = Round::start(&a, &b, variant, self.tuning.clone(), seed);
        round.fixture = Some(fixture);
        Ok(round)
    }

    /// Record a resolved round in the ledger.
    ///
    /// Only the match the round was started for can be written, and only once.
    pub fn finish_round(&mut self, round: &Round) -> Result<Outcome, SessionError> {
        let outcome = round.outcome.ok_or(SessionError::RoundNotResolved)?;
        let fixture = round.fixture.ok_or(SessionError::UnboundRound)?;
        let (r, i) = (fixture.bracket_round, fixture.match_index);
        let m = self
            .ledger
            .match_at(r, i)
            .ok_or(SessionError::NoMatchAvailable { round: r, index: i })?;
        if m.completed {
            return Err(SessionError::AlreadyRecorded { round: r, index: i });
        }
        let [p1, p2] = fixture.players;
        let current = self.ledger.current_round == r && self.ledger.current_match == i;
        if !current || m.player1 != Some(p1) || m.player2 != Some(p2) {
            return Err(SessionError::FixtureMismatch { round: r, index: i });
        }
        let (winner, loser) = match outcome.winner {
            Side::A => (p1, p2),
            Side::B => (p2, p1),
        };
        self.ledger.record_result(winner, loser)?;
        self.rounds_played += 1;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fighter::{FighterConfig, StatPath};
    use crate::sim::state::{DeathCause, FrameEvents};

    fn session(players: u32) -> Session {
        let mut ledger = Ledger::new(players);
        ledger.seed_first_round();
        Session::new(ledger, Tuning::default(), 77)
    }

    #[test]
    fn test_no_bracket_no_round() {
        let mut s = Session::new(Ledger::new(2), Tuning::default(), 1);
        assert!(matches!(
            s.start_round(),
            Err(SessionError::NoMatchAvailable { .. })
        ));
    }

    #[test]
    fn test_round_uses_ledger_builds() {
        let mut s = session(2);
        s.ledger.set_stat_choice(2, StatPath::Endurance).unwrap();
        let round = s.start_round_in("colosseum").unwrap();
        assert_eq!(round.fighter(Side::A).name, "Player 1");
        assert_eq!(round.fighter(Side::B).health, 120);
    }

    #[test]
    fn test_unknown_arena_falls_back() {
        let mut s = session(2);
        let round = s.start_round_in("volcano").unwrap();
        assert_eq!(round.arena.variant, ArenaVariant::Colosseum);
    }

    #[test]
    fn test_finish_records_winner() {
        let mut s = session(4);
        let mut round = s.start_round().unwrap();
        assert_eq!(s.finish_round(&round), Err(SessionError::RoundNotResolved));

        let mut events = FrameEvents::default();
        round.resolve(Side::B, DeathCause::Knockout, &mut events);
        let outcome = s.finish_round(&round).unwrap();
        assert_eq!(outcome.winner, Side::B);
        assert!(s.ledger.player(1).unwrap().eliminated);
        assert_eq!(s.ledger.bracket[0].matches[0].winner, Some(2));
        assert_eq!(s.rounds_played(), 1);

        // Next match is players 3 and 4
        let next = s.start_round().unwrap();
        assert_eq!(next.fighter(Side::A).name, "Player 3");
    }

    #[test]
    fn test_round_is_recorded_once() {
        let mut s = session(4);
        let mut round = s.start_round().unwrap();
        let mut events = FrameEvents::default();
        round.resolve(Side::A, DeathCause::Knockout, &mut events);
        s.finish_round(&round).unwrap();

        assert_eq!(
            s.finish_round(&round),
            Err(SessionError::AlreadyRecorded { round: 1, index: 0 })
        );
        // The second match is untouched
        let second = &s.ledger.bracket[0].matches[1];
        assert!(!second.completed);
        assert_eq!(second.winner, None);
        assert!(!s.ledger.player(3).unwrap().eliminated);
        assert!(!s.ledger.player(4).unwrap().eliminated);
        assert_eq!(s.ledger.current_match, 1);
        assert_eq!(s.rounds_played(), 1);
    }

    #[test]
    fn test_round_tagged_with_its_match() {
        let mut s = session(4);
        let round = s.start_round().unwrap();
        assert_eq!(
            round.fixture,
            Some(Fixture {
                bracket_round: 1,
                match_index: 0,
                players: [1, 2],
            })
        );
    }

    #[test]
    fn test_foreign_rounds_rejected() {
        let mut s = session(4);
        let mut events = FrameEvents::default();

        let mut loose = Round::start(
            &FighterConfig::new("Red", StatPath::Fury),
            &FighterConfig::new("Blue", StatPath::Fury),
            ArenaVariant::Colosseum,
            Tuning::default(),
            5,
        );
        loose.resolve(Side::A, DeathCause::Knockout, &mut events);
        assert_eq!(s.finish_round(&loose), Err(SessionError::UnboundRound));

        // Ledger moved on to another match while the round was running
        let mut round = s.start_round().unwrap();
        round.resolve(Side::B, DeathCause::Knockout, &mut events);
        s.ledger.current_match = 1;
        assert_eq!(
            s.finish_round(&round),
            Err(SessionError::FixtureMismatch { round: 1, index: 0 })
        );
        assert!(s.ledger.bracket[0].matches.iter().all(|m| !m.completed));
    }

    #[test]
    fn test_same_seed_same_arenas() {
        let mut one = session(2);
        let mut two = session(2);
        for _ in 0..8 {
            let a = one.start_round().unwrap();
            let b = two.start_round().unwrap();
            assert_eq!(a.arena.variant, b.arena.variant);
            assert_eq!(a.seed, b.seed);
        }
    }
}
