//! Per-frame simulation tick
//!
//! One call advances a round by a variable frame delta. Phases run in a fixed
//! order and fighter A always resolves before fighter B:
//!
//! 1. round clock advance
//! 2. cooldown decay
//! 3. scheduled effects (match clock, then A's timers, then B's)
//! 4. weapon spawner
//! 5. projectiles
//! 6. low-health passives
//! 7. buff timers
//! 8. input
//! 9. physics, hazards and the death boundary
//! 10. melee hit checks (hitboxes follow the body they were derived from)
//! 11. pickups
//!
//! Steps 4 onwards only run while fighting is allowed. Once the round is
//! resolved every later step is skipped, and later calls do nothing.

use super::combat;
use super::fighter::{FighterTimer, Side};
use super::input::{self, TickInput};
use super::physics;
use super::spawner;
use super::state::{DeathCause, FrameEvents, GameEvent, MatchPhase, MatchTimer, Round};
use crate::decay_ms;

impl Round {
    /// Advance the round by `dt_ms`
    pub fn update(&mut self, dt_ms: f32, input: &TickInput) -> FrameEvents {
        tick(self, input, dt_ms)
    }
}

/// Advance the round by one frame
pub fn tick(round: &mut Round, input: &TickInput, dt_ms: f32) -> FrameEvents {
    let mut events = FrameEvents::default();
    if round.is_resolved() {
        return events;
    }
    if !dt_ms.is_finite() || dt_ms <= 0.0 {
        log::debug!("Ignoring frame with delta {}", dt_ms);
        return events;
    }

    round.elapsed_ms += dt_ms as f64;

    for fighter in &mut round.fighters {
        decay_ms(&mut fighter.attack_cooldown_ms, dt_ms);
        decay_ms(&mut fighter.dash_cooldown_ms, dt_ms);
        decay_ms(&mut fighter.knockback_lock_ms, dt_ms);
    }

    run_match_timers(round, &mut events);
    for side in Side::BOTH {
        if round.is_resolved() {
            return events;
        }
        run_fighter_timers(round, side, &mut events);
    }

    if round.is_resolved() || round.frozen || !round.phase.is_combat() {
        return events;
    }

    spawner::update(round, dt_ms, &mut events);
    combat::update_projectiles(round, dt_ms, &mut events);
    if round.is_resolved() {
        return events;
    }
    combat::update_passives(round, &mut events);
    combat::update_buffs(round, dt_ms, &mut events);

    for side in Side::BOTH {
        input::resolve(round, side, input.for_side(side), dt_ms, &mut events);
        if round.is_resolved() {
            return events;
        }
    }

    for side in Side::BOTH {
        let Round {
            fighters,
            arena,
            tuning,
            ..
        } = round;
        let fighter = &mut fighters[side.index()];
        physics::integrate(fighter, arena, tuning, dt_ms);
        if let Some(cause) = physics::elimination(fighter, arena, tuning) {
            round.resolve(side.other(), cause, &mut events);
            return events;
        }
    }

    for side in Side::BOTH {
        combat::resolve_melee(round, side, &mut events);
        if round.is_resolved() {
            return events;
        }
    }

    combat::check_pickups(round, &mut events);
    events
}

/// Countdown, round clock, overtime drain and the sudden-death banner
fn run_match_timers(round: &mut Round, events: &mut FrameEvents) {
    let now = round.elapsed_ms;
    let tick_ms = round.tuning.tick_ms as f64;
    while let Some((deadline, timer)) = round.clock.pop_due(now) {
        match timer {
            MatchTimer::Countdown { step } => {
                let total = round.tuning.countdown_ticks;
                if step + 1 < total {
                    events.push(GameEvent::Countdown {
                        remaining: total - 1 - step,
                    });
                } else if step + 1 == total {
                    log::info!("Fight!");
                    events.push(GameEvent::Fight);
                } else {
                    round.phase = MatchPhase::Active;
                    round.frozen = false;
                    round.clock.schedule_at(deadline + tick_ms, MatchTimer::Clock);
                    events.push(GameEvent::ClockStarted);
                }
            }
            MatchTimer::Clock => {
                if round.phase != MatchPhase::Active {
                    continue;
                }
                round.timer = round.timer.saturating_sub(1);
                events.push(GameEvent::ClockTick {
                    remaining: round.timer,
                });
                if round.timer == 0 {
                    time_up(round, deadline, events);
                } else {
                    round.clock.schedule_at(deadline + tick_ms, MatchTimer::Clock);
                }
            }
            MatchTimer::Drain => {
                if round.phase == MatchPhase::Overtime {
                    drain(round, deadline, events);
                }
            }
            MatchTimer::SuddenDeathStart => {
                round.frozen = false;
                events.push(GameEvent::SuddenDeathFight);
            }
        }
        if round.is_resolved() {
            return;
        }
    }
}

/// Clock hit zero: higher health wins, a tie goes to overtime
fn time_up(round: &mut Round, deadline: f64, events: &mut FrameEvents) {
    let [a, b] = [round.fighters[0].health, round.fighters[1].health];
    if a > b {
        round.resolve(Side::A, DeathCause::Timeout, events);
    } else if b > a {
        round.resolve(Side::B, DeathCause::Timeout, events);
    } else {
        round.phase = MatchPhase::Overtime;
        round
            .clock
            .schedule_at(deadline + round.tuning.tick_ms as f64, MatchTimer::Drain);
        log::info!("Time up at {} HP each, overtime", a);
        events.push(GameEvent::OvertimeStarted);
    }
}

/// One overtime second: both fighters lose the same amount at once
fn drain(round: &mut Round, deadline: f64, events: &mut FrameEvents) {
    let amount = round.tuning.overtime_drain;
    for fighter in &mut round.fighters {
        fighter.health = (fighter.health - amount).max(0);
    }
    let health = [round.fighters[0].health, round.fighters[1].health];
    events.push(GameEvent::OvertimeDrain { health });

    match (health[0] <= 0, health[1] <= 0) {
        (true, true) => {
            for fighter in &mut round.fighters {
                fighter.health = 1;
            }
            round.phase = MatchPhase::SuddenDeath;
            round.frozen = true;
            round.clock.schedule_at(
                deadline + round.tuning.sudden_death_intro_ms as f64,
                MatchTimer::SuddenDeathStart,
            );
            log::info!("Both drained out, sudden death");
            events.push(GameEvent::SuddenDeath);
        }
        (true, false) => {
            round.resolve(Side::B, DeathCause::OvertimeDrain, events);
        }
        (false, true) => {
            round.resolve(Side::A, DeathCause::OvertimeDrain, events);
        }
        (false, false) => {
            round
                .clock
                .schedule_at(deadline + round.tuning.tick_ms as f64, MatchTimer::Drain);
        }
    }
}

/// Delayed per-fighter effects due this frame
fn run_fighter_timers(round: &mut Round, side: Side, events: &mut FrameEvents) {
    let now = round.elapsed_ms;
    while let Some((deadline, timer)) = round.fighter_mut(side).timers.pop_due(now) {
        let fighter = round.fighter_mut(side);
        match timer {
            FighterTimer::EndAttack => fighter.is_attacking = false,
            FighterTimer::EndSacrifice { attempt } => {
                if fighter.sacrifice_attacking && fighter.sacrifice_attempt == attempt {
                    combat::sacrifice_missed(round, side, events);
                }
            }
            FighterTimer::EndDash => {
                if let Some(dash) = fighter.dash.take() {
                    fighter.body.pos.x = dash.to_x;
                    fighter.body.vel.x = 0.0;
                }
            }
            FighterTimer::Regen => combat::regen_pulse(round, side, deadline, events),
        }
        if round.is_resolved() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena::{ArenaVariant, HazardKind};
    use crate::sim::fighter::{ActiveBuff, Buff, FighterConfig, StatPath, WeaponKind};
    use crate::sim::input::{Button, FighterKeys};
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    const FRAME: f32 = 1000.0 / 60.0;

    fn new_round(a: StatPath, b: StatPath, variant: ArenaVariant) -> Round {
        Round::start(
            &FighterConfig::new("Red", a),
            &FighterConfig::new("Blue", b),
            variant,
            Tuning::default(),
            2024,
        )
    }

    /// A round where no field weapon ever shows up (potions would skew health)
    fn quiet_round() -> Round {
        let tuning = Tuning {
            spawn_interval_ms: 1.0e9,
            ..Tuning::default()
        };
        Round::start(
            &FighterConfig::new("Red", StatPath::Fury),
            &FighterConfig::new("Blue", StatPath::Fury),
            ArenaVariant::Colosseum,
            tuning,
            2024,
        )
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    fn a_presses(button: Button) -> TickInput {
        TickInput {
            a: FighterKeys::tap(button),
            ..Default::default()
        }
    }

    fn fight(round: &mut Round) {
        round.update(4000.0, &idle());
        assert_eq!(round.phase, MatchPhase::Active);
    }

    /// Park B right in front of A, standing still
    fn line_up(round: &mut Round) {
        let a = round.fighter(Side::A).body.pos;
        let b = round.fighter_mut(Side::B);
        b.body.pos = a + Vec2::new(45.0, 0.0);
        b.body.vel = Vec2::ZERO;
        b.knockback_lock_ms = 0.0;
        round.fighter_mut(Side::A).attack_cooldown_ms = 0.0;
    }

    #[test]
    fn test_countdown_sequence() {
        let mut round = new_round(StatPath::Fury, StatPath::Fury, ArenaVariant::Colosseum);
        // "3" shows on the very first frame
        assert_eq!(
            round.update(1.0, &idle()).events,
            vec![GameEvent::Countdown { remaining: 3 }]
        );
        assert_eq!(
            round.update(999.0, &idle()).events,
            vec![GameEvent::Countdown { remaining: 2 }]
        );
        assert_eq!(
            round.update(1000.0, &idle()).events,
            vec![GameEvent::Countdown { remaining: 1 }]
        );
        assert_eq!(round.update(1000.0, &idle()).events, vec![GameEvent::Fight]);
        // Banner is up but fighters are still held
        assert!(round.frozen);
        assert_eq!(round.phase, MatchPhase::Countdown);

        assert_eq!(
            round.update(1000.0, &idle()).events,
            vec![GameEvent::ClockStarted]
        );
        assert!(!round.frozen);
        assert_eq!(round.phase, MatchPhase::Active);
        assert_eq!(round.timer, 30);
    }

    #[test]
    fn test_frozen_during_countdown() {
        let mut round = new_round(StatPath::Fury, StatPath::Fury, ArenaVariant::Colosseum);
        let start = round.fighter(Side::A).body.pos;
        let input = TickInput {
            a: FighterKeys::hold(Button::Left),
            ..Default::default()
        };
        for _ in 0..60 {
            round.update(FRAME, &input);
        }
        assert_eq!(round.fighter(Side::A).body.pos, start);
        assert_eq!(round.phase, MatchPhase::Countdown);
    }

    #[test]
    fn test_four_punches_end_the_round() {
        let mut round = new_round(StatPath::Fury, StatPath::Fury, ArenaVariant::Colosseum);
        fight(&mut round);
        let mut health = Vec::new();
        let mut overs = 0;
        for _ in 0..4 {
            line_up(&mut round);
            let events = round.update(FRAME, &a_presses(Button::Attack));
            overs += events
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::RoundOver(_)))
                .count();
            health.push(round.fighter(Side::B).health);
        }
        assert_eq!(health, vec![55, 30, 5, 0]);
        assert_eq!(overs, 1);
        let outcome = round.outcome.unwrap();
        assert_eq!(outcome.winner, Side::A);
        assert_eq!(outcome.cause, DeathCause::Knockout);
    }

    #[test]
    fn test_sword_berserker_hit_end_to_end() {
        let mut round = new_round(StatPath::Fury, StatPath::Endurance, ArenaVariant::Colosseum);
        fight(&mut round);
        {
            let a = round.fighter_mut(Side::A);
            a.weapon = Some(WeaponKind::Sword);
            a.buff = Some(ActiveBuff {
                kind: Buff::Berserker,
                remaining_ms: 8000.0,
                speed_bonus: 0.0,
            });
        }
        line_up(&mut round);
        let events = round.update(FRAME, &a_presses(Button::Attack));
        assert!(events.events.iter().any(|e| matches!(
            e,
            GameEvent::Hit { damage: 75, attacker: Side::A, .. }
        )));
        assert_eq!(round.fighter(Side::B).health, 120 - 75);
    }

    #[test]
    fn test_hazard_ends_round_regardless_of_health() {
        let mut round = new_round(StatPath::Fury, StatPath::Fury, ArenaVariant::SpikePit);
        fight(&mut round);
        round.fighter_mut(Side::B).health = 1;
        let left = round.arena.left;
        round.fighter_mut(Side::A).body.pos.x = left;
        let events = round.update(FRAME, &idle());
        let outcome = events.outcome().expect("round should end");
        assert_eq!(outcome.winner, Side::B);
        assert_eq!(outcome.cause, DeathCause::Hazard(HazardKind::Spikes));
    }

    #[test]
    fn test_void_fall_ends_round() {
        let mut round = new_round(StatPath::Fury, StatPath::Fury, ArenaVariant::Abyss);
        fight(&mut round);
        {
            let b = round.fighter_mut(Side::B);
            b.body.pos = Vec2::new(450.0, 300.0);
            b.body.grounded = false;
        }
        let mut outcome = None;
        for _ in 0..240 {
            outcome = round.update(FRAME, &idle()).outcome().or(outcome);
        }
        let outcome = outcome.expect("falling fighter should be eliminated");
        assert_eq!(outcome.winner, Side::A);
        assert_eq!(outcome.cause, DeathCause::Hazard(HazardKind::Void));
    }

    #[test]
    fn test_lava_ends_round() {
        let mut round = new_round(StatPath::Fury, StatPath::Endurance, ArenaVariant::LavaLake);
        fight(&mut round);
        {
            // Gap between the left and middle platforms
            let b = round.fighter_mut(Side::B);
            b.body.pos = Vec2::new(455.0, 300.0);
            b.body.grounded = false;
        }
        let mut outcome = None;
        for _ in 0..240 {
            outcome = round.update(FRAME, &idle()).outcome().or(outcome);
        }
        let outcome = outcome.expect("fighter in the lava should be eliminated");
        assert_eq!(outcome.winner, Side::A);
        assert_eq!(outcome.cause, DeathCause::Hazard(HazardKind::Lava));
        // Full health doesn't matter
        assert_eq!(round.fighter(Side::B).health, 120);
    }

    #[test]
    fn test_bad_body_skips_the_frame() {
        let mut round = quiet_round();
        fight(&mut round);
        line_up(&mut round);
        let good = round.fighter(Side::B).body.pos;
        round.fighter_mut(Side::B).body.pos.x = f32::NAN;

        let events = round.update(FRAME, &a_presses(Button::Attack));
        assert!(!events.events.iter().any(|e| matches!(e, GameEvent::Hit { .. })));
        assert!(!round.is_resolved());
        assert_eq!(round.fighter(Side::B).health, 80);

        // Geometry is back: the still-open swing lands on the next frame
        round.fighter_mut(Side::B).body.pos = good;
        let events = round.update(FRAME, &idle());
        assert!(events.events.iter().any(|e| matches!(e, GameEvent::Hit { .. })));
        assert_eq!(round.fighter(Side::B).health, 55);
    }

    #[test]
    fn test_drop_through_at_long_frames() {
        let mut round = quiet_round();
        fight(&mut round);
        let p = round.arena.platforms[2];
        {
            let a = round.fighter_mut(Side::A);
            a.body.pos = Vec2::new(p.center().x - a.body.size.x / 2.0, p.top() - a.body.size.y);
            a.body.vel = Vec2::ZERO;
            a.body.grounded = true;
        }
        round.update(100.0, &a_presses(Button::Down));
        for _ in 0..20 {
            round.update(100.0, &idle());
        }
        let a = round.fighter(Side::A);
        assert!(a.body.grounded);
        assert_eq!(a.body.bottom(), round.arena.ground_level().unwrap());
    }

    #[test]
    fn test_timeout_higher_health_wins() {
        let mut round = quiet_round();
        fight(&mut round);
        round.fighter_mut(Side::A).health = 40;
        for _ in 0..30 {
            round.update(1000.0, &idle());
        }
        let outcome = round.outcome.expect("clock should decide");
        assert_eq!(outcome.winner, Side::B);
        assert_eq!(outcome.cause, DeathCause::Timeout);
    }

    #[test]
    fn test_tie_at_timeout_goes_to_overtime() {
        let mut round = quiet_round();
        fight(&mut round);
        let mut saw_overtime = false;
        for _ in 0..30 {
            let events = round.update(1000.0, &idle());
            saw_overtime |= events.events.contains(&GameEvent::OvertimeStarted);
        }
        assert!(saw_overtime);
        assert_eq!(round.phase, MatchPhase::Overtime);
        assert_eq!(round.timer, 0);
        assert!(round.outcome.is_none());
    }

    #[test]
    fn test_overtime_single_zero_loses() {
        let mut round = quiet_round();
        round.update(34_000.0, &idle());
        assert_eq!(round.phase, MatchPhase::Overtime);
        round.fighter_mut(Side::A).health = 3;
        round.fighter_mut(Side::B).health = 10;
        round.update(1000.0, &idle());
        let outcome = round.outcome.expect("drain should decide");
        assert_eq!(outcome.winner, Side::B);
        assert_eq!(outcome.cause, DeathCause::OvertimeDrain);
    }

    #[test]
    fn test_simultaneous_zero_goes_to_sudden_death() {
        let mut round = quiet_round();
        round.update(34_000.0, &idle());
        round.fighter_mut(Side::A).health = 5;
        round.fighter_mut(Side::B).health = 5;
        let events = round.update(1000.0, &idle());
        assert!(events.events.contains(&GameEvent::SuddenDeath));
        assert_eq!(round.phase, MatchPhase::SuddenDeath);
        assert_eq!(round.snapshot().health, [1, 1]);
        assert!(round.frozen);

        // Banner, then fighting resumes
        round.update(1999.0, &idle());
        assert!(round.frozen);
        let events = round.update(1.0, &idle());
        assert!(events.events.contains(&GameEvent::SuddenDeathFight));
        assert!(!round.frozen);

        // No more drain in sudden death
        round.update(3000.0, &idle());
        assert_eq!(round.snapshot().health, [1, 1]);

        line_up(&mut round);
        let events = round.update(FRAME, &a_presses(Button::Attack));
        let outcome = events.outcome().expect("next hit wins");
        assert_eq!(outcome.winner, Side::A);
    }

    #[test]
    fn test_resolved_round_is_inert() {
        let mut round = new_round(StatPath::Fury, StatPath::Fury, ArenaVariant::Colosseum);
        fight(&mut round);
        let mut scratch = FrameEvents::default();
        round.resolve(Side::B, DeathCause::Knockout, &mut scratch);
        let before = round.snapshot();
        let pos = round.fighter(Side::A).body.pos;
        for _ in 0..10 {
            let events = round.update(FRAME, &a_presses(Button::Left));
            assert!(events.is_empty());
        }
        assert_eq!(round.snapshot(), before);
        assert_eq!(round.fighter(Side::A).body.pos, pos);
    }

    #[test]
    fn test_sacrifice_whiff_costs_thirty_after_window() {
        let mut round = new_round(StatPath::Fury, StatPath::Fury, ArenaVariant::Colosseum);
        fight(&mut round);
        round.update(FRAME, &a_presses(Button::Sacrifice));
        assert!(round.fighter(Side::A).sacrifice_attacking);
        for _ in 0..20 {
            round.update(FRAME, &idle());
        }
        let a = round.fighter(Side::A);
        assert!(!a.sacrifice_attacking);
        assert_eq!(a.health, 50);
    }

    #[test]
    fn test_dash_end_settles_position() {
        let mut round = new_round(StatPath::Fury, StatPath::Fury, ArenaVariant::Colosseum);
        fight(&mut round);
        let start = round.fighter(Side::A).body.pos.x;
        round.update(FRAME, &a_presses(Button::Right));
        round.update(FRAME, &a_presses(Button::Right));
        assert!(round.fighter(Side::A).is_dashing());
        for _ in 0..12 {
            round.update(FRAME, &idle());
        }
        let a = round.fighter(Side::A);
        assert!(!a.is_dashing());
        assert_eq!(a.body.vel.x, 0.0);
        // Walked one frame, then dashed the full distance
        assert!(a.body.pos.x >= start + 240.0);
    }

    #[test]
    fn test_same_seed_same_round() {
        let script = [
            a_presses(Button::Right),
            idle(),
            a_presses(Button::Attack),
            TickInput {
                b: FighterKeys::tap(Button::Up),
                ..Default::default()
            },
            a_presses(Button::Gambit),
        ];
        let mut one = new_round(StatPath::Fury, StatPath::Endurance, ArenaVariant::Colosseum);
        let mut two = new_round(StatPath::Fury, StatPath::Endurance, ArenaVariant::Colosseum);
        fight(&mut one);
        fight(&mut two);
        for frame in 0..600 {
            let input = script[frame % script.len()];
            let e1 = one.update(FRAME, &input);
            let e2 = two.update(FRAME, &input);
            assert_eq!(e1.events, e2.events);
        }
        assert_eq!(one.snapshot(), two.snapshot());
        assert_eq!(one.field_weapon, two.field_weapon);
    }

    #[test]
    fn test_bad_delta_ignored() {
        let mut round = new_round(StatPath::Fury, StatPath::Fury, ArenaVariant::Colosseum);
        assert!(round.update(f32::NAN, &idle()).is_empty());
        assert!(round.update(-5.0, &idle()).is_empty());
        assert_eq!(round.elapsed_ms, 0.0);
    }

    proptest! {
        #[test]
        fn prop_overtime_drain_ignores_frame_rate(frames in prop::collection::vec(1.0f32..120.0, 1..400)) {
            let mut round = quiet_round();
            round.update(34_000.0, &idle());
            prop_assert_eq!(round.phase, MatchPhase::Overtime);
            let overtime_start = round.elapsed_ms;
            for dt in frames {
                round.update(dt, &idle());
                // Stop before the final simultaneous drain
                if round.elapsed_ms - overtime_start >= 14_000.0 {
                    break;
                }
            }
            let seconds = ((round.elapsed_ms - overtime_start) / 1000.0).floor() as i32;
            let [a, b] = round.snapshot().health;
            prop_assert_eq!(a, b);
            prop_assert_eq!(a, 80 - 5 * seconds);
        }
    }
}
