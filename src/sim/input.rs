//! Input resolution
//!
//! Turns per-frame key state into fighter intent: walking, jumping,
//! fast-falling, dropping through platforms, double-tap dashes and the
//! attack/sacrifice/gambit triggers.

use serde::{Deserialize, Serialize};

use super::combat;
use super::fighter::{DashMotion, Direction, FighterTimer, Side, TapRecord};
use super::geom::Rect;
use super::state::{FrameEvents, GameEvent, Round};
use crate::consts::LOOKAHEAD_DT;
use crate::tuning::Tuning;

/// Logical buttons per fighter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Button {
    Up,
    Left,
    Down,
    Right,
    Attack,
    Sacrifice,
    Gambit,
}

/// A set of buttons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buttons {
    pub up: bool,
    pub left: bool,
    pub down: bool,
    pub right: bool,
    pub attack: bool,
    pub sacrifice: bool,
    pub gambit: bool,
}

impl Buttons {
    pub fn get(&self, button: Button) -> bool {
        match button {
            Button::Up => self.up,
            Button::Left => self.left,
            Button::Down => self.down,
            Button::Right => self.right,
            Button::Attack => self.attack,
            Button::Sacrifice => self.sacrifice,
            Button::Gambit => self.gambit,
        }
    }

    pub fn set(&mut self, button: Button, value: bool) {
        let slot = match button {
            Button::Up => &mut self.up,
            Button::Left => &mut self.left,
            Button::Down => &mut self.down,
            Button::Right => &mut self.right,
            Button::Attack => &mut self.attack,
            Button::Sacrifice => &mut self.sacrifice,
            Button::Gambit => &mut self.gambit,
        };
        *slot = value;
    }

    /// Builder-style helper, mostly for scripted input
    pub fn with(mut self, button: Button) -> Self {
        self.set(button, true);
        self
    }
}

/// Key state for one fighter this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterKeys {
    /// Currently down
    pub held: Buttons,
    /// Went down since the previous frame
    pub pressed: Buttons,
}

impl FighterKeys {
    /// Hold a button that was just pressed this frame
    pub fn tap(button: Button) -> Self {
        let b = Buttons::default().with(button);
        Self {
            held: b,
            pressed: b,
        }
    }

    /// Hold a button that was already down
    pub fn hold(button: Button) -> Self {
        Self {
            held: Buttons::default().with(button),
            pressed: Buttons::default(),
        }
    }
}

/// Input commands for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub a: FighterKeys,
    pub b: FighterKeys,
}

impl TickInput {
    pub fn for_side(&self, side: Side) -> &FighterKeys {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }
}

/// Browser key codes (`KeyboardEvent.code`) for both fighters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    pub bindings: Vec<(String, Side, Button)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let p1 = [
            ("KeyW", Button::Up),
            ("KeyA", Button::Left),
            ("KeyS", Button::Down),
            ("KeyD", Button::Right),
            ("Space", Button::Attack),
            ("KeyQ", Button::Sacrifice),
            ("KeyE", Button::Gambit),
        ];
        let p2 = [
            ("ArrowUp", Button::Up),
            ("ArrowLeft", Button::Left),
            ("ArrowDown", Button::Down),
            ("ArrowRight", Button::Right),
            ("ShiftRight", Button::Attack),
            ("ShiftLeft", Button::Attack),
            ("Period", Button::Sacrifice),
            ("Slash", Button::Gambit),
        ];
        let bindings = p1
            .iter()
            .map(|(code, b)| (code.to_string(), Side::A, *b))
            .chain(p2.iter().map(|(code, b)| (code.to_string(), Side::B, *b)))
            .collect();
        Self { bindings }
    }
}

impl KeyBindings {
    pub fn lookup(&self, code: &str) -> Option<(Side, Button)> {
        self.bindings
            .iter()
            .find(|(c, _, _)| c == code)
            .map(|(_, side, button)| (*side, *button))
    }
}

/// Folds key-down/key-up events into held + edge state
#[derive(Debug, Clone, Default)]
pub struct KeyTracker {
    pub bindings: KeyBindings,
    state: TickInput,
}

impl KeyTracker {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            state: TickInput::default(),
        }
    }

    /// Returns false for keys that are not bound
    pub fn key_down(&mut self, code: &str) -> bool {
        let Some((side, button)) = self.bindings.lookup(code) else {
            return false;
        };
        let keys = self.keys_mut(side);
        // Auto-repeat must not count as a fresh press
        if !keys.held.get(button) {
            keys.pressed.set(button, true);
        }
        keys.held.set(button, true);
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        let Some((side, button)) = self.bindings.lookup(code) else {
            return false;
        };
        self.keys_mut(side).held.set(button, false);
        true
    }

    /// Input for the next frame; clears the edge state
    pub fn take_frame(&mut self) -> TickInput {
        let frame = self.state;
        self.state.a.pressed = Buttons::default();
        self.state.b.pressed = Buttons::default();
        frame
    }

    fn keys_mut(&mut self, side: Side) -> &mut FighterKeys {
        match side {
            Side::A => &mut self.state.a,
            Side::B => &mut self.state.b,
        }
    }
}

/// Where a dash from `body` toward `dir` ends.
///
/// The target is clamped to the arena; if it would overlap the opponent the
/// target is walked back toward the origin until it does not. With no legal
/// spot the fighter stays where it is.
pub fn plan_dash(
    body: Rect,
    opponent: Option<Rect>,
    dir: Direction,
    left: f32,
    right: f32,
    tuning: &Tuning,
) -> f32 {
    let max_x = (right - body.w).max(left);
    let target = (body.x + dir.sign() * tuning.dash_distance).clamp(left, max_x);
    let Some(opponent) = opponent else {
        return target;
    };
    if !body.with_x(target).overlaps(&opponent) {
        return target;
    }
    let step = -dir.sign() * tuning.dash_step.max(1.0);
    let mut x = target;
    loop {
        x += step;
        let passed_origin = match dir {
            Direction::Right => x <= body.x,
            Direction::Left => x >= body.x,
        };
        if passed_origin {
            return body.x;
        }
        if !body.with_x(x).overlaps(&opponent) {
            return x;
        }
    }
}

/// Apply one fighter's keys for this frame
pub fn resolve(round: &mut Round, side: Side, keys: &FighterKeys, dt_ms: f32, events: &mut FrameEvents) {
    let now = round.elapsed_ms;
    let dt = dt_ms / 1000.0;

    for dir in [Direction::Left, Direction::Right] {
        let pressed = match dir {
            Direction::Left => keys.pressed.left,
            Direction::Right => keys.pressed.right,
        };
        if pressed {
            handle_tap(round, side, dir, now, events);
        }
    }

    {
        let Round {
            tuning,
            arena,
            fighters,
            ..
        } = round;
        let [a, b] = fighters;
        let (me, opponent) = match side {
            Side::A => (a, &*b),
            Side::B => (b, &*a),
        };

        // Walking (a dash or knockback owns horizontal motion)
        if !me.is_dashing() && me.knockback_lock_ms <= 0.0 {
            let intent = if keys.held.left {
                me.face(Direction::Left);
                -me.speed()
            } else if keys.held.right {
                me.face(Direction::Right);
                me.speed()
            } else {
                0.0
            };

            if intent != 0.0 {
                match (me.body.bounds(), opponent.body.bounds()) {
                    (Some(mine), Some(theirs)) => {
                        let projected = mine.with_x(mine.x + intent * LOOKAHEAD_DT);
                        me.body.vel.x = if projected.overlaps(&theirs) { 0.0 } else { intent };
                    }
                    _ => log::debug!("{:?} movement check skipped: bad bounds", side),
                }
            } else {
                me.body.vel.x *= tuning.friction;
            }
        }

        if keys.pressed.up && me.body.grounded {
            me.body.vel.y = tuning.jump_velocity;
            me.body.grounded = false;
            me.dropping_through = None;
        }

        if keys.held.down && !me.body.grounded && me.body.vel.y > 0.0 {
            me.body.vel.y += tuning.fast_fall_accel * dt;
        }

        if keys.pressed.down && me.body.grounded {
            if let Some(bounds) = me.body.bounds() {
                let on_floor = arena.on_floor(&bounds, tuning.floor_tolerance);
                let standing_on = arena.platforms.iter().position(|p| {
                    bounds.overlaps_x(p) && (bounds.bottom() - p.top()).abs() < tuning.platform_snap
                });
                if let (false, Some(idx)) = (on_floor, standing_on) {
                    me.body.grounded = false;
                    me.body.vel.y = tuning.drop_nudge;
                    me.dropping_through = Some(idx);
                }
            }
        }
    }

    if keys.pressed.attack {
        combat::start_attack(round, side, events);
    }
    if keys.pressed.sacrifice {
        combat::start_sacrifice(round, side, events);
    }
    if keys.pressed.gambit {
        combat::blood_gambit(round, side, events);
    }
}

/// Directional press: dash on a quick second tap, then remember this tap
fn handle_tap(round: &mut Round, side: Side, dir: Direction, now: f64, events: &mut FrameEvents) {
    let window = round.tuning.double_tap_window_ms as f64;
    let fighter = round.fighter(side);
    let double_tap = fighter
        .last_tap
        .is_some_and(|tap| tap.dir == dir && now - tap.at_ms < window);
    if double_tap && fighter.dash_cooldown_ms <= 0.0 && !fighter.is_dashing() {
        start_dash(round, side, dir, events);
    }
    round.fighter_mut(side).last_tap = Some(TapRecord { dir, at_ms: now });
}

fn start_dash(round: &mut Round, side: Side, dir: Direction, events: &mut FrameEvents) {
    let now = round.elapsed_ms;
    let (left, right) = (round.arena.left, round.arena.right);
    let tuning = &round.tuning;
    let [a, b] = &mut round.fighters;
    let (me, opponent) = match side {
        Side::A => (a, &*b),
        Side::B => (b, &*a),
    };
    let Some(bounds) = me.body.bounds() else {
        log::debug!("{:?} dash skipped: bad bounds", side);
        return;
    };
    let to_x = plan_dash(bounds, opponent.body.bounds(), dir, left, right, tuning);
    me.dash = Some(DashMotion {
        from_x: bounds.x,
        to_x,
        elapsed_ms: 0.0,
        duration_ms: tuning.dash_duration_ms,
    });
    me.dash_cooldown_ms = tuning.dash_cooldown_ms;
    me.face(dir);
    me.timers.schedule_in(now, tuning.dash_duration_ms, FighterTimer::EndDash);
    events.push(GameEvent::Dashed {
        side,
        from_x: bounds.x,
        to_x,
    });
}
