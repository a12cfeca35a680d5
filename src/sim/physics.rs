//! Fighter physics
//!
//! Gravity, integration and collision against the static arena. Elimination
//! (hazards and the death boundary) is a separate query so nothing in the
//! collision pass can skip it.

use super::arena::{ArenaGeometry, Ground};
use super::fighter::Fighter;
use super::state::DeathCause;
use crate::tuning::Tuning;

/// Advance one fighter's body by `dt_ms`
pub fn integrate(fighter: &mut Fighter, arena: &ArenaGeometry, tuning: &Tuning, dt_ms: f32) {
    let dt = dt_ms / 1000.0;
    let Some(prev) = fighter.body.bounds() else {
        log::debug!("{:?} physics skipped: bad bounds", fighter.side);
        return;
    };

    let body = &mut fighter.body;
    if !body.grounded {
        body.vel.y = (body.vel.y + tuning.gravity * dt).min(tuning.terminal_velocity);
    }

    match fighter.dash.as_mut() {
        Some(dash) => {
            dash.elapsed_ms = (dash.elapsed_ms + dt_ms).min(dash.duration_ms);
            body.pos.x = dash.current_x();
        }
        None => body.pos.x += body.vel.x * dt,
    }
    body.pos.y += body.vel.y * dt;

    let max_x = (arena.right - body.size.x).max(arena.left);
    if body.pos.x < arena.left {
        body.pos.x = arena.left;
        body.vel.x = 0.0;
    } else if body.pos.x > max_x {
        body.pos.x = max_x;
        body.vel.x = 0.0;
    }

    let Some(bounds) = body.bounds() else {
        return;
    };

    // Clear the drop-through once the body started this frame below that
    // platform, or is now beside it. Either way the landing rule can't fire.
    if let Some(idx) = fighter.dropping_through {
        let passed = arena
            .platforms
            .get(idx)
            .is_none_or(|p| prev.top() >= p.bottom() || !bounds.overlaps_x(p));
        if passed {
            fighter.dropping_through = None;
        }
    }

    let mut on_platform = false;
    for (idx, platform) in arena.platforms.iter().enumerate() {
        if fighter.dropping_through == Some(idx) || !bounds.overlaps_x(platform) {
            continue;
        }

        if body.vel.y > 0.0 && prev.top() < platform.top() && bounds.bottom() >= platform.top() {
            body.pos.y = platform.top() - body.size.y;
            body.vel.y = 0.0;
            body.grounded = true;
            return;
        }

        if body.vel.y < 0.0
            && bounds.top() <= platform.bottom()
            && prev.bottom() > platform.bottom()
            && prev.top() > platform.top()
        {
            body.pos.y = platform.bottom();
            body.vel.y = 0.0;
            return;
        }

        if body.grounded && (bounds.bottom() - platform.top()).abs() < tuning.platform_snap {
            on_platform = true;
            break;
        }
    }

    if body.grounded && !on_platform && !arena.on_floor(&bounds, tuning.floor_tolerance) {
        body.grounded = false;
    }

    match arena.ground {
        Ground::Solid { y } => {
            if body.pos.y + body.size.y > y {
                body.pos.y = y - body.size.y;
                body.vel.y = body.vel.y.min(0.0);
                body.grounded = true;
            }
        }
        Ground::Span { y, left, right } => {
            let bottom = body.pos.y + body.size.y;
            let over_span = bounds.right() > left && bounds.left() < right;
            if over_span
                && body.vel.y >= 0.0
                && bottom >= y
                && bottom <= y + tuning.span_landing_tolerance
            {
                body.pos.y = y - body.size.y;
                body.vel.y = 0.0;
                body.grounded = true;
            }
        }
        Ground::None => {}
    }

    for wall in &arena.walls {
        let Some(bounds) = body.bounds() else {
            return;
        };
        if !bounds.overlaps(wall) {
            continue;
        }
        // Walls hug the arena edges; push toward the middle
        if wall.center().x < (arena.left + arena.right) / 2.0 {
            body.pos.x = wall.right();
            body.vel.x = body.vel.x.max(0.0);
        } else {
            body.pos.x = wall.left() - body.size.x;
            body.vel.x = body.vel.x.min(0.0);
        }
    }
}

/// Whether the fighter has been eliminated by the arena itself
pub fn elimination(fighter: &Fighter, arena: &ArenaGeometry, tuning: &Tuning) -> Option<DeathCause> {
    let bounds = fighter.body.bounds()?;
    if let Some(hazard) = arena.hazards.iter().find(|h| h.rect.overlaps(&bounds)) {
        return Some(DeathCause::Hazard(hazard.kind));
    }
    if bounds.top() > tuning.death_boundary_y {
        return Some(DeathCause::Fall);
    }
    None
}
