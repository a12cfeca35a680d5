//! Field weapon spawner
//!
//! At most one weapon lies on the field. A new one is attempted every spawn
//! interval of combat time and vanishes if nobody grabs it in time.

use glam::Vec2;
use rand::Rng;

use super::fighter::WeaponKind;
use super::state::{FieldWeapon, FrameEvents, GameEvent, Round};

pub fn update(round: &mut Round, dt_ms: f32, events: &mut FrameEvents) {
    if let Some(item) = round.field_weapon.as_mut() {
        item.lifespan_ms -= dt_ms;
        if item.lifespan_ms <= 0.0 {
            let kind = item.kind;
            round.field_weapon = None;
            log::debug!("{:?} despawned", kind);
            events.push(GameEvent::WeaponExpired { kind });
        }
    }

    round.spawn_elapsed_ms += dt_ms;
    let interval = round.tuning.spawn_interval_ms;
    if round.spawn_elapsed_ms < interval {
        return;
    }
    round.spawn_elapsed_ms -= interval;
    if round.field_weapon.is_none() {
        spawn(round, events);
    }
}

/// Drop a random weapon at a random site
pub fn spawn(round: &mut Round, events: &mut FrameEvents) {
    let sites = round.arena.weapon_spawn_sites();
    if sites.is_empty() {
        log::warn!("Arena {} has no weapon spawn sites", round.arena.variant.as_str());
        return;
    }
    let site = sites[round.rng.random_range(0..sites.len())];
    let x = if site.x_max > site.x_min {
        round.rng.random_range(site.x_min..site.x_max)
    } else {
        site.x_min
    };
    let kind = WeaponKind::ALL[round.rng.random_range(0..WeaponKind::ALL.len())];
    let pos = Vec2::new(x, site.y);
    round.field_weapon = Some(FieldWeapon {
        kind,
        pos,
        lifespan_ms: round.tuning.weapon_lifespan_ms,
    });
    log::debug!("{:?} spawned at ({:.0}, {:.0})", kind, pos.x, pos.y);
    events.push(GameEvent::WeaponSpawned { kind, pos });
}
