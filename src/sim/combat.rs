//! Combat resolution
//!
//! Attacks, damage, mitigation, knockback, projectiles, passives, the two
//! high-risk abilities and weapon pickups. Every damage source funnels through
//! [`apply_damage`] so the win check can never be skipped.

use glam::Vec2;
use rand::Rng;

use super::fighter::{ActiveBuff, Buff, Fighter, FighterTimer, Passive, Side, WeaponKind};
use super::state::{DeathCause, FrameEvents, GambitReward, GameEvent, HitSource, Projectile, Round};
use crate::tuning::Tuning;

/// Incoming damage kept by a shield
const SHIELD_FACTOR: f32 = 0.5;

/// Bullets leave the muzzle this far in front of the shooter's center
const MUZZLE_OFFSET: f32 = 30.0;

/// Outgoing damage before mitigation
pub fn outgoing_damage(attacker: &Fighter, weapon: Option<WeaponKind>, sacrifice: bool, tuning: &Tuning) -> i32 {
    let mut damage = attacker.stats.damage as f32;
    if attacker.has_rage() {
        damage *= tuning.rage_multiplier;
    }
    if attacker.has_buff(Buff::Berserker) {
        damage *= tuning.berserker.magnitude;
    }
    if weapon == Some(WeaponKind::Sword) {
        damage *= tuning.sword_multiplier;
    }
    let damage = damage.floor() as i32;
    if sacrifice {
        (damage as f32 * tuning.sacrifice_multiplier) as i32
    } else {
        damage
    }
}

/// Damage left after a shield and/or iron skin, each rounding up
pub fn mitigated(damage: i32, shield: bool, iron: Option<f32>) -> i32 {
    let mut damage = damage as f32;
    if shield {
        damage = (damage * SHIELD_FACTOR).ceil();
    }
    if let Some(factor) = iron {
        damage = (damage * factor).ceil();
    }
    damage as i32
}

/// Subtract health and run the win check. Returns true if this ended the round.
pub fn apply_damage(round: &mut Round, target: Side, amount: i32, cause: DeathCause, events: &mut FrameEvents) -> bool {
    let fighter = round.fighter_mut(target);
    fighter.health = (fighter.health - amount).max(0);
    if !fighter.is_alive() {
        return round.resolve(target.other(), cause, events);
    }
    false
}

/// One landed hit from `attacker` on the opponent
pub fn land_hit(round: &mut Round, attacker: Side, source: HitSource, events: &mut FrameEvents) {
    let target = attacker.other();
    let tuning = &round.tuning;
    let weapon = match source {
        HitSource::Melee | HitSource::Sacrifice => round.fighter(attacker).weapon,
        HitSource::Bullet | HitSource::SacrificeBullet => Some(WeaponKind::Gun),
    };
    let raw = outgoing_damage(round.fighter(attacker), weapon, source.is_sacrifice(), tuning);
    let victim = round.fighter(target);
    let iron = victim.has_buff(Buff::Iron).then_some(tuning.iron.magnitude);
    let damage = mitigated(raw, victim.weapon == Some(WeaponKind::Shield), iron);
    let knockback = tuning.knockback_for(weapon);
    let lock_ms = tuning.knockback_lock_ms;
    let vampiric_heal = tuning.vampiric.magnitude as i32;

    // Pushed away from the attacker, or along its facing when stacked
    let (me, them) = round.pair_mut(attacker);
    let dx = them.body.center().x - me.body.center().x;
    let dir = if dx.abs() > f32::EPSILON { dx.signum() } else { me.body.facing_sign() };
    if me.has_buff(Buff::Vampiric) {
        let healed = me.heal(vampiric_heal);
        if healed > 0 {
            events.push(GameEvent::Healed {
                side: attacker,
                amount: healed,
            });
        }
    }
    let victim = round.fighter_mut(target);
    victim.body.vel.x = dir * knockback;
    victim.knockback_lock_ms = lock_ms;

    log::debug!("{:?} hits {:?} for {} ({:?})", attacker, target, damage, source);
    events.push(GameEvent::Hit {
        attacker,
        target,
        damage,
        source,
    });
    apply_damage(round, target, damage, DeathCause::Knockout, events);
}

/// Normal attack: a melee swing, or a shot when holding a gun
pub fn start_attack(round: &mut Round, side: Side, events: &mut FrameEvents) {
    let now = round.elapsed_ms;
    let tuning = &round.tuning;
    let (cooldown, window) = (tuning.attack_cooldown_ms, tuning.attack_window_ms);
    let fighter = round.fighter_mut(side);
    if fighter.attack_cooldown_ms > 0.0 {
        return;
    }
    fighter.attack_cooldown_ms = cooldown;
    if fighter.weapon == Some(WeaponKind::Gun) {
        fire_bullet(round, side, false, events);
        return;
    }
    fighter.is_attacking = true;
    fighter.timers.schedule_in(now, window, FighterTimer::EndAttack);
    events.push(GameEvent::AttackStarted { side });
}

/// Sacrifice attack: once per round, only above the health floor
pub fn start_sacrifice(round: &mut Round, side: Side, events: &mut FrameEvents) {
    let now = round.elapsed_ms;
    let (min_health, window) = (round.tuning.sacrifice_min_health, round.tuning.attack_window_ms);
    let fighter = round.fighter_mut(side);
    if fighter.sacrifice_used || fighter.health <= min_health {
        return;
    }
    fighter.sacrifice_used = true;
    fighter.sacrifice_hit = false;
    fighter.sacrifice_attempt += 1;
    if fighter.weapon == Some(WeaponKind::Gun) {
        fire_bullet(round, side, true, events);
        return;
    }
    let attempt = fighter.sacrifice_attempt;
    fighter.sacrifice_attacking = true;
    fighter
        .timers
        .schedule_in(now, window, FighterTimer::EndSacrifice { attempt });
    log::info!("{} commits a sacrifice attack", fighter.name);
    events.push(GameEvent::SacrificeStarted { side });
}

/// Self-damage for a sacrifice that never connected
pub fn sacrifice_missed(round: &mut Round, side: Side, events: &mut FrameEvents) {
    let penalty = round.tuning.sacrifice_penalty;
    let fighter = round.fighter_mut(side);
    if fighter.sacrifice_hit {
        return;
    }
    // Settled either way from here on
    fighter.sacrifice_hit = true;
    fighter.sacrifice_attacking = false;
    log::info!("{}'s sacrifice missed", fighter.name);
    events.push(GameEvent::SacrificeMissed { side, penalty });
    apply_damage(round, side, penalty, DeathCause::SacrificeBacklash, events);
}

/// Blood gambit: trade health for a random reward
pub fn blood_gambit(round: &mut Round, side: Side, events: &mut FrameEvents) {
    let tuning = &round.tuning;
    let (threshold, cost_frac) = (tuning.gambit_threshold, tuning.gambit_cost);
    let fighter = round.fighter(side);
    let max = fighter.stats.max_health;
    if fighter.gambit_used || fighter.health as f32 <= max as f32 * threshold {
        return;
    }
    let cost = (max as f32 * cost_frac).floor() as i32;
    let unarmed = fighter.weapon.is_none();

    // Unarmed fighters get the weapon as a fifth option
    let options = Buff::ALL.len() + usize::from(unarmed);
    let roll = round.rng.random_range(0..options);
    let reward = match Buff::ALL.get(roll) {
        Some(&buff) => GambitReward::Buff(buff),
        None => {
            let pick = round.rng.random_range(0..WeaponKind::HELD.len());
            GambitReward::Weapon(WeaponKind::HELD[pick])
        }
    };

    let buff = match reward {
        GambitReward::Buff(kind) => {
            let bt = round.tuning.buff(kind);
            let speed_bonus = if kind == Buff::Swift {
                round.fighter(side).stats.speed * bt.magnitude
            } else {
                0.0
            };
            Some(ActiveBuff {
                kind,
                remaining_ms: bt.duration_ms,
                speed_bonus,
            })
        }
        GambitReward::Weapon(_) => None,
    };
    let fighter = round.fighter_mut(side);
    fighter.gambit_used = true;
    fighter.health = (fighter.health - cost).max(1);
    if let GambitReward::Weapon(kind) = reward {
        fighter.weapon = Some(kind);
    }
    if buff.is_some() {
        fighter.buff = buff;
    }
    log::info!("{} gambles {} HP for {:?}", fighter.name, cost, reward);
    events.push(GameEvent::GambitActivated { side, cost, reward });
}

fn fire_bullet(round: &mut Round, shooter: Side, sacrifice: bool, events: &mut FrameEvents) {
    let id = round.next_entity_id();
    let speed = if sacrifice {
        round.tuning.sacrifice_bullet_speed
    } else {
        round.tuning.bullet_speed
    };
    let lifespan_ms = round.tuning.bullet_lifespan_ms;
    let body = round.fighter(shooter).body;
    let facing = body.facing_sign();
    round.projectiles.push(Projectile {
        id,
        shooter,
        pos: body.center() + Vec2::new(facing * MUZZLE_OFFSET, 0.0),
        vel_x: facing * speed,
        lifespan_ms,
        sacrifice,
        resolved: false,
    });
    events.push(GameEvent::ShotFired {
        side: shooter,
        sacrifice,
    });
}

/// Melee hit check for one attacker; sacrifice swings take priority
pub fn resolve_melee(round: &mut Round, attacker: Side, events: &mut FrameEvents) {
    let tuning = &round.tuning;
    let (me, them) = (round.fighter(attacker), round.fighter(attacker.other()));
    if !me.is_attacking && !me.sacrifice_attacking {
        return;
    }
    let (Some(hitbox), Some(target)) = (me.hitbox(tuning), them.body.bounds()) else {
        return;
    };
    if !hitbox.overlaps(&target) {
        return;
    }
    let me = round.fighter_mut(attacker);
    let source = if me.sacrifice_attacking {
        me.sacrifice_attacking = false;
        me.sacrifice_hit = true;
        HitSource::Sacrifice
    } else {
        me.is_attacking = false;
        HitSource::Melee
    };
    land_hit(round, attacker, source, events);
}

enum BulletFate {
    Flying,
    Hit,
    Gone,
}

/// Move bullets and settle the ones that hit or expire
pub fn update_projectiles(round: &mut Round, dt_ms: f32, events: &mut FrameEvents) {
    let dt = dt_ms / 1000.0;
    let radius = round.tuning.bullet_hit_radius;
    let mut settled = Vec::new();

    for p in &mut round.projectiles {
        p.pos.x += p.vel_x * dt;
        p.lifespan_ms -= dt_ms;
        let target = round.fighters[p.shooter.other().index()].body.center();
        let fate = if p.pos.distance(target) < radius {
            BulletFate::Hit
        } else if p.lifespan_ms <= 0.0
            || p.pos.x < round.arena.left
            || p.pos.x > round.arena.right
            || round.arena.platforms.iter().any(|pl| pl.contains_point(p.pos))
        {
            BulletFate::Gone
        } else {
            BulletFate::Flying
        };
        if !matches!(fate, BulletFate::Flying) && !p.resolved {
            p.resolved = true;
            settled.push((p.shooter, p.sacrifice, fate));
        }
    }
    round.projectiles.retain(|p| !p.resolved);

    for (shooter, sacrifice, fate) in settled {
        if round.is_resolved() {
            return;
        }
        match (fate, sacrifice) {
            (BulletFate::Hit, false) => land_hit(round, shooter, HitSource::Bullet, events),
            (BulletFate::Hit, true) => {
                round.fighter_mut(shooter).sacrifice_hit = true;
                land_hit(round, shooter, HitSource::SacrificeBullet, events);
            }
            (_, true) => sacrifice_missed(round, shooter, events),
            _ => {}
        }
    }
}

/// Trigger low-health passives (once per fighter per round)
pub fn update_passives(round: &mut Round, events: &mut FrameEvents) {
    let now = round.elapsed_ms;
    let tuning = &round.tuning;
    let (threshold, ticks, interval) = (tuning.passive_threshold, tuning.regen_ticks, tuning.regen_interval_ms);
    for side in Side::BOTH {
        let fighter = round.fighter_mut(side);
        let low = (fighter.health as f32) < fighter.stats.max_health as f32 * threshold;
        if fighter.ability_triggered || !fighter.is_alive() || !low {
            continue;
        }
        let passive = fighter.path.passive();
        fighter.ability_triggered = true;
        fighter.ability = Some(passive);
        if passive == Passive::Regeneration {
            fighter.regen_pulses_left = ticks;
            fighter.timers.schedule_in(now, interval, FighterTimer::Regen);
        }
        log::info!("{} triggers {:?}", fighter.name, passive);
        events.push(GameEvent::PassiveTriggered { side, passive });
    }
}

/// One regeneration pulse; queues the next while pulses remain
pub fn regen_pulse(round: &mut Round, side: Side, deadline_ms: f64, events: &mut FrameEvents) {
    let (amount, interval) = (round.tuning.regen_amount, round.tuning.regen_interval_ms);
    let fighter = round.fighter_mut(side);
    if fighter.regen_pulses_left == 0 {
        return;
    }
    fighter.regen_pulses_left -= 1;
    let healed = fighter.heal(amount);
    if fighter.regen_pulses_left > 0 {
        fighter.timers.schedule_in(deadline_ms, interval, FighterTimer::Regen);
    }
    if healed > 0 {
        events.push(GameEvent::Healed { side, amount: healed });
    }
}

/// Count down gambit buffs
pub fn update_buffs(round: &mut Round, dt_ms: f32, events: &mut FrameEvents) {
    for side in Side::BOTH {
        let fighter = round.fighter_mut(side);
        let Some(buff) = fighter.buff.as_mut() else {
            continue;
        };
        buff.remaining_ms -= dt_ms;
        if buff.remaining_ms <= 0.0 {
            let kind = buff.kind;
            fighter.buff = None;
            events.push(GameEvent::BuffExpired { side, buff: kind });
        }
    }
}

/// Collect the field weapon if a fighter is close enough (A checked first)
pub fn check_pickups(round: &mut Round, events: &mut FrameEvents) {
    let Some(item) = round.field_weapon else {
        return;
    };
    let (radius, heal) = (round.tuning.pickup_radius, round.tuning.potion_heal);
    let Some(side) = Side::BOTH
        .into_iter()
        .find(|s| round.fighter(*s).body.center().distance(item.pos) < radius)
    else {
        return;
    };
    round.field_weapon = None;
    let fighter = round.fighter_mut(side);
    match item.kind {
        WeaponKind::Potion => {
            let healed = fighter.heal(heal);
            events.push(GameEvent::Healed { side, amount: healed });
        }
        kind => fighter.weapon = Some(kind),
    }
    events.push(GameEvent::WeaponPickedUp { side, kind: item.kind });
}
