//! Ability system
//!
//! Every ability passes the same gate: cooldown, then energy. A rejected
//! activation never spends energy or touches the cooldown. `now` is the tick's
//! clock reading in milliseconds.

use glam::Vec2;

use super::rig::{self, HOOK_DAMPING, HOOK_STIFFNESS, WEAPON_TIP};
use super::state::{Ability, HookState, Rig, RunState};
use crate::error::Rejection;
use crate::physics::{JointDesc, PhysicsWorld};
use crate::tuning::Tuning;

/// Successful activation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    Burst,
    Dash,
    /// Grapple attached at a world point
    HookAttached { point: Vec2 },
    /// Active grapple let go; free of charge
    HookReleased,
    Slow,
}

pub type AbilityResult = Result<Activation, Rejection>;

fn rig_of(run: &RunState) -> Result<Rig, Rejection> {
    run.rig.ok_or(Rejection::NotRunning)
}

/// Cooldown then affordability; touches nothing
fn check(run: &RunState, tuning: &Tuning, ability: Ability, now: f64) -> Result<(), Rejection> {
    if !run.cooldowns.get(ability).ready(now) {
        return Err(Rejection::OnCooldown);
    }
    let cost = tuning.ability(ability).cost;
    if !run.energy.can_afford(cost) {
        return Err(Rejection::InsufficientEnergy {
            needed: cost.ceil() as u32,
            available: run.energy.value().floor() as u32,
        });
    }
    Ok(())
}

/// Spend the exact cost and restart the cooldown
fn commit(run: &mut RunState, tuning: &Tuning, ability: Ability, now: f64) {
    run.energy.try_spend(tuning.ability(ability).cost);
    run.cooldowns.get_mut(ability).trigger(now);
}

/// Kick the pivot away from the weapon tip, biased upward
pub fn try_burst<W: PhysicsWorld>(
    run: &mut RunState,
    world: &mut W,
    tuning: &Tuning,
    now: f64,
) -> AbilityResult {
    let rig = rig_of(run)?;
    let pivot = world.position(rig.pivot).ok_or(Rejection::NotRunning)?;
    let tip = rig::weapon_tip(world, &rig).ok_or(Rejection::NotRunning)?;
    check(run, tuning, Ability::Burst, now)?;
    commit(run, tuning, Ability::Burst, now);

    let away = (pivot - tip).normalize_or_zero();
    let impulse = away * tuning.burst_impulse + Vec2::new(0.0, -tuning.impulse_lift);
    world.apply_impulse(rig.pivot, impulse, pivot);
    Ok(Activation::Burst)
}

/// Horizontal shove along the steering direction, biased upward
pub fn try_dash<W: PhysicsWorld>(
    run: &mut RunState,
    world: &mut W,
    tuning: &Tuning,
    now: f64,
) -> AbilityResult {
    let rig = rig_of(run)?;
    let pivot = world.position(rig.pivot).ok_or(Rejection::NotRunning)?;
    check(run, tuning, Ability::Dash, now)?;
    commit(run, tuning, Ability::Dash, now);

    let impulse = Vec2::new(
        run.steering.angle.cos() * tuning.dash_impulse,
        -tuning.impulse_lift,
    );
    world.apply_impulse(rig.pivot, impulse, pivot);
    Ok(Activation::Dash)
}

/// Attach or release the grapple.
///
/// Releasing is always allowed and costs nothing. Attaching casts a ray from
/// the weapon tip along the steering angle against static level geometry; a
/// miss consumes nothing.
pub fn toggle_hook<W: PhysicsWorld>(
    run: &mut RunState,
    world: &mut W,
    tuning: &Tuning,
    now: f64,
) -> AbilityResult {
    let rig = rig_of(run)?;
    if release_hook(run, world) {
        return Ok(Activation::HookReleased);
    }

    let tip = rig::weapon_tip(world, &rig).ok_or(Rejection::NotRunning)?;
    check(run, tuning, Ability::Hook, now)?;

    let end = tip + crate::direction(run.steering.angle) * tuning.hook_range;
    let registry = &run.registry;
    let hit = world
        .cast_ray(tip, end, &|body| {
            registry.role(body).is_some_and(|role| role.is_hookable())
        })
        .ok_or(Rejection::NoTarget)?;
    let target = world.body_state(hit.body).ok_or(Rejection::NoTarget)?;

    commit(run, tuning, Ability::Hook, now);

    // Anchor in the target's local frame
    let offset = crate::rotate(hit.point - target.position, -target.angle);
    let joint = world.add_joint(&JointDesc {
        body_a: rig.weapon,
        anchor_a: WEAPON_TIP,
        body_b: hit.body,
        anchor_b: offset,
        rest_length: 0.0,
        stiffness: HOOK_STIFFNESS,
        damping: HOOK_DAMPING,
    });
    run.hook = Some(HookState {
        joint,
        target: hit.body,
        target_offset: offset,
        until: now + tuning.hook_duration_ms,
    });
    Ok(Activation::HookAttached { point: hit.point })
}

/// Open a slow-motion window
pub fn try_slow<W: PhysicsWorld>(
    run: &mut RunState,
    _world: &mut W,
    tuning: &Tuning,
    now: f64,
) -> AbilityResult {
    rig_of(run)?;
    check(run, tuning, Ability::Slow, now)?;
    commit(run, tuning, Ability::Slow, now);
    run.slow_until = Some(now + tuning.slow_duration_ms);
    Ok(Activation::Slow)
}

/// Dispatch an ability by kind
pub fn activate<W: PhysicsWorld>(
    ability: Ability,
    run: &mut RunState,
    world: &mut W,
    tuning: &Tuning,
    now: f64,
) -> AbilityResult {
    match ability {
        Ability::Burst => try_burst(run, world, tuning, now),
        Ability::Dash => try_dash(run, world, tuning, now),
        Ability::Hook => toggle_hook(run, world, tuning, now),
        Ability::Slow => try_slow(run, world, tuning, now),
    }
}

/// The only way a grapple joint is removed. Returns true if one was active.
pub fn release_hook<W: PhysicsWorld>(run: &mut RunState, world: &mut W) -> bool {
    match run.hook.take() {
        Some(hook) => {
            world.remove_joint(hook.joint);
            true
        }
        None => false,
    }
}

/// Release the grapple once its window has passed
pub fn expire_hook<W: PhysicsWorld>(run: &mut RunState, world: &mut W, now: f64) -> bool {
    if run.hook.is_some_and(|hook| now > hook.until) {
        release_hook(run, world)
    } else {
        false
    }
}

/// World-space endpoints of the grapple rope (tip, hooked point)
pub fn hook_rope<W: PhysicsWorld>(run: &RunState, world: &W) -> Option<(Vec2, Vec2)> {
    let hook = run.hook?;
    let rig = run.rig?;
    let tip = rig::weapon_tip(world, &rig)?;
    let point = rig::local_to_world(world, hook.target, hook.target_offset)?;
    Some((tip, point))
}
