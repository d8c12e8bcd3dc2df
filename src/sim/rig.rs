//! Pot-and-hammer rig
//!
//! The player never moves the pivot directly. A kinematic anchor is placed
//! where the weapon tip should be, and a spring drags the tip toward it; the
//! pivot follows through its own spring to the weapon's handle.

use glam::Vec2;

use super::state::{BodyRegistry, BodyRole, Rig, SteeringTarget};
use crate::physics::{BodyDesc, BodyHandle, CollisionFilter, JointDesc, PhysicsWorld, Shape};
use crate::tuning::Tuning;

pub const PIVOT_RADIUS: f32 = 26.0;
pub const WEAPON_SIZE: Vec2 = Vec2::new(180.0, 18.0);
pub const ANCHOR_RADIUS: f32 = 6.0;

/// Weapon-local attachment points
pub const WEAPON_HANDLE: Vec2 = Vec2::new(-70.0, 0.0);
pub const WEAPON_TIP: Vec2 = Vec2::new(80.0, 0.0);

/// Pivot ↔ weapon handle spring
pub const PIVOT_JOINT_LENGTH: f32 = 18.0;
pub const PIVOT_JOINT_STIFFNESS: f32 = 30_000.0;
pub const PIVOT_JOINT_DAMPING: f32 = 400.0;

/// Weapon tip ↔ steering anchor spring
pub const STEER_STIFFNESS: f32 = 1_500.0;
pub const STEER_DAMPING: f32 = 120.0;

/// Weapon tip ↔ hooked geometry spring
pub const HOOK_STIFFNESS: f32 = 30_000.0;
pub const HOOK_DAMPING: f32 = 300.0;

/// Where the pivot appears at the start of a run
pub fn pivot_spawn(tuning: &Tuning) -> Vec2 {
    Vec2::new(120.0, tuning.level.stage_base_y - 60.0)
}

fn weapon_spawn(tuning: &Tuning) -> Vec2 {
    Vec2::new(260.0, tuning.level.stage_base_y - 120.0)
}

fn anchor_spawn(tuning: &Tuning) -> Vec2 {
    Vec2::new(340.0, tuning.level.stage_base_y - 180.0)
}

/// Create pivot, weapon and steering anchor, wire their springs and register
/// their roles.
pub fn build_rig<W: PhysicsWorld>(world: &mut W, registry: &mut BodyRegistry, tuning: &Tuning) -> Rig {
    let pivot = world.add_body(
        &BodyDesc::dynamic(Shape::Circle {
            radius: PIVOT_RADIUS,
        })
        .at(pivot_spawn(tuning))
        .with_friction(0.9)
        .with_density(0.006)
        .with_linear_damping(1.2)
        .with_filter(CollisionFilter::RigGroup),
    );

    let weapon = world.add_body(
        &BodyDesc::dynamic(Shape::Rect {
            width: WEAPON_SIZE.x,
            height: WEAPON_SIZE.y,
        })
        .at(weapon_spawn(tuning))
        .with_friction(0.9)
        .with_restitution(0.03)
        .with_density(0.0035)
        .with_linear_damping(0.6)
        .with_filter(CollisionFilter::RigGroup),
    );

    let anchor = world.add_body(
        &BodyDesc::kinematic(Shape::Circle {
            radius: ANCHOR_RADIUS,
        })
        .at(anchor_spawn(tuning))
        .with_filter(CollisionFilter::Disabled),
    );

    let pivot_joint = world.add_joint(&JointDesc {
        body_a: pivot,
        anchor_a: Vec2::ZERO,
        body_b: weapon,
        anchor_b: WEAPON_HANDLE,
        rest_length: PIVOT_JOINT_LENGTH,
        stiffness: PIVOT_JOINT_STIFFNESS,
        damping: PIVOT_JOINT_DAMPING,
    });

    let steer_joint = world.add_joint(&JointDesc {
        body_a: weapon,
        anchor_a: WEAPON_TIP,
        body_b: anchor,
        anchor_b: Vec2::ZERO,
        rest_length: 0.0,
        stiffness: STEER_STIFFNESS,
        damping: STEER_DAMPING,
    });

    registry.insert(pivot, BodyRole::Player);
    registry.insert(weapon, BodyRole::Weapon);
    registry.insert(anchor, BodyRole::Anchor);

    Rig {
        pivot,
        weapon,
        anchor,
        pivot_joint,
        steer_joint,
    }
}

/// World position of a body-local point
pub fn local_to_world<W: PhysicsWorld>(world: &W, body: BodyHandle, local: Vec2) -> Option<Vec2> {
    let state = world.body_state(body)?;
    Some(state.position + crate::rotate(local, state.angle))
}

/// Weapon tip in world space
pub fn weapon_tip<W: PhysicsWorld>(world: &W, rig: &Rig) -> Option<Vec2> {
    local_to_world(world, rig.weapon, WEAPON_TIP)
}

/// Advance the steering target from held input.
///
/// `rotate` and `extend` are -1, 0 or 1; `dt` is wall-clock seconds.
pub fn steer(target: &mut SteeringTarget, rotate: f32, extend: f32, tuning: &Tuning, dt: f32) {
    target.angle += rotate * tuning.rotate_speed * dt;
    target.reach = crate::clamp(
        target.reach + extend * tuning.extend_speed * dt,
        tuning.min_reach,
        tuning.max_reach,
    );
}

/// Move the kinematic anchor to where the steering target wants the tip.
/// No-op if the pivot is gone.
pub fn place_anchor<W: PhysicsWorld>(world: &mut W, rig: &Rig, target: &SteeringTarget) {
    if let Some(pivot) = world.position(rig.pivot) {
        world.set_position(rig.anchor, target.anchor_for(pivot));
    }
}

/// Teleport the rig to `at`, weapon offset beside it, all motion zeroed
pub fn place_rig<W: PhysicsWorld>(world: &mut W, rig: &Rig, at: Vec2, tuning: &Tuning) {
    for (body, position) in [
        (rig.pivot, at),
        (rig.weapon, at + tuning.respawn_weapon_offset),
    ] {
        world.set_position(body, position);
        world.set_velocity(body, Vec2::ZERO);
        world.set_angular_velocity(body, 0.0);
    }
}
