//! Collision reactor
//!
//! Turns the contacts that started during a physics step into game-state
//! changes: coin pickup, checkpoint capture, enemy hits. Only the pivot
//! triggers anything; weapon contacts are ignored.

use glam::Vec2;

use super::abilities::release_hook;
use super::rig;
use super::state::{BodyRegistry, BodyRole, Checkpoint, RunState};
use crate::physics::{BodyHandle, ContactPair, PhysicsWorld};
use crate::tuning::Tuning;

/// What a contact means for the run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactEvent {
    CoinCollected { coin: BodyHandle },
    CheckpointReached { marker: BodyHandle, stage: u32 },
    EnemyHit { enemy: BodyHandle },
}

/// Result of applying one step's contacts
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactReport {
    pub events: Vec<ContactEvent>,
    /// Respawn triggered by an enemy hit
    pub respawned: bool,
}

/// Classify a pair against the registry. Pure.
pub fn classify(pair: ContactPair, registry: &BodyRegistry) -> Option<ContactEvent> {
    let role_a = registry.role(pair.a)?;
    let role_b = registry.role(pair.b)?;
    let (other, role) = match (role_a, role_b) {
        (BodyRole::Player, r) => (pair.b, r),
        (r, BodyRole::Player) => (pair.a, r),
        _ => return None,
    };

    match *role {
        BodyRole::Coin { .. } => Some(ContactEvent::CoinCollected { coin: other }),
        BodyRole::Checkpoint { stage } => Some(ContactEvent::CheckpointReached {
            marker: other,
            stage,
        }),
        BodyRole::Enemy { .. } => Some(ContactEvent::EnemyHit { enemy: other }),
        _ => None,
    }
}

/// Apply a batch of contacts in order.
///
/// Each pair is classified against the registry as left by earlier pairs, so
/// a coin reported twice is only counted once. At most one respawn happens
/// per batch.
pub fn apply_contacts<W: PhysicsWorld>(
    run: &mut RunState,
    world: &mut W,
    tuning: &Tuning,
    pairs: &[ContactPair],
) -> ContactReport {
    let mut report = ContactReport::default();

    for &pair in pairs {
        let Some(event) = classify(pair, &run.registry) else {
            continue;
        };
        match event {
            ContactEvent::CoinCollected { coin } => {
                run.registry.remove(coin);
                world.remove_body(coin);
                run.counters.coins += 1;
            }
            ContactEvent::CheckpointReached { marker, stage } => {
                let Some(at) = world.position(marker) else {
                    continue;
                };
                run.checkpoint = Checkpoint {
                    position: at - Vec2::new(0.0, tuning.checkpoint_lift),
                    stage,
                };
                log::info!("Checkpoint: stage {stage}");
            }
            ContactEvent::EnemyHit { .. } => {
                if report.respawned {
                    continue;
                }
                report.respawned = respawn(run, world, tuning);
            }
        }
        report.events.push(event);
    }

    report
}

/// Send the rig back to the last checkpoint.
///
/// Counts a death, zeroes motion, drops any grapple and tops energy up to the
/// respawn floor. Returns false (and changes nothing) without a rig.
pub fn respawn<W: PhysicsWorld>(run: &mut RunState, world: &mut W, tuning: &Tuning) -> bool {
    let Some(rig) = run.rig else {
        return false;
    };

    run.counters.deaths += 1;
    rig::place_rig(world, &rig, run.checkpoint.position, tuning);
    release_hook(run, world);
    run.energy.floor_at(tuning.respawn_energy_floor);

    log::info!(
        "Respawn at stage {} (deaths: {})",
        run.checkpoint.stage,
        run.counters.deaths
    );
    true
}
