//! Idle/demo mode - a simple AI that plays unattended
//!
//! Swings the hammer forward in a steady sweep, bursts out of stalls, hooks
//! whenever the grapple is ready and dashes toward the goal. Good enough to
//! show the rig moving; it makes no attempt to play well.

use super::state::{Ability, RunState};
use super::tick::TickInput;
use crate::hud::HudSnapshot;
use crate::physics::PhysicsWorld;

/// Ticks per sweep half-cycle
const SWEEP_TICKS: u32 = 90;
/// Pivot speed (px/s) below which the rig counts as stalled
const STALL_SPEED: f32 = 40.0;
/// Ticks without progress before giving up and respawning
const STUCK_TICKS: u32 = 60 * 12;

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    ticks: u32,
    best_x: f32,
    since_progress: u32,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the next tick's input from the current run and HUD
    pub fn next_input<W: PhysicsWorld>(
        &mut self,
        run: &RunState,
        world: &W,
        hud: &HudSnapshot,
    ) -> TickInput {
        self.ticks = self.ticks.wrapping_add(1);
        let mut input = TickInput::default();

        let Some(pivot) = run.rig.and_then(|rig| world.body_state(rig.pivot)) else {
            return input;
        };

        if pivot.position.x > self.best_x + 1.0 {
            self.best_x = pivot.position.x;
            self.since_progress = 0;
        } else {
            self.since_progress += 1;
        }
        if self.since_progress > STUCK_TICKS {
            self.since_progress = 0;
            input.respawn = true;
            return input;
        }

        // Sweep clockwise while extending, then retract on the way back
        let forward = (self.ticks / SWEEP_TICKS) % 2 == 0;
        input.right = true;
        input.up = forward;
        input.down = !forward;

        let stalled = pivot.velocity.length() < STALL_SPEED;
        if stalled && hud.ability(Ability::Burst).ready && hud.energy > 50.0 {
            input.burst = true;
        }
        if hud.ability(Ability::Hook).ready && hud.hook_rope.is_none() && hud.energy > 30.0 {
            input.hook = true;
        }
        if hud.ability(Ability::Dash).ready && hud.energy > 70.0 && run.steering.angle.cos() > 0.5 {
            input.dash = true;
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::mock::MockWorld;
    use crate::sim::rig;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn setup() -> (RunState, MockWorld, HudSnapshot) {
        let tuning = Tuning::default();
        let mut world = MockWorld::default();
        let mut run = RunState::new(0, &tuning, 0.0);
        run.rig = Some(rig::build_rig(&mut world, &mut run.registry, &tuning));
        (run, world, HudSnapshot::idle(&tuning))
    }

    #[test]
    fn test_stalled_rig_bursts() {
        let (run, world, hud) = setup();
        let mut pilot = Autopilot::new();
        let input = pilot.next_input(&run, &world, &hud);
        assert!(input.right);
        assert!(input.burst);
        assert!(input.hook);
    }

    #[test]
    fn test_no_rig_no_input() {
        let tuning = Tuning::default();
        let run = RunState::new(0, &tuning, 0.0);
        let mut pilot = Autopilot::new();
        let input = pilot.next_input(&run, &MockWorld::default(), &HudSnapshot::idle(&tuning));
        assert!(!input.right && !input.burst);
    }

    #[test]
    fn test_stuck_requests_respawn() {
        let (run, mut world, hud) = setup();
        let pivot = run.rig.expect("rig").pivot;
        world.set_velocity(pivot, Vec2::new(100.0, 0.0));
        let mut pilot = Autopilot::new();
        let respawned = (0..=STUCK_TICKS + 1).any(|_| pilot.next_input(&run, &world, &hud).respawn);
        assert!(respawned);
    }
}
