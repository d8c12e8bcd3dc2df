//! Fixed timestep game loop
//!
//! [`Game`] owns the physics backend, the clock and the active run. Each call
//! to [`Game::tick`] reads the clock once and advances everything in a fixed
//! order: abilities, steering, enemy patrol, physics, contacts, camera, fall
//! check, HUD.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::abilities::{self, Activation};
use super::level;
use super::reactor;
use super::rig;
use super::state::{Ability, GamePhase, RunState};
use super::tracker;
use crate::clock::Clock;
use crate::consts::*;
use crate::error::{GameError, Rejection};
use crate::hud::{
    HELP_NOTICE_MS, HudSnapshot, NOTICE_MS, NoticeBoard, START_NOTICE_MS, UNAVAILABLE_NOTICE_MS,
};
use crate::physics::{PhysicsBackend, PhysicsWorld};
use crate::tuning::Tuning;

/// Control summary shown by [`Game::help`]
pub const HELP_TEXT: &str = "W/Up extend, S/Down retract, A/Left rotate left, D/Right rotate right. \
     SPACE Burst, SHIFT Dash, F Hook, Q Slow, R Checkpoint";

/// Default seed for the first run
const DEFAULT_SEED: u64 = 0x5EED_CAFE;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held: rotate the weapon counter-clockwise
    pub left: bool,
    /// Held: rotate the weapon clockwise
    pub right: bool,
    /// Held: extend reach
    pub up: bool,
    /// Held: retract reach
    pub down: bool,
    pub burst: bool,
    pub dash: bool,
    /// Toggle the grapple
    pub hook: bool,
    pub slow: bool,
    /// Return to the last checkpoint
    pub respawn: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Rotation axis: -1, 0 or 1
    pub fn rotate_axis(&self) -> f32 {
        (self.right as i8 - self.left as i8) as f32
    }

    /// Reach axis: -1, 0 or 1
    pub fn extend_axis(&self) -> f32 {
        (self.up as i8 - self.down as i8) as f32
    }

    /// One-shot ability requests, in processing order
    pub fn abilities(&self) -> impl Iterator<Item = Ability> {
        [
            (self.burst, Ability::Burst),
            (self.dash, Ability::Dash),
            (self.hook, Ability::Hook),
            (self.slow, Ability::Slow),
        ]
        .into_iter()
        .filter_map(|(pressed, ability)| pressed.then_some(ability))
    }

    /// Forget one-shot presses once a tick has consumed them
    pub fn clear_one_shots(&mut self) {
        self.burst = false;
        self.dash = false;
        self.hook = false;
        self.slow = false;
        self.respawn = false;
        self.pause = false;
    }
}

/// The running game: backend, clock, run and HUD
pub struct Game<B: PhysicsBackend, C: Clock> {
    backend: B,
    clock: C,
    tuning: Tuning,
    phase: GamePhase,
    run: Option<RunState>,
    world: Option<B::World>,
    notices: NoticeBoard,
    hud: HudSnapshot,
    next_seed: u64,
    accumulator: f32,
}

impl<B: PhysicsBackend, C: Clock> Game<B, C> {
    pub fn new(backend: B, clock: C, tuning: Tuning) -> Self {
        let hud = HudSnapshot::idle(&tuning);
        Self {
            backend,
            clock,
            tuning,
            phase: GamePhase::Idle,
            run: None,
            world: None,
            notices: NoticeBoard::new(),
            hud,
            next_seed: DEFAULT_SEED,
            accumulator: 0.0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn hud(&self) -> &HudSnapshot {
        &self.hud
    }

    pub fn run_state(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn world(&self) -> Option<&B::World> {
        self.world.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Start a new run with the next seed in sequence
    pub fn start_run(&mut self) -> Result<(), GameError> {
        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        self.start_run_with_seed(seed)
    }

    /// Start a new run, discarding any current one.
    ///
    /// Tuning that fails validation is refused before a world is built. If the
    /// backend cannot produce a world the game stays idle and a notice is
    /// posted.
    pub fn start_run_with_seed(&mut self, seed: u64) -> Result<(), GameError> {
        if let Err(err) = self.tuning.validate() {
            log::warn!("Refusing to start run: {err}");
            return Err(err.into());
        }
        let now = self.clock.now_ms();
        let gravity = Vec2::new(0.0, self.tuning.gravity_y);

        let mut world = match self.backend.create_world(gravity) {
            Ok(world) => world,
            Err(err) => {
                log::warn!("Cannot start run on {}: {err}", self.backend.name());
                self.notices.post(
                    "Physics engine unavailable. Reload and try again.",
                    UNAVAILABLE_NOTICE_MS,
                    now,
                );
                self.hud.notice = self.notices.current(now).map(|n| n.text.clone());
                return Err(err);
            }
        };

        let mut run = RunState::new(seed, &self.tuning, now);
        let mut rng = Pcg32::seed_from_u64(seed);
        let plan = level::plan_level(&self.tuning, &mut rng);
        level::spawn_level(&mut world, &mut run.registry, &plan);
        run.goal_x = plan.goal_x;

        let rig = rig::build_rig(&mut world, &mut run.registry, &self.tuning);
        if let Some(pivot) = world.position(rig.pivot) {
            run.camera = pivot;
            run.checkpoint.position = pivot;
        }
        run.checkpoint.stage = 1;
        run.rig = Some(rig);

        log::info!(
            "Run started on {} (seed {seed:#x}, {} bodies)",
            self.backend.name(),
            run.registry.len()
        );

        self.run = Some(run);
        self.world = Some(world);
        self.phase = GamePhase::Playing;
        self.accumulator = 0.0;
        self.notices.post("Run started. (WASD / Arrows)", START_NOTICE_MS, now);
        self.refresh_hud(now);
        Ok(())
    }

    /// Pause or resume; no effect while idle
    pub fn toggle_pause(&mut self) -> GamePhase {
        let now = self.clock.now_ms();
        self.toggle_pause_at(now);
        self.refresh_hud(now);
        self.phase
    }

    fn toggle_pause_at(&mut self, now: f64) {
        let (phase, text) = match self.phase {
            GamePhase::Playing => (GamePhase::Paused, "Paused"),
            GamePhase::Paused => (GamePhase::Playing, "Resumed"),
            GamePhase::Idle => return,
        };
        self.phase = phase;
        self.notices.post(text, NOTICE_MS, now);
    }

    /// Return to the last checkpoint. False when no run is active.
    pub fn respawn(&mut self) -> bool {
        let now = self.clock.now_ms();
        let done = self.respawn_at(now);
        self.refresh_hud(now);
        done
    }

    fn respawn_at(&mut self, now: f64) -> bool {
        let (Some(run), Some(world)) = (self.run.as_mut(), self.world.as_mut()) else {
            return false;
        };
        if !reactor::respawn(run, world, &self.tuning) {
            return false;
        }
        let stage = run.checkpoint.stage;
        self.notices.post(format!("Respawn (stage {stage})"), NOTICE_MS, now);
        true
    }

    /// Drop the run and return to the splash screen
    pub fn reset(&mut self) {
        if self.run.is_some() {
            log::info!("Run discarded");
        }
        self.run = None;
        self.world = None;
        self.phase = GamePhase::Idle;
        self.accumulator = 0.0;
        self.notices.clear();
        self.hud = HudSnapshot::idle(&self.tuning);
    }

    /// Post the control summary
    pub fn help(&mut self) {
        let now = self.clock.now_ms();
        self.notices.post(HELP_TEXT, HELP_NOTICE_MS, now);
        self.hud.notice = self.notices.current(now).map(|n| n.text.clone());
    }

    /// Run as many fixed ticks as `frame_dt` seconds cover.
    ///
    /// One-shot inputs apply to the first tick only. Returns the number of
    /// ticks run.
    pub fn frame(&mut self, frame_dt: f32, input: &TickInput) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut input = input.clone();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick(&input);
            input.clear_one_shots();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Advance the game by one fixed timestep
    pub fn tick(&mut self, input: &TickInput) {
        let now = self.clock.now_ms();

        if input.pause {
            self.toggle_pause_at(now);
        }

        match self.phase {
            GamePhase::Idle | GamePhase::Paused => {
                self.refresh_hud(now);
                return;
            }
            GamePhase::Playing => {}
        }

        if input.respawn {
            self.respawn_at(now);
        }

        let tuning = &self.tuning;
        let (Some(run), Some(world)) = (self.run.as_mut(), self.world.as_mut()) else {
            return;
        };
        let Some(rig) = run.rig else {
            return;
        };

        // Abilities
        for ability in input.abilities() {
            match abilities::activate(ability, run, world, tuning, now) {
                Ok(activation) => {
                    log::debug!("{ability:?}: {activation:?}");
                    self.notices.post(activation_text(activation), NOTICE_MS, now);
                }
                Err(rejection) => {
                    log::debug!("{ability:?} rejected: {rejection}");
                    if !rejection.is_silent() {
                        self.notices.post(rejection_text(ability, rejection), NOTICE_MS, now);
                    }
                }
            }
        }

        // Steering
        rig::steer(
            &mut run.steering,
            input.rotate_axis(),
            input.extend_axis(),
            tuning,
            SIM_DT,
        );
        rig::place_anchor(world, &rig, &run.steering);

        patrol_enemies(run, world);

        // Time scale and grapple expiry
        let scale = run.time_scale(now, tuning);
        if abilities::expire_hook(run, world, now) {
            log::debug!("Hook expired");
        }

        world.step(SIM_DT * scale);

        // Contacts
        let contacts = world.drain_contacts();
        let report = reactor::apply_contacts(run, world, tuning, &contacts);
        for event in &report.events {
            match *event {
                reactor::ContactEvent::CheckpointReached { stage, .. } => {
                    self.notices.post(format!("Checkpoint: stage {stage}"), NOTICE_MS, now);
                }
                reactor::ContactEvent::EnemyHit { .. } if report.respawned => {
                    let stage = run.checkpoint.stage;
                    self.notices.post(format!("Respawn (stage {stage})"), NOTICE_MS, now);
                }
                _ => {}
            }
        }

        // Camera and fall check
        if let Some(pivot) = world.position(rig.pivot) {
            tracker::follow_camera(&mut run.camera, pivot, tuning);

            if let Err(err) = check_bounds(pivot, tuning) {
                log::debug!("{err}");
                if reactor::respawn(run, world, tuning) {
                    let stage = run.checkpoint.stage;
                    self.notices.post(format!("Respawn (stage {stage})"), NOTICE_MS, now);
                }
            }
        }

        // Regeneration runs on wall-clock ticks, unaffected by slow motion
        run.energy.regen(tuning.energy_regen * SIM_DT);

        self.refresh_hud(now);
    }

    fn refresh_hud(&mut self, now: f64) {
        match (self.run.as_ref(), self.world.as_ref()) {
            (Some(run), Some(world)) if self.phase != GamePhase::Idle => {
                self.hud.capture(self.phase, run, world, &self.tuning, now);
            }
            _ => {
                self.hud.phase = self.phase;
            }
        }
        self.hud.notice = self.notices.current(now).map(|n| n.text.clone());
    }
}

/// Drive every enemy along its patrol; rotation stays pinned
pub fn patrol_enemies<W: PhysicsWorld>(run: &mut RunState, world: &mut W) {
    for enemy in run.registry.enemies() {
        let Some(state) = world.body_state(enemy) else {
            continue;
        };
        let Some(patrol) = run.registry.patrol_mut(enemy) else {
            continue;
        };
        let vx = patrol.steer(state.position.x);
        world.set_angle(enemy, 0.0);
        world.set_angular_velocity(enemy, 0.0);
        world.set_velocity(enemy, Vec2::new(vx, state.velocity.y));
    }
}

/// Pivot below the fall limit is out of bounds
fn check_bounds(pivot: Vec2, tuning: &Tuning) -> Result<(), GameError> {
    if pivot.y > tuning.fall_y_limit {
        return Err(GameError::OutOfBounds {
            y: pivot.y,
            limit: tuning.fall_y_limit,
        });
    }
    Ok(())
}

fn activation_text(activation: Activation) -> &'static str {
    match activation {
        Activation::Burst => "Burst!",
        Activation::Dash => "Dash!",
        Activation::HookAttached { .. } => "Hook attached!",
        Activation::HookReleased => "Hook released",
        Activation::Slow => "Slow-Mo!",
    }
}

fn rejection_text(ability: Ability, rejection: Rejection) -> String {
    match rejection {
        Rejection::InsufficientEnergy { .. } => {
            format!("Not enough energy for {}", ability.label())
        }
        Rejection::NoTarget => "Nothing to hook onto.".to_string(),
        other => other.to_string(),
    }
}
