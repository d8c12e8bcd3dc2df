//! Run state and core simulation types
//!
//! Everything a run mutates lives in [`RunState`]. Bodies themselves belong to
//! the physics world; the run keeps handles plus a typed [`BodyRegistry`]
//! describing what each handle means to the game.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::{BodyHandle, JointHandle};
use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run; splash screen
    Idle,
    /// Active gameplay
    Playing,
    /// Run exists but the simulation is frozen
    Paused,
}

/// The four player abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Burst,
    Dash,
    Hook,
    Slow,
}

impl Ability {
    pub const ALL: [Ability; 4] = [Ability::Burst, Ability::Dash, Ability::Hook, Ability::Slow];

    pub fn index(self) -> usize {
        match self {
            Ability::Burst => 0,
            Ability::Dash => 1,
            Ability::Hook => 2,
            Ability::Slow => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Ability::Burst => "Burst",
            Ability::Dash => "Dash",
            Ability::Hook => "Hook",
            Ability::Slow => "Slow",
        }
    }
}

/// Enemy patrol parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    pub min_x: f32,
    pub max_x: f32,
    /// -1.0 (left) or 1.0 (right)
    pub dir: f32,
    /// Horizontal speed (px/s)
    pub speed: f32,
}

impl Patrol {
    /// Turn around at the patrol bounds; returns the horizontal velocity to apply
    pub fn steer(&mut self, x: f32) -> f32 {
        if x < self.min_x {
            self.dir = 1.0;
        }
        if x > self.max_x {
            self.dir = -1.0;
        }
        self.dir * self.speed
    }
}

/// What a body means to the game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyRole {
    Platform { stage: u32, size: Vec2 },
    Wall,
    Floor,
    /// The pivot ("pot")
    Player,
    /// The hammer
    Weapon,
    /// Kinematic steering anchor
    Anchor,
    Checkpoint { stage: u32 },
    Coin { stage: u32 },
    Decoration { stage: u32 },
    Enemy { stage: u32, patrol: Patrol },
}

impl BodyRole {
    /// Static level geometry the hook can grab
    pub fn is_hookable(&self) -> bool {
        matches!(self, BodyRole::Platform { .. } | BodyRole::Wall | BodyRole::Floor)
    }

    pub fn stage(&self) -> Option<u32> {
        match *self {
            BodyRole::Platform { stage, .. }
            | BodyRole::Checkpoint { stage }
            | BodyRole::Coin { stage }
            | BodyRole::Decoration { stage }
            | BodyRole::Enemy { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

/// Typed lookup from body handle to game role.
///
/// Ordered by handle so iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    roles: BTreeMap<BodyHandle, BodyRole>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: BodyHandle, role: BodyRole) {
        self.roles.insert(body, role);
    }

    pub fn remove(&mut self, body: BodyHandle) -> Option<BodyRole> {
        self.roles.remove(&body)
    }

    pub fn role(&self, body: BodyHandle) -> Option<&BodyRole> {
        self.roles.get(&body)
    }

    pub fn contains(&self, body: BodyHandle) -> bool {
        self.roles.contains_key(&body)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &BodyRole)> {
        self.roles.iter().map(|(h, r)| (*h, r))
    }

    /// Handles of every patrolling enemy, in handle order
    pub fn enemies(&self) -> Vec<BodyHandle> {
        self.roles
            .iter()
            .filter(|(_, r)| matches!(r, BodyRole::Enemy { .. }))
            .map(|(h, _)| *h)
            .collect()
    }

    pub fn patrol_mut(&mut self, body: BodyHandle) -> Option<&mut Patrol> {
        match self.roles.get_mut(&body) {
            Some(BodyRole::Enemy { patrol, .. }) => Some(patrol),
            _ => None,
        }
    }
}

/// Cooldown record for one ability (timestamps in ms)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    /// `None` until first use
    pub last_used: Option<f64>,
    pub duration_ms: f64,
}

impl Cooldown {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            last_used: None,
            duration_ms,
        }
    }

    pub fn ready(&self, now: f64) -> bool {
        match self.last_used {
            None => true,
            Some(last) => now - last >= self.duration_ms,
        }
    }

    /// 0 right after use, 1 when ready
    pub fn fraction(&self, now: f64) -> f32 {
        match self.last_used {
            None => 1.0,
            Some(_) if self.duration_ms <= 0.0 => 1.0,
            Some(last) => ((now - last) / self.duration_ms).clamp(0.0, 1.0) as f32,
        }
    }

    pub fn trigger(&mut self, now: f64) {
        self.last_used = Some(now);
    }
}

/// Per-ability cooldowns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldowns([Cooldown; 4]);

impl Cooldowns {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self(Ability::ALL.map(|a| Cooldown::new(tuning.ability(a).cooldown_ms)))
    }

    pub fn get(&self, ability: Ability) -> &Cooldown {
        &self.0[ability.index()]
    }

    pub fn get_mut(&mut self, ability: Ability) -> &mut Cooldown {
        &mut self.0[ability.index()]
    }
}

/// Bounded energy pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    value: f32,
    max: f32,
}

impl Energy {
    /// Full pool
    pub fn full(max: f32) -> Self {
        let max = max.max(0.0);
        Self { value: max, max }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.value / self.max
        }
    }

    pub fn set(&mut self, value: f32) {
        self.value = value.clamp(0.0, self.max);
    }

    pub fn can_afford(&self, cost: f32) -> bool {
        self.value >= cost
    }

    /// All-or-nothing spend
    pub fn try_spend(&mut self, cost: f32) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.set(self.value - cost);
        true
    }

    pub fn regen(&mut self, amount: f32) {
        self.set(self.value + amount);
    }

    /// Raise to at least `floor`, never lowering
    pub fn floor_at(&mut self, floor: f32) {
        self.set(self.value.max(floor));
    }
}

/// Last touched respawn anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub position: Vec2,
    pub stage: u32,
}

/// Desired weapon orientation and extension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringTarget {
    pub angle: f32,
    pub reach: f32,
}

impl SteeringTarget {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            angle: tuning.default_angle,
            reach: tuning.default_reach.clamp(tuning.min_reach, tuning.max_reach),
        }
    }

    /// Anchor position for a pivot at `pivot`
    pub fn anchor_for(&self, pivot: Vec2) -> Vec2 {
        pivot + crate::direction(self.angle) * self.reach
    }
}

/// Run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    pub deaths: u32,
    pub coins: u32,
}

/// Active grapple; the joint is owned by the run until released
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HookState {
    pub joint: JointHandle,
    /// Hooked body and the anchor offset from its center
    pub target: BodyHandle,
    pub target_offset: Vec2,
    pub until: f64,
}

/// Handles of the player mechanism
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rig {
    pub pivot: BodyHandle,
    pub weapon: BodyHandle,
    pub anchor: BodyHandle,
    pub pivot_joint: JointHandle,
    pub steer_joint: JointHandle,
}

/// Everything one run mutates
#[derive(Debug, Clone)]
pub struct RunState {
    pub seed: u64,
    pub registry: BodyRegistry,
    pub rig: Option<Rig>,
    /// X coordinate that counts as 100% progress
    pub goal_x: f32,
    pub checkpoint: Checkpoint,
    pub energy: Energy,
    pub cooldowns: Cooldowns,
    pub counters: RunCounters,
    pub steering: SteeringTarget,
    pub camera: Vec2,
    pub hook: Option<HookState>,
    /// Slow-mo expiry (ms); `None` when never used
    pub slow_until: Option<f64>,
    pub started_at: f64,
}

impl RunState {
    /// Fresh state for a run starting at `now`
    pub fn new(seed: u64, tuning: &Tuning, now: f64) -> Self {
        let spawn = crate::sim::rig::pivot_spawn(tuning);
        Self {
            seed,
            registry: BodyRegistry::new(),
            rig: None,
            goal_x: tuning.goal_x(),
            checkpoint: Checkpoint {
                position: spawn,
                stage: 1,
            },
            energy: Energy::full(tuning.energy_max),
            cooldowns: Cooldowns::from_tuning(tuning),
            counters: RunCounters::default(),
            steering: SteeringTarget::from_tuning(tuning),
            camera: spawn,
            hook: None,
            slow_until: None,
            started_at: now,
        }
    }

    pub fn slow_active(&self, now: f64) -> bool {
        self.slow_until.is_some_and(|until| now < until)
    }

    /// Physics time scale for a tick at `now`
    pub fn time_scale(&self, now: f64, tuning: &Tuning) -> f32 {
        if self.slow_active(now) {
            tuning.slow_time_scale
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cooldown_ready_and_fraction() {
        let mut cd = Cooldown::new(900.0);
        assert!(cd.ready(0.0));
        assert_eq!(cd.fraction(0.0), 1.0);

        cd.trigger(1000.0);
        assert!(!cd.ready(1899.0));
        assert!(cd.ready(1900.0));
        assert!((cd.fraction(1450.0) - 0.5).abs() < 1e-6);
        assert_eq!(cd.fraction(5000.0), 1.0);
    }

    #[test]
    fn test_energy_spend_is_all_or_nothing() {
        let mut energy = Energy::full(100.0);
        assert!(energy.try_spend(26.0));
        assert_eq!(energy.value(), 74.0);
        assert!(!energy.try_spend(80.0));
        assert_eq!(energy.value(), 74.0);
    }

    #[test]
    fn test_energy_floor_never_lowers() {
        let mut energy = Energy::full(100.0);
        energy.floor_at(40.0);
        assert_eq!(energy.value(), 100.0);

        energy.set(12.0);
        energy.floor_at(40.0);
        assert_eq!(energy.value(), 40.0);
    }

    #[test]
    fn test_patrol_reverses_at_bounds() {
        let mut patrol = Patrol {
            min_x: 100.0,
            max_x: 260.0,
            dir: 1.0,
            speed: 90.0,
        };
        assert_eq!(patrol.steer(200.0), 90.0);
        assert_eq!(patrol.steer(261.0), -90.0);
        assert_eq!(patrol.steer(200.0), -90.0);
        assert_eq!(patrol.steer(99.0), 90.0);
    }

    #[test]
    fn test_registry_enemy_lookup() {
        let mut registry = BodyRegistry::new();
        registry.insert(BodyHandle(3), BodyRole::Wall);
        registry.insert(
            BodyHandle(1),
            BodyRole::Enemy {
                stage: 3,
                patrol: Patrol {
                    min_x: 0.0,
                    max_x: 10.0,
                    dir: -1.0,
                    speed: 80.0,
                },
            },
        );
        assert_eq!(registry.enemies(), vec![BodyHandle(1)]);
        assert!(registry.patrol_mut(BodyHandle(3)).is_none());
        assert!(registry.role(BodyHandle(3)).is_some_and(|r| r.is_hookable()));
        assert_eq!(registry.role(BodyHandle(1)).and_then(|r| r.stage()), Some(3));
    }

    proptest! {
        #[test]
        fn prop_energy_stays_in_bounds(ops in proptest::collection::vec((0u8..3, 0.0f32..60.0), 0..64)) {
            let mut energy = Energy::full(100.0);
            for (op, amount) in ops {
                let before = energy.value();
                match op {
                    0 => {
                        let spent = energy.try_spend(amount);
                        if spent {
                            prop_assert!((energy.value() - (before - amount)).abs() < 1e-3);
                        } else {
                            prop_assert_eq!(energy.value(), before);
                        }
                    }
                    1 => energy.regen(amount),
                    _ => energy.floor_at(amount),
                }
                prop_assert!(energy.value() >= 0.0);
                prop_assert!(energy.value() <= energy.max());
            }
        }

        #[test]
        fn prop_cooldown_fraction_bounded(duration in 1.0f64..10_000.0, used in 0.0f64..1e6, dt in -1e4f64..1e5) {
            let mut cd = Cooldown::new(duration);
            cd.trigger(used);
            let f = cd.fraction(used + dt);
            prop_assert!((0.0..=1.0).contains(&f));
            prop_assert_eq!(cd.ready(used + dt), (used + dt) - used >= duration);
        }
    }
}
