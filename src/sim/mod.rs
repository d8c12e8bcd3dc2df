//! Gameplay simulation module
//!
//! All gameplay logic lives here. Physics is delegated to a
//! [`PhysicsWorld`](crate::physics::PhysicsWorld); everything else is:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by body handle)
//! - Clock read once per tick

pub mod abilities;
pub mod autopilot;
pub mod level;
pub mod reactor;
pub mod rig;
pub mod state;
pub mod tick;
pub mod tracker;

pub use abilities::{AbilityResult, Activation, release_hook};
pub use autopilot::Autopilot;
pub use level::{LevelPlan, Placement, plan_level, spawn_level};
pub use reactor::{ContactEvent, ContactReport, apply_contacts, classify, respawn};
pub use state::{
    Ability, BodyRegistry, BodyRole, Checkpoint, Cooldown, Cooldowns, Energy, GamePhase,
    HookState, Patrol, Rig, RunCounters, RunState, SteeringTarget,
};
pub use tick::{Game, HELP_TEXT, TickInput};
pub use tracker::{follow_camera, world_to_screen};
