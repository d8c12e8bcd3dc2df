//! Physics engine boundary
//!
//! The simulation core never integrates forces itself. It describes bodies
//! and spring joints, pokes positions and impulses, steps the world, and reads
//! back contacts and ray hits through [`PhysicsWorld`]. A [`PhysicsBackend`]
//! produces a fresh world for each run.
//!
//! Coordinates are pixels with Y pointing down.

pub mod rapier;

#[cfg(test)]
pub(crate) mod mock;

pub use rapier::{RapierBackend, RapierWorld};

use glam::Vec2;

use crate::error::GameError;

/// Opaque reference to a body owned by a physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub u32);

/// Opaque reference to a joint owned by a physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JointHandle(pub u32);

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves
    Static,
    /// Integrated by the engine
    Dynamic,
    /// Moved only by explicit position writes, infinite mass
    Kinematic,
}

/// Collision shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

impl Shape {
    /// Axis-aligned half extents (ignores rotation)
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Rect { width, height } => Vec2::new(width, height) * 0.5,
        }
    }
}

/// Which bodies a body may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionFilter {
    /// Collides with everything
    #[default]
    Default,
    /// Collides with everything except other members of the rig group
    RigGroup,
    /// Collides with nothing and is invisible to ray casts
    Disabled,
}

/// Description of a body before creation
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub shape: Shape,
    pub position: Vec2,
    pub friction: f32,
    pub restitution: f32,
    pub density: f32,
    /// Velocity decay (1/s)
    pub linear_damping: f32,
    /// Reports contacts but produces no collision response
    pub sensor: bool,
    pub fixed_rotation: bool,
    pub filter: CollisionFilter,
}

impl BodyDesc {
    fn with_kind(kind: BodyKind, shape: Shape) -> Self {
        Self {
            kind,
            shape,
            position: Vec2::ZERO,
            friction: 0.1,
            restitution: 0.0,
            density: 0.001,
            linear_damping: 0.0,
            sensor: false,
            fixed_rotation: false,
            filter: CollisionFilter::Default,
        }
    }

    pub fn fixed(shape: Shape) -> Self {
        Self::with_kind(BodyKind::Static, shape)
    }

    pub fn dynamic(shape: Shape) -> Self {
        Self::with_kind(BodyKind::Dynamic, shape)
    }

    pub fn kinematic(shape: Shape) -> Self {
        Self::with_kind(BodyKind::Kinematic, shape)
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Spring link between two bodies.
///
/// Anchors are offsets in each body's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointDesc {
    pub body_a: BodyHandle,
    pub anchor_a: Vec2,
    pub body_b: BodyHandle,
    pub anchor_b: Vec2,
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

/// Kinematic snapshot of a body
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyState {
    pub position: Vec2,
    pub angle: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
}

/// Two bodies that started touching during the last step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactPair {
    pub a: BodyHandle,
    pub b: BodyHandle,
}

impl ContactPair {
    pub fn new(a: BodyHandle, b: BodyHandle) -> Self {
        Self { a, b }
    }
}

/// First intersection of a ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub body: BodyHandle,
    pub point: Vec2,
}

/// A live physics world.
///
/// Operations on handles the world no longer knows are no-ops (setters) or
/// report absence (getters, removals); they never panic.
pub trait PhysicsWorld {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyHandle;

    /// Remove a body and any joints attached to it. Returns false if unknown.
    fn remove_body(&mut self, body: BodyHandle) -> bool;

    fn add_joint(&mut self, desc: &JointDesc) -> JointHandle;

    /// Returns false if the joint was already gone.
    fn remove_joint(&mut self, joint: JointHandle) -> bool;

    fn contains_joint(&self, joint: JointHandle) -> bool;

    fn body_state(&self, body: BodyHandle) -> Option<BodyState>;

    fn set_position(&mut self, body: BodyHandle, position: Vec2);

    fn set_angle(&mut self, body: BodyHandle, angle: f32);

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2);

    fn set_angular_velocity(&mut self, body: BodyHandle, angular_velocity: f32);

    /// Instantaneous impulse applied at a world-space point
    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2, point: Vec2);

    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);

    /// Pairs that started touching since the previous drain
    fn drain_contacts(&mut self) -> Vec<ContactPair>;

    /// First hit along the segment `from → to` among bodies accepted by `filter`.
    ///
    /// Bodies added or removed since the last step are visible to the query.
    fn cast_ray(
        &mut self,
        from: Vec2,
        to: Vec2,
        filter: &dyn Fn(BodyHandle) -> bool,
    ) -> Option<RayHit>;

    fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.body_state(body).map(|s| s.position)
    }
}

/// Factory for physics worlds.
pub trait PhysicsBackend {
    type World: PhysicsWorld;

    /// Create an empty world with the given gravity (px/s²).
    fn create_world(&mut self, gravity: Vec2) -> Result<Self::World, GameError>;

    /// Human-readable engine name (e.g., "rapier2d").
    fn name(&self) -> &str;
}
