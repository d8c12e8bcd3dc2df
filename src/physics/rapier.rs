//! rapier2d implementation of the physics boundary
//!
//! Wraps the Rapier pipeline boilerplate behind [`PhysicsWorld`]. Each body
//! gets a slot index that doubles as its [`BodyHandle`]; the index is stored
//! in the collider's `user_data` so contacts and ray hits map straight back.

use std::collections::HashMap;
use std::sync::Mutex;

use glam::Vec2;
use rapier2d::prelude::*;

// `ContactPair` stays rapier's here; ours is spelled `super::ContactPair`
use super::{
    BodyDesc, BodyHandle, BodyKind, BodyState, CollisionFilter, JointDesc, JointHandle,
    PhysicsBackend, PhysicsWorld, RayHit, Shape,
};
use crate::error::GameError;

// ---------------------------------------------------------------------------
// Conversion helpers (private) - glam <-> nalgebra
// ---------------------------------------------------------------------------

fn to_na(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn to_point(v: Vec2) -> Point<Real> {
    point![v.x, v.y]
}

fn from_na(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Rig bodies share this group and ignore each other
const RIG_GROUP: Group = Group::GROUP_2;

fn interaction_groups(filter: CollisionFilter) -> InteractionGroups {
    match filter {
        CollisionFilter::Default => InteractionGroups::all(),
        CollisionFilter::RigGroup => {
            InteractionGroups::new(RIG_GROUP, Group::ALL.difference(RIG_GROUP))
        }
        CollisionFilter::Disabled => InteractionGroups::none(),
    }
}

// ---------------------------------------------------------------------------
// Event collector
// ---------------------------------------------------------------------------

/// Collects collision-start events during a step
struct StartedCollector {
    started: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl StartedCollector {
    fn new() -> Self {
        Self {
            started: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) -> Vec<(ColliderHandle, ColliderHandle)> {
        match self.started.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl EventHandler for StartedCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let CollisionEvent::Started(h1, h2, _) = event {
            if let Ok(mut guard) = self.started.lock() {
                guard.push((h1, h2));
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

// ---------------------------------------------------------------------------
// RapierWorld
// ---------------------------------------------------------------------------

pub struct RapierWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    /// Colliders changed since the query pipeline was last rebuilt
    queries_stale: bool,
    events: StartedCollector,
    slots: Vec<Option<RigidBodyHandle>>,
    joints: HashMap<JointHandle, ImpulseJointHandle>,
    next_joint: u32,
    contacts: Vec<super::ContactPair>,
}

impl RapierWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            queries_stale: false,
            events: StartedCollector::new(),
            slots: Vec::new(),
            joints: HashMap::new(),
            next_joint: 0,
            contacts: Vec::new(),
        }
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn slot(&self, body: BodyHandle) -> Option<RigidBodyHandle> {
        self.slots.get(body.0 as usize).copied().flatten()
    }

    fn rigid_body_mut(&mut self, body: BodyHandle) -> Option<&mut RigidBody> {
        let slot = self.slot(body)?;
        self.bodies.get_mut(slot)
    }

    fn collider_to_handle(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        let collider = self.colliders.get(collider)?;
        let handle = BodyHandle(collider.user_data as u32);
        self.slot(handle).map(|_| handle)
    }
}

impl PhysicsWorld for RapierWorld {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.slots.len() as u32);

        let builder = match desc.kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
        };
        let rb = builder
            .translation(to_na(desc.position))
            .linear_damping(desc.linear_damping)
            .locked_axes(if desc.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .user_data(handle.0 as u128)
            .build();
        let body = self.bodies.insert(rb);

        // Disabled bodies carry no collider at all
        if desc.filter != CollisionFilter::Disabled {
            let shape = match desc.shape {
                Shape::Circle { radius } => ColliderBuilder::ball(radius),
                Shape::Rect { width, height } => ColliderBuilder::cuboid(width * 0.5, height * 0.5),
            };
            let collider = shape
                .friction(desc.friction)
                .restitution(desc.restitution)
                .density(desc.density)
                .sensor(desc.sensor)
                .collision_groups(interaction_groups(desc.filter))
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .user_data(handle.0 as u128)
                .build();
            self.colliders
                .insert_with_parent(collider, body, &mut self.bodies);
        }

        self.slots.push(Some(body));
        self.queries_stale = true;
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        let Some(slot) = self.slot(body) else {
            return false;
        };
        self.bodies.remove(
            slot,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.slots[body.0 as usize] = None;
        self.queries_stale = true;
        // Rapier drops attached joints with the body; forget their handles too
        let impulse_joints = &self.impulse_joints;
        self.joints.retain(|_, h| impulse_joints.get(*h).is_some());
        true
    }

    fn add_joint(&mut self, desc: &JointDesc) -> JointHandle {
        let handle = JointHandle(self.next_joint);
        self.next_joint += 1;

        let (Some(a), Some(b)) = (self.slot(desc.body_a), self.slot(desc.body_b)) else {
            log::warn!("Joint requested between missing bodies {:?} / {:?}", desc.body_a, desc.body_b);
            return handle;
        };
        let joint = SpringJointBuilder::new(desc.rest_length, desc.stiffness, desc.damping)
            .local_anchor1(to_point(desc.anchor_a))
            .local_anchor2(to_point(desc.anchor_b))
            .build();
        let inner = self.impulse_joints.insert(a, b, joint, true);
        self.joints.insert(handle, inner);
        handle
    }

    fn remove_joint(&mut self, joint: JointHandle) -> bool {
        match self.joints.remove(&joint) {
            Some(inner) => self.impulse_joints.remove(inner, true).is_some(),
            None => false,
        }
    }

    fn contains_joint(&self, joint: JointHandle) -> bool {
        self.joints
            .get(&joint)
            .is_some_and(|h| self.impulse_joints.get(*h).is_some())
    }

    fn body_state(&self, body: BodyHandle) -> Option<BodyState> {
        let rb = self.bodies.get(self.slot(body)?)?;
        Some(BodyState {
            position: from_na(rb.translation()),
            angle: rb.rotation().angle(),
            velocity: from_na(rb.linvel()),
            angular_velocity: rb.angvel(),
        })
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec2) {
        if let Some(rb) = self.rigid_body_mut(body) {
            if rb.is_kinematic() {
                rb.set_next_kinematic_translation(to_na(position));
            } else {
                rb.set_translation(to_na(position), true);
            }
        }
    }

    fn set_angle(&mut self, body: BodyHandle, angle: f32) {
        if let Some(rb) = self.rigid_body_mut(body) {
            rb.set_rotation(Rotation::new(angle), true);
        }
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(rb) = self.rigid_body_mut(body) {
            rb.set_linvel(to_na(velocity), true);
        }
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, angular_velocity: f32) {
        if let Some(rb) = self.rigid_body_mut(body) {
            rb.set_angvel(angular_velocity, true);
        }
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2, point: Vec2) {
        if let Some(rb) = self.rigid_body_mut(body) {
            rb.apply_impulse_at_point(to_na(impulse), to_point(point), true);
        }
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.events,
        );
        self.queries_stale = false;

        for (h1, h2) in self.events.drain() {
            if let (Some(a), Some(b)) = (self.collider_to_handle(h1), self.collider_to_handle(h2)) {
                self.contacts.push(super::ContactPair::new(a, b));
            }
        }
    }

    fn drain_contacts(&mut self) -> Vec<super::ContactPair> {
        std::mem::take(&mut self.contacts)
    }

    fn cast_ray(
        &mut self,
        from: Vec2,
        to: Vec2,
        filter: &dyn Fn(BodyHandle) -> bool,
    ) -> Option<RayHit> {
        let delta = to - from;
        let max_toi = delta.length();
        if max_toi <= f32::EPSILON {
            return None;
        }
        // The pipeline is only rebuilt by `step`; a fresh level has never stepped
        if self.queries_stale {
            self.query_pipeline.update(&self.colliders);
            self.queries_stale = false;
        }
        let ray = Ray::new(to_point(from), to_na(delta / max_toi));
        let predicate = |_: ColliderHandle, collider: &Collider| {
            filter(BodyHandle(collider.user_data as u32))
        };
        let query = QueryFilter::default().exclude_sensors().predicate(&predicate);

        let (collider, toi) =
            self.query_pipeline
                .cast_ray(&self.bodies, &self.colliders, &ray, max_toi, true, query)?;
        let body = self.collider_to_handle(collider)?;
        let hit = ray.point_at(toi);
        Some(RayHit {
            body,
            point: Vec2::new(hit.x, hit.y),
        })
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Produces a fresh [`RapierWorld`] per run
#[derive(Debug, Default, Clone, Copy)]
pub struct RapierBackend;

impl PhysicsBackend for RapierBackend {
    type World = RapierWorld;

    fn create_world(&mut self, gravity: Vec2) -> Result<RapierWorld, GameError> {
        if !gravity.is_finite() {
            return Err(GameError::ResourceUnavailable(format!(
                "cannot build a world with gravity {gravity}"
            )));
        }
        Ok(RapierWorld::new(gravity))
    }

    fn name(&self) -> &str {
        "rapier2d"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
