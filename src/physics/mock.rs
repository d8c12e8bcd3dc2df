//! Deterministic stand-in physics world for tests.
//!
//! Bodies drift with their velocity (no gravity, no collision response),
//! ray casts test axis-aligned boxes, and contacts are scripted by the test.

use std::collections::BTreeMap;

use glam::Vec2;

use super::{
    BodyDesc, BodyHandle, BodyKind, BodyState, CollisionFilter, ContactPair, JointDesc,
    JointHandle, PhysicsBackend, PhysicsWorld, RayHit,
};
use crate::error::GameError;

#[derive(Debug, Clone)]
pub struct MockBody {
    pub desc: BodyDesc,
    pub state: BodyState,
}

#[derive(Debug, Default)]
pub struct MockWorld {
    pub bodies: BTreeMap<BodyHandle, MockBody>,
    pub joints: BTreeMap<JointHandle, JointDesc>,
    pub gravity: Vec2,
    /// Every dt passed to `step`
    pub steps: Vec<f32>,
    /// Every impulse applied, in order
    pub impulses: Vec<(BodyHandle, Vec2)>,
    pending_contacts: Vec<ContactPair>,
    next_body: u32,
    next_joint: u32,
}

impl MockWorld {
    /// Queue a contact to be reported by the next drain
    pub fn push_contact(&mut self, a: BodyHandle, b: BodyHandle) {
        self.pending_contacts.push(ContactPair::new(a, b));
    }

    pub fn joint(&self, joint: JointHandle) -> Option<&JointDesc> {
        self.joints.get(&joint)
    }

    pub fn body(&self, body: BodyHandle) -> Option<&MockBody> {
        self.bodies.get(&body)
    }
}

impl PhysicsWorld for MockWorld {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_body);
        self.next_body += 1;
        self.bodies.insert(
            handle,
            MockBody {
                desc: desc.clone(),
                state: BodyState {
                    position: desc.position,
                    ..Default::default()
                },
            },
        );
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        if self.bodies.remove(&body).is_none() {
            return false;
        }
        self.joints.retain(|_, j| j.body_a != body && j.body_b != body);
        true
    }

    fn add_joint(&mut self, desc: &JointDesc) -> JointHandle {
        let handle = JointHandle(self.next_joint);
        self.next_joint += 1;
        self.joints.insert(handle, *desc);
        handle
    }

    fn remove_joint(&mut self, joint: JointHandle) -> bool {
        self.joints.remove(&joint).is_some()
    }

    fn contains_joint(&self, joint: JointHandle) -> bool {
        self.joints.contains_key(&joint)
    }

    fn body_state(&self, body: BodyHandle) -> Option<BodyState> {
        self.bodies.get(&body).map(|b| b.state)
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec2) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.state.position = position;
        }
    }

    fn set_angle(&mut self, body: BodyHandle, angle: f32) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.state.angle = angle;
        }
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.state.velocity = velocity;
        }
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, angular_velocity: f32) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.state.angular_velocity = angular_velocity;
        }
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2, _point: Vec2) {
        if self.bodies.contains_key(&body) {
            self.impulses.push((body, impulse));
        }
    }

    fn step(&mut self, dt: f32) {
        self.steps.push(dt);
        for body in self.bodies.values_mut() {
            if body.desc.kind == BodyKind::Dynamic {
                body.state.position += body.state.velocity * dt;
                body.state.angle += body.state.angular_velocity * dt;
            }
        }
    }

    fn drain_contacts(&mut self) -> Vec<ContactPair> {
        std::mem::take(&mut self.pending_contacts)
    }

    fn cast_ray(
        &mut self,
        from: Vec2,
        to: Vec2,
        filter: &dyn Fn(BodyHandle) -> bool,
    ) -> Option<RayHit> {
        let delta = to - from;
        let mut best: Option<(f32, BodyHandle)> = None;

        for (&handle, body) in &self.bodies {
            if body.desc.sensor || body.desc.filter == CollisionFilter::Disabled || !filter(handle) {
                continue;
            }
            let half = body.desc.shape.half_extents();
            let min = body.state.position - half;
            let max = body.state.position + half;
            if let Some(t) = segment_aabb(from, delta, min, max) {
                if best.is_none_or(|(bt, _)| t < bt) {
                    best = Some((t, handle));
                }
            }
        }

        best.map(|(t, body)| RayHit {
            body,
            point: from + delta * t,
        })
    }
}

/// Slab test; returns the entry parameter in [0, 1]
fn segment_aabb(origin: Vec2, delta: Vec2, min: Vec2, max: Vec2) -> Option<f32> {
    let mut t_min: f32 = 0.0;
    let mut t_max: f32 = 1.0;
    for axis in 0..2 {
        let (o, d, lo, hi) = (origin[axis], delta[axis], min[axis], max[axis]);
        if d.abs() < 1e-6 {
            if o < lo || o > hi {
                return None;
            }
        } else {
            let inv = 1.0 / d;
            let (mut t1, mut t2) = ((lo - o) * inv, (hi - o) * inv);
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
    }
    Some(t_min)
}

/// Backend handing out [`MockWorld`]s, or failing on demand
#[derive(Debug, Default)]
pub struct MockBackend {
    pub unavailable: bool,
    pub worlds_created: u32,
}

impl PhysicsBackend for MockBackend {
    type World = MockWorld;

    fn create_world(&mut self, gravity: Vec2) -> Result<MockWorld, GameError> {
        if self.unavailable {
            return Err(GameError::ResourceUnavailable("mock engine offline".into()));
        }
        self.worlds_created += 1;
        Ok(MockWorld {
            gravity,
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Shape;

    #[test]
    fn test_ray_hits_nearest_box() {
        let mut world = MockWorld::default();
        let far = world.add_body(
            &BodyDesc::fixed(Shape::Rect { width: 20.0, height: 20.0 }).at(Vec2::new(200.0, 0.0)),
        );
        let near = world.add_body(
            &BodyDesc::fixed(Shape::Rect { width: 20.0, height: 20.0 }).at(Vec2::new(100.0, 0.0)),
        );

        let hit = world
            .cast_ray(Vec2::ZERO, Vec2::new(300.0, 0.0), &|_| true)
            .expect("hit");
        assert_eq!(hit.body, near);
        assert!((hit.point.x - 90.0).abs() < 1e-3);

        let hit = world
            .cast_ray(Vec2::ZERO, Vec2::new(300.0, 0.0), &|b| b == far)
            .expect("filtered hit");
        assert_eq!(hit.body, far);

        assert!(world.cast_ray(Vec2::ZERO, Vec2::new(50.0, 0.0), &|_| true).is_none());
    }

    #[test]
    fn test_remove_body_drops_attached_joints() {
        let mut world = MockWorld::default();
        let shape = Shape::Circle { radius: 5.0 };
        let a = world.add_body(&BodyDesc::dynamic(shape));
        let b = world.add_body(&BodyDesc::dynamic(shape));
        let joint = world.add_joint(&JointDesc {
            body_a: a,
            anchor_a: Vec2::ZERO,
            body_b: b,
            anchor_b: Vec2::ZERO,
            rest_length: 0.0,
            stiffness: 1.0,
            damping: 0.0,
        });
        assert!(world.remove_body(b));
        assert!(!world.contains_joint(joint));
        assert!(!world.remove_body(b));
    }
}
