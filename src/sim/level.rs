//! Procedural level generation
//!
//! Levels are a left-to-right staircase of stages. Planning is pure (tuning +
//! seeded RNG in, placements out); spawning pushes a plan into a physics world
//! and the body registry.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{BodyRegistry, BodyRole, Patrol};
use crate::physics::{BodyDesc, PhysicsWorld, Shape};
use crate::tuning::Tuning;

/// Checkpoint marker radius
pub const CHECKPOINT_RADIUS: f32 = 18.0;
/// Coin radius
pub const COIN_RADIUS: f32 = 12.0;
/// Decoration radius
pub const DECORATION_RADIUS: f32 = 18.0;
/// Enemy box
pub const ENEMY_SIZE: Vec2 = Vec2::new(44.0, 54.0);

/// Side wall box and the tall tower platform
const WALL_SIZE: Vec2 = Vec2::new(800.0, 8000.0);
const TOWER_SIZE: Vec2 = Vec2::new(50.0, 240.0);
const FLOOR_HEIGHT: f32 = 140.0;

/// One body to be created
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub role: BodyRole,
    pub shape: Shape,
    pub position: Vec2,
}

impl Placement {
    fn rect(role: BodyRole, position: Vec2, size: Vec2) -> Self {
        Self {
            role,
            shape: Shape::Rect {
                width: size.x,
                height: size.y,
            },
            position,
        }
    }

    fn circle(role: BodyRole, position: Vec2, radius: f32) -> Self {
        Self {
            role,
            shape: Shape::Circle { radius },
            position,
        }
    }

    /// Physical description for this placement's role
    pub fn body_desc(&self) -> BodyDesc {
        let desc = match self.role {
            BodyRole::Platform { .. } | BodyRole::Wall | BodyRole::Floor => {
                BodyDesc::fixed(self.shape).with_friction(0.9)
            }
            BodyRole::Checkpoint { .. } | BodyRole::Coin { .. } | BodyRole::Decoration { .. } => {
                BodyDesc::fixed(self.shape).sensor()
            }
            BodyRole::Enemy { .. } => BodyDesc::dynamic(self.shape)
                .with_friction(0.7)
                .with_density(0.002)
                .with_fixed_rotation(true),
            // Rig bodies are never planned
            BodyRole::Player | BodyRole::Weapon | BodyRole::Anchor => BodyDesc::fixed(self.shape),
        };
        desc.at(self.position)
    }
}

/// Output of [`plan_level`]
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPlan {
    /// Bounds first, then stage contents in increasing stage order
    pub placements: Vec<Placement>,
    pub goal_x: f32,
}

impl LevelPlan {
    pub fn count(&self, pred: impl Fn(&BodyRole) -> bool) -> usize {
        self.placements.iter().filter(|p| pred(&p.role)).count()
    }
}

/// Base platform center for a stage (1-based)
pub fn stage_origin(tuning: &Tuning, stage: u32) -> Vec2 {
    let level = &tuning.level;
    let i = stage.saturating_sub(1) as f32;
    Vec2::new(
        i * level.stage_width + 260.0,
        level.stage_base_y - i * level.stage_step_up,
    )
}

/// Lay out a complete level. Deterministic for a given RNG state.
pub fn plan_level(tuning: &Tuning, rng: &mut Pcg32) -> LevelPlan {
    let level = &tuning.level;
    let n = level.stage_count;
    let span = n as f32 * level.stage_width;
    let mut placements = Vec::new();

    placements.push(Placement::rect(BodyRole::Wall, Vec2::new(-400.0, 0.0), WALL_SIZE));
    placements.push(Placement::rect(BodyRole::Wall, Vec2::new(span + 900.0, 0.0), WALL_SIZE));
    placements.push(Placement::rect(
        BodyRole::Floor,
        Vec2::new(500.0, level.stage_base_y + 140.0),
        Vec2::new(span + 2000.0, FLOOR_HEIGHT),
    ));

    for stage in 1..=n {
        let origin = stage_origin(tuning, stage);
        let (x, y) = (origin.x, origin.y);

        let block = Vec2::new(level.stage_block_w, level.stage_block_h);
        placements.push(Placement::rect(
            BodyRole::Platform { stage, size: block },
            origin,
            block,
        ));

        let (ledge_pos, ledge_size) = if stage % 2 == 0 {
            (Vec2::new(x + 220.0, y - 70.0), Vec2::new(260.0, 40.0))
        } else {
            (Vec2::new(x - 220.0, y - 60.0), Vec2::new(240.0, 36.0))
        };
        placements.push(Placement::rect(
            BodyRole::Platform {
                stage,
                size: ledge_size,
            },
            ledge_pos,
            ledge_size,
        ));

        if stage == 1 || stage % level.checkpoint_every == 0 {
            placements.push(Placement::circle(
                BodyRole::Checkpoint { stage },
                Vec2::new(x + 120.0, y - 70.0),
                CHECKPOINT_RADIUS,
            ));
        }

        if stage % 2 == 1 {
            placements.push(Placement::circle(
                BodyRole::Coin { stage },
                Vec2::new(x - 60.0, y - 95.0),
                COIN_RADIUS,
            ));
        }
        if stage % level.bonus_coin_every == 0 {
            placements.push(Placement::circle(
                BodyRole::Coin { stage },
                Vec2::new(x + 80.0, y - 120.0),
                COIN_RADIUS,
            ));
        }

        if stage % level.plant_every == 0 {
            let dx: f32 = rng.random_range(-80.0..80.0);
            placements.push(Placement::circle(
                BodyRole::Decoration { stage },
                Vec2::new(x + dx, y - 40.0),
                DECORATION_RADIUS,
            ));
        }

        if stage % level.enemy_every == 0 && stage < n {
            let ex = x + 100.0;
            let dir = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
            let speed = if level.enemy_speed_max > level.enemy_speed_min {
                rng.random_range(level.enemy_speed_min..level.enemy_speed_max)
            } else {
                level.enemy_speed_min
            };
            let patrol = Patrol {
                min_x: ex - level.enemy_patrol_half_span,
                max_x: ex + level.enemy_patrol_half_span,
                dir,
                speed,
            };
            placements.push(Placement::rect(
                BodyRole::Enemy { stage, patrol },
                Vec2::new(ex, y - 70.0),
                ENEMY_SIZE,
            ));
        }

        if stage % level.tower_every == 0 {
            placements.push(Placement::rect(
                BodyRole::Platform {
                    stage,
                    size: TOWER_SIZE,
                },
                Vec2::new(x + 260.0, y - 120.0),
                TOWER_SIZE,
            ));
        }
    }

    LevelPlan {
        placements,
        goal_x: tuning.goal_x(),
    }
}

/// Create every planned body and register its role
pub fn spawn_level<W: PhysicsWorld>(world: &mut W, registry: &mut BodyRegistry, plan: &LevelPlan) {
    for placement in &plan.placements {
        let handle = world.add_body(&placement.body_desc());
        registry.insert(handle, placement.role);
    }

    log::info!(
        "Level spawned: {} bodies, {} coins, {} checkpoints, {} enemies, goal_x={}",
        plan.placements.len(),
        plan.count(|r| matches!(r, BodyRole::Coin { .. })),
        plan.count(|r| matches!(r, BodyRole::Checkpoint { .. })),
        plan.count(|r| matches!(r, BodyRole::Enemy { .. })),
        plan.goal_x
    );
}
