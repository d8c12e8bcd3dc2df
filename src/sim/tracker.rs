//! Progress and camera tracking

use glam::Vec2;

use crate::tuning::Tuning;

/// Stage the pivot is over, 1-based
pub fn stage_at(x: f32, tuning: &Tuning) -> u32 {
    let level = &tuning.level;
    let raw = 1.0 + (x / level.stage_width).floor();
    raw.clamp(1.0, level.stage_count as f32) as u32
}

/// Height readout; 1 unit per 10 px above y = 0
pub fn height_at(y: f32) -> u32 {
    (-y / 10.0).round().max(0.0) as u32
}

/// Fraction of the level covered, in [0, 1]
pub fn progress_at(x: f32, goal_x: f32, tuning: &Tuning) -> f32 {
    let start = tuning.progress_pad_start;
    let end = goal_x - tuning.progress_pad_end;
    if end <= start {
        return if x >= end { 1.0 } else { 0.0 };
    }
    ((x - start) / (end - start)).clamp(0.0, 1.0)
}

/// Ease the camera one tick toward the pivot (offset upward)
pub fn follow_camera(camera: &mut Vec2, pivot: Vec2, tuning: &Tuning) {
    let target = pivot + tuning.cam_offset;
    *camera += (target - *camera) * tuning.cam_smooth;
}

/// Project a world point into a viewport centered on the camera
pub fn world_to_screen(point: Vec2, camera: Vec2, zoom: f32, viewport: Vec2) -> Vec2 {
    (point - camera) * zoom + viewport * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_stage_clamped() {
        let tuning = Tuning::default();
        assert_eq!(stage_at(-500.0, &tuning), 1);
        assert_eq!(stage_at(0.0, &tuning), 1);
        assert_eq!(stage_at(519.0, &tuning), 1);
        assert_eq!(stage_at(520.0, &tuning), 2);
        assert_eq!(stage_at(1e6, &tuning), 20);
    }

    #[test]
    fn test_height() {
        assert_eq!(height_at(760.0), 0);
        assert_eq!(height_at(0.0), 0);
        assert_eq!(height_at(-125.0), 13);
    }

    #[test]
    fn test_progress_endpoints() {
        let tuning = Tuning::default();
        let goal = tuning.goal_x();
        assert_eq!(progress_at(80.0, goal, &tuning), 0.0);
        assert_eq!(progress_at(goal - 280.0, goal, &tuning), 1.0);
        let mid = progress_at((80.0 + goal - 280.0) / 2.0, goal, &tuning);
        assert!((mid - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_camera_eases() {
        let tuning = Tuning::default();
        let mut camera = Vec2::ZERO;
        follow_camera(&mut camera, Vec2::new(100.0, 80.0), &tuning);
        assert!((camera - Vec2::new(10.0, 0.0)).length() < 1e-5);
        for _ in 0..500 {
            follow_camera(&mut camera, Vec2::new(100.0, 80.0), &tuning);
        }
        assert!((camera - Vec2::new(100.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_world_to_screen_centers_camera() {
        let viewport = Vec2::new(1280.0, 720.0);
        let camera = Vec2::new(500.0, 300.0);
        assert_eq!(world_to_screen(camera, camera, 1.0, viewport), Vec2::new(640.0, 360.0));
        assert_eq!(
            world_to_screen(Vec2::new(510.0, 290.0), camera, 2.0, viewport),
            Vec2::new(660.0, 340.0)
        );
    }

    proptest! {
        #[test]
        fn prop_progress_monotonic(a in -2000.0f32..20_000.0, b in -2000.0f32..20_000.0) {
            let tuning = Tuning::default();
            let goal = tuning.goal_x();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let p_lo = progress_at(lo, goal, &tuning);
            let p_hi = progress_at(hi, goal, &tuning);
            prop_assert!((0.0..=1.0).contains(&p_lo));
            prop_assert!((0.0..=1.0).contains(&p_hi));
            prop_assert!(p_lo <= p_hi);
        }
    }
}
