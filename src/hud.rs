//! HUD readout
//!
//! The presentation layer never reads simulation state directly; it gets a
//! [`HudSnapshot`] per tick plus whatever notice is currently showing.

use glam::Vec2;
use serde::Serialize;

use crate::physics::PhysicsWorld;
use crate::sim::abilities::hook_rope;
use crate::sim::state::{Ability, GamePhase, RunState};
use crate::sim::tracker;
use crate::tuning::Tuning;

/// Default notice duration (ms)
pub const NOTICE_MS: f64 = 1800.0;
/// Run-start notice duration (ms)
pub const START_NOTICE_MS: f64 = 2000.0;
/// Help text duration (ms)
pub const HELP_NOTICE_MS: f64 = 3600.0;
/// Missing physics engine notice duration (ms)
pub const UNAVAILABLE_NOTICE_MS: f64 = 4000.0;

/// Transient message for the player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub text: String,
    /// Clock time (ms) after which the notice is gone
    pub until: f64,
}

/// Holds at most one notice; a new one replaces the old.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, text: impl Into<String>, duration_ms: f64, now: f64) {
        let text = text.into();
        log::info!("Notice: {text}");
        self.current = Some(Notice {
            text,
            until: now + duration_ms,
        });
    }

    /// Visible notice at `now`
    pub fn current(&self, now: f64) -> Option<&Notice> {
        self.current.as_ref().filter(|n| now < n.until)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Format elapsed milliseconds as `m:ss.s`
pub fn format_elapsed(ms: f64) -> String {
    let tenths = (ms.max(0.0) / 100.0).floor() as u64;
    let minutes = tenths / 600;
    let seconds = (tenths % 600) / 10;
    let tenth = tenths % 10;
    format!("{minutes}:{seconds:02}.{tenth}")
}

/// Cooldown state for one ability
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AbilityReadout {
    pub ability: Ability,
    pub ready: bool,
    /// 0 right after use, 1 when ready
    pub fraction: f32,
}

/// Grapple rope endpoints (world space)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HookRope {
    pub from: Vec2,
    pub to: Vec2,
}

/// Everything the HUD shows for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub elapsed_ms: f64,
    pub elapsed: String,
    pub stage: u32,
    pub height: u32,
    pub coins: u32,
    pub deaths: u32,
    pub energy: f32,
    pub energy_fraction: f32,
    pub progress: f32,
    pub abilities: [AbilityReadout; 4],
    pub camera: Vec2,
    pub zoom: f32,
    pub hook_rope: Option<HookRope>,
    pub slow_motion: bool,
    pub notice: Option<String>,
}

impl HudSnapshot {
    /// Splash-screen readout before any run
    pub fn idle(tuning: &Tuning) -> Self {
        Self {
            phase: GamePhase::Idle,
            elapsed_ms: 0.0,
            elapsed: format_elapsed(0.0),
            stage: 1,
            height: 0,
            coins: 0,
            deaths: 0,
            energy: tuning.energy_max,
            energy_fraction: 1.0,
            progress: 0.0,
            abilities: Ability::ALL.map(|ability| AbilityReadout {
                ability,
                ready: true,
                fraction: 1.0,
            }),
            camera: Vec2::ZERO,
            zoom: tuning.zoom,
            hook_rope: None,
            slow_motion: false,
            notice: None,
        }
    }

    /// Read the run at `now`. Position-derived fields keep their previous
    /// values when the pivot is missing.
    pub fn capture<W: PhysicsWorld>(
        &mut self,
        phase: GamePhase,
        run: &RunState,
        world: &W,
        tuning: &Tuning,
        now: f64,
    ) {
        self.phase = phase;
        if phase != GamePhase::Paused {
            self.elapsed_ms = now - run.started_at;
            self.elapsed = format_elapsed(self.elapsed_ms);
        }

        if let Some(pivot) = run.rig.and_then(|rig| world.position(rig.pivot)) {
            self.stage = tracker::stage_at(pivot.x, tuning);
            self.height = tracker::height_at(pivot.y);
            self.progress = tracker::progress_at(pivot.x, run.goal_x, tuning);
        }

        self.coins = run.counters.coins;
        self.deaths = run.counters.deaths;
        self.energy = run.energy.value();
        self.energy_fraction = run.energy.fraction();
        self.abilities = Ability::ALL.map(|ability| {
            let cooldown = run.cooldowns.get(ability);
            AbilityReadout {
                ability,
                ready: cooldown.ready(now),
                fraction: cooldown.fraction(now),
            }
        });
        self.camera = run.camera;
        self.zoom = tuning.zoom;
        self.hook_rope = hook_rope(run, world).map(|(from, to)| HookRope { from, to });
        self.slow_motion = run.slow_active(now);
    }

    pub fn ability(&self, ability: Ability) -> &AbilityReadout {
        &self.abilities[ability.index()]
    }

    /// One-line status for logs
    pub fn summary(&self) -> String {
        let ready: Vec<&str> = self
            .abilities
            .iter()
            .filter(|a| a.ready)
            .map(|a| a.ability.label())
            .collect();
        format!(
            "[{:?}] {} stage {} height {} progress {:.0}% coins {} deaths {} energy {:.0} ready [{}]{}",
            self.phase,
            self.elapsed,
            self.stage,
            self.height,
            self.progress * 100.0,
            self.coins,
            self.deaths,
            self.energy,
            ready.join(", "),
            if self.hook_rope.is_some() { " hooked" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0.0), "0:00.0");
        assert_eq!(format_elapsed(65_320.0), "1:05.3");
        assert_eq!(format_elapsed(59_999.0), "0:59.9");
        assert_eq!(format_elapsed(600_000.0), "10:00.0");
        assert_eq!(format_elapsed(-5.0), "0:00.0");
    }

    #[test]
    fn test_latest_notice_wins() {
        let mut board = NoticeBoard::new();
        assert!(board.current(0.0).is_none());

        board.post("Checkpoint: stage 3", NOTICE_MS, 1000.0);
        board.post("Dash!", NOTICE_MS, 1200.0);
        assert_eq!(board.current(1300.0).map(|n| n.text.as_str()), Some("Dash!"));
        assert!(board.current(2999.0).is_some());
        assert!(board.current(3000.0).is_none());
    }

    #[test]
    fn test_idle_snapshot() {
        let hud = HudSnapshot::idle(&Tuning::default());
        assert_eq!(hud.phase, GamePhase::Idle);
        assert_eq!(hud.elapsed, "0:00.0");
        assert!(hud.abilities.iter().all(|a| a.ready));
        assert!(hud.summary().contains("Idle"));
    }
}
