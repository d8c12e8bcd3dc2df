//! Hammer Ascent headless runner
//!
//! Plays a run with the demo autopilot on the rapier2d backend and logs the
//! HUD once per simulated second.
//!
//! Usage: `hammer-ascent [tuning.json] [seconds]`

use std::process::ExitCode;

use hammer_ascent::consts::*;
use hammer_ascent::physics::RapierBackend;
use hammer_ascent::sim::{Autopilot, Game, GamePhase};
use hammer_ascent::{ManualClock, Tuning};

/// Simulated render rate; each frame covers two fixed ticks
const FRAME_DT: f32 = 1.0 / 30.0;
const DEFAULT_SECONDS: f64 = 30.0;

struct Args {
    tuning: Option<String>,
    seconds: f64,
}

fn parse_args() -> Args {
    let mut args = Args {
        tuning: None,
        seconds: DEFAULT_SECONDS,
    };
    for arg in std::env::args().skip(1) {
        match arg.parse::<f64>() {
            Ok(seconds) if seconds > 0.0 => args.seconds = seconds,
            _ => args.tuning = Some(arg),
        }
    }
    args
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Hammer Ascent (headless) starting...");

    let args = parse_args();
    let tuning = match args.tuning.as_deref() {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::error!("Failed to load tuning from {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    let clock = ManualClock::new(0.0);
    let mut game = Game::new(RapierBackend, clock.clone(), tuning);
    if let Err(err) = game.start_run() {
        log::error!("{err}");
        return ExitCode::FAILURE;
    }

    let mut pilot = Autopilot::new();
    let frame_ms = FRAME_DT as f64 * 1000.0;
    let frames = (args.seconds * 1000.0 / frame_ms).ceil() as u64;
    let mut next_report = 1000.0;
    let mut ticks = 0u64;

    for _ in 0..frames {
        clock.advance(frame_ms);

        let input = match (game.run_state(), game.world()) {
            (Some(run), Some(world)) => pilot.next_input(run, world, game.hud()),
            _ => Default::default(),
        };
        ticks += game.frame(FRAME_DT, &input) as u64;

        if game.hud().elapsed_ms >= next_report {
            log::info!("{}", game.hud().summary());
            if let Some(notice) = &game.hud().notice {
                log::debug!("  notice: {notice}");
            }
            next_report += 1000.0;
        }

        if game.phase() != GamePhase::Playing {
            break;
        }
    }

    let hud = game.hud();
    log::info!(
        "Finished after {} ticks ({} sim time): stage {}, progress {:.0}%, coins {}, deaths {}",
        ticks,
        hud.elapsed,
        hud.stage,
        hud.progress * 100.0,
        hud.coins,
        hud.deaths
    );
    println!("{}", hud.summary());
    ExitCode::SUCCESS
}
