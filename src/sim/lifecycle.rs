//! Run lifecycle state machine
//!
//! ```text
//! Menu --start/flap--> Playing <--toggle--> Paused
//!                         |
//!                    (collision)
//!                         v
//!                     GameOver --restart--> Playing
//! ```
//!
//! Any mode returns to `Menu` through `reset_round(state, Mode::Menu)`.

use glam::Vec2;

use super::beat::{SyncDebug, TapQuality, evaluate_tap_sync};
use super::environment::sync_from_score;
use super::events::{EventKind, GameEvent, RunSummary};
use super::physics::{apply_flap, resync_to_world};
use super::state::{ChainState, Mode, Passives, RunState};
use crate::consts::{MIN_WORLD_HEIGHT, MIN_WORLD_WIDTH};

/// Return every run counter to its starting value and enter `mode`.
///
/// High score, world size, RNG stream and the debug phase source survive.
pub fn reset_round(state: &mut RunState, mode: Mode) {
    state.events.clear();
    state.mode = mode;
    state.run_time = 0.0;
    state.difficulty_phase = 1;

    let base_x = state.world.width * state.tuning.player.base_x_factor;
    let player = &mut state.player;
    player.radius = state.tuning.player.radius;
    player.base_x = base_x;
    player.pos = Vec2::new(base_x, state.world.height * 0.48);
    player.vel = Vec2::ZERO;

    state.obstacles.clear();
    state.collectibles.clear();
    state.score = 0;
    state.spawn_timer = state.tuning.spawn.initial_delay;
    state.heat = 0.0;
    state.overheat_timer = 0.0;
    state.invulnerability_timer = 0.0;

    state.sync.reset();
    state.chain = ChainState::default();
    state.passives = Passives::default();
    sync_from_score(state, true);
}

/// Begin a run from `Menu`/`GameOver`, or resume from `Paused`
pub fn start_game(state: &mut RunState) {
    match state.mode {
        Mode::Playing => {}
        Mode::Paused => state.mode = Mode::Playing,
        Mode::Menu | Mode::GameOver => {
            reset_round(state, Mode::Playing);
            log::info!("Run started");
            state.emit(EventKind::RunStart);
        }
    }
}

/// Flap input. Starts the run from the menu; ignored outside `Playing`.
pub fn trigger_flap(state: &mut RunState) -> Option<TapQuality> {
    if state.mode == Mode::Menu {
        start_game(state);
    }
    if state.mode != Mode::Playing {
        return None;
    }

    let quality = evaluate_tap_sync(state);
    apply_flap(state, quality);
    state.emit(EventKind::Flap { quality });
    Some(quality)
}

/// Flip between `Playing` and `Paused`. Returns false in any other mode.
pub fn toggle_pause(state: &mut RunState) -> bool {
    match state.mode {
        Mode::Playing => {
            state.mode = Mode::Paused;
            true
        }
        Mode::Paused => {
            state.mode = Mode::Playing;
            true
        }
        _ => false,
    }
}

/// Fresh run regardless of mode; an abandoned live run reports `RunAborted`
pub fn restart_from_game_over(state: &mut RunState) {
    let aborted = (state.mode == Mode::Playing && state.run_time > 0.2)
        .then(|| RunSummary::from_state(state));

    reset_round(state, Mode::Playing);
    if let Some(summary) = aborted {
        log::info!("Run aborted at score {} after {:.1}s", summary.score, summary.run_duration);
        state.emit(EventKind::RunAborted(summary));
    }
    log::info!("Run started");
    state.emit(EventKind::RunStart);
}

/// Enter `GameOver` once; later calls are no-ops
pub fn trigger_game_over(state: &mut RunState) {
    if state.mode == Mode::GameOver {
        return;
    }
    state.mode = Mode::GameOver;
    let summary = RunSummary::from_state(state);
    log::info!(
        "Game over: score {} in {:.1}s, accuracy {:.0}%, best chain {}",
        summary.score,
        summary.run_duration,
        summary.sync_accuracy * 100.0,
        summary.chain_peak
    );
    state.emit(EventKind::GameOver(summary));

    if state.score > state.high_score {
        state.high_score = state.score;
    }
}

/// Apply a new playfield size and keep the player inside it
pub fn resize_world(state: &mut RunState, width: f32, height: f32, pixel_scale: f32) {
    let sanitize = |v: f32, min: f32| if v.is_finite() { v.max(min) } else { min };
    state.world.width = sanitize(width, MIN_WORLD_WIDTH);
    state.world.height = sanitize(height, MIN_WORLD_HEIGHT);
    state.world.pixel_scale = if pixel_scale.is_finite() && pixel_scale > 0.0 {
        pixel_scale
    } else {
        1.0
    };
    resync_to_world(&mut state.player, &state.world, &state.tuning);
}

/// Install (or with `SyncDebug::Off`, remove) a beat phase override
pub fn set_sync_debug(state: &mut RunState, debug: SyncDebug) {
    log::debug!("Sync debug override: {:?}", debug);
    state.sync.phase_source = debug.into_source();
}

/// Force the score (testing hook); NaN and negatives become 0
pub fn set_score_for_testing(state: &mut RunState, score: f64) {
    state.score = if score.is_finite() && score > 0.0 {
        score.floor() as u64
    } else if score == f64::INFINITY {
        u64::MAX
    } else {
        0
    };
    sync_from_score(state, false);
}

/// Read and clear the event queue
pub fn consume_events(state: &mut RunState) -> Vec<GameEvent> {
    state.events.drain()
}
