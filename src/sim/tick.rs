//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::beat::sync_beat_clock;
use super::collision::{check_bounds, check_obstacles, collect_anchors, score_passed_obstacles};
use super::environment::{current_difficulty, update_transition};
use super::heat::update_heat;
use super::lifecycle::{restart_from_game_over, toggle_pause, trigger_flap};
use super::physics::update_player;
use super::spawner::update_obstacles;
use super::state::{Mode, RunState};
use crate::decay;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flap (click/tap/space). Also starts from the menu, resumes from pause
    /// and restarts after game over.
    pub flap: bool,
    /// Pause toggle
    pub pause: bool,
    /// Abandon the current run and start over
    pub restart: bool,
    /// Autopilot - flaps on the beat toward the next gap
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut RunState, input: &TickInput, dt: f32) {
    if input.pause {
        toggle_pause(state);
    }
    if input.restart {
        restart_from_game_over(state);
    }

    let mut flap = input.flap;
    if input.autopilot && autopilot_wants_flap(state) {
        flap = true;
    }
    if flap {
        match state.mode {
            Mode::GameOver => restart_from_game_over(state),
            Mode::Paused => {
                toggle_pause(state);
            }
            Mode::Menu | Mode::Playing => {
                trigger_flap(state);
            }
        }
    }

    state.total_time += dt as f64;
    sync_beat_clock(state);
    update_transition(state, dt);

    // Frozen outside active play
    if state.mode != Mode::Playing {
        return;
    }

    state.run_time += dt as f64;
    update_heat(state, dt);
    update_timers(state, dt);

    let (phase, profile) = current_difficulty(state);
    state.difficulty_phase = phase;

    update_player(state, dt);
    update_obstacles(state, dt, &profile);
    score_passed_obstacles(state);
    collect_anchors(state);
    check_bounds(state);
    check_obstacles(state);
}

/// Gameplay countdowns
fn update_timers(state: &mut RunState, dt: f32) {
    decay(&mut state.invulnerability_timer, dt);
    decay(&mut state.sync.recent_perfect_timer, dt);
    decay(&mut state.sync.perfect_pulse_timer, dt);
    decay(&mut state.chain.anchor_stability_timer, dt);

    let passives = &mut state.passives;
    decay(&mut passives.gap_timer, dt);
    decay(&mut passives.gap_cooldown, dt);
    decay(&mut passives.flux_timer, dt);
    decay(&mut passives.flux_cooldown, dt);
}

/// Autopilot decision for this tick.
///
/// Starts runs from the menu. While playing it aims slightly below the centre
/// of the next gap and only flaps on the way down, waiting for the beat unless
/// the player is sinking well past the target.
pub fn autopilot_wants_flap(state: &RunState) -> bool {
    match state.mode {
        Mode::Menu => return true,
        Mode::Playing => {}
        _ => return false,
    }

    let player = &state.player;
    let target_y = state
        .obstacles
        .iter()
        .find(|o| o.right() > player.pos.x - player.radius)
        .map(|o| o.gap_y + o.gap_height * 0.1)
        .unwrap_or(state.world.height * 0.5);

    let falling = player.vel.y >= 0.0;
    if !falling || player.pos.y <= target_y {
        return false;
    }

    let near_beat = state.sync.beat_ms_to_next <= 30.0;
    let sinking_fast = player.pos.y > target_y + 60.0;
    near_beat || sinking_fast
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::events::EventKind;
    use crate::sim::lifecycle::start_game;

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_menu_only_advances_total_time() {
        let mut state = RunState::new(1);
        for _ in 0..30 {
            tick(&mut state, &idle(), SIM_DT);
        }
        assert_eq!(state.mode, Mode::Menu);
        assert_eq!(state.run_time, 0.0);
        assert!((state.total_time - 0.5).abs() < 1e-4);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_playing_spawns_and_scrolls() {
        let mut state = RunState::new(1);
        start_game(&mut state);
        for _ in 0..12 {
            tick(&mut state, &idle(), SIM_DT);
        }
        assert_eq!(state.obstacles.len(), 1);
        let x0 = state.obstacles[0].x;
        tick(&mut state, &idle(), SIM_DT);
        assert!(state.obstacles[0].x < x0);
        assert!(state.run_time > 0.2);
    }

    #[test]
    fn test_no_input_falls_to_game_over() {
        let mut state = RunState::new(1);
        start_game(&mut state);
        for _ in 0..600 {
            tick(&mut state, &idle(), SIM_DT);
            if state.mode == Mode::GameOver {
                break;
            }
        }
        assert_eq!(state.mode, Mode::GameOver);
    }

    #[test]
    fn test_pause_freezes_run() {
        let mut state = RunState::new(1);
        start_game(&mut state);
        tick(&mut state, &idle(), SIM_DT);
        let pause = TickInput { pause: true, ..Default::default() };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.mode, Mode::Paused);
        let frozen = (state.run_time, state.player.pos.y);
        for _ in 0..10 {
            tick(&mut state, &idle(), SIM_DT);
        }
        assert_eq!((state.run_time, state.player.pos.y), frozen);

        let flap = TickInput { flap: true, ..Default::default() };
        tick(&mut state, &flap, SIM_DT);
        assert_eq!(state.mode, Mode::Playing);
        // Resuming does not count as a tap
        assert_eq!(state.sync.taps_total, 0);
    }

    #[test]
    fn test_flap_after_game_over_restarts() {
        let mut state = RunState::new(1);
        start_game(&mut state);
        state.mode = Mode::GameOver;
        state.events.clear();
        let flap = TickInput { flap: true, ..Default::default() };
        tick(&mut state, &flap, SIM_DT);
        assert_eq!(state.mode, Mode::Playing);
        assert!(state.events.iter().any(|e| e.kind == EventKind::RunStart));
    }

    #[test]
    fn test_timers_decay_while_playing() {
        let mut state = RunState::new(1);
        start_game(&mut state);
        state.passives.gap_cooldown = 0.05;
        state.chain.anchor_stability_timer = 0.05;
        for _ in 0..6 {
            tick(&mut state, &idle(), SIM_DT);
        }
        assert_eq!(state.passives.gap_cooldown, 0.0);
        assert_eq!(state.chain.anchor_stability_timer, 0.0);
    }

    #[test]
    fn test_autopilot_run_keeps_invariants() {
        let mut state = RunState::new(314);
        let input = TickInput { autopilot: true, ..Default::default() };
        for _ in 0..(60 * 30) {
            tick(&mut state, &input, SIM_DT);
            assert!(state.heat >= 0.0 && state.heat <= state.tuning.heat.max);
            assert!(state.chain.multiplier >= 1.0 && state.chain.multiplier <= 3.0);
            if state.mode == Mode::GameOver {
                break;
            }
        }
        assert!(state.sync.taps_total > 0);
        assert!(state.run_time > 1.0);
    }
}
