//! Property tests for the simulation invariants

use proptest::prelude::*;
use sky_circuits::consts::SIM_DT;
use sky_circuits::sim::{self, Mode, RunState, SyncDebug, TapQuality, TickInput, tick};

/// One scripted frame: flap or not, and the beat phase the flap lands on
fn frames() -> impl Strategy<Value = Vec<(bool, f64)>> {
    prop::collection::vec((any::<bool>(), 0.0f64..1.0), 1..400)
}

fn run_script(seed: u64, script: &[(bool, f64)], mut check: impl FnMut(&RunState)) -> RunState {
    let mut state = RunState::new(seed);
    sim::start_game(&mut state);
    for &(flap, phase) in script {
        sim::set_sync_debug(&mut state, SyncDebug::Phase(phase));
        let input = TickInput { flap, ..Default::default() };
        tick(&mut state, &input, SIM_DT);
        check(&state);
        if state.mode == Mode::GameOver {
            break;
        }
    }
    state
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn heat_stays_in_bounds(seed in any::<u64>(), script in frames()) {
        run_script(seed, &script, |state| {
            assert!(state.heat >= 0.0 && state.heat <= state.tuning.heat.max);
            if state.overheat_timer > 0.0 {
                assert_eq!(state.heat, state.tuning.heat.max);
            }
        });
    }

    #[test]
    fn heat_rises_only_on_offbeat_taps(seed in any::<u64>(), script in frames()) {
        let mut state = RunState::new(seed);
        sim::start_game(&mut state);
        for &(flap, phase) in &script {
            sim::set_sync_debug(&mut state, SyncDebug::Phase(phase));
            let heat_before = state.heat;
            let taps_before = state.sync.taps_total;
            tick(&mut state, &TickInput { flap, ..Default::default() }, SIM_DT);
            if state.heat > heat_before {
                prop_assert_eq!(state.sync.taps_total, taps_before + 1);
                prop_assert_eq!(state.sync.tap_quality, Some(TapQuality::Offbeat));
            }
            if state.mode == Mode::GameOver {
                break;
            }
        }
    }

    #[test]
    fn multiplier_stays_in_bounds(seed in any::<u64>(), script in frames()) {
        run_script(seed, &script, |state| {
            let max = state.tuning.chain.multiplier_max;
            assert!(state.chain.multiplier >= 1.0 && state.chain.multiplier <= max);
            if state.chain.streak == 0 {
                assert_eq!(state.chain.multiplier, 1.0);
            }
        });
    }

    #[test]
    fn obstacles_stay_ordered(seed in any::<u64>()) {
        let mut state = RunState::new(seed);
        sim::start_game(&mut state);
        state.passives.shield_charges = u32::MAX;
        for _ in 0..(60 * 20) {
            // Keep the player centred so the run lasts
            state.player.pos.y = state.world.height * 0.5;
            state.player.vel.y = 0.0;
            tick(&mut state, &TickInput::default(), SIM_DT);
            for pair in state.obstacles.windows(2) {
                prop_assert!(pair[0].x < pair[1].x);
            }
        }
        prop_assert!(state.obstacles.len() >= 2);
    }

    #[test]
    fn reset_round_clears_run(seed in any::<u64>(), script in frames(), menu in any::<bool>()) {
        let mut state = run_script(seed, &script, |_| {});
        let high = state.high_score;
        let mode = if menu { Mode::Menu } else { Mode::Playing };
        sim::reset_round(&mut state, mode);
        prop_assert_eq!(state.mode, mode);
        prop_assert_eq!(state.score, 0);
        prop_assert_eq!(state.heat, 0.0);
        prop_assert_eq!(state.chain.streak, 0);
        prop_assert_eq!(state.chain.multiplier, 1.0);
        prop_assert!(state.obstacles.is_empty());
        prop_assert!(state.events.is_empty());
        prop_assert_eq!(state.high_score, high);
    }

    #[test]
    fn game_over_is_idempotent(seed in any::<u64>(), score in 0u64..10_000, high in 0u64..10_000) {
        let mut state = RunState::new(seed);
        sim::start_game(&mut state);
        state.score = score;
        state.high_score = high;
        sim::trigger_game_over(&mut state);
        let after_first = (state.mode, state.score, state.high_score, state.events.len());
        sim::trigger_game_over(&mut state);
        prop_assert_eq!((state.mode, state.score, state.high_score, state.events.len()), after_first);
        prop_assert_eq!(state.high_score, score.max(high));
    }

    #[test]
    fn sync_debug_parse_never_panics(payload in ".{0,40}") {
        if let Some(debug) = SyncDebug::parse(&payload) {
            let mut state = RunState::new(0);
            sim::set_sync_debug(&mut state, debug);
            sim::start_game(&mut state);
            sim::trigger_flap(&mut state);
            prop_assert!(state.sync.last_tap_delta_ms.is_finite());
        }
    }
}
