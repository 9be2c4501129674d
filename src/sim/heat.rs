//! Heat / overheat gate
//!
//! Offbeat taps add heat, on-beat taps and time remove it. Reaching the cap
//! starts an overheat penalty during which heat stays pinned at the cap.

use super::events::EventKind;
use super::state::RunState;
use crate::decay;

/// Add (or with a negative delta, relieve) heat
pub fn apply_heat_delta(state: &mut RunState, delta: f32) {
    if !delta.is_finite() || delta == 0.0 {
        return;
    }
    let max = state.tuning.heat.max;
    // Saturated until the penalty runs out
    if state.is_overheated() {
        state.heat = max;
        return;
    }

    state.heat = (state.heat + delta).clamp(0.0, max);
    if state.heat >= max {
        state.overheat_timer = state.tuning.heat.overheat_duration_sec;
        log::debug!("Overheat for {:.1}s", state.overheat_timer);
        state.emit(EventKind::OverheatStart);
    }
}

/// Per-tick dissipation and overheat countdown
pub fn update_heat(state: &mut RunState, dt: f32) {
    if state.is_overheated() {
        decay(&mut state.overheat_timer, dt);
        state.heat = state.tuning.heat.max;
        if !state.is_overheated() {
            // Penalty over: start cooling from the cap this tick
            state.heat = (state.heat - state.tuning.heat.dissipate_per_sec * dt).max(0.0);
        }
        return;
    }
    state.heat = (state.heat - state.tuning.heat.dissipate_per_sec * dt).clamp(0.0, state.tuning.heat.max);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_clamps_and_triggers_overheat() {
        let mut state = RunState::new(3);
        for _ in 0..10 {
            apply_heat_delta(&mut state, 14.0);
        }
        assert_eq!(state.heat, 100.0);
        assert!(state.is_overheated());
        let overheat_events = state
            .events
            .iter()
            .filter(|e| e.kind == EventKind::OverheatStart)
            .count();
        assert_eq!(overheat_events, 1);
    }

    #[test]
    fn test_relief_ignored_while_overheated() {
        let mut state = RunState::new(3);
        apply_heat_delta(&mut state, 500.0);
        apply_heat_delta(&mut state, -50.0);
        assert_eq!(state.heat, 100.0);
    }

    #[test]
    fn test_dissipation_after_overheat_expires() {
        let mut state = RunState::new(3);
        apply_heat_delta(&mut state, 500.0);
        let dt = 1.0 / 60.0;
        // 2.5s penalty
        for _ in 0..150 {
            update_heat(&mut state, dt);
        }
        update_heat(&mut state, dt);
        assert!(!state.is_overheated());
        assert!(state.heat < 100.0);
        for _ in 0..600 {
            update_heat(&mut state, dt);
        }
        assert_eq!(state.heat, 0.0);
    }

    #[test]
    fn test_non_finite_delta_ignored() {
        let mut state = RunState::new(3);
        apply_heat_delta(&mut state, f32::NAN);
        apply_heat_delta(&mut state, f32::INFINITY);
        assert_eq!(state.heat, 0.0);
    }
}
