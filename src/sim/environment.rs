//! Environment tier progression
//!
//! Score maps to a tier; the tier (mod the environment count) picks the
//! active environment, which drives difficulty, tempo and theme.

use super::events::EventKind;
use super::state::RunState;
use crate::decay;
use crate::tuning::DifficultyProfile;

pub fn tier_for_score(score: u64, step: u64) -> u64 {
    score / step.max(1)
}

pub fn index_for_tier(tier: u64, environment_count: usize) -> usize {
    if environment_count == 0 {
        return 0;
    }
    (tier % environment_count as u64) as usize
}

/// Recompute tier, progress and milestone from the score.
///
/// With `force`, indices snap to the computed environment without a
/// transition or event (round reset). Otherwise an index change starts a
/// crossfade and emits `EnvironmentShift`.
pub fn sync_from_score(state: &mut RunState, force: bool) {
    let step = state.tuning.progression.score_per_environment.max(1);
    let tier = tier_for_score(state.score, step);
    let next_index = index_for_tier(tier, state.tuning.environment_count());

    let env = &mut state.environment;
    env.current_tier = tier;
    env.progress_to_next = (state.score % step) as f32 / step as f32;
    env.next_milestone = (tier + 1).saturating_mul(step);

    if force {
        env.previous_index = next_index;
        env.active_index = next_index;
        env.transition_timer = 0.0;
        env.transition_progress = 1.0;
        env.label_timer = 0.0;
        return;
    }

    if next_index == env.active_index {
        return;
    }

    let from_index = env.active_index;
    env.previous_index = from_index;
    env.active_index = next_index;
    env.transition_timer = state.tuning.progression.transition_duration;
    env.transition_progress = 0.0;
    env.label_timer = state.tuning.progression.label_duration;

    log::info!(
        "Environment shift {} -> {} ({}) at score {}",
        from_index,
        next_index,
        state.tuning.environment(next_index).label,
        state.score
    );
    let score = state.score;
    state.emit(EventKind::EnvironmentShift {
        from_index,
        to_index: next_index,
        tier,
        score,
    });
}

/// Advance crossfade and label timers
pub fn update_transition(state: &mut RunState, dt: f32) {
    let duration = state.tuning.progression.transition_duration.max(0.001);
    let env = &mut state.environment;
    if env.transition_timer > 0.0 {
        decay(&mut env.transition_timer, dt);
        env.transition_progress = 1.0 - env.transition_timer / duration;
        if env.transition_timer <= 0.0 {
            env.transition_progress = 1.0;
            env.previous_index = env.active_index;
        }
    } else {
        env.transition_progress = 1.0;
    }
    decay(&mut env.label_timer, dt);
}

/// Difficulty profile of the active environment and its 1-based phase number
pub fn current_difficulty(state: &RunState) -> (u32, DifficultyProfile) {
    let last = state.tuning.environment_count().saturating_sub(1);
    let index = state.environment.active_index.min(last);
    let profile = state.tuning.environment(index).difficulty.clone();
    (index as u32 + 1, profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_and_index() {
        assert_eq!(tier_for_score(0, 250), 0);
        assert_eq!(tier_for_score(249, 250), 0);
        assert_eq!(tier_for_score(250, 250), 1);
        assert_eq!(index_for_tier(5, 4), 1);
        assert_eq!(index_for_tier(3, 0), 0);
    }

    #[test]
    fn test_shift_emits_event_and_starts_transition() {
        let mut state = RunState::new(11);
        state.score = 260;
        sync_from_score(&mut state, false);
        assert_eq!(state.environment.active_index, 1);
        assert_eq!(state.environment.previous_index, 0);
        assert_eq!(state.environment.next_milestone, 500);
        assert!((state.environment.progress_to_next - 0.04).abs() < 1e-6);
        assert!(state.environment.transition_timer > 0.0);
        let events = state.events.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].kind,
            EventKind::EnvironmentShift { from_index: 0, to_index: 1, tier: 1, score: 260 }
        ));
    }

    #[test]
    fn test_force_snaps_without_event() {
        let mut state = RunState::new(11);
        state.score = 1000;
        sync_from_score(&mut state, true);
        // tier 4 wraps back to the first environment
        assert_eq!(state.environment.current_tier, 4);
        assert_eq!(state.environment.active_index, 0);
        assert_eq!(state.environment.transition_progress, 1.0);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_transition_completes() {
        let mut state = RunState::new(11);
        state.score = 300;
        sync_from_score(&mut state, false);
        for _ in 0..150 {
            update_transition(&mut state, 1.0 / 60.0);
        }
        assert_eq!(state.environment.transition_progress, 1.0);
        assert_eq!(state.environment.previous_index, 1);
        assert_eq!(state.environment.label_timer, 0.0);
    }

    #[test]
    fn test_difficulty_phase_follows_environment() {
        let mut state = RunState::new(11);
        state.environment.active_index = 2;
        let (phase, profile) = current_difficulty(&state);
        assert_eq!(phase, 3);
        assert_eq!(profile.obstacle_speed, 258.0);
    }
}
