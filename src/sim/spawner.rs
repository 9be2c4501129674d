//! Obstacle and sync-anchor generation
//!
//! Obstacles enter from the right edge on a countdown. Each spawn may also
//! drop a collectible inside the obstacle's gap.

use rand::Rng;

use super::state::{Collectible, Obstacle, RunState};
use super::weighted;
use crate::tuning::{DifficultyProfile, Placement};

/// Scroll, wobble, despawn and spawn for one tick
pub fn update_obstacles(state: &mut RunState, dt: f32, profile: &DifficultyProfile) {
    let shift = profile.obstacle_speed * dt;
    let run_time = state.run_time as f32;
    for obstacle in &mut state.obstacles {
        obstacle.x -= shift;
        obstacle.apply_wobble(run_time);
    }
    for collectible in &mut state.collectibles {
        collectible.x -= shift;
    }

    let spawn = &state.tuning.spawn;
    let obstacle_margin = spawn.obstacle_despawn_margin;
    let collectible_margin = spawn.collectible_despawn_margin;
    state.obstacles.retain(|o| o.right() > -obstacle_margin);
    state.collectibles.retain(|c| c.x + c.radius > -collectible_margin);

    state.spawn_timer -= dt;
    if state.spawn_timer <= 0.0 {
        spawn_obstacle(state, profile);
        state.spawn_timer += profile.spawn_interval;
    }
}

/// Obstacle width for the current world
pub fn obstacle_width(state: &RunState) -> f32 {
    let spawn = &state.tuning.spawn;
    (state.world.width * spawn.obstacle_width_factor)
        .clamp(spawn.obstacle_width_min, spawn.obstacle_width_max)
}

/// Gap height for the current world and passives
pub fn gap_height(state: &RunState, profile: &DifficultyProfile) -> f32 {
    let spawn = &state.tuning.spawn;
    let widen = if state.passives.gap_timer > 0.0 {
        state.tuning.passives.gap.widen_amount
    } else {
        0.0
    };
    let max = (state.world.height - spawn.gap_height_reserve).max(spawn.gap_height_min);
    (profile.gap_height + widen).clamp(spawn.gap_height_min, max)
}

/// Append one obstacle (and maybe a collectible) after the last one
pub fn spawn_obstacle(state: &mut RunState, profile: &DifficultyProfile) {
    let tuning = state.tuning.clone();
    let spawn = &tuning.spawn;

    let width = obstacle_width(state);
    let gap_height = gap_height(state, profile);
    let half_gap = gap_height * 0.5;
    let min_center = half_gap + spawn.gap_center_margin;
    let max_center = (state.world.height - half_gap - spawn.gap_center_margin).max(min_center);
    let gap_y = if max_center > min_center {
        state.rng.random_range(min_center..max_center)
    } else {
        min_center
    };

    let spawn_start = state.world.width + width;
    let x = match state.obstacles.last() {
        Some(prev) => spawn_start.max(prev.right() + spawn.obstacle_spacing_min),
        None => spawn_start,
    };

    let wobble_phase = state.rng.random_range(0.0..std::f32::consts::TAU);
    state.obstacles.push(Obstacle {
        x,
        width,
        gap_y,
        gap_height,
        base_gap_y: gap_y,
        min_gap_center: min_center,
        max_gap_center: max_center,
        wobble_amp: profile.wobble_amp.max(0.0),
        wobble_freq: profile.wobble_freq.max(0.0),
        wobble_phase,
        theme_index: state.environment.active_index,
        scored: false,
    });
    log::trace!("Spawned obstacle at x={:.1} gap={:.1}±{:.1}", x, gap_y, half_gap);

    if state.rng.random::<f32>() > profile.collectible_chance {
        return;
    }

    let radius = spawn.collectible_radius;
    let min_y = radius + spawn.edge_margin;
    let max_y = (state.world.height - radius - spawn.edge_margin).max(min_y);
    let gap_top = (gap_y - half_gap).clamp(min_y, max_y);
    let gap_bottom = (gap_y + half_gap).clamp(min_y, max_y);

    let placement = weighted::pick(&spawn.placements, &mut state.rng)
        .copied()
        .unwrap_or(Placement::GapCenter);
    let edge_spread = (half_gap * 0.24).max(14.0);
    let y = match placement {
        Placement::GapTop => gap_top + radius + state.rng.random::<f32>() * edge_spread,
        Placement::GapCenter => {
            gap_y + (state.rng.random::<f32>() - 0.5) * (half_gap * 0.18).max(18.0)
        }
        Placement::GapBottom => gap_bottom - radius - state.rng.random::<f32>() * edge_spread,
    };

    let offset_span = (spawn.collectible_offset_max - spawn.collectible_offset_min).max(0.0);
    let x_offset = width * (spawn.collectible_offset_min + state.rng.random::<f32>() * offset_span);
    state.collectibles.push(Collectible {
        x: x + x_offset,
        y: y.clamp(min_y, max_y),
        radius,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::environment::current_difficulty;

    fn profile(state: &RunState) -> DifficultyProfile {
        current_difficulty(state).1
    }

    #[test]
    fn test_spawn_respects_spacing() {
        let mut state = RunState::new(2024);
        let p = profile(&state);
        for _ in 0..8 {
            spawn_obstacle(&mut state, &p);
        }
        for pair in state.obstacles.windows(2) {
            assert!(pair[1].x >= pair[0].right() + 225.0 - 1e-3);
        }
    }

    #[test]
    fn test_spawned_gap_is_legal() {
        let mut state = RunState::new(99);
        let p = profile(&state);
        for _ in 0..50 {
            spawn_obstacle(&mut state, &p);
        }
        for o in &state.obstacles {
            assert!(o.gap_top() >= 30.0 - 1e-3);
            assert!(o.gap_bottom() <= state.world.height - 30.0 + 1e-3);
            assert!(o.width >= 70.0 && o.width <= 96.0);
        }
        for c in &state.collectibles {
            assert!(c.y >= c.radius + 24.0 - 1e-3);
            assert!(c.y <= state.world.height - c.radius - 24.0 + 1e-3);
        }
    }

    #[test]
    fn test_gap_widen_passive() {
        let mut state = RunState::new(1);
        let p = profile(&state);
        let normal = gap_height(&state, &p);
        state.passives.gap_timer = 1.0;
        assert_eq!(gap_height(&state, &p), normal + 36.0);
    }

    #[test]
    fn test_scroll_and_despawn() {
        let mut state = RunState::new(4);
        state.spawn_timer = 100.0;
        state.obstacles.push(Obstacle::new(-200.0, 60.0, 270.0, 180.0));
        state.obstacles.push(Obstacle::new(400.0, 60.0, 270.0, 180.0));
        let p = profile(&state);
        update_obstacles(&mut state, SIM_DT, &p);
        assert_eq!(state.obstacles.len(), 1);
        assert!(state.obstacles[0].x < 400.0);
    }

    #[test]
    fn test_countdown_spawns() {
        let mut state = RunState::new(4);
        state.spawn_timer = 0.0;
        let p = profile(&state);
        update_obstacles(&mut state, SIM_DT, &p);
        assert_eq!(state.obstacles.len(), 1);
        assert!(state.spawn_timer > 0.0);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut a = RunState::new(77);
        let mut b = RunState::new(77);
        let p = profile(&a);
        for _ in 0..5 {
            spawn_obstacle(&mut a, &p);
            spawn_obstacle(&mut b, &p);
        }
        for (oa, ob) in a.obstacles.iter().zip(&b.obstacles) {
            assert_eq!(oa.gap_y, ob.gap_y);
        }
        assert_eq!(a.collectibles.len(), b.collectibles.len());
    }
}
