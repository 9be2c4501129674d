//! Player motion
//!
//! Vertical: gravity with a terminal fall speed. Horizontal: exponential drag
//! plus a spring back to the home lane, then a hard clamp to the legal band.

use super::beat::TapQuality;
use super::state::{Player, RunState, World};
use crate::tuning::Tuning;

/// Combined gravity multiplier from flux-boost and overheat
pub fn gravity_multiplier(state: &RunState) -> f32 {
    let physics = &state.tuning.physics;
    let flux = if state.passives.flux_timer > 0.0 {
        physics.flux_gravity_multiplier
    } else {
        1.0
    };
    let overheat = if state.is_overheated() {
        physics.overheat_gravity_multiplier
    } else {
        1.0
    };
    flux * overheat
}

/// Integrate the player by one tick
pub fn update_player(state: &mut RunState, dt: f32) {
    let gravity = state.tuning.physics.gravity * gravity_multiplier(state);
    let flux_active = state.passives.flux_timer > 0.0;
    let tuning = &state.tuning;
    let player = &mut state.player;

    player.vel.y = (player.vel.y + gravity * dt).min(tuning.physics.max_fall_speed);
    player.pos.y += player.vel.y * dt;

    if flux_active {
        player.vel.x += tuning.physics.flux_drift * dt;
    }
    player.vel.x *= (-tuning.player.horizontal_drag * dt).exp();
    player.pos.x += player.vel.x * dt;
    player.pos.x += (player.base_x - player.pos.x) * tuning.player.horizontal_spring * dt;

    clamp_to_lane(player, &state.world, tuning);
}

/// Legal horizontal band for the player
pub fn lane_bounds(player: &Player, world: &World, tuning: &Tuning) -> (f32, f32) {
    let min_x = player.radius + tuning.player.min_x_margin;
    let max_x = (world.width * tuning.player.max_x_factor).max(min_x);
    (min_x, max_x)
}

pub fn clamp_to_lane(player: &mut Player, world: &World, tuning: &Tuning) {
    let (min_x, max_x) = lane_bounds(player, world, tuning);
    player.pos.x = player.pos.x.clamp(min_x, max_x);
}

/// Re-anchor the player after the world is resized
pub fn resync_to_world(player: &mut Player, world: &World, tuning: &Tuning) {
    player.base_x = world.width * tuning.player.base_x_factor;
    clamp_to_lane(player, world, tuning);
    let min_y = player.radius + 1.0;
    let max_y = (world.height - player.radius - 1.0).max(min_y);
    player.pos.y = player.pos.y.clamp(min_y, max_y);
}

/// Flap response for a graded tap: an upward impulse and a forward kick.
///
/// Downward speed is cancelled first; upward speed is kept, so a flap never
/// slows a climb.
pub fn apply_flap(state: &mut RunState, quality: TapQuality) {
    let flap = &state.tuning.flap;
    let response = match quality {
        TapQuality::Perfect => flap.perfect,
        TapQuality::Sync => flap.sync,
        TapQuality::Offbeat => flap.offbeat,
    };
    state.player.vel.x += response.forward_kick;
    let impulse = state.tuning.physics.flap_impulse * response.impulse_scale;
    state.player.vel.y = state.player.vel.y.min(0.0) + impulse;
}
