//! Collision detection and response
//!
//! The player collides as an ellipse that is a little narrower than its sprite.
//! Obstacles are pairs of axis-aligned rectangles above and below the gap.

use glam::Vec2;

use super::chain::{award_score, resolve_sector};
use super::events::{EventKind, ScoreSource};
use super::lifecycle::trigger_game_over;
use super::state::{Mode, Obstacle, Player, RunState};
use crate::tuning::Tuning;

/// Elliptical player hitbox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub center: Vec2,
    /// Half-extents along x and y
    pub radii: Vec2,
}

impl Hitbox {
    pub fn of(player: &Player, tuning: &Tuning) -> Self {
        Self {
            center: Vec2::new(player.pos.x + tuning.player.hitbox_offset_x, player.pos.y),
            radii: Vec2::new(
                player.radius * tuning.player.hitbox_radius_x_factor,
                player.radius * tuning.player.hitbox_radius_y_factor,
            ),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.radii.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.radii.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y - self.radii.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.radii.y
    }

    /// Largest radius, used as the pickup reach
    #[inline]
    pub fn reach(&self) -> f32 {
        self.radii.max_element()
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }
}

/// Solid parts of an obstacle: above the gap and below it
pub fn obstacle_rects(obstacle: &Obstacle, world_height: f32) -> [Rect; 2] {
    let top = obstacle.gap_top().max(0.0);
    let bottom = obstacle.gap_bottom().min(world_height);
    [
        Rect::new(obstacle.x, 0.0, obstacle.width, top),
        Rect::new(obstacle.x, bottom, obstacle.width, world_height - bottom),
    ]
}

/// Ellipse vs rectangle: the closest point of the rect, measured in ellipse
/// space, must lie inside the unit circle
pub fn ellipse_rect_overlap(hitbox: &Hitbox, rect: &Rect) -> bool {
    if rect.is_empty() || hitbox.radii.x <= 0.0 || hitbox.radii.y <= 0.0 {
        return false;
    }
    let closest = hitbox.center.clamp(rect.min, rect.max);
    let d = (hitbox.center - closest) / hitbox.radii;
    d.length_squared() <= 1.0
}

/// Index of the first obstacle whose solid parts touch the hitbox
pub fn find_obstacle_hit(hitbox: &Hitbox, obstacles: &[Obstacle], world_height: f32) -> Option<usize> {
    obstacles.iter().position(|obstacle| {
        let overlap_x = hitbox.right() > obstacle.x && hitbox.left() < obstacle.right();
        overlap_x
            && obstacle_rects(obstacle, world_height)
                .iter()
                .any(|rect| ellipse_rect_overlap(hitbox, rect))
    })
}

/// Spend one shield charge on an impact. Returns false with no charges left.
pub fn try_consume_shield(state: &mut RunState) -> bool {
    if state.passives.shield_charges == 0 {
        return false;
    }
    state.passives.shield_charges -= 1;
    state.invulnerability_timer = state.tuning.passives.shield.invulnerability_sec;
    let charges_left = state.passives.shield_charges;
    log::debug!("Shield absorbed impact, {} left", charges_left);
    state.emit(EventKind::ShieldHit { charges_left });
    true
}

fn clamp_into_field(player: &mut Player, height: f32) {
    let min_y = player.radius + 2.0;
    let max_y = (height - player.radius - 2.0).max(min_y);
    player.pos.y = player.pos.y.clamp(min_y, max_y);
}

/// Top/bottom edge of the playfield
pub fn check_bounds(state: &mut RunState) {
    if state.mode != Mode::Playing {
        return;
    }
    let hitbox = Hitbox::of(&state.player, &state.tuning);
    if hitbox.top() >= 0.0 && hitbox.bottom() <= state.world.height {
        return;
    }

    let height = state.world.height;
    if state.is_invulnerable() {
        // Still inside the grace of the last hit: keep the player in the field
        clamp_into_field(&mut state.player, height);
        return;
    }
    if try_consume_shield(state) {
        clamp_into_field(&mut state.player, height);
        state.player.vel.y *= state.tuning.physics.ground_bounce_damping;
        return;
    }
    trigger_game_over(state);
}

/// Obstacle walls
pub fn check_obstacles(state: &mut RunState) {
    if state.mode != Mode::Playing || state.is_invulnerable() {
        return;
    }
    let hitbox = Hitbox::of(&state.player, &state.tuning);
    let Some(index) = find_obstacle_hit(&hitbox, &state.obstacles, state.world.height) else {
        return;
    };

    if try_consume_shield(state) {
        let obstacle_x = state.obstacles[index].x;
        let player = &mut state.player;
        player.pos.x = obstacle_x - player.radius - 2.0;
        player.vel.x *= state.tuning.player.impact_vx_damping;
        return;
    }
    trigger_game_over(state);
}

/// Resolve a sector for every obstacle the hitbox has fully cleared
pub fn score_passed_obstacles(state: &mut RunState) {
    let hitbox_left = Hitbox::of(&state.player, &state.tuning).left();
    for i in 0..state.obstacles.len() {
        let obstacle = &mut state.obstacles[i];
        if obstacle.scored || obstacle.right() >= hitbox_left {
            continue;
        }
        obstacle.scored = true;
        resolve_sector(state);
    }
}

/// Pick up sync anchors touching the hitbox
pub fn collect_anchors(state: &mut RunState) {
    let hitbox = Hitbox::of(&state.player, &state.tuning);
    let reach = hitbox.reach();
    let before = state.collectibles.len();
    state
        .collectibles
        .retain(|c| hitbox.center.distance(Vec2::new(c.x, c.y)) > c.radius + reach);
    let collected = before - state.collectibles.len();

    let tuning = state.tuning.clone();
    for _ in 0..collected {
        let window = tuning.sync.anchor_stability_sec;
        state.chain.anchor_stability_timer = state.chain.anchor_stability_timer.max(window);
        award_score(state, tuning.chain.anchor_score_bonus, ScoreSource::SyncAnchor);
        state.emit(EventKind::SyncAnchor {
            multiplier_bonus: tuning.chain.anchor_multiplier_bonus,
            anchor_window: window,
        });
    }
}
