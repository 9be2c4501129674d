//! Rounded, serializable view of the run for tests and debugging hosts

use serde::Serialize;

use super::beat::TapQuality;
use super::state::{Mode, RunState, SectorVerdict};
use crate::round_to;

pub const COORD_SYSTEM: &str = "origin-top-left, +x right, +y down, units in CSS pixels";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub r: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleSnapshot {
    pub x: f64,
    pub w: f64,
    pub gap_y: f64,
    pub gap_h: f64,
    pub theme_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorSnapshot {
    pub x: f64,
    pub y: f64,
    pub r: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub tap_quality: Option<TapQuality>,
    pub beat_phase: f64,
    pub beat_ms_to_next: f64,
    pub last_tap_delta_ms: f64,
    pub offbeat_streak: u32,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSnapshot {
    pub streak: u32,
    pub best_streak: u32,
    pub multiplier: f64,
    pub sector_quality: Option<SectorVerdict>,
    pub linked_sector_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassiveSnapshot {
    pub active: String,
    pub shield_charges: u32,
    pub gap_time_left: f64,
    pub flux_time_left: f64,
    pub anchor_stability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSnapshot {
    /// 1-based
    pub index: usize,
    pub name: String,
    pub tier: u64,
    pub progress_to_next: f64,
    pub next_milestone: u64,
    pub points_to_next: u64,
}

/// Full-state snapshot; serializes to the camelCase JSON shape hosts expect
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub mode: Mode,
    pub time: f64,
    pub coord_system: &'static str,
    pub player: PlayerSnapshot,
    pub obstacles: Vec<ObstacleSnapshot>,
    pub sync_anchors: Vec<AnchorSnapshot>,
    pub sync: SyncSnapshot,
    pub chain: ChainSnapshot,
    pub passives: PassiveSnapshot,
    pub heat: f64,
    pub overheat_time_left: f64,
    pub score: u64,
    pub high_score: u64,
    pub phase: u32,
    pub environment: EnvironmentSnapshot,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn r1(v: f32) -> f64 {
    round_to(v as f64, 1)
}

fn r2(v: f32) -> f64 {
    round_to(v as f64, 2)
}

/// Capture the current state
pub fn snapshot(state: &RunState) -> Snapshot {
    let env = &state.environment;
    let active_env = state.tuning.environment(env.active_index);

    Snapshot {
        mode: state.mode,
        time: round_to(state.run_time, 2),
        coord_system: COORD_SYSTEM,
        player: PlayerSnapshot {
            x: r1(state.player.pos.x),
            y: r1(state.player.pos.y),
            vx: r1(state.player.vel.x),
            vy: r1(state.player.vel.y),
            r: state.player.radius,
        },
        obstacles: state
            .obstacles
            .iter()
            .map(|o| ObstacleSnapshot {
                x: r1(o.x),
                w: r1(o.width),
                gap_y: r1(o.gap_y),
                gap_h: r1(o.gap_height),
                theme_index: o.theme_index,
            })
            .collect(),
        sync_anchors: state
            .collectibles
            .iter()
            .map(|c| AnchorSnapshot { x: r1(c.x), y: r1(c.y), r: c.radius })
            .collect(),
        sync: SyncSnapshot {
            tap_quality: state.sync.tap_quality,
            beat_phase: round_to(state.sync.beat_phase as f64, 3),
            beat_ms_to_next: r1(state.sync.beat_ms_to_next),
            last_tap_delta_ms: r1(state.sync.last_tap_delta_ms),
            offbeat_streak: state.sync.offbeat_streak,
            accuracy: round_to(state.sync_accuracy(), 4),
        },
        chain: ChainSnapshot {
            streak: state.chain.streak,
            best_streak: state.chain.best_streak,
            multiplier: r2(state.chain.multiplier),
            sector_quality: state.chain.last_verdict,
            linked_sector_rate: round_to(state.linked_sector_rate(), 4),
        },
        passives: PassiveSnapshot {
            active: state.passives.active_label(),
            shield_charges: state.passives.shield_charges,
            gap_time_left: r2(state.passives.gap_timer),
            flux_time_left: r2(state.passives.flux_timer),
            anchor_stability: r2(state.chain.anchor_stability_timer),
        },
        heat: r1(state.heat),
        overheat_time_left: r2(state.overheat_timer),
        score: state.score,
        high_score: state.high_score,
        phase: state.difficulty_phase,
        environment: EnvironmentSnapshot {
            index: env.active_index + 1,
            name: active_env.label.clone(),
            tier: env.current_tier,
            progress_to_next: r2(env.progress_to_next),
            next_milestone: env.next_milestone,
            points_to_next: env.next_milestone.saturating_sub(state.score),
        },
    }
}
