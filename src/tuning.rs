//! Game balance tables
//!
//! Every tunable number lives here. `Tuning::default()` is the shipped balance;
//! a JSON document may override any subset of it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a tuning document is unusable
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("at least one environment must be configured")]
    NoEnvironments,
    #[error("environment {index} has non-positive bpm {bpm}")]
    InvalidBpm { index: usize, bpm: f32 },
    #[error("environment {index}: perfect window {perfect}ms must be within sync window {sync}ms")]
    InvertedWindows { index: usize, perfect: f32, sync: f32 },
    #[error("environment {index}: spawn interval must be positive")]
    InvalidSpawnInterval { index: usize },
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Vertical impulse added by a flap (negative = up)
    pub flap_impulse: f32,
    pub max_fall_speed: f32,
    pub flux_gravity_multiplier: f32,
    pub overheat_gravity_multiplier: f32,
    /// Vertical velocity retained after a shielded boundary bounce
    pub ground_bounce_damping: f32,
    /// Forward acceleration while flux-boost is active (px/s²)
    pub flux_drift: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 1200.0,
            flap_impulse: -420.0,
            max_fall_speed: 620.0,
            flux_gravity_multiplier: 0.72,
            overheat_gravity_multiplier: 1.2,
            ground_bounce_damping: 0.12,
            flux_drift: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub radius: f32,
    pub hitbox_radius_x_factor: f32,
    pub hitbox_radius_y_factor: f32,
    pub hitbox_offset_x: f32,
    /// Home lane as a fraction of world width
    pub base_x_factor: f32,
    /// Rightmost legal x as a fraction of world width
    pub max_x_factor: f32,
    /// Left margin added to the radius for the minimum legal x
    pub min_x_margin: f32,
    pub horizontal_spring: f32,
    pub horizontal_drag: f32,
    /// Horizontal velocity retained after a shielded obstacle hit
    pub impact_vx_damping: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 16.0,
            hitbox_radius_x_factor: 0.72,
            hitbox_radius_y_factor: 0.8,
            hitbox_offset_x: -1.0,
            base_x_factor: 0.28,
            max_x_factor: 0.75,
            min_x_margin: 12.0,
            horizontal_spring: 3.2,
            horizontal_drag: 5.5,
            impact_vx_damping: 0.25,
        }
    }
}

/// Flap response per tap grade
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlapResponse {
    /// Multiplier on `PhysicsTuning::flap_impulse`
    pub impulse_scale: f32,
    /// Forward velocity added to the player
    pub forward_kick: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlapTuning {
    pub perfect: FlapResponse,
    pub sync: FlapResponse,
    pub offbeat: FlapResponse,
}

impl Default for FlapTuning {
    fn default() -> Self {
        Self {
            perfect: FlapResponse { impulse_scale: 1.06, forward_kick: 38.0 },
            sync: FlapResponse { impulse_scale: 1.0, forward_kick: 18.0 },
            offbeat: FlapResponse { impulse_scale: 0.92, forward_kick: 0.0 },
        }
    }
}

/// Where a collectible sits relative to its obstacle's gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    GapTop,
    GapCenter,
    GapBottom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Obstacle width as a fraction of world width (before clamping)
    pub obstacle_width_factor: f32,
    pub obstacle_width_min: f32,
    pub obstacle_width_max: f32,
    pub obstacle_spacing_min: f32,
    pub gap_height_min: f32,
    /// Gap height may not exceed `world height - gap_height_reserve`
    pub gap_height_reserve: f32,
    /// Vertical margin between the gap and the screen edges
    pub gap_center_margin: f32,
    pub edge_margin: f32,
    pub collectible_radius: f32,
    /// (weight, placement) candidates for collectibles
    pub placements: Vec<(f32, Placement)>,
    /// Collectible x offset range as fractions of obstacle width
    pub collectible_offset_min: f32,
    pub collectible_offset_max: f32,
    /// Delay before the first obstacle of a round
    pub initial_delay: f32,
    /// Obstacles are dropped once their right edge passes this far left of 0
    pub obstacle_despawn_margin: f32,
    pub collectible_despawn_margin: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            obstacle_width_factor: 0.09,
            obstacle_width_min: 70.0,
            obstacle_width_max: 96.0,
            obstacle_spacing_min: 225.0,
            gap_height_min: 128.0,
            gap_height_reserve: 126.0,
            gap_center_margin: 30.0,
            edge_margin: 24.0,
            collectible_radius: 12.0,
            placements: vec![
                (0.34, Placement::GapTop),
                (0.26, Placement::GapCenter),
                (0.4, Placement::GapBottom),
            ],
            collectible_offset_min: 0.35,
            collectible_offset_max: 0.65,
            initial_delay: 0.16,
            obstacle_despawn_margin: 100.0,
            collectible_despawn_margin: 80.0,
        }
    }
}

/// Scroll/spawn pressure for one environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub obstacle_speed: f32,
    pub spawn_interval: f32,
    pub gap_height: f32,
    pub collectible_chance: f32,
    /// Gap centre wobble amplitude (px), 0 disables
    pub wobble_amp: f32,
    /// Gap centre wobble angular frequency (rad/s)
    pub wobble_freq: f32,
}

/// One visual/difficulty tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentTuning {
    pub label: String,
    pub difficulty: DifficultyProfile,
    pub bpm: f32,
    pub perfect_window_ms: f32,
    pub sync_window_ms: f32,
}

fn default_environments() -> Vec<EnvironmentTuning> {
    let env = |label: &str, speed, interval, gap, chance, amp, freq, bpm, perfect, sync| {
        EnvironmentTuning {
            label: label.to_string(),
            difficulty: DifficultyProfile {
                obstacle_speed: speed,
                spawn_interval: interval,
                gap_height: gap,
                collectible_chance: chance,
                wobble_amp: amp,
                wobble_freq: freq,
            },
            bpm,
            perfect_window_ms: perfect,
            sync_window_ms: sync,
        }
    };
    vec![
        env("Neon Dawn", 180.0, 1.55, 192.0, 0.58, 0.0, 0.0, 100.0, 70.0, 140.0),
        env("Circuit Dusk", 220.0, 1.32, 170.0, 0.66, 10.0, 1.6, 110.0, 65.0, 130.0),
        env("Aurora Grid", 258.0, 1.08, 154.0, 0.74, 18.0, 2.1, 120.0, 60.0, 120.0),
        env("Void Pulse", 280.0, 0.98, 148.0, 0.78, 24.0, 2.6, 128.0, 55.0, 110.0),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatTuning {
    pub max: f32,
    pub dissipate_per_sec: f32,
    pub overheat_duration_sec: f32,
    /// Grading window multiplier while overheated
    pub overheat_window_factor: f32,
}

impl Default for HeatTuning {
    fn default() -> Self {
        Self {
            max: 100.0,
            dissipate_per_sec: 18.0,
            overheat_duration_sec: 2.5,
            overheat_window_factor: 0.88,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTuning {
    pub recent_perfect_window_sec: f32,
    pub perfect_pulse_sec: f32,
    pub perfect_heat_relief: f32,
    pub sync_heat_relief: f32,
    pub offbeat_heat_penalty: f32,
    /// Offbeat penalty multiplier while anchor stability is active
    pub anchor_penalty_scale: f32,
    pub anchor_stability_sec: f32,
    /// Perfect taps in a clean sector needed to trigger flux-boost
    pub sector_perfect_for_flux: u32,
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            recent_perfect_window_sec: 0.6,
            perfect_pulse_sec: 0.25,
            perfect_heat_relief: 6.0,
            sync_heat_relief: 3.0,
            offbeat_heat_penalty: 14.0,
            anchor_penalty_scale: 0.68,
            anchor_stability_sec: 3.0,
            sector_perfect_for_flux: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainTuning {
    pub linked_perfect_required: u32,
    pub broken_offbeat_threshold: u32,
    pub multiplier_per_linked_sector: f32,
    pub multiplier_max: f32,
    pub base_sector_score: f32,
    pub anchor_multiplier_bonus: f32,
    pub anchor_score_bonus: u64,
}

impl Default for ChainTuning {
    fn default() -> Self {
        Self {
            linked_perfect_required: 1,
            broken_offbeat_threshold: 1,
            multiplier_per_linked_sector: 0.25,
            multiplier_max: 3.0,
            base_sector_score: 10.0,
            anchor_multiplier_bonus: 0.5,
            anchor_score_bonus: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldTuning {
    pub max_charges: u32,
    /// One charge is granted every this many linked sectors
    pub linked_every: u32,
    pub invulnerability_sec: f32,
}

impl Default for ShieldTuning {
    fn default() -> Self {
        Self { max_charges: 2, linked_every: 4, invulnerability_sec: 0.35 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GapTuning {
    pub streak_threshold: u32,
    pub duration: f32,
    pub cooldown: f32,
    pub widen_amount: f32,
}

impl Default for GapTuning {
    fn default() -> Self {
        Self { streak_threshold: 3, duration: 2.0, cooldown: 6.0, widen_amount: 36.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FluxTuning {
    pub duration: f32,
    pub cooldown: f32,
    /// Minimum forward velocity applied on activation
    pub push: f32,
    /// Vertical velocity retained on activation
    pub vy_damping: f32,
}

impl Default for FluxTuning {
    fn default() -> Self {
        Self { duration: 0.8, cooldown: 5.0, push: 320.0, vy_damping: 0.8 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PassiveTuning {
    pub shield: ShieldTuning,
    pub gap: GapTuning,
    pub flux: FluxTuning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionTuning {
    pub score_per_environment: u64,
    pub transition_duration: f32,
    pub label_duration: f32,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self { score_per_environment: 250, transition_duration: 1.2, label_duration: 2.2 }
    }
}

/// Complete balance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub player: PlayerTuning,
    pub flap: FlapTuning,
    pub spawn: SpawnTuning,
    pub environments: Vec<EnvironmentTuning>,
    pub heat: HeatTuning,
    pub sync: SyncTuning,
    pub chain: ChainTuning,
    pub passives: PassiveTuning,
    pub progression: ProgressionTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            physics: PhysicsTuning::default(),
            player: PlayerTuning::default(),
            flap: FlapTuning::default(),
            spawn: SpawnTuning::default(),
            environments: default_environments(),
            heat: HeatTuning::default(),
            sync: SyncTuning::default(),
            chain: ChainTuning::default(),
            passives: PassiveTuning::default(),
            progression: ProgressionTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check cross-field invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.environments.is_empty() {
            return Err(TuningError::NoEnvironments);
        }
        for (index, env) in self.environments.iter().enumerate() {
            if !(env.bpm > 0.0) {
                return Err(TuningError::InvalidBpm { index, bpm: env.bpm });
            }
            if !(env.perfect_window_ms >= 0.0 && env.perfect_window_ms <= env.sync_window_ms) {
                return Err(TuningError::InvertedWindows {
                    index,
                    perfect: env.perfect_window_ms,
                    sync: env.sync_window_ms,
                });
            }
            if !(env.difficulty.spawn_interval > 0.0) {
                return Err(TuningError::InvalidSpawnInterval { index });
            }
        }
        if !(self.heat.max > 0.0) {
            return Err(TuningError::InvalidValue("heat.max must be positive"));
        }
        if !(self.chain.multiplier_max >= 1.0) {
            return Err(TuningError::InvalidValue("chain.multiplier_max must be at least 1"));
        }
        if self.progression.score_per_environment == 0 {
            return Err(TuningError::InvalidValue(
                "progression.score_per_environment must be non-zero",
            ));
        }
        if self.spawn.obstacle_width_min > self.spawn.obstacle_width_max {
            return Err(TuningError::InvalidValue("spawn obstacle width range is inverted"));
        }
        if self.spawn.placements.iter().all(|(w, _)| !(*w > 0.0)) {
            return Err(TuningError::InvalidValue("spawn.placements needs a positive weight"));
        }
        Ok(())
    }

    /// Environment table entry, clamped into range
    pub fn environment(&self, index: usize) -> &EnvironmentTuning {
        let last = self.environments.len().saturating_sub(1);
        &self.environments[index.min(last)]
    }

    pub fn environment_count(&self) -> usize {
        self.environments.len()
    }
}
