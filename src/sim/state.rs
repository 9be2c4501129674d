//! Run state and core simulation types
//!
//! `RunState` is the single mutable aggregate the engine owns. Everything the
//! presentation layer reads each frame lives here.

use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::beat::{PhaseSource, TapQuality};
use super::events::EventQueue;
use crate::consts::*;
use crate::tuning::{Tuning, TuningError};

/// Run lifecycle mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Waiting for the first flap/start
    Menu,
    /// Active gameplay
    Playing,
    /// Frozen mid-run
    Paused,
    /// Run ended by an unshielded collision
    GameOver,
}

/// Playfield size, set by the host on resize
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub pixel_scale: f32,
}

impl Default for World {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
            pixel_scale: 1.0,
        }
    }
}

/// The player-controlled body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Home lane the horizontal spring pulls toward
    pub base_x: f32,
}

/// A scrolling wall with a vertical gap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge
    pub x: f32,
    pub width: f32,
    /// Current gap centre (may wobble around `base_gap_y`)
    pub gap_y: f32,
    pub gap_height: f32,
    pub base_gap_y: f32,
    pub min_gap_center: f32,
    pub max_gap_center: f32,
    pub wobble_amp: f32,
    pub wobble_freq: f32,
    pub wobble_phase: f32,
    /// Environment active when this obstacle spawned
    pub theme_index: usize,
    /// Already resolved as a sector
    pub scored: bool,
}

impl Obstacle {
    /// A static obstacle (no wobble) spanning the full vertical band
    pub fn new(x: f32, width: f32, gap_y: f32, gap_height: f32) -> Self {
        Self {
            x,
            width,
            gap_y,
            gap_height,
            base_gap_y: gap_y,
            min_gap_center: gap_y,
            max_gap_center: gap_y,
            wobble_amp: 0.0,
            wobble_freq: 0.0,
            wobble_phase: 0.0,
            theme_index: 0,
            scored: false,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn gap_top(&self) -> f32 {
        self.gap_y - self.gap_height * 0.5
    }

    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        self.gap_y + self.gap_height * 0.5
    }

    /// Move the gap centre along its sinusoidal wobble
    pub fn apply_wobble(&mut self, run_time: f32) {
        if self.wobble_amp > 0.0 && self.wobble_freq > 0.0 {
            let offset = (run_time * self.wobble_freq + self.wobble_phase).sin() * self.wobble_amp;
            self.gap_y = (self.base_gap_y + offset).clamp(self.min_gap_center, self.max_gap_center);
        }
    }
}

/// A sync anchor pickup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Beat clock and tap grading state
#[derive(Debug, Clone)]
pub struct SyncState {
    pub beat_interval_ms: f32,
    /// Position inside the current beat, in [0, 1)
    pub beat_phase: f32,
    pub beat_ms_to_next: f32,
    pub last_tap_delta_ms: f32,
    pub tap_quality: Option<TapQuality>,
    pub offbeat_streak: u32,
    pub recent_perfect_timer: f32,
    pub perfect_pulse_timer: f32,
    pub taps_total: u32,
    pub taps_in_window: u32,
    pub perfect_taps: u32,
    pub phase_source: PhaseSource,
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            beat_interval_ms: 0.0,
            beat_phase: 0.0,
            beat_ms_to_next: 0.0,
            last_tap_delta_ms: 0.0,
            tap_quality: None,
            offbeat_streak: 0,
            recent_perfect_timer: 0.0,
            perfect_pulse_timer: 0.0,
            taps_total: 0,
            taps_in_window: 0,
            perfect_taps: 0,
            phase_source: PhaseSource::Natural,
        }
    }
}

impl SyncState {
    /// Clear per-run counters; the debug phase source survives resets
    pub fn reset(&mut self) {
        let phase_source = self.phase_source;
        *self = Self { phase_source, ..Self::default() };
    }
}

/// Tap grades tallied since the last obstacle pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorTally {
    pub perfect: u32,
    pub sync: u32,
    pub offbeat: u32,
}

impl SectorTally {
    pub fn record(&mut self, quality: TapQuality) {
        match quality {
            TapQuality::Perfect => self.perfect += 1,
            TapQuality::Sync => self.sync += 1,
            TapQuality::Offbeat => self.offbeat += 1,
        }
    }
}

/// Sector verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectorVerdict {
    Linked,
    Broken,
}

#[derive(Debug, Clone)]
pub struct ChainState {
    pub streak: u32,
    pub best_streak: u32,
    /// Always within [1, multiplier_max]
    pub multiplier: f32,
    pub last_verdict: Option<SectorVerdict>,
    pub linked_sectors: u32,
    pub total_sectors: u32,
    pub anchor_stability_timer: f32,
    /// Linked sectors since the last shield grant
    pub linked_since_shield: u32,
    pub sector: SectorTally,
}

impl Default for ChainState {
    fn default() -> Self {
        Self {
            streak: 0,
            best_streak: 0,
            multiplier: 1.0,
            last_verdict: None,
            linked_sectors: 0,
            total_sectors: 0,
            anchor_stability_timer: 0.0,
            linked_since_shield: 0,
            sector: SectorTally::default(),
        }
    }
}

/// Passive abilities granted by chain performance
#[derive(Debug, Clone, Default)]
pub struct Passives {
    pub shield_charges: u32,
    pub gap_timer: f32,
    pub gap_cooldown: f32,
    pub flux_timer: f32,
    pub flux_cooldown: f32,
}

impl Passives {
    /// HUD summary of the most relevant active passive
    pub fn active_label(&self) -> String {
        if self.flux_timer > 0.0 {
            format!("Flux Boost {:.1}s", self.flux_timer)
        } else if self.gap_timer > 0.0 {
            format!("Gap Widen {:.1}s", self.gap_timer)
        } else if self.shield_charges > 0 {
            format!("Pulse Shield x{}", self.shield_charges)
        } else {
            "-".to_string()
        }
    }
}

/// Environment tier progression
#[derive(Debug, Clone, Default)]
pub struct EnvironmentState {
    pub active_index: usize,
    /// Crossfade source while a transition runs
    pub previous_index: usize,
    pub current_tier: u64,
    pub next_milestone: u64,
    pub progress_to_next: f32,
    pub transition_timer: f32,
    pub transition_progress: f32,
    pub label_timer: f32,
}

/// Complete run state
#[derive(Debug, Clone)]
pub struct RunState {
    /// Balance tables (shared, immutable)
    pub tuning: Arc<Tuning>,
    /// Seed of the spawn RNG
    pub seed: u64,
    pub rng: Pcg32,
    pub mode: Mode,
    /// Seconds since the round started
    pub run_time: f64,
    /// Seconds since the state was created (monotonic)
    pub total_time: f64,
    pub world: World,
    /// 1-based difficulty profile currently in effect
    pub difficulty_phase: u32,
    pub player: Player,
    /// Sorted by ascending x
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub score: u64,
    pub high_score: u64,
    pub spawn_timer: f32,
    pub heat: f32,
    pub overheat_timer: f32,
    pub invulnerability_timer: f32,
    pub sync: SyncState,
    pub chain: ChainState,
    pub passives: Passives,
    pub environment: EnvironmentState,
    pub events: EventQueue,
}

impl RunState {
    /// Create a state in `Menu` with the default balance
    pub fn new(seed: u64) -> Self {
        Self::build(Arc::new(Tuning::default()), seed)
    }

    /// Create a state in `Menu` with the given balance, rejecting tables
    /// the simulation cannot run on
    pub fn with_tuning(tuning: Arc<Tuning>, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(tuning, seed))
    }

    fn build(tuning: Arc<Tuning>, seed: u64) -> Self {
        let world = World::default();
        let player = Player {
            pos: Vec2::new(world.width * tuning.player.base_x_factor, world.height * 0.5),
            vel: Vec2::ZERO,
            radius: tuning.player.radius,
            base_x: world.width * tuning.player.base_x_factor,
        };
        let mut state = Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            mode: Mode::Menu,
            run_time: 0.0,
            total_time: 0.0,
            world,
            difficulty_phase: 1,
            player,
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            score: 0,
            high_score: 0,
            spawn_timer: 0.0,
            heat: 0.0,
            overheat_timer: 0.0,
            invulnerability_timer: 0.0,
            sync: SyncState::default(),
            chain: ChainState::default(),
            passives: Passives::default(),
            environment: EnvironmentState::default(),
            events: EventQueue::default(),
        };

        super::lifecycle::reset_round(&mut state, Mode::Menu);

        state
    }

    /// Taps inside the sync window over all taps this run
    pub fn sync_accuracy(&self) -> f64 {
        if self.sync.taps_total == 0 {
            return 0.0;
        }
        self.sync.taps_in_window as f64 / self.sync.taps_total as f64
    }

    /// Linked sectors over resolved sectors this run
    pub fn linked_sector_rate(&self) -> f64 {
        if self.chain.total_sectors == 0 {
            return 0.0;
        }
        self.chain.linked_sectors as f64 / self.chain.total_sectors as f64
    }

    #[inline]
    pub fn is_overheated(&self) -> bool {
        self.overheat_timer > 0.0
    }

    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerability_timer > 0.0
    }

    /// Queue a domain event stamped with the current total time
    pub fn emit(&mut self, kind: super::events::EventKind) {
        self.events.push(self.total_time, kind);
    }
}
