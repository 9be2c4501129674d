//! Domain events emitted by the simulation
//!
//! Events accumulate in a FIFO owned by `RunState` and are drained exactly once
//! per frame by the host (audio, telemetry, HUD flashes).

use serde::Serialize;

use super::beat::TapQuality;
use super::state::{RunState, SectorVerdict};
use crate::round_to;

/// Which passive fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassiveKind {
    Shield,
    Gap,
    Flux,
}

/// Why score was awarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreSource {
    LinkedSector,
    BrokenSector,
    SyncAnchor,
}

/// End-of-run statistics carried by `GameOver` and `RunAborted`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub score: u64,
    /// Seconds
    pub run_duration: f64,
    /// Taps in a sync window over all taps, [0, 1]
    pub sync_accuracy: f64,
    /// Best chain streak of the run
    pub chain_peak: u32,
    pub linked_sector_rate: f64,
}

impl RunSummary {
    pub fn from_state(state: &RunState) -> Self {
        Self {
            score: state.score,
            run_duration: round_to(state.run_time, 3),
            sync_accuracy: round_to(state.sync_accuracy(), 4),
            chain_peak: state.chain.best_streak,
            linked_sector_rate: round_to(state.linked_sector_rate(), 4),
        }
    }
}

/// Event payloads, one variant per event type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum EventKind {
    Flap {
        quality: TapQuality,
    },
    SyncPerfect {
        delta_ms: f32,
    },
    SyncHit {
        delta_ms: f32,
    },
    SyncOffbeat {
        delta_ms: f32,
        streak: u32,
    },
    SyncAnchor {
        multiplier_bonus: f32,
        anchor_window: f32,
    },
    ChainBreak {
        streak: u32,
    },
    PassiveTrigger {
        passive: PassiveKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        charges: Option<u32>,
    },
    ShieldHit {
        charges_left: u32,
    },
    OverheatStart,
    ScoreGain {
        amount: u64,
        source: ScoreSource,
        score: u64,
    },
    SectorResolved {
        verdict: SectorVerdict,
        gain: u64,
        multiplier: f32,
        perfect_taps: u32,
        sync_taps: u32,
        offbeat_taps: u32,
    },
    EnvironmentShift {
        from_index: usize,
        to_index: usize,
        tier: u64,
        score: u64,
    },
    RunStart,
    RunAborted(RunSummary),
    #[serde(rename = "gameover")]
    GameOver(RunSummary),
}

/// A timestamped event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEvent {
    /// `total_time` at emission (seconds, millisecond precision)
    pub at: f64,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Append-only event FIFO, drained by the host
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn push(&mut self, total_time: f64, kind: EventKind) {
        self.events.push(GameEvent { at: round_to(total_time, 3), kind });
    }

    /// Take every queued event, leaving the queue empty
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }
}
