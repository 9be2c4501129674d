//! Beat clock and tap grading
//!
//! The beat phase is derived from run time and the active environment's BPM.
//! A tap is graded by its distance to the nearest beat.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::events::EventKind;
use super::heat::apply_heat_delta;
use super::state::RunState;
use crate::{round_to, wrap_phase};

/// Tap timing grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapQuality {
    Perfect,
    Sync,
    Offbeat,
}

impl TapQuality {
    /// Perfect and sync taps both count as on-beat
    pub fn in_window(self) -> bool {
        !matches!(self, TapQuality::Offbeat)
    }
}

/// Where the beat phase comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseSource {
    /// Derived from run time
    Natural,
    /// Every evaluation sees this phase
    Fixed(f64),
    /// Each tap draws the next value of a 32-bit LCG
    Seeded(u32),
}

impl PhaseSource {
    /// Phase used to grade a tap; advances the seeded generator
    pub fn next_tap_phase(&mut self, natural: f64) -> f64 {
        match self {
            PhaseSource::Natural => natural,
            PhaseSource::Fixed(phase) => *phase,
            PhaseSource::Seeded(seed) => {
                *seed = lcg_next(*seed);
                *seed as f64 / 4_294_967_296.0
            }
        }
    }

    /// Phase shown by the beat clock each tick (never advances the generator)
    pub fn display_phase(&self, natural: f64) -> f64 {
        match self {
            PhaseSource::Fixed(phase) => *phase,
            _ => natural,
        }
    }
}

#[inline]
pub fn lcg_next(seed: u32) -> u32 {
    seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223)
}

/// FNV-1a over the UTF-16 code units of `text`
pub fn hash_seed(text: &str) -> u32 {
    text.encode_utf16().fold(2_166_136_261u32, |hash, unit| {
        (hash ^ unit as u32).wrapping_mul(16_777_619)
    })
}

/// Debug override for the beat phase
#[derive(Debug, Clone, PartialEq)]
pub enum SyncDebug {
    /// Back to the natural clock
    Off,
    /// Fixed phase (wrapped into [0, 1))
    Phase(f64),
    /// Deterministic per-tap phases from a hashed seed
    Seed(String),
}

impl SyncDebug {
    /// Parse a JSON-ish payload: `null`, a number, a numeric string,
    /// `{"phase": n}` or `{"seed": s}`. Returns `None` for payloads that carry
    /// no instruction.
    pub fn parse(payload: &str) -> Option<SyncDebug> {
        match serde_json::from_str::<Value>(payload) {
            Ok(value) => Self::from_value(&value),
            // Bare text is read as a phase, like a number typed into a console
            Err(_) => Some(SyncDebug::Phase(number_or_zero(payload))),
        }
    }

    pub fn from_value(value: &Value) -> Option<SyncDebug> {
        match value {
            Value::Null => Some(SyncDebug::Off),
            Value::Number(_) | Value::String(_) => Some(SyncDebug::Phase(value_as_phase(value))),
            Value::Object(map) => {
                if let Some(phase) = map.get("phase") {
                    Some(SyncDebug::Phase(value_as_phase(phase)))
                } else {
                    map.get("seed").map(|seed| match seed {
                        Value::String(s) => SyncDebug::Seed(s.clone()),
                        other => SyncDebug::Seed(other.to_string()),
                    })
                }
            }
            _ => None,
        }
    }

    pub fn into_source(self) -> PhaseSource {
        match self {
            SyncDebug::Off => PhaseSource::Natural,
            SyncDebug::Phase(phase) => PhaseSource::Fixed(wrap_phase(phase)),
            SyncDebug::Seed(seed) => PhaseSource::Seeded(hash_seed(&seed)),
        }
    }
}

fn number_or_zero(text: &str) -> f64 {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn value_as_phase(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => number_or_zero(s),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Tempo and grading windows for the active environment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncProfile {
    pub bpm: f32,
    pub beat_interval_ms: f64,
    pub perfect_window_ms: f64,
    pub sync_window_ms: f64,
}

impl SyncProfile {
    pub fn for_state(state: &RunState) -> Self {
        let env = state.tuning.environment(state.environment.active_index);
        let factor = if state.is_overheated() {
            state.tuning.heat.overheat_window_factor as f64
        } else {
            1.0
        };
        Self {
            bpm: env.bpm,
            beat_interval_ms: 60_000.0 / (env.bpm.max(1.0) as f64),
            perfect_window_ms: env.perfect_window_ms as f64 * factor,
            sync_window_ms: env.sync_window_ms as f64 * factor,
        }
    }

    /// Natural phase at `run_time` seconds
    pub fn phase_at(&self, run_time: f64) -> f64 {
        wrap_phase(run_time * 1000.0 / self.beat_interval_ms)
    }

    /// Grade a phase: returns the signed offset to the nearest beat (ms) and the grade
    pub fn grade(&self, phase: f64) -> (f64, TapQuality) {
        let phase = wrap_phase(phase);
        let centered = if phase > 0.5 { phase - 1.0 } else { phase };
        let delta_ms = centered * self.beat_interval_ms;
        let quality = if delta_ms.abs() <= self.perfect_window_ms {
            TapQuality::Perfect
        } else if delta_ms.abs() <= self.sync_window_ms {
            TapQuality::Sync
        } else {
            TapQuality::Offbeat
        };
        (delta_ms, quality)
    }
}

/// Refresh the displayed beat clock (interval, phase, ms to next beat)
pub fn sync_beat_clock(state: &mut RunState) -> SyncProfile {
    let profile = SyncProfile::for_state(state);
    let natural = profile.phase_at(state.run_time);
    let phase = state.sync.phase_source.display_phase(natural);

    state.sync.beat_interval_ms = profile.beat_interval_ms as f32;
    state.sync.beat_phase = phase as f32;
    state.sync.beat_ms_to_next = round_to((1.0 - phase) * profile.beat_interval_ms, 1) as f32;
    profile
}

/// Grade a tap against the beat and apply its side effects
///
/// Updates tap counters, feeds the heat gate, tallies the current sector and
/// emits the matching sync event.
pub fn evaluate_tap_sync(state: &mut RunState) -> TapQuality {
    let profile = SyncProfile::for_state(state);
    let natural = profile.phase_at(state.run_time);
    let phase = state.sync.phase_source.next_tap_phase(natural);
    let (delta_ms, quality) = profile.grade(phase);
    let delta_ms = round_to(delta_ms, 1) as f32;

    let tuning = state.tuning.clone();
    let sync = &mut state.sync;
    sync.last_tap_delta_ms = delta_ms;
    sync.tap_quality = Some(quality);
    sync.taps_total += 1;
    if quality.in_window() {
        sync.taps_in_window += 1;
    }
    state.chain.sector.record(quality);

    match quality {
        TapQuality::Perfect => {
            state.sync.perfect_taps += 1;
            state.sync.offbeat_streak = 0;
            state.sync.recent_perfect_timer = tuning.sync.recent_perfect_window_sec;
            state.sync.perfect_pulse_timer = tuning.sync.perfect_pulse_sec;
            apply_heat_delta(state, -tuning.sync.perfect_heat_relief);
            state.emit(EventKind::SyncPerfect { delta_ms });
        }
        TapQuality::Sync => {
            state.sync.offbeat_streak = 0;
            apply_heat_delta(state, -tuning.sync.sync_heat_relief);
            state.emit(EventKind::SyncHit { delta_ms });
        }
        TapQuality::Offbeat => {
            state.sync.offbeat_streak += 1;
            let scale = if state.chain.anchor_stability_timer > 0.0 {
                tuning.sync.anchor_penalty_scale
            } else {
                1.0
            };
            apply_heat_delta(state, tuning.sync.offbeat_heat_penalty * scale);
            let streak = state.sync.offbeat_streak;
            state.emit(EventKind::SyncOffbeat { delta_ms, streak });
        }
    }

    quality
}
