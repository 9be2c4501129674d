//! Aggregated run telemetry
//!
//! Counts run starts and completed runs and accumulates play time. Persisted as
//! one JSON object under `TELEMETRY_KEY`; stored values that are missing,
//! negative or non-numeric load as zero.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::persistence::{KeyValueStore, TELEMETRY_KEY};
use crate::sim::{EventKind, GameEvent};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetrySnapshot {
    pub run_starts: u64,
    pub completed_runs: u64,
    pub total_run_duration_sec: f64,
    pub avg_run_duration_sec: f64,
}

impl TelemetrySnapshot {
    fn normalized(mut self) -> Self {
        self.avg_run_duration_sec = if self.completed_runs > 0 {
            self.total_run_duration_sec / self.completed_runs as f64
        } else {
            0.0
        };
        self
    }

    /// Lenient parse of a stored payload
    pub fn from_stored(raw: &str) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
            return Self::default();
        };
        let field = |name: &str| {
            map.get(name)
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(0.0)
        };
        Self {
            run_starts: field("runStarts").round() as u64,
            completed_runs: field("completedRuns").round() as u64,
            total_run_duration_sec: field("totalRunDurationSec"),
            avg_run_duration_sec: 0.0,
        }
        .normalized()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    data: TelemetrySnapshot,
}

impl Telemetry {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let data = match store.get(TELEMETRY_KEY) {
            Ok(Some(raw)) => TelemetrySnapshot::from_stored(&raw),
            Ok(None) => TelemetrySnapshot::default(),
            Err(e) => {
                log::warn!("Could not read telemetry: {}", e);
                TelemetrySnapshot::default()
            }
        };
        Self { data }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.data.clone().normalized()
    }

    pub fn track_run_start(&mut self, store: &mut dyn KeyValueStore) -> TelemetrySnapshot {
        self.data.run_starts += 1;
        self.persist(store)
    }

    /// Record a finished run; non-positive or non-finite durations are ignored
    pub fn track_run_end(&mut self, store: &mut dyn KeyValueStore, duration_sec: f64) -> TelemetrySnapshot {
        if !duration_sec.is_finite() || duration_sec <= 0.0 {
            return self.snapshot();
        }
        self.data.completed_runs += 1;
        self.data.total_run_duration_sec += duration_sec;
        self.persist(store)
    }

    /// Feed a drained simulation event
    pub fn observe(&mut self, store: &mut dyn KeyValueStore, event: &GameEvent) {
        match &event.kind {
            EventKind::RunStart => {
                self.track_run_start(store);
            }
            EventKind::GameOver(summary) | EventKind::RunAborted(summary) => {
                self.track_run_end(store, summary.run_duration);
            }
            _ => {}
        }
    }

    fn persist(&mut self, store: &mut dyn KeyValueStore) -> TelemetrySnapshot {
        self.data = self.data.clone().normalized();
        match serde_json::to_string(&self.data) {
            Ok(json) => {
                if let Err(e) = store.set(TELEMETRY_KEY, &json) {
                    log::warn!("Could not save telemetry: {}", e);
                }
            }
            Err(e) => log::warn!("Could not encode telemetry: {}", e),
        }
        self.data.clone()
    }
}
