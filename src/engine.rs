//! Frame-driven engine
//!
//! Owns the run state and its collaborators (key-value store, telemetry) and
//! turns variable wall-clock frame deltas into fixed simulation ticks. Hosts
//! call one of the input entry points whenever the player acts, `frame` once
//! per display frame, then `drain_events` and `snapshot`/`state` to present.

use std::sync::Arc;

use crate::consts::*;
use crate::highscores::{read_high_score, write_high_score};
use crate::persistence::KeyValueStore;
use crate::sim::{self, GameEvent, Mode, RunState, Snapshot, SyncDebug, TickInput, tick};
use crate::telemetry::{Telemetry, TelemetrySnapshot};
use crate::tuning::{Tuning, TuningError};

pub struct Engine {
    state: RunState,
    store: Box<dyn KeyValueStore>,
    telemetry: Telemetry,
    accumulator: f32,
    /// One-shot commands consumed by the next tick
    input: TickInput,
    /// Last high score written to the store
    saved_high_score: u64,
}

impl Engine {
    /// Build an engine around a validated tuning table
    pub fn new(tuning: Tuning, seed: u64, store: Box<dyn KeyValueStore>) -> Result<Self, TuningError> {
        let state = RunState::with_tuning(Arc::new(tuning), seed)?;
        Ok(Self::from_parts(state, store))
    }

    /// Engine with the shipped balance
    pub fn with_store(seed: u64, store: Box<dyn KeyValueStore>) -> Self {
        Self::from_parts(RunState::new(seed), store)
    }

    fn from_parts(mut state: RunState, store: Box<dyn KeyValueStore>) -> Self {
        let high_score = read_high_score(store.as_ref());
        state.high_score = high_score;
        let telemetry = Telemetry::load(store.as_ref());
        log::info!("Engine ready (seed {}, high score {})", state.seed, high_score);

        Self {
            state,
            store,
            telemetry,
            accumulator: 0.0,
            input: TickInput::default(),
            saved_high_score: high_score,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Mutable access for hosts and tests that poke state between ticks
    pub fn state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        sim::snapshot(&self.state)
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry.snapshot()
    }

    // Deferred input, applied at the start of the next tick

    pub fn queue_flap(&mut self) {
        self.input.flap = true;
    }

    pub fn queue_pause(&mut self) {
        self.input.pause = true;
    }

    pub fn queue_restart(&mut self) {
        self.input.restart = true;
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
    }

    // Immediate entry points

    pub fn start_game(&mut self) {
        sim::start_game(&mut self.state);
    }

    pub fn trigger_flap(&mut self) -> Option<sim::TapQuality> {
        sim::trigger_flap(&mut self.state)
    }

    pub fn toggle_pause(&mut self) -> bool {
        sim::toggle_pause(&mut self.state)
    }

    pub fn reset_round(&mut self, mode: Mode) {
        sim::reset_round(&mut self.state, mode);
        self.accumulator = 0.0;
    }

    /// Leave whatever is running and return to the menu
    pub fn reset_to_menu(&mut self) {
        self.reset_round(Mode::Menu);
    }

    pub fn restart_from_game_over(&mut self) {
        sim::restart_from_game_over(&mut self.state);
        self.accumulator = 0.0;
    }

    pub fn resize_world(&mut self, width: f32, height: f32, pixel_scale: f32) {
        sim::resize_world(&mut self.state, width, height, pixel_scale);
    }

    pub fn set_sync_debug(&mut self, debug: SyncDebug) {
        sim::set_sync_debug(&mut self.state, debug);
    }

    pub fn set_score_for_testing(&mut self, score: f64) {
        sim::set_score_for_testing(&mut self.state, score);
    }

    /// Feed one display frame of wall-clock time. Returns the ticks run.
    pub fn frame(&mut self, elapsed_sec: f32) -> u32 {
        let dt = if elapsed_sec.is_finite() {
            elapsed_sec.clamp(0.0, MAX_FRAME_DELTA)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        self.persist_high_score();
        substeps
    }

    /// Run `max(1, round(ms / tick_ms))` ticks immediately (testing hook)
    pub fn advance_by_ms(&mut self, ms: f64) -> u32 {
        let tick_ms = SIM_DT as f64 * 1000.0;
        let steps = if ms.is_finite() {
            (ms / tick_ms).round().max(1.0) as u32
        } else {
            1
        };
        for _ in 0..steps {
            self.step();
        }
        self.persist_high_score();
        steps
    }

    fn step(&mut self) {
        let input = self.input.clone();
        tick(&mut self.state, &input, SIM_DT);
        // Clear one-shot inputs after processing
        self.input.flap = false;
        self.input.pause = false;
        self.input.restart = false;
    }

    /// Take this frame's events, updating telemetry on the way out
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        let events = sim::consume_events(&mut self.state);
        for event in &events {
            self.telemetry.observe(self.store.as_mut(), event);
        }
        self.persist_high_score();
        events
    }

    fn persist_high_score(&mut self) {
        if self.state.high_score > self.saved_high_score {
            write_high_score(self.store.as_mut(), self.state.high_score);
            self.saved_high_score = self.state.high_score;
        }
    }
}
