//! Sky Circuits - a beat-synced side-scrolling arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, beat sync, chain scoring)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Key-value stores for the high score and telemetry
//! - `engine`: Fixed-timestep driver that owns the run state and its collaborators

pub mod engine;
pub mod highscores;
pub mod persistence;
pub mod sim;
pub mod telemetry;
pub mod tuning;

pub use engine::Engine;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest wall-clock delta a single frame may feed the accumulator (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.1;

    /// Smallest legal world size (CSS pixels)
    pub const MIN_WORLD_WIDTH: f32 = 320.0;
    pub const MIN_WORLD_HEIGHT: f32 = 180.0;

    /// Default world size before the first resize
    pub const DEFAULT_WORLD_WIDTH: f32 = 960.0;
    pub const DEFAULT_WORLD_HEIGHT: f32 = 540.0;
}

/// Wrap a phase value into [0, 1). Non-finite input maps to 0.
#[inline]
pub fn wrap_phase(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Round to a fixed number of decimal places (for snapshots and event payloads)
#[inline]
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Decrement a countdown timer, clamping at zero
#[inline]
pub fn decay(timer: &mut f32, dt: f32) {
    if *timer > 0.0 {
        *timer = (*timer - dt).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_phase() {
        assert_eq!(wrap_phase(0.25), 0.25);
        assert!((wrap_phase(1.75) - 0.75).abs() < 1e-9);
        assert!((wrap_phase(-0.25) - 0.75).abs() < 1e-9);
        assert_eq!(wrap_phase(f64::NAN), 0.0);
        assert_eq!(wrap_phase(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.049, 1), -0.0);
    }

    #[test]
    fn test_decay_clamps() {
        let mut t = 0.01;
        decay(&mut t, 0.5);
        assert_eq!(t, 0.0);
        decay(&mut t, 0.5);
        assert_eq!(t, 0.0);
    }
}
