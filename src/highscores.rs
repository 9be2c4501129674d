//! Best-score persistence
//!
//! A single non-negative integer stored as text under `HIGH_SCORE_KEY`.
//! Reads fall back to 0 and writes are best-effort; neither ever fails the
//! caller.

use crate::persistence::{HIGH_SCORE_KEY, KeyValueStore};

/// Parse a stored score; anything that is not a finite, non-negative number is 0
pub fn parse_high_score(raw: &str) -> u64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value.floor() as u64,
        _ => 0,
    }
}

/// Load the best score, defaulting to 0 on any failure
pub fn read_high_score(store: &dyn KeyValueStore) -> u64 {
    match store.get(HIGH_SCORE_KEY) {
        Ok(Some(raw)) => {
            let score = parse_high_score(&raw);
            log::info!("Loaded high score {}", score);
            score
        }
        Ok(None) => {
            log::info!("No high score found, starting fresh");
            0
        }
        Err(e) => {
            log::warn!("Could not read high score: {}", e);
            0
        }
    }
}

/// Persist the best score; failures are logged and dropped
pub fn write_high_score(store: &mut dyn KeyValueStore, score: u64) {
    match store.set(HIGH_SCORE_KEY, &score.to_string()) {
        Ok(()) => log::info!("High score saved ({})", score),
        Err(e) => log::warn!("Could not save high score: {}", e),
    }
}
