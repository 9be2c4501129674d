//! Small key-value persistence for scalars that outlive a run
//!
//! Features:
//! - One trait, three backends (memory, JSON file, browser LocalStorage)
//! - Typed errors; callers decide whether a failure matters
//! - Atomic file writes (tmp → rename)
//!
//! The simulation never touches a store. The engine reads the high score and
//! telemetry at startup and writes them back when they change.

pub mod memory;

#[cfg(not(target_arch = "wasm32"))]
pub mod file;

#[cfg(target_arch = "wasm32")]
pub mod local_storage;

pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// Storage key of the best score
pub const HIGH_SCORE_KEY: &str = "skyCircuits.highScore.v1";
/// Storage key of the aggregated run telemetry
pub const TELEMETRY_KEY: &str = "skyCircuits.telemetry.v1";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage backend rejected the operation: {0}")]
    Backend(String),
}

/// String-keyed, string-valued storage
pub trait KeyValueStore {
    /// `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// The platform's natural store: LocalStorage in the browser, memory natively
pub fn default_store() -> Box<dyn KeyValueStore> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(LocalStorageStore::new())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(MemoryStore::default())
    }
}
