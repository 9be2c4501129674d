//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (spawns) and an explicit `PhaseSource` (beat grading)
//! - Stable iteration order (obstacles sorted by x)
//! - No rendering, audio or storage dependencies

pub mod beat;
pub mod chain;
pub mod collision;
pub mod environment;
pub mod events;
pub mod heat;
pub mod lifecycle;
pub mod physics;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod weighted;

pub use beat::{PhaseSource, SyncDebug, SyncProfile, TapQuality, evaluate_tap_sync};
pub use chain::resolve_sector;
pub use collision::{Hitbox, Rect, ellipse_rect_overlap};
pub use events::{EventKind, GameEvent, PassiveKind, RunSummary, ScoreSource};
pub use lifecycle::{
    consume_events, reset_round, resize_world, restart_from_game_over, set_score_for_testing,
    set_sync_debug, start_game, toggle_pause, trigger_flap, trigger_game_over,
};
pub use snapshot::{Snapshot, snapshot};
pub use state::{
    ChainState, Collectible, EnvironmentState, Mode, Obstacle, Passives, Player, RunState,
    SectorTally, SectorVerdict, SyncState, World,
};
pub use tick::{TickInput, tick};
