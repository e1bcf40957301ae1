//! Beat Blitz - a side-scrolling rhythm platformer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, scoring, lifecycle)
//! - `music`: Beat scheduler driving note playback in sync with gameplay
//! - `level`: Level data loading and the obstacle factory
//! - `session`: Wires sim + scheduler behind a key/tick interface
//! - `highscores`: Per-level high score persistence
//! - `settings`: User preferences

pub mod highscores;
pub mod level;
pub mod music;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// How quickly the level scrolls to the left (px/s)
    pub const SCROLL_SPEED: f32 = 500.0;
    /// Width of one level slice (px) - the unit of obstacle placement
    pub const SLICE_WIDTH: f32 = 80.0;
    /// Baseline the player stands on (px above screen bottom)
    pub const GROUND_HEIGHT: f32 = 200.0;
    /// Downward acceleration (px/s²)
    pub const GRAVITY: f32 = -2500.0;
    /// Upward velocity applied on a jump (px/s)
    pub const JUMP_STRENGTH: f32 = 800.0;

    /// Player square side length (px)
    pub const PLAYER_SIZE: f32 = 40.0;
    /// Player's fixed screen-space x (world motion is simulated by scrolling)
    pub const PLAYER_X: f32 = 200.0;

    /// Height of one tower block (px)
    pub const BLOCK_HEIGHT: f32 = 40.0;
    /// Height of a ground spike hazard (px)
    pub const GROUND_SPIKE_HEIGHT: f32 = 50.0;
    /// Height of the spike sitting on a spiked tower (px)
    pub const TOWER_SPIKE_HEIGHT: f32 = 30.0;
    /// Height of the spike attached to a floating square (px)
    pub const FLOATING_SPIKE_HEIGHT: f32 = 20.0;
    /// Vertical offset per height unit for floating squares (px)
    pub const FLOATING_OFFSET_STEP: f32 = 50.0;
    /// Landing/head-bump threshold for tower-style collisions (px)
    pub const LANDING_EPSILON: f32 = 5.0;

    /// Visible width used to derive the active obstacle window (px)
    pub const VIEWPORT_WIDTH: f32 = 1600.0;
    /// Level is complete once the player clears the last obstacle by this much (px)
    pub const LEVEL_END_MARGIN: f32 = SLICE_WIDTH;

    /// Seconds the player stays dead before a respawn is attempted
    pub const RESPAWN_DELAY: f32 = 2.0;

    /// A jump within this many scheduler ticks of the pending note group
    /// fires that group immediately
    pub const JUMP_SKIP_TICKS: u64 = 2;
}
