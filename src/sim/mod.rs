//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by slice index)
//! - No rendering, audio, or platform dependencies

pub mod collision;
pub mod obstacle;
pub mod state;
pub mod tick;

pub use collision::{CollisionOutcome, PassOutcome, PlayerBox, active_obstacles, resolve};
pub use obstacle::{ColorKey, Obstacle, ShapeKind, SurfaceColor};
pub use state::{GameEvent, GameState, LifePhase, Player, ScoreState};
pub use tick::{TickInput, tick};
