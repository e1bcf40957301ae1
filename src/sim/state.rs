//! Game state and core simulation types
//!
//! All state the session needs for HUD, persistence, and determinism lives
//! here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::PlayerBox;
use super::obstacle::{ColorKey, Obstacle, SurfaceColor};
use crate::consts::*;

/// Points for a correct jump below the streak threshold
pub const CORRECT_POINTS: i64 = 10;
/// Points for a correct jump once the streak bonus is engaged
pub const STREAK_BONUS_POINTS: i64 = 30;
/// Streak count at which the bonus engages
pub const STREAK_BONUS_AT: u32 = 3;
/// Points lost on an incorrect jump
pub const INCORRECT_PENALTY: i64 = 5;
/// Points lost on death
pub const DEATH_PENALTY: i64 = 10;

/// Player lifecycle phase
///
/// `Complete` is terminal: once reached, further ticks are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifePhase {
    /// Normal play
    Alive,
    /// Waiting out the respawn timer; physics and input are suspended
    Dead { ticks: u32 },
    /// Level finished - terminal
    Complete,
}

/// The player square
///
/// Horizontal position is fixed in screen space; the world scrolls past.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player {
    /// Bottom edge height (screen space)
    pub y: f32,
    pub vel_y: f32,
    /// Color of the key last pressed - the player's active color
    pub color: ColorKey,
    /// Standing on the ground or an obstacle top
    pub supported: bool,
    /// Color of the surface currently holding the player up
    pub support_color: Option<SurfaceColor>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            y: GROUND_HEIGHT,
            vel_y: 0.0,
            color: ColorKey::Red,
            supported: true,
            support_color: Some(SurfaceColor::White),
        }
    }

    /// Bounding square for collision checks
    pub fn boxed(&self) -> PlayerBox {
        PlayerBox {
            pos: Vec2::new(PLAYER_X, self.y),
            size: PLAYER_SIZE,
        }
    }

    /// Reset to the grounded spawn pose (keeps the active color)
    pub fn reset_to_ground(&mut self) {
        self.y = GROUND_HEIGHT;
        self.vel_y = 0.0;
        self.supported = true;
        self.support_color = Some(SurfaceColor::White);
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// Score and streak bookkeeping
///
/// Score may go negative; HUD display clamps at zero separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: i64,
    /// Consecutive correct jumps
    pub streak: u32,
}

impl ScoreState {
    /// Apply a correct jump; returns the points awarded
    pub fn correct_jump(&mut self) -> i64 {
        self.streak += 1;
        let points = if self.streak >= STREAK_BONUS_AT {
            STREAK_BONUS_POINTS
        } else {
            CORRECT_POINTS
        };
        self.score += points;
        points
    }

    pub fn incorrect_jump(&mut self) {
        self.score -= INCORRECT_PENALTY;
        self.streak = 0;
    }

    pub fn death(&mut self) {
        self.score -= DEATH_PENALTY;
        self.streak = 0;
    }
}

/// Events emitted by the simulation tick for the audio/persistence layers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    CorrectJump { key: ColorKey },
    IncorrectJump { key: ColorKey },
    Death,
    Respawn,
    LevelComplete { final_score: i64 },
}

/// Complete simulation state for one level run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Level obstacles, sorted by slice index at load and never mutated
    pub obstacles: Vec<Obstacle>,
    /// Accumulated horizontal scroll (world x of the screen's left edge)
    pub scroll_x: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    pub score: ScoreState,
    pub phase: LifePhase,
    /// Seconds the player stays dead before a respawn attempt
    pub respawn_delay: f32,
    /// World x the player's leading edge must pass to finish the level
    level_end_x: f32,
}

impl GameState {
    /// Create a run from loaded obstacles
    pub fn new(mut obstacles: Vec<Obstacle>) -> Self {
        obstacles.sort_by_key(|o| o.slice);
        let level_end_x = obstacles
            .last()
            .map(|o| o.world_right() + LEVEL_END_MARGIN)
            .unwrap_or(LEVEL_END_MARGIN);
        Self {
            obstacles,
            scroll_x: 0.0,
            time_ticks: 0,
            player: Player::new(),
            score: ScoreState::default(),
            phase: LifePhase::Alive,
            respawn_delay: RESPAWN_DELAY,
            level_end_x,
        }
    }

    /// World-space x of the player's leading (right) edge
    pub fn player_leading_edge(&self) -> f32 {
        self.scroll_x + PLAYER_X + PLAYER_SIZE
    }

    /// True once the player has cleared the last obstacle's trailing edge
    /// by the completion margin
    pub fn past_level_end(&self) -> bool {
        self.player_leading_edge() > self.level_end_x
    }

    /// Restart the run in place: fresh player, score, scroll, and phase
    pub fn restart(&mut self) {
        self.scroll_x = 0.0;
        self.time_ticks = 0;
        self.player = Player::new();
        self.score = ScoreState::default();
        self.phase = LifePhase::Alive;
    }
}
