//! Obstacle shapes and per-shape collision classification
//!
//! Every obstacle occupies one fixed-width slice of the level grid. Shape
//! kinds are a tagged enum dispatched through a single `check_collision`,
//! with the spike-region-wins override expressed as explicit check ordering
//! rather than virtual dispatch.

use serde::{Deserialize, Serialize};

use super::collision::{CollisionOutcome, PlayerBox};
use crate::consts::*;

/// One of the three color keys the player can hold (1, 2, 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorKey {
    Red,
    Green,
    Blue,
}

impl ColorKey {
    /// Map a number key to its color, if it is one of the three color keys
    pub fn from_key_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(ColorKey::Red),
            2 => Some(ColorKey::Green),
            3 => Some(ColorKey::Blue),
            _ => None,
        }
    }
}

/// Color attribute of a platform surface
///
/// White is the neutral surface: any key counts as a correct jump from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SurfaceColor {
    Red,
    Green,
    Blue,
    #[default]
    White,
}

impl SurfaceColor {
    /// Whether jumping off this surface with `key` held counts as correct
    pub fn accepts(self, key: ColorKey) -> bool {
        match self {
            SurfaceColor::White => true,
            SurfaceColor::Red => key == ColorKey::Red,
            SurfaceColor::Green => key == ColorKey::Green,
            SurfaceColor::Blue => key == ColorKey::Blue,
        }
    }

    /// Classify an RGB triple from level data by its dominant channel
    ///
    /// Anything without a clear dominant channel degrades to White.
    pub fn from_rgb(rgb: [f32; 3]) -> Self {
        let [r, g, b] = rgb;
        if r > g && r > b {
            SurfaceColor::Red
        } else if g > r && g > b {
            SurfaceColor::Green
        } else if b > r && b > g {
            SurfaceColor::Blue
        } else {
            SurfaceColor::White
        }
    }
}

/// Obstacle shape variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// No shape at all - never collides
    Empty,
    /// Triangular hazard rising from the ground
    Spikes,
    /// Solid block column anchored to the ground, `blocks` units tall
    Tower { blocks: u32 },
    /// Tower with a spike region directly above its top
    TowerWithSpikes { blocks: u32 },
    /// Single block floating `blocks` offset units above the ground
    FloatingSquare { blocks: u32 },
    /// Floating square with a spike region above or below it
    FloatingSquareWithSpikes { blocks: u32, spikes_on_top: bool },
}

impl ShapeKind {
    /// Build a shape from a level-data type string
    ///
    /// Unknown type strings degrade to `Empty` - a malformed slice is never
    /// fatal to the level.
    pub fn from_type_str(otype: &str, height: u32, spikes_on_top: bool) -> Self {
        let blocks = height.max(1);
        match otype {
            "empty" => ShapeKind::Empty,
            "spikes" => ShapeKind::Spikes,
            "tower" => ShapeKind::Tower { blocks },
            "towerWithSpikes" => ShapeKind::TowerWithSpikes { blocks },
            "floatingSquare" => ShapeKind::FloatingSquare { blocks },
            "floatingSquareWithSpikes" => ShapeKind::FloatingSquareWithSpikes {
                blocks,
                spikes_on_top,
            },
            other => {
                log::warn!("Unknown obstacle type {other:?}, treating as empty");
                ShapeKind::Empty
            }
        }
    }
}

/// One obstacle, pinned to its slice of the level grid
///
/// Slice index is assigned at load and never changes; world-space geometry
/// is a pure function of the shape parameters and the current scroll offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Position along the track, in slices
    pub slice: u32,
    pub kind: ShapeKind,
    /// Color of the standable surface (ignored for spikes/empty)
    pub color: SurfaceColor,
}

/// Axis-aligned box overlap, exclusive at the edges
fn overlaps(
    a_left: f32,
    a_right: f32,
    a_bottom: f32,
    a_top: f32,
    b_left: f32,
    b_right: f32,
    b_bottom: f32,
    b_top: f32,
) -> bool {
    a_right > b_left && a_left < b_right && a_top > b_bottom && a_bottom < b_top
}

impl Obstacle {
    pub fn new(slice: u32, kind: ShapeKind, color: SurfaceColor) -> Self {
        Self { slice, kind, color }
    }

    /// World-space left edge before scrolling
    pub fn world_left(&self) -> f32 {
        self.slice as f32 * SLICE_WIDTH
    }

    /// World-space right edge before scrolling
    pub fn world_right(&self) -> f32 {
        self.world_left() + SLICE_WIDTH
    }

    /// Screen-space left edge at the given scroll offset
    pub fn left(&self, scroll_x: f32) -> f32 {
        self.world_left() - scroll_x
    }

    /// Total height above the ground line, in pixels
    pub fn height(&self) -> f32 {
        match self.kind {
            ShapeKind::Empty => 0.0,
            ShapeKind::Spikes => GROUND_SPIKE_HEIGHT,
            ShapeKind::Tower { blocks } => blocks as f32 * BLOCK_HEIGHT,
            ShapeKind::TowerWithSpikes { blocks } => {
                blocks as f32 * BLOCK_HEIGHT + TOWER_SPIKE_HEIGHT
            }
            ShapeKind::FloatingSquare { blocks } => {
                blocks as f32 * FLOATING_OFFSET_STEP + BLOCK_HEIGHT
            }
            ShapeKind::FloatingSquareWithSpikes {
                blocks,
                spikes_on_top,
            } => {
                let top = blocks as f32 * FLOATING_OFFSET_STEP + BLOCK_HEIGHT;
                if spikes_on_top {
                    top + FLOATING_SPIKE_HEIGHT
                } else {
                    top
                }
            }
        }
    }

    /// Classify how the player collides with this obstacle, if at all
    ///
    /// `player` is the player's bounding square (bottom-left corner + size)
    /// in screen space; `vy` is the player's vertical velocity.
    pub fn check_collision(
        &self,
        scroll_x: f32,
        player: &PlayerBox,
        vy: f32,
    ) -> CollisionOutcome {
        let left = self.left(scroll_x);
        let right = left + SLICE_WIDTH;
        let (pl, pr) = (player.pos.x, player.pos.x + player.size);
        let (pb, pt) = (player.pos.y, player.pos.y + player.size);

        match self.kind {
            ShapeKind::Empty => CollisionOutcome::None,

            ShapeKind::Spikes => {
                let spike_top = GROUND_HEIGHT + GROUND_SPIKE_HEIGHT;
                if overlaps(pl, pr, pb, pt, left, right, GROUND_HEIGHT, spike_top) {
                    CollisionOutcome::Spike
                } else {
                    CollisionOutcome::None
                }
            }

            ShapeKind::Tower { blocks } => {
                let top = GROUND_HEIGHT + blocks as f32 * BLOCK_HEIGHT;
                self.classify_rect(left, right, GROUND_HEIGHT, top, player, vy)
            }

            ShapeKind::TowerWithSpikes { blocks } => {
                let top = GROUND_HEIGHT + blocks as f32 * BLOCK_HEIGHT;
                // Spike region sits directly above the tower top and always
                // wins over what would otherwise be a valid landing
                if overlaps(pl, pr, pb, pt, left, right, top, top + TOWER_SPIKE_HEIGHT) {
                    return CollisionOutcome::Spike;
                }
                match self.classify_rect(left, right, GROUND_HEIGHT, top, player, vy) {
                    // The top is where the spikes begin - landing there is
                    // impossible, it kills like a side hit
                    CollisionOutcome::Top { .. } => CollisionOutcome::Side,
                    other => other,
                }
            }

            ShapeKind::FloatingSquare { blocks } => {
                let bottom = GROUND_HEIGHT + blocks as f32 * FLOATING_OFFSET_STEP;
                self.classify_rect(left, right, bottom, bottom + BLOCK_HEIGHT, player, vy)
            }

            ShapeKind::FloatingSquareWithSpikes {
                blocks,
                spikes_on_top,
            } => {
                let bottom = GROUND_HEIGHT + blocks as f32 * FLOATING_OFFSET_STEP;
                let top = bottom + BLOCK_HEIGHT;
                let (spike_bottom, spike_top) = if spikes_on_top {
                    (top, top + FLOATING_SPIKE_HEIGHT)
                } else {
                    (bottom - FLOATING_SPIKE_HEIGHT, bottom)
                };
                if overlaps(pl, pr, pb, pt, left, right, spike_bottom, spike_top) {
                    return CollisionOutcome::Spike;
                }
                self.classify_rect(left, right, bottom, top, player, vy)
            }
        }
    }

    /// Shared rectangle classification for tower-style solids
    ///
    /// Top and bottom are checked before side, guarded only by the landing
    /// epsilon; a fast-moving player can still "side" through near-corner
    /// cases.
    fn classify_rect(
        &self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        player: &PlayerBox,
        vy: f32,
    ) -> CollisionOutcome {
        let (pl, pr) = (player.pos.x, player.pos.x + player.size);
        let (pb, pt) = (player.pos.y, player.pos.y + player.size);

        if !overlaps(pl, pr, pb, pt, left, right, bottom, top) {
            return CollisionOutcome::None;
        }

        // Player's bottom is at or just below the top and moving downward
        if (pb - top).abs() < LANDING_EPSILON && vy <= 0.0 {
            return CollisionOutcome::Top {
                y: top,
                color: self.color,
            };
        }

        // Player's top is near the underside and moving upward
        if (pt - bottom).abs() < LANDING_EPSILON && vy >= 0.0 {
            return CollisionOutcome::Bottom { y: bottom };
        }

        CollisionOutcome::Side
    }
}
