//! Collision outcomes and the per-tick resolver pass
//!
//! The resolver walks the obstacles inside the active viewport window in
//! slice order. The first fatal outcome (spike or side) ends the pass;
//! top/bottom outcomes reposition the player as they are found, so the last
//! writer among overlapping platforms wins the final y and support color.

use glam::Vec2;

use super::obstacle::{Obstacle, SurfaceColor};
use crate::consts::*;

/// Result of one obstacle's collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionOutcome {
    /// No contact
    None,
    /// Player lands on the surface at `y`; carries the surface color for
    /// jump judging
    Top { y: f32, color: SurfaceColor },
    /// Player bumps its head on the underside at `y`
    Bottom { y: f32 },
    /// Player ran into a face - fatal
    Side,
    /// Player touched a spike region - fatal
    Spike,
}

/// Player bounding square: bottom-left corner plus side length
#[derive(Debug, Clone, Copy)]
pub struct PlayerBox {
    pub pos: Vec2,
    pub size: f32,
}

/// Result of a full resolver pass over the active obstacles
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassOutcome {
    /// A spike or side hit was found - the player dies this tick
    Fatal,
    /// No fatal contact; position and velocity after any landings/bumps
    Clear {
        y: f32,
        vel_y: f32,
        /// True if some platform top is holding the player up
        supported: bool,
        /// Color of the last surface that provided support
        support_color: Option<SurfaceColor>,
    },
}

/// Obstacles whose horizontal span currently intersects the viewport,
/// with one slice width of margin on both sides
///
/// Pure query, recomputed each tick from the scroll offset; obstacles are
/// never added to or removed from the level while it runs.
pub fn active_obstacles(obstacles: &[Obstacle], scroll_x: f32) -> impl Iterator<Item = &Obstacle> {
    obstacles.iter().filter(move |o| {
        let left = o.left(scroll_x);
        left + SLICE_WIDTH > -SLICE_WIDTH && left < VIEWPORT_WIDTH + SLICE_WIDTH
    })
}

/// Run the collision pass for the current player box and velocity
///
/// Top/bottom repositioning is applied incrementally: each landing or bump
/// updates the box that later obstacles are tested against, mirroring the
/// in-order mutation the classification rules assume.
pub fn resolve(obstacles: &[Obstacle], scroll_x: f32, player: PlayerBox, vy: f32) -> PassOutcome {
    let mut boxed = player;
    let mut vel_y = vy;
    let mut supported = false;
    let mut support_color = None;

    for obs in active_obstacles(obstacles, scroll_x) {
        match obs.check_collision(scroll_x, &boxed, vel_y) {
            CollisionOutcome::Spike | CollisionOutcome::Side => return PassOutcome::Fatal,
            CollisionOutcome::Top { y, color } => {
                boxed.pos.y = y;
                vel_y = 0.0;
                supported = true;
                support_color = Some(color);
            }
            CollisionOutcome::Bottom { y } => {
                // Head bump: player's top is pushed to the underside.
                // Does not grant support.
                boxed.pos.y = y - boxed.size;
                vel_y = 0.0;
            }
            CollisionOutcome::None => {}
        }
    }

    PassOutcome::Clear {
        y: boxed.pos.y,
        vel_y,
        supported,
        support_color,
    }
}

/// Whether any obstacle collides with the player at the given position
///
/// Used by the respawn check: a dead player may not resurrect into
/// geometry.
pub fn position_blocked(obstacles: &[Obstacle], scroll_x: f32, player: PlayerBox) -> bool {
    active_obstacles(obstacles, scroll_x)
        .any(|o| o.check_collision(scroll_x, &player, 0.0) != CollisionOutcome::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::ShapeKind;

    fn player_at(x: f32, y: f32) -> PlayerBox {
        PlayerBox {
            pos: Vec2::new(x, y),
            size: PLAYER_SIZE,
        }
    }

    #[test]
    fn test_active_window_excludes_far_obstacles() {
        let obstacles = vec![
            Obstacle::new(0, ShapeKind::Spikes, SurfaceColor::White),
            Obstacle::new(100, ShapeKind::Spikes, SurfaceColor::White),
        ];
        let active: Vec<u32> = active_obstacles(&obstacles, 0.0).map(|o| o.slice).collect();
        assert_eq!(active, vec![0]);

        // Scroll slice 100 into view
        let scroll = 100.0 * SLICE_WIDTH;
        let active: Vec<u32> = active_obstacles(&obstacles, scroll)
            .map(|o| o.slice)
            .collect();
        assert_eq!(active, vec![100]);
    }

    #[test]
    fn test_first_fatal_terminates_pass() {
        let obstacles = vec![
            Obstacle::new(0, ShapeKind::Spikes, SurfaceColor::White),
            Obstacle::new(0, ShapeKind::Tower { blocks: 1 }, SurfaceColor::Red),
        ];
        let outcome = resolve(&obstacles, 0.0, player_at(10.0, GROUND_HEIGHT), 0.0);
        assert_eq!(outcome, PassOutcome::Fatal);
    }

    #[test]
    fn test_landing_reports_support_color() {
        let obstacles = vec![Obstacle::new(
            2,
            ShapeKind::Tower { blocks: 2 },
            SurfaceColor::Green,
        )];
        let top = GROUND_HEIGHT + 2.0 * BLOCK_HEIGHT;
        let scroll = 2.0 * SLICE_WIDTH - 10.0;
        let outcome = resolve(&obstacles, scroll, player_at(10.0, top - 3.0), -40.0);
        assert_eq!(
            outcome,
            PassOutcome::Clear {
                y: top,
                vel_y: 0.0,
                supported: true,
                support_color: Some(SurfaceColor::Green),
            }
        );
    }

    #[test]
    fn test_last_landing_wins() {
        // Two towers of equal height in the same slice position but
        // different colors: the later one in slice order overrides
        let obstacles = vec![
            Obstacle::new(0, ShapeKind::Tower { blocks: 1 }, SurfaceColor::Red),
            Obstacle::new(0, ShapeKind::Tower { blocks: 1 }, SurfaceColor::Blue),
        ];
        let top = GROUND_HEIGHT + BLOCK_HEIGHT;
        let outcome = resolve(&obstacles, 0.0, player_at(10.0, top - 2.0), -10.0);
        match outcome {
            PassOutcome::Clear { support_color, .. } => {
                assert_eq!(support_color, Some(SurfaceColor::Blue));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_head_bump_does_not_support() {
        let obstacles = vec![Obstacle::new(
            0,
            ShapeKind::FloatingSquare { blocks: 4 },
            SurfaceColor::White,
        )];
        let bottom = GROUND_HEIGHT + 4.0 * FLOATING_OFFSET_STEP;
        let outcome = resolve(
            &obstacles,
            0.0,
            player_at(10.0, bottom - PLAYER_SIZE + 2.0),
            250.0,
        );
        assert_eq!(
            outcome,
            PassOutcome::Clear {
                y: bottom - PLAYER_SIZE,
                vel_y: 0.0,
                supported: false,
                support_color: None,
            }
        );
    }

    #[test]
    fn test_respawn_position_blocked() {
        let obstacles = vec![Obstacle::new(5, ShapeKind::Spikes, SurfaceColor::White)];
        let scroll = 5.0 * SLICE_WIDTH - PLAYER_X;
        assert!(position_blocked(
            &obstacles,
            scroll,
            player_at(PLAYER_X, GROUND_HEIGHT)
        ));
        assert!(!position_blocked(
            &obstacles,
            0.0,
            player_at(PLAYER_X, GROUND_HEIGHT)
        ));
    }
}
