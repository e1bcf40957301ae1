//! Fixed timestep simulation tick
//!
//! Advances scrolling, player physics, collision resolution, the jump
//! controller, and the death/respawn/completion lifecycle for one step.

use super::collision::{PassOutcome, position_blocked, resolve};
use super::obstacle::{ColorKey, SurfaceColor};
use super::state::{GameEvent, GameState, LifePhase};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Color key currently held, if any. Holding attempts a jump every
    /// tick the player is supported, which amounts to one jump per landing.
    pub held_key: Option<ColorKey>,
    /// Restart the run from the beginning
    pub restart: bool,
}

/// Advance the game state by one fixed timestep
///
/// Returns the lifecycle events this tick produced, in order, for the
/// audio and persistence layers.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.restart {
        log::info!("Restarting level run");
        state.restart();
        return events;
    }

    if state.phase == LifePhase::Complete {
        return events;
    }

    state.time_ticks += 1;

    // The world keeps scrolling even while dead
    state.scroll_x += SCROLL_SPEED * dt;

    if let LifePhase::Dead { ticks } = state.phase {
        let ticks = ticks + 1;
        state.phase = LifePhase::Dead { ticks };
        if ticks as f32 * dt >= state.respawn_delay {
            // Never resurrect into geometry; keep waiting until the spawn
            // position scrolls clear
            let spawn = state.player.boxed();
            if position_blocked(&state.obstacles, state.scroll_x, spawn) {
                log::debug!("Respawn blocked at tick {}, deferring", state.time_ticks);
            } else {
                state.player.reset_to_ground();
                state.phase = LifePhase::Alive;
                log::info!("Player respawned at tick {}", state.time_ticks);
                events.push(GameEvent::Respawn);
            }
        }
        return events;
    }

    // Gravity integration
    let player = &mut state.player;
    player.vel_y += GRAVITY * dt;
    player.y += player.vel_y * dt;

    // Ground clamp; support may be re-granted by a platform top below
    if player.y < GROUND_HEIGHT {
        player.y = GROUND_HEIGHT;
        player.vel_y = 0.0;
        player.supported = true;
        player.support_color = Some(SurfaceColor::White);
    } else {
        player.supported = false;
        player.support_color = None;
    }

    // Collision pass over the active window
    match resolve(
        &state.obstacles,
        state.scroll_x,
        state.player.boxed(),
        state.player.vel_y,
    ) {
        PassOutcome::Fatal => {
            kill(state, &mut events);
            return events;
        }
        PassOutcome::Clear {
            y,
            vel_y,
            supported,
            support_color,
        } => {
            state.player.y = y;
            state.player.vel_y = vel_y;
            if supported {
                state.player.supported = true;
                state.player.support_color = support_color;
            }
        }
    }

    // Jump controller
    if let Some(key) = input.held_key {
        attempt_jump(state, key, &mut events);
    }

    // Completion: one-way transition once the player clears the level end
    // while alive
    if state.phase == LifePhase::Alive && state.past_level_end() {
        state.phase = LifePhase::Complete;
        let final_score = state.score.score;
        log::info!("Level complete, final score {final_score}");
        events.push(GameEvent::LevelComplete { final_score });
    }

    events
}

/// Kill the player. Idempotent: a second fatal hit while dead is a no-op.
fn kill(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if matches!(state.phase, LifePhase::Dead { .. }) {
        return;
    }
    state.score.death();
    state.player.reset_to_ground();
    state.phase = LifePhase::Dead { ticks: 0 };
    log::info!(
        "Player died at tick {} (score {})",
        state.time_ticks,
        state.score.score
    );
    events.push(GameEvent::Death);
}

/// Try to jump with the held color key
///
/// Only fires while supported. The jump itself always happens; the color
/// judgment only happens when the resolver tracked a support color.
fn attempt_jump(state: &mut GameState, key: ColorKey, events: &mut Vec<GameEvent>) {
    if !state.player.supported {
        return;
    }

    state.player.vel_y = JUMP_STRENGTH;

    match state.player.support_color {
        Some(color) if color.accepts(key) => {
            let points = state.score.correct_jump();
            log::debug!("Correct jump (+{points}), streak {}", state.score.streak);
            events.push(GameEvent::CorrectJump { key });
        }
        Some(_) => {
            state.score.incorrect_jump();
            log::debug!("Incorrect jump, score {}", state.score.score);
            events.push(GameEvent::IncorrectJump { key });
        }
        // Freshly airborne with no tracked color: no judgment
        None => {}
    }

    // The active color follows the pressed key regardless of correctness
    state.player.color = key;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::{Obstacle, ShapeKind};

    fn empty_state() -> GameState {
        // One far-away obstacle so the level doesn't complete immediately
        GameState::new(vec![Obstacle::new(
            1000,
            ShapeKind::Tower { blocks: 1 },
            SurfaceColor::Red,
        )])
    }

    fn run_ticks(state: &mut GameState, input: &TickInput, n: u32) -> Vec<GameEvent> {
        let mut all = Vec::new();
        for _ in 0..n {
            all.extend(tick(state, input, SIM_DT));
        }
        all
    }

    #[test]
    fn test_jump_from_ground_scores_correct() {
        let mut state = empty_state();
        let input = TickInput {
            held_key: Some(ColorKey::Green),
            ..Default::default()
        };
        let events = tick(&mut state, &input, SIM_DT);
        // Ground is white - any key is correct
        assert_eq!(events, vec![GameEvent::CorrectJump { key: ColorKey::Green }]);
        assert_eq!(state.score.score, 10);
        assert_eq!(state.player.vel_y, JUMP_STRENGTH);
        assert_eq!(state.player.color, ColorKey::Green);
    }

    #[test]
    fn test_holding_key_jumps_once_per_landing() {
        let mut state = empty_state();
        let input = TickInput {
            held_key: Some(ColorKey::Red),
            ..Default::default()
        };
        // Enough ticks for one full jump arc (~0.64 s) plus the landing
        let events = run_ticks(&mut state, &input, 90);
        let jumps = events
            .iter()
            .filter(|e| matches!(e, GameEvent::CorrectJump { .. }))
            .count();
        assert_eq!(jumps, 2, "one jump at start, one after landing");
    }

    #[test]
    fn test_airborne_landing_on_tower() {
        let mut state = GameState::new(vec![Obstacle::new(
            10,
            ShapeKind::Tower { blocks: 2 },
            SurfaceColor::Blue,
        )]);
        let top = GROUND_HEIGHT + 2.0 * BLOCK_HEIGHT;
        // Put slice 10 under the player and drop from just above its top
        state.scroll_x = 10.0 * SLICE_WIDTH - PLAYER_X;
        state.player.y = top + 10.0;
        state.player.vel_y = 0.0;
        state.player.supported = false;
        state.player.support_color = None;

        let input = TickInput::default();
        let mut landed_tick = None;
        for i in 0..30 {
            tick(&mut state, &input, SIM_DT);
            if state.player.supported && landed_tick.is_none() {
                landed_tick = Some(i);
                assert_eq!(state.player.y, top);
                assert_eq!(state.player.support_color, Some(SurfaceColor::Blue));
                assert_eq!(state.player.vel_y, 0.0);
            }
        }
        assert!(landed_tick.is_some(), "player never landed");
        assert_eq!(state.phase, LifePhase::Alive);
    }

    #[test]
    fn test_incorrect_jump_from_colored_platform() {
        let mut state = empty_state();
        state.player.supported = true;
        state.player.support_color = Some(SurfaceColor::Red);
        let input = TickInput {
            held_key: Some(ColorKey::Blue),
            ..Default::default()
        };
        let events = tick(&mut state, &input, SIM_DT);
        assert!(events.contains(&GameEvent::IncorrectJump { key: ColorKey::Blue }));
        assert_eq!(state.score.score, -5);
        assert_eq!(state.score.streak, 0);
        // Active color still follows the pressed key
        assert_eq!(state.player.color, ColorKey::Blue);
    }

    #[test]
    fn test_death_is_idempotent() {
        let mut state = GameState::new(vec![Obstacle::new(
            10,
            ShapeKind::Spikes,
            SurfaceColor::White,
        )]);
        state.scroll_x = 10.0 * SLICE_WIDTH - PLAYER_X;

        let input = TickInput::default();
        let events = tick(&mut state, &input, SIM_DT);
        assert_eq!(events, vec![GameEvent::Death]);
        assert_eq!(state.score.score, -10);
        assert!(matches!(state.phase, LifePhase::Dead { .. }));

        // Still overlapping the spike, but already dead: no second penalty
        let events = tick(&mut state, &input, SIM_DT);
        assert!(events.is_empty());
        assert_eq!(state.score.score, -10);
    }

    #[test]
    fn test_dead_player_ignores_input() {
        let mut state = empty_state();
        state.phase = LifePhase::Dead { ticks: 0 };
        let input = TickInput {
            held_key: Some(ColorKey::Red),
            ..Default::default()
        };
        let events = tick(&mut state, &input, SIM_DT);
        assert!(events.is_empty());
        assert_eq!(state.score.score, 0);
    }

    #[test]
    fn test_respawn_after_timeout() {
        let mut state = empty_state();
        state.phase = LifePhase::Dead { ticks: 0 };
        let delay_ticks = (state.respawn_delay / SIM_DT).ceil() as u32;

        let input = TickInput::default();
        let events = run_ticks(&mut state, &input, delay_ticks + 2);
        assert!(events.contains(&GameEvent::Respawn));
        assert_eq!(state.phase, LifePhase::Alive);
        assert_eq!(state.player.y, GROUND_HEIGHT);
    }

    #[test]
    fn test_respawn_deferred_while_blocked() {
        // A row of spikes parked over the respawn position
        let mut obstacles = Vec::new();
        for slice in 0..40 {
            obstacles.push(Obstacle::new(slice, ShapeKind::Spikes, SurfaceColor::White));
        }
        obstacles.push(Obstacle::new(
            2000,
            ShapeKind::Tower { blocks: 1 },
            SurfaceColor::Red,
        ));
        let mut state = GameState::new(obstacles);
        // Timer already expired; spawn position still occupied
        let expired = (state.respawn_delay / SIM_DT).ceil() as u32 + 1;
        state.phase = LifePhase::Dead { ticks: expired };

        let input = TickInput::default();
        let events = tick(&mut state, &input, SIM_DT);
        assert!(events.is_empty());
        assert!(matches!(state.phase, LifePhase::Dead { .. }));

        // Once the spikes scroll past, the deferred respawn goes through.
        // 40 slices at 500 px/s is ~6.7 s of scrolling.
        let events = run_ticks(&mut state, &input, 900);
        assert!(events.contains(&GameEvent::Respawn));
        assert_eq!(state.phase, LifePhase::Alive);
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        // Level ends just past slice 1
        let mut state = GameState::new(vec![Obstacle::new(
            1,
            ShapeKind::Tower { blocks: 1 },
            SurfaceColor::Red,
        )]);
        let input = TickInput::default();
        // Scroll until well past the end
        let events = run_ticks(&mut state, &input, 120);
        let completions: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelComplete { .. }))
            .collect();
        assert_eq!(completions.len(), 1);
        assert_eq!(state.phase, LifePhase::Complete);

        // Terminal: later ticks are no-ops
        let ticks_before = state.time_ticks;
        let events = tick(&mut state, &input, SIM_DT);
        assert!(events.is_empty());
        assert_eq!(state.time_ticks, ticks_before);
    }

    #[test]
    fn test_restart_resets_run() {
        let mut state = empty_state();
        state.score.score = 40;
        state.scroll_x = 500.0;
        state.phase = LifePhase::Dead { ticks: 7 };

        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        let events = tick(&mut state, &input, SIM_DT);
        assert!(events.is_empty());
        assert_eq!(state.score.score, 0);
        assert_eq!(state.scroll_x, 0.0);
        assert_eq!(state.phase, LifePhase::Alive);
    }
}
