//! Game session: wires the simulation and the beat scheduler
//!
//! The session owns the fixed-timestep loop. Frontends feed it wall-clock
//! time and key transitions; it drives the sim at 120 Hz, forwards
//! lifecycle events into the scheduler, and surfaces HUD state and the
//! end-of-level report.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::highscores::stars_for_score;
use crate::music::{AudioSink, BeatSchedule, BeatScheduler, SongData};
use crate::settings::Settings;
use crate::sim::{self, ColorKey, GameEvent, GameState, LifePhase, Obstacle, TickInput};

/// What the HUD needs each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudSnapshot {
    /// Displayed score, clamped at zero (the raw score may be negative)
    pub score: i64,
    pub streak: u32,
    /// Stars the current score would earn (0 - 3)
    pub stars: u8,
}

/// Emitted once when the level is finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub level_name: String,
    /// Raw final score, negative runs included
    pub final_score: i64,
}

/// One level run: simulation, music, and input state
pub struct Session {
    level_name: String,
    state: GameState,
    scheduler: BeatScheduler,
    /// Best possible score for this level, for star ratings
    max_score: i64,
    held_key: Option<ColorKey>,
    pending_restart: bool,
    /// Leftover wall-clock time below one sim step
    accumulator: f32,
    music_started: bool,
    report_sent: bool,
}

impl Session {
    pub fn new(
        level_name: impl Into<String>,
        obstacles: Vec<Obstacle>,
        song: &SongData,
        settings: &Settings,
        max_score: i64,
    ) -> Self {
        let mut state = GameState::new(obstacles);
        state.respawn_delay = settings.respawn_delay;
        let schedule = BeatSchedule::from_song(song);
        let scheduler = BeatScheduler::new(schedule, settings.group_volumes());
        Self {
            level_name: level_name.into(),
            state,
            scheduler,
            max_score,
            held_key: None,
            pending_restart: false,
            accumulator: 0.0,
            music_started: false,
            report_sent: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn on_key_down(&mut self, key: ColorKey) {
        self.held_key = Some(key);
    }

    /// Release a key; ignored if another key has been pressed since
    pub fn on_key_up(&mut self, key: ColorKey) {
        if self.held_key == Some(key) {
            self.held_key = None;
        }
    }

    /// Queue a restart for the next tick
    pub fn restart(&mut self) {
        self.pending_restart = true;
    }

    pub fn is_complete(&self) -> bool {
        self.state.phase == LifePhase::Complete
    }

    /// HUD values for the current frame
    pub fn hud(&self) -> HudSnapshot {
        let raw = self.state.score.score;
        HudSnapshot {
            score: raw.max(0),
            streak: self.state.score.streak,
            stars: stars_for_score(raw, self.max_score),
        }
    }

    /// Advance the session by `dt` seconds of wall-clock time
    ///
    /// Returns the end-of-level report exactly once, on the frame the
    /// level completes.
    pub fn on_tick(&mut self, dt: f32, sink: &mut dyn AudioSink) -> Option<SessionReport> {
        if !self.music_started {
            self.scheduler.start(sink);
            self.music_started = true;
        }

        if self.pending_restart {
            self.pending_restart = false;
            let input = TickInput {
                held_key: None,
                restart: true,
            };
            sim::tick(&mut self.state, &input, SIM_DT);
            self.scheduler.rewind(sink);
            self.accumulator = 0.0;
            self.report_sent = false;
            return None;
        }

        let mut report = None;
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;

            self.scheduler.advance(SIM_DT as f64, sink);

            let input = TickInput {
                held_key: self.held_key,
                restart: false,
            };
            for event in sim::tick(&mut self.state, &input, SIM_DT) {
                self.scheduler.on_event(&event, sink);
                if let GameEvent::LevelComplete { final_score } = event
                    && !self.report_sent
                {
                    self.report_sent = true;
                    report = Some(SessionReport {
                        level_name: self.level_name.clone(),
                        final_score,
                    });
                }
            }
        }
        // Drop any backlog a long frame couldn't consume
        if self.accumulator >= SIM_DT {
            self.accumulator = 0.0;
        }
        report
    }
}
