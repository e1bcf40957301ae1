//! Headless demo runner
//!
//! Loads a level file and its song file, then autoplays the run with a
//! simple pilot that always presses the key matching the surface it is
//! standing on. Note events go to the log instead of an audio device.
//!
//! Usage: beat-blitz <level.json> <song.json> [settings.json]

use std::process;

use beat_blitz::consts::SIM_DT;
use beat_blitz::highscores::HighScores;
use beat_blitz::level;
use beat_blitz::music::{AudioSink, SongData};
use beat_blitz::session::Session;
use beat_blitz::settings::Settings;
use beat_blitz::sim::{
    ColorKey, ShapeKind, SurfaceColor,
    state::{CORRECT_POINTS, STREAK_BONUS_AT, STREAK_BONUS_POINTS},
};

const HIGHSCORES_PATH: &str = "highscores.json";

/// Sink that logs note events instead of producing sound
struct LogSink;

impl AudioSink for LogSink {
    fn note_on(&mut self, channel: u8, pitch: u8, velocity: u8) {
        log::debug!("note on  ch{channel} pitch {pitch} vel {velocity}");
    }

    fn note_off(&mut self, channel: u8, pitch: u8) {
        log::debug!("note off ch{channel} pitch {pitch}");
    }

    fn set_channel_volume(&mut self, channel: u8, level: f32) {
        log::debug!("volume   ch{channel} -> {level:.2}");
    }
}

/// Key that matches a support surface
fn key_for(color: SurfaceColor) -> ColorKey {
    match color {
        SurfaceColor::Red | SurfaceColor::White => ColorKey::Red,
        SurfaceColor::Green => ColorKey::Green,
        SurfaceColor::Blue => ColorKey::Blue,
    }
}

/// Best achievable score: every landable platform jumped correctly
fn max_score(obstacles: &[beat_blitz::sim::Obstacle]) -> i64 {
    let landable = obstacles
        .iter()
        .filter(|o| {
            matches!(
                o.kind,
                ShapeKind::Tower { .. } | ShapeKind::FloatingSquare { .. }
            )
        })
        .count() as i64;
    let base = landable.min(STREAK_BONUS_AT as i64 - 1);
    base * CORRECT_POINTS + (landable - base) * STREAK_BONUS_POINTS
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(level_path), Some(song_path)) = (args.next(), args.next()) else {
        eprintln!("usage: beat-blitz <level.json> <song.json> [settings.json]");
        process::exit(2);
    };
    let settings = match args.next() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };

    let level_data = level::load(&level_path)?;
    let obstacles = level::build_obstacles(&level_data);
    let song = SongData::load(&song_path)?;

    let best_possible = max_score(&obstacles);
    let mut session = Session::new(
        level_path.clone(),
        obstacles,
        &song,
        &settings,
        best_possible,
    );
    let mut highscores = HighScores::load(HIGHSCORES_PATH);
    let mut sink = LogSink;

    // Frame loop at the sim rate; bail out if the run somehow never ends
    let max_frames = 120 * 60 * 10;
    let mut held: Option<ColorKey> = None;
    for frame in 0..max_frames {
        // Press the key matching the surface underfoot; release while
        // airborne so the landing tick never jumps with a stale key
        match session.state().player.support_color {
            Some(color) => {
                let key = key_for(color);
                session.on_key_down(key);
                held = Some(key);
            }
            None => {
                if let Some(key) = held.take() {
                    session.on_key_up(key);
                }
            }
        }

        if let Some(report) = session.on_tick(SIM_DT, &mut sink) {
            let hud = session.hud();
            println!(
                "Level complete: score {} ({} stars)",
                report.final_score, hud.stars
            );
            if highscores.record(&report.level_name, report.final_score, best_possible) {
                println!("New high score!");
                highscores.save(HIGHSCORES_PATH)?;
            }
            return Ok(());
        }

        if frame % 120 == 0 {
            let hud = session.hud();
            log::info!(
                "t={:.1}s score {} streak {}",
                frame as f32 * SIM_DT,
                hud.score,
                hud.streak
            );
        }
    }

    Err("run did not finish within the frame limit".into())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        log::error!("{err}");
        process::exit(1);
    }
}
