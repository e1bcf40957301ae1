//! Per-level high score table
//!
//! Persisted as JSON, keyed by level name. Scores are stored as achieved,
//! negative runs included; star ratings are derived against the level's
//! maximum achievable score.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Best result recorded for one level
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: i64,
    /// Stars earned on the best run (0 - 3)
    pub stars: u8,
}

/// Star rating for a score against a level's maximum
///
/// Thirds of the maximum earn one and two stars; 90% earns three.
pub fn stars_for_score(score: i64, max_score: i64) -> u8 {
    if max_score <= 0 || score <= 0 {
        return 0;
    }
    let ratio = score as f64 / max_score as f64;
    if ratio >= 0.9 {
        3
    } else if ratio >= 2.0 / 3.0 {
        2
    } else if ratio >= 1.0 / 3.0 {
        1
    } else {
        0
    }
}

/// High score table across all levels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub levels: BTreeMap<String, HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best recorded score for a level
    pub fn best(&self, level: &str) -> Option<i64> {
        self.levels.get(level).map(|e| e.score)
    }

    /// Record a finished run. Returns true if it set a new high score.
    pub fn record(&mut self, level: &str, score: i64, max_score: i64) -> bool {
        let stars = stars_for_score(score, max_score);
        match self.levels.get_mut(level) {
            Some(entry) if score <= entry.score => false,
            Some(entry) => {
                entry.score = score;
                entry.stars = stars;
                true
            }
            None => {
                self.levels
                    .insert(level.to_string(), HighScoreEntry { score, stars });
                true
            }
        }
    }

    /// Load the table from a JSON file, falling back to an empty table
    pub fn load(path: impl AsRef<Path>) -> Self {
        match fs::read_to_string(path.as_ref()) {
            Ok(json) => match serde_json::from_str::<HighScores>(&json) {
                Ok(scores) => {
                    log::info!("Loaded high scores for {} levels", scores.levels.len());
                    scores
                }
                Err(err) => {
                    log::warn!("Ignoring malformed high score file: {err}");
                    Self::new()
                }
            },
            Err(_) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
        }
    }

    /// Save the table to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, json)?;
        log::info!("High scores saved ({} levels)", self.levels.len());
        Ok(())
    }
}
