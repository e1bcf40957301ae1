//! Level data loading and the obstacle factory
//!
//! A level file is a JSON object mapping slice indices (as strings) to
//! obstacle descriptors, the format the MIDI-driven level generator emits:
//!
//! ```json
//! { "12": {"type": "tower", "height": 2, "color": [1, 0, 0]} }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::sim::{Obstacle, ShapeKind, SurfaceColor};

fn default_height() -> u32 {
    1
}

fn default_spikes_on_top() -> bool {
    true
}

/// Failed to read or parse a level file
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse level file: {0}")]
    Json(#[from] serde_json::Error),
}

/// One obstacle as described in the level file
#[derive(Debug, Clone, Deserialize)]
pub struct ObstacleDescriptor {
    #[serde(rename = "type")]
    pub otype: String,
    /// Height in blocks (towers) or offset units (floating squares)
    #[serde(default = "default_height")]
    pub height: u32,
    /// RGB in 0.0 - 1.0; absent means white (any key accepted)
    #[serde(default)]
    pub color: Option<[f32; 3]>,
    #[serde(rename = "spikesOnTop", default = "default_spikes_on_top")]
    pub spikes_on_top: bool,
}

/// Raw level file contents, keyed by slice index string
pub type LevelData = BTreeMap<String, ObstacleDescriptor>;

/// Load a level file from disk
pub fn load(path: impl AsRef<Path>) -> Result<LevelData, LevelError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Turn level data into simulation obstacles
///
/// Slice keys that do not parse as numbers are skipped with a warning
/// rather than failing the whole level.
pub fn build_obstacles(data: &LevelData) -> Vec<Obstacle> {
    let mut obstacles = Vec::with_capacity(data.len());
    for (key, desc) in data {
        let slice = match key.parse::<u32>() {
            Ok(slice) => slice,
            Err(_) => {
                log::warn!("Skipping non-numeric slice key {key:?}");
                continue;
            }
        };
        let kind = ShapeKind::from_type_str(&desc.otype, desc.height, desc.spikes_on_top);
        let color = desc
            .color
            .map(SurfaceColor::from_rgb)
            .unwrap_or(SurfaceColor::White);
        obstacles.push(Obstacle::new(slice, kind, color));
    }
    obstacles.sort_by_key(|o| o.slice);
    log::info!("Built {} obstacles", obstacles.len());
    obstacles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_generator_output() {
        let json = r#"{
            "5": {"type": "tower", "height": 2, "color": [1, 0, 0]},
            "9": {"type": "spikes"},
            "11": {"type": "floatingSquareWithSpikes", "height": 2, "spikesOnTop": true}
        }"#;
        let data: LevelData = serde_json::from_str(json).expect("parse");
        let obstacles = build_obstacles(&data);
        assert_eq!(obstacles.len(), 3);
        assert_eq!(obstacles[0].slice, 5);
        assert_eq!(obstacles[0].kind, ShapeKind::Tower { blocks: 2 });
        assert_eq!(obstacles[0].color, SurfaceColor::Red);
        assert_eq!(obstacles[1].kind, ShapeKind::Spikes);
        // Color defaults to white when absent
        assert_eq!(obstacles[1].color, SurfaceColor::White);
        assert_eq!(
            obstacles[2].kind,
            ShapeKind::FloatingSquareWithSpikes {
                blocks: 2,
                spikes_on_top: true
            }
        );
    }

    #[test]
    fn test_numeric_slice_ordering() {
        // Lexicographic order would put "10" before "9"
        let json = r#"{
            "10": {"type": "spikes"},
            "9": {"type": "tower", "height": 1}
        }"#;
        let data: LevelData = serde_json::from_str(json).expect("parse");
        let obstacles = build_obstacles(&data);
        assert_eq!(obstacles[0].slice, 9);
        assert_eq!(obstacles[1].slice, 10);
    }

    #[test]
    fn test_bad_slice_key_skipped() {
        let json = r#"{
            "3": {"type": "tower", "height": 1},
            "metadata": {"type": "tower", "height": 1}
        }"#;
        let data: LevelData = serde_json::from_str(json).expect("parse");
        let obstacles = build_obstacles(&data);
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].slice, 3);
    }

    #[test]
    fn test_unknown_type_becomes_empty() {
        let json = r#"{"0": {"type": "laserGrid"}}"#;
        let data: LevelData = serde_json::from_str(json).expect("parse");
        let obstacles = build_obstacles(&data);
        assert_eq!(obstacles[0].kind, ShapeKind::Empty);
    }
}
