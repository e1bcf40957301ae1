//! Song data: deserialization and the tick-bucketed note schedule
//!
//! Consumes the JSON produced by the MIDI authoring tool:
//! `{notes_by_tick, channel_metadata, metadata}`. Tick keys arrive as
//! strings; adjacent ticks differing by one are quantization artifacts and
//! are coalesced into a single bucket at load time.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default MIDI tick resolution when the metadata omits it
const DEFAULT_TICKS_PER_BEAT: u32 = 480;

fn default_ticks_per_beat() -> u32 {
    DEFAULT_TICKS_PER_BEAT
}

fn default_play_track() -> u8 {
    1
}

/// Failed to read or parse song data
#[derive(Debug, thiserror::Error)]
pub enum SongError {
    #[error("failed to read song file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse song file: {0}")]
    Json(#[from] serde_json::Error),
}

/// One scheduled note: played on its bucket's tick, released after
/// `length_ticks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    #[serde(default)]
    pub channel: u8,
    pub note: u8,
    pub velocity: u8,
    pub length_ticks: u64,
    #[serde(default)]
    pub start_tick: u64,
    /// Level slice this note lines up with (authoring metadata)
    #[serde(default)]
    pub slice: i64,
}

/// Per-channel playback metadata
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChannelMeta {
    /// General MIDI program number
    #[serde(default)]
    pub program: u8,
    #[serde(default)]
    pub mute_track: u8,
    #[serde(default = "default_play_track")]
    pub play_track: u8,
}

/// Song-level metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongMetadata {
    pub bpm: f64,
    #[serde(default = "default_ticks_per_beat")]
    pub ticks_per_beat: u32,
}

/// Raw song file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongData {
    pub notes_by_tick: BTreeMap<String, Vec<NoteEvent>>,
    #[serde(default)]
    pub channel_metadata: HashMap<String, ChannelMeta>,
    pub metadata: SongMetadata,
}

impl SongData {
    /// Load song data from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SongError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// The playable schedule: notes bucketed by musical tick, in tick order
#[derive(Debug, Clone)]
pub struct BeatSchedule {
    buckets: BTreeMap<u64, Vec<NoteEvent>>,
    /// Channel metadata keyed by channel number
    pub channels: HashMap<u8, ChannelMeta>,
    /// Musical ticks per second, derived from bpm and tick resolution
    pub ticks_per_second: f64,
}

impl BeatSchedule {
    /// Build the schedule from raw song data, coalescing adjacent ticks
    pub fn from_song(song: &SongData) -> Self {
        let mut buckets: BTreeMap<u64, Vec<NoteEvent>> = BTreeMap::new();
        let mut last_raw: Option<u64> = None;
        let mut last_bucket: u64 = 0;

        // BTreeMap<String, _> sorts keys lexicographically; re-sort numerically
        let mut ticks: Vec<(u64, &Vec<NoteEvent>)> = song
            .notes_by_tick
            .iter()
            .filter_map(|(key, notes)| match key.parse::<u64>() {
                Ok(tick) => Some((tick, notes)),
                Err(_) => {
                    log::warn!("Skipping non-numeric tick key {key:?}");
                    None
                }
            })
            .collect();
        ticks.sort_by_key(|(tick, _)| *tick);

        for (tick, notes) in ticks {
            // Ticks one apart are near-simultaneous quantization noise;
            // fold them into the preceding bucket
            let bucket = match last_raw {
                Some(prev) if tick == prev + 1 => last_bucket,
                _ => tick,
            };
            buckets.entry(bucket).or_default().extend(notes.iter().cloned());
            last_raw = Some(tick);
            last_bucket = bucket;
        }

        let channels = song
            .channel_metadata
            .iter()
            .filter_map(|(key, meta)| match key.parse::<u8>() {
                Ok(channel) => Some((channel, *meta)),
                Err(_) => {
                    log::warn!("Skipping non-numeric channel key {key:?}");
                    None
                }
            })
            .collect();

        let ticks_per_second =
            song.metadata.bpm / 60.0 * song.metadata.ticks_per_beat as f64;

        log::info!(
            "Loaded schedule: {} buckets, {:.1} ticks/s ({} bpm)",
            buckets.len(),
            ticks_per_second,
            song.metadata.bpm
        );

        Self {
            buckets,
            channels,
            ticks_per_second,
        }
    }

    /// Notes at an exact bucket tick
    pub fn bucket(&self, tick: u64) -> Option<&[NoteEvent]> {
        self.buckets.get(&tick).map(Vec::as_slice)
    }

    /// First bucket tick at or after `tick`
    pub fn next_bucket_at_or_after(&self, tick: u64) -> Option<u64> {
        self.buckets.range(tick..).next().map(|(t, _)| *t)
    }

    /// First bucket tick strictly after `tick`
    pub fn next_bucket_after(&self, tick: u64) -> Option<u64> {
        self.buckets.range(tick + 1..).next().map(|(t, _)| *t)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
