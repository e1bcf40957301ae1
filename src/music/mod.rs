//! Beat-synchronized audio scheduling
//!
//! The scheduler owns a musical tick clock and a single-slot pending fire
//! that re-posts itself bucket by bucket. Gameplay events feed back into it:
//! a well-timed jump pulls the next note group forward, and channel-group
//! volumes duck on death/jump events.

pub mod scheduler;
pub mod song;

pub use scheduler::{AudioSink, BeatScheduler, ChannelGroup, GroupVolumes};
pub use song::{BeatSchedule, ChannelMeta, NoteEvent, SongData, SongError};
