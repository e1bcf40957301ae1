//! The beat scheduler: a self-rescheduling single-shot fire chain
//!
//! At most one pending "next note group" exists at any time. Each firing
//! emits the bucket's note-ons, schedules matching deferred note-offs, and
//! posts exactly one successor - replacing, never stacking. A correctly
//! timed jump cancels the outstanding fire and plays it immediately,
//! nudging the music forward in sync with player action.

use std::collections::BTreeMap;

use crate::consts::JUMP_SKIP_TICKS;
use crate::sim::GameEvent;

use super::song::{BeatSchedule, ChannelMeta};

/// Audio output interface the scheduler drives
///
/// Sample generation itself lives outside the core; this is the seam.
pub trait AudioSink {
    fn note_on(&mut self, channel: u8, pitch: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, pitch: u8);
    /// Set a channel's volume, 0.0 - 1.0
    fn set_channel_volume(&mut self, channel: u8, level: f32);
}

/// Volume bucket a channel belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelGroup {
    /// The mutable melody track - ducked and restored by gameplay
    Main,
    Background,
    Bass,
}

impl ChannelGroup {
    /// Classify a channel by its metadata
    ///
    /// General MIDI bass programs (32-39) form their own group regardless
    /// of track flags.
    pub fn classify(meta: &ChannelMeta) -> Self {
        if (32..=39).contains(&meta.program) {
            ChannelGroup::Bass
        } else if meta.play_track != 0 {
            ChannelGroup::Main
        } else {
            ChannelGroup::Background
        }
    }
}

/// Configured base volume per channel group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupVolumes {
    pub main: f32,
    pub background: f32,
    pub bass: f32,
}

impl Default for GroupVolumes {
    fn default() -> Self {
        Self {
            main: 0.8,
            background: 0.5,
            bass: 0.6,
        }
    }
}

/// The single outstanding fire. Replaced, never stacked.
#[derive(Debug, Clone, Copy)]
struct PendingFire {
    /// Absolute scheduler tick to fire at
    target: u64,
}

/// Tick-clocked note scheduler
pub struct BeatScheduler {
    schedule: BeatSchedule,
    volumes: GroupVolumes,
    /// Current duck factor applied to the Main group
    main_duck: f32,
    /// Fractional tick position of the audio clock
    tick_pos: f64,
    current_tick: u64,
    /// Scheduler tick that maps to bucket tick 0 (beat-aligned start)
    origin: u64,
    pending: Option<PendingFire>,
    /// Deferred note-offs keyed by absolute scheduler tick
    note_offs: BTreeMap<u64, Vec<(u8, u8)>>,
    started: bool,
}

impl BeatScheduler {
    pub fn new(schedule: BeatSchedule, volumes: GroupVolumes) -> Self {
        Self {
            schedule,
            volumes,
            main_duck: 1.0,
            tick_pos: 0.0,
            current_tick: 0,
            origin: 0,
            pending: None,
            note_offs: BTreeMap::new(),
            started: false,
        }
    }

    pub fn ticks_per_second(&self) -> f64 {
        self.schedule.ticks_per_second
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Tick of the outstanding fire, if one is posted
    pub fn pending_tick(&self) -> Option<u64> {
        self.pending.map(|p| p.target)
    }

    /// Apply volumes and post the first fire, aligned to the current tick
    pub fn start(&mut self, sink: &mut dyn AudioSink) {
        self.origin = self.current_tick;
        self.main_duck = 1.0;
        self.apply_volumes(sink);
        self.pending = self
            .schedule
            .next_bucket_at_or_after(0)
            .map(|bucket| PendingFire {
                target: self.origin + bucket,
            });
        self.started = true;
        match self.pending {
            Some(p) => log::info!("Scheduler started, first fire at tick {}", p.target),
            None => log::warn!("Scheduler started with an empty schedule"),
        }
    }

    /// Rewind to the beginning of the song (level restart)
    pub fn rewind(&mut self, sink: &mut dyn AudioSink) {
        self.release_all(sink);
        self.tick_pos = 0.0;
        self.current_tick = 0;
        self.start(sink);
    }

    /// Advance the audio clock by `dt` seconds, firing anything due
    pub fn advance(&mut self, dt: f64, sink: &mut dyn AudioSink) {
        if !self.started {
            return;
        }
        self.tick_pos += dt * self.schedule.ticks_per_second;
        self.current_tick = self.tick_pos as u64;

        self.flush_note_offs(sink);

        // Each firing posts its own successor, which may itself already be
        // due within this advance
        while let Some(p) = self.pending {
            if p.target > self.current_tick {
                break;
            }
            self.cancel_pending();
            self.fire_at(p.target, sink);
        }
    }

    /// A correct jump within the skip window pulls the pending note group
    /// forward and fires it now
    pub fn on_correct_jump(&mut self, sink: &mut dyn AudioSink) {
        // Correctness feedback: full main volume again
        self.set_main_duck(1.0, sink);

        let Some(p) = self.pending else { return };
        if p.target > self.current_tick && p.target - self.current_tick <= JUMP_SKIP_TICKS {
            log::debug!(
                "Jump skip: firing tick {} early (clock at {})",
                p.target,
                self.current_tick
            );
            self.cancel_pending();
            // Nudge the clock to the group so the chain stays beat-aligned
            self.current_tick = p.target;
            self.tick_pos = p.target as f64;
            self.fire_at(p.target, sink);
        }
    }

    /// React to a gameplay lifecycle event
    pub fn on_event(&mut self, event: &GameEvent, sink: &mut dyn AudioSink) {
        match event {
            GameEvent::CorrectJump { .. } => self.on_correct_jump(sink),
            GameEvent::IncorrectJump { .. } => self.set_main_duck(0.5, sink),
            GameEvent::Death => self.set_main_duck(0.0, sink),
            GameEvent::Respawn => self.set_main_duck(1.0, sink),
            GameEvent::LevelComplete { .. } => self.stop(sink),
        }
    }

    /// Cancel the outstanding fire. Idempotent: cancelling when nothing is
    /// pending is a no-op.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Stop playback: release held notes and drop the pending fire
    pub fn stop(&mut self, sink: &mut dyn AudioSink) {
        self.cancel_pending();
        self.release_all(sink);
        log::info!("Scheduler stopped at tick {}", self.current_tick);
    }

    /// Fire the bucket mapped to absolute tick `target`, then post the
    /// single successor
    fn fire_at(&mut self, target: u64, sink: &mut dyn AudioSink) {
        let bucket_tick = target - self.origin;
        let notes = self
            .schedule
            .bucket(bucket_tick)
            .map(<[_]>::to_vec)
            .unwrap_or_default();
        for note in &notes {
            sink.note_on(note.channel, note.note, note.velocity);
            self.note_offs
                .entry(target + note.length_ticks.max(1))
                .or_default()
                .push((note.channel, note.note));
        }

        // Exactly one successor, strictly after this bucket. At the end of
        // the song there is nothing to post and the chain simply stops.
        self.pending = self
            .schedule
            .next_bucket_after(bucket_tick)
            .map(|bucket| PendingFire {
                target: self.origin + bucket,
            });
        if self.pending.is_none() {
            log::info!("End of schedule reached at tick {bucket_tick}");
        }
    }

    /// Emit note-offs whose release tick has passed
    fn flush_note_offs(&mut self, sink: &mut dyn AudioSink) {
        let due: Vec<u64> = self
            .note_offs
            .range(..=self.current_tick)
            .map(|(t, _)| *t)
            .collect();
        for tick in due {
            if let Some(notes) = self.note_offs.remove(&tick) {
                for (channel, pitch) in notes {
                    sink.note_off(channel, pitch);
                }
            }
        }
    }

    /// Release every outstanding note immediately
    fn release_all(&mut self, sink: &mut dyn AudioSink) {
        let offs = std::mem::take(&mut self.note_offs);
        for (_, notes) in offs {
            for (channel, pitch) in notes {
                sink.note_off(channel, pitch);
            }
        }
    }

    fn set_main_duck(&mut self, factor: f32, sink: &mut dyn AudioSink) {
        if (self.main_duck - factor).abs() < f32::EPSILON {
            return;
        }
        self.main_duck = factor;
        self.apply_volumes(sink);
    }

    /// Push current group volumes (with ducking) to every known channel
    fn apply_volumes(&mut self, sink: &mut dyn AudioSink) {
        let channels: Vec<(u8, ChannelMeta)> = self
            .schedule
            .channels
            .iter()
            .map(|(ch, meta)| (*ch, *meta))
            .collect();
        for (channel, meta) in channels {
            let level = match ChannelGroup::classify(&meta) {
                ChannelGroup::Main => self.volumes.main * self.main_duck,
                ChannelGroup::Background => self.volumes.background,
                ChannelGroup::Bass => self.volumes.bass,
            };
            sink.set_channel_volume(channel, level);
        }
    }
}
