//! Sound cues and the sinks that play them.
//!
//! The session only queues cues; whoever owns the terminal drains the queue
//! once per frame and hands each cue to a sink.
use std::io::Write;

use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    /// Background loop, started when a match begins.
    Music,
    Shoot,
    Hit,
    ShieldBreak,
}

pub trait AudioSink {
    /// Play `cue` from the beginning, restarting it if it is already playing.
    fn play(&mut self, cue: SoundCue) -> Result<()>;

    /// One volume for every cue, in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);

    fn volume(&self) -> f32;
}

/// Clamp a requested volume into the valid range. NaN mutes.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Hand every queued cue to `sink`. A failed cue is logged and skipped so
/// the frame still renders.
pub fn play_all(sink: &mut impl AudioSink, cues: Vec<SoundCue>) {
    for cue in cues {
        if let Err(err) = sink.play(cue) {
            tracing::warn!(%err, ?cue, "sound cue failed");
        }
    }
}

// ── Terminal bell ────────────────────────────────────────────────────────────

/// Rings the terminal bell for effect cues. The music cue is only logged.
pub struct TerminalBell<W: Write> {
    out: W,
    volume: f32,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W, volume: f32) -> Self {
        Self {
            out,
            volume: clamp_volume(volume),
        }
    }
}

impl<W: Write> AudioSink for TerminalBell<W> {
    fn play(&mut self, cue: SoundCue) -> Result<()> {
        tracing::debug!(?cue, volume = self.volume, "sound cue");
        if self.volume <= 0.0 || cue == SoundCue::Music {
            return Ok(());
        }
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }

    fn volume(&self) -> f32 {
        self.volume
    }
}

// ── Recorder ─────────────────────────────────────────────────────────────────

/// Keeps every cue it is asked to play.
#[derive(Debug, Default)]
pub struct Recorder {
    pub played: Vec<SoundCue>,
    volume: f32,
}

impl AudioSink for Recorder {
    fn play(&mut self, cue: SoundCue) -> Result<()> {
        self.played.push(cue);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }

    fn volume(&self) -> f32 {
        self.volume
    }
}
