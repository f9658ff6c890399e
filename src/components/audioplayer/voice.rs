//! Playback voices handed out by the [`VoicePool`](super::pool::VoicePool).
//!
//! A [`Voice`] is the player-side mirror of one host playback unit. The host
//! owns the real audio source; the player only tracks what it told the host
//! to do through [`VoiceCmd`](crate::events::audio::VoiceCmd).

use serde::Serialize;
use std::fmt;

use crate::resources::clipstore::AudioClip;

/// Identifier of a pooled voice. Unique for the lifetime of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VoiceId(pub u32);

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VoiceState {
    Idle,
    Active,
}

/// Playback state of a single voice.
#[derive(Debug, Clone)]
pub struct Voice {
    /// Clip assigned while active; `None` when idle.
    pub clip: Option<AudioClip>,
    pub looped: bool,
    /// Volume in `0.0..=1.0`.
    pub volume: f32,
    pub state: VoiceState,
    /// Bumped on every activation. Pending timed reclamations carry the
    /// generation they were scheduled for and are ignored once it moves on.
    pub generation: u32,
}

impl Default for Voice {
    fn default() -> Self {
        Voice {
            clip: None,
            looped: false,
            volume: 1.0,
            state: VoiceState::Idle,
            generation: 0,
        }
    }
}

impl Voice {
    /// Configure the voice for `clip` and mark it active.
    ///
    /// Returns the new generation.
    pub fn activate(&mut self, clip: AudioClip, looped: bool, volume: f32) -> u32 {
        self.clip = Some(clip);
        self.looped = looped;
        self.volume = clamp_volume(volume);
        self.state = VoiceState::Active;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Return to the neutral idle state. The generation is kept.
    pub fn reset(&mut self) {
        self.clip = None;
        self.looped = false;
        self.volume = 1.0;
        self.state = VoiceState::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.state == VoiceState::Active
    }

    /// Id of the assigned clip, if any.
    pub fn clip_id(&self) -> Option<&str> {
        self.clip.as_ref().map(|c| c.id())
    }
}

/// Clamp a requested volume into `0.0..=1.0`. NaN becomes silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
