//! Audio messages.
//!
//! - [`AudioRequest`]: game code asks the current audio player to play or stop
//!   a named clip. Handled by
//!   [`handle_audio_requests`](crate::systems::audioplayer::handle_audio_requests).
//! - [`VoiceCmd`]: a player tells the host backend what to do with its voices.
//!   Forwarded to the backend thread by
//!   [`forward_voice_cmds`](crate::systems::audio::forward_voice_cmds).
//! - [`VoiceFinished`]: a one-shot voice ran to the end of its clip and was
//!   reclaimed.

use bevy_ecs::message::Message;
use bevy_ecs::prelude::Entity;
use std::str::FromStr;

use crate::components::audioplayer::voice::VoiceId;
use crate::resources::clipstore::AudioClip;

/// Commands sent *to* the host backend.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum VoiceCmd {
    /// Create a playback unit parented to the player entity.
    Create { player: Entity, voice: VoiceId },
    Start {
        player: Entity,
        voice: VoiceId,
        clip: AudioClip,
        looped: bool,
        volume: f32,
    },
    SetVolume {
        player: Entity,
        voice: VoiceId,
        volume: f32,
    },
    Stop { player: Entity, voice: VoiceId },
    Destroy { player: Entity, voice: VoiceId },
    Shutdown,
}

/// Caller-facing playback requests addressed to the current audio player.
///
/// Unknown clip names are ignored.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum AudioRequest {
    PlayOnce { clip: String, volume: f32 },
    PlayLooped { clip: String, volume: f32 },
    /// Looped play that is skipped when this clip is already the only loop
    /// playing it.
    PlayLoopedExclusive { clip: String, volume: f32 },
    StopOne { clip: String },
    StopAll { clip: String },
    SetVolume { clip: String, volume: f32 },
}

impl AudioRequest {
    pub fn clip(&self) -> &str {
        match self {
            AudioRequest::PlayOnce { clip, .. }
            | AudioRequest::PlayLooped { clip, .. }
            | AudioRequest::PlayLoopedExclusive { clip, .. }
            | AudioRequest::StopOne { clip }
            | AudioRequest::StopAll { clip }
            | AudioRequest::SetVolume { clip, .. } => clip,
        }
    }
}

/// Parses `action:clip[:volume]`, e.g. `once:explosion:0.8`, `loop:theme`,
/// `loop1:theme:0.5`, `stop:theme`, `stopall:theme`, `volume:theme:0.3`.
impl FromStr for AudioRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let action = parts.next().unwrap_or_default().trim();
        let clip = parts
            .next()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| format!("missing clip name in '{}'", s))?
            .to_string();
        let volume = match parts.next() {
            Some(v) => v
                .trim()
                .parse::<f32>()
                .map_err(|e| format!("invalid volume in '{}': {}", s, e))?,
            None => 1.0,
        };

        match action {
            "once" => Ok(AudioRequest::PlayOnce { clip, volume }),
            "loop" => Ok(AudioRequest::PlayLooped { clip, volume }),
            "loop1" => Ok(AudioRequest::PlayLoopedExclusive { clip, volume }),
            "stop" => Ok(AudioRequest::StopOne { clip }),
            "stopall" => Ok(AudioRequest::StopAll { clip }),
            "volume" => Ok(AudioRequest::SetVolume { clip, volume }),
            other => Err(format!("unknown audio action '{}'", other)),
        }
    }
}

/// Written when a one-shot voice is reclaimed by its timer.
#[derive(Message, Debug, Clone)]
pub struct VoiceFinished {
    pub player: Entity,
    pub voice: VoiceId,
    pub clip: AudioClip,
}
