//! Engine systems.
//!
//! This module groups the ECS systems and the exclusive `&mut World` helpers
//! that drive audio players and singleton lifecycles.
//!
//! Submodules overview
//! - [`audio`] – backend thread plus the systems that feed it commands
//! - [`audioconfig`] – push [`AudioConfig`](crate::resources::audioconfig::AudioConfig) changes to live players
//! - [`audioplayer`] – player attach/detach hooks, timed reclamation, request handling
//! - [`scope`] – unload the active scope and switch to another
//! - [`singleton`] – attach/detach/switch hooks around the identity registry
//! - [`time`] – update simulation time and delta

pub mod audio;
pub mod audioconfig;
pub mod audioplayer;
pub mod scope;
pub mod singleton;
pub mod time;

use bevy_ecs::prelude::*;

/// Build the per-frame audio schedule in its required order:
/// config changes, timers, requests, then command forwarding.
///
/// Timers run before requests: the frame delta elapsed before any voice
/// started this frame, so it must not count against that voice.
pub fn audio_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        // audio systems must be together
        (
            audioconfig::apply_audio_config_changes,
            audio::update_bevy_voice_finished,
            audioplayer::update_audio_players,
            audio::update_bevy_audio_requests,
            audioplayer::handle_audio_requests,
            // advance VoiceCmd messages, then collect and forward new ones
            audio::update_bevy_voice_cmds,
            audio::collect_voice_cmds,
            audio::forward_voice_cmds,
        )
            .chain(),
    );
    schedule
}
