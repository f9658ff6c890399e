//! Audio backend thread and the systems that feed it.
//!
//! - [`voice_backend_thread`] runs on its own OS thread and stands in for the
//!   host: it creates, starts, stops and destroys playback units in response
//!   to [`VoiceCmd`] messages. This crate does not mix audio, so the backend
//!   keeps the bookkeeping and logs what a real device would do.
//! - [`collect_voice_cmds`] drains every [`AudioPlayer`] outbox into the ECS
//!   message queue.
//! - [`forward_voice_cmds`] sends queued commands to the backend thread.
//! - [`update_bevy_voice_cmds`] and [`update_bevy_audio_requests`] advance the
//!   message queues once per frame.
//!
//! Notes
//! - The thread is created by [`crate::resources::audio::setup_audio`] and
//!   joined by [`crate::resources::audio::shutdown_audio`].
//! - Without an [`AudioBridge`] the forwarding system does nothing, which is
//!   how tests run players headless.

use crate::components::audioplayer::AudioPlayer;
use crate::components::audioplayer::voice::VoiceId;
use crate::events::audio::{AudioRequest, VoiceCmd, VoiceFinished};
use crate::resources::audio::AudioBridge;
use bevy_ecs::prelude::*;
use crossbeam_channel::Receiver;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Counters reported by the backend thread when it exits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackendSummary {
    pub created: u64,
    pub destroyed: u64,
    pub started: u64,
    pub stopped: u64,
    /// Highest number of simultaneously playing units.
    pub peak_playing: usize,
    /// Units still alive when the thread exited.
    pub leaked: usize,
}

#[derive(Debug, Default)]
struct HostVoice {
    clip: Option<String>,
    playing: bool,
    looped: bool,
    volume: f32,
}

/// Entry point of the backend thread.
///
/// Blocks on the command channel until [`VoiceCmd::Shutdown`] arrives or every
/// sender is dropped.
pub fn voice_backend_thread(rx_cmd: Receiver<VoiceCmd>) -> BackendSummary {
    info!(
        "[audio] backend thread starting (id={:?})",
        std::thread::current().id()
    );

    let mut voices: FxHashMap<(Entity, VoiceId), HostVoice> = FxHashMap::default();
    let mut summary = BackendSummary::default();

    for cmd in rx_cmd.iter() {
        match cmd {
            VoiceCmd::Create { player, voice } => {
                debug!("[audio] create {} for {:?}", voice, player);
                voices.insert((player, voice), HostVoice::default());
                summary.created += 1;
            }
            VoiceCmd::Start {
                player,
                voice,
                clip,
                looped,
                volume,
            } => match voices.get_mut(&(player, voice)) {
                Some(unit) => {
                    debug!(
                        "[audio] start {} clip='{}' looped={} volume={}",
                        voice,
                        clip.id(),
                        looped,
                        volume
                    );
                    unit.clip = Some(clip.id().to_string());
                    unit.looped = looped;
                    unit.volume = volume;
                    unit.playing = true;
                    summary.started += 1;
                    let playing = voices.values().filter(|v| v.playing).count();
                    summary.peak_playing = summary.peak_playing.max(playing);
                }
                None => warn!("[audio] start for unknown {} of {:?}", voice, player),
            },
            VoiceCmd::SetVolume {
                player,
                voice,
                volume,
            } => {
                if let Some(unit) = voices.get_mut(&(player, voice)) {
                    debug!("[audio] volume {} -> {}", voice, volume);
                    unit.volume = volume;
                }
            }
            VoiceCmd::Stop { player, voice } => {
                if let Some(unit) = voices.get_mut(&(player, voice)) {
                    debug!(
                        "[audio] stop {} clip='{}' looped={}",
                        voice,
                        unit.clip.as_deref().unwrap_or(""),
                        unit.looped
                    );
                    unit.playing = false;
                    unit.clip = None;
                    unit.looped = false;
                    unit.volume = 1.0;
                    summary.stopped += 1;
                }
            }
            VoiceCmd::Destroy { player, voice } => {
                if voices.remove(&(player, voice)).is_some() {
                    debug!("[audio] destroy {} of {:?}", voice, player);
                    summary.destroyed += 1;
                }
            }
            VoiceCmd::Shutdown => {
                info!("[audio] shutdown requested");
                break;
            }
        }
    }

    summary.leaked = voices.len();
    if summary.leaked > 0 {
        warn!("[audio] {} units still alive at exit", summary.leaked);
    }
    info!(
        "[audio] backend thread exiting (id={:?})",
        std::thread::current().id()
    );
    summary
}

/// Move every player's queued [`VoiceCmd`]s into the ECS message queue.
pub fn collect_voice_cmds(
    mut players: Query<&mut AudioPlayer>,
    mut writer: MessageWriter<VoiceCmd>,
) {
    for mut player in players.iter_mut() {
        if player.pending_commands().is_empty() {
            continue;
        }
        writer.write_batch(player.drain_commands());
    }
}

/// Forward queued [`VoiceCmd`]s to the backend thread, if one is running.
pub fn forward_voice_cmds(bridge: Option<Res<AudioBridge>>, mut reader: MessageReader<VoiceCmd>) {
    let Some(bridge) = bridge else {
        reader.clear();
        return;
    };
    for cmd in reader.read() {
        // ignore send error on shutdown
        let _ = bridge.tx_cmd.send(cmd.clone());
    }
}

/// Advance the ECS message queue for [`VoiceCmd`].
pub fn update_bevy_voice_cmds(mut msgs: ResMut<Messages<VoiceCmd>>) {
    msgs.update();
}

/// Advance the ECS message queue for [`AudioRequest`].
pub fn update_bevy_audio_requests(mut msgs: ResMut<Messages<AudioRequest>>) {
    msgs.update();
}

/// Advance the ECS message queue for [`VoiceFinished`].
pub fn update_bevy_voice_finished(mut msgs: ResMut<Messages<VoiceFinished>>) {
    msgs.update();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::clipstore::AudioClip;
    use crossbeam_channel::unbounded;

    #[test]
    fn backend_tracks_unit_lifecycle() {
        let player = World::new().spawn_empty().id();
        let (tx, rx) = unbounded();
        let voice = VoiceId(0);
        tx.send(VoiceCmd::Create { player, voice }).unwrap();
        tx.send(VoiceCmd::Start {
            player,
            voice,
            clip: AudioClip::new("boom", 1.0),
            looped: false,
            volume: 0.5,
        })
        .unwrap();
        tx.send(VoiceCmd::Stop { player, voice }).unwrap();
        tx.send(VoiceCmd::Create {
            player,
            voice: VoiceId(1),
        })
        .unwrap();
        tx.send(VoiceCmd::Destroy { player, voice }).unwrap();
        tx.send(VoiceCmd::Shutdown).unwrap();

        let summary = voice_backend_thread(rx);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.started, 1);
        assert_eq!(summary.stopped, 1);
        assert_eq!(summary.destroyed, 1);
        assert_eq!(summary.peak_playing, 1);
        assert_eq!(summary.leaked, 1);
    }

    #[test]
    fn backend_exits_when_senders_drop() {
        let (tx, rx) = unbounded::<VoiceCmd>();
        drop(tx);
        assert_eq!(voice_backend_thread(rx), BackendSummary::default());
    }
}
