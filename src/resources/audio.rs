//! ECS resources that bridge the main thread with the host audio backend.
//!
//! Use [`setup_audio`] once during initialization to spawn the backend thread
//! and insert the [`AudioBridge`] plus the audio message queues. Call
//! [`shutdown_audio`] during teardown to stop the thread and collect its
//! [`BackendSummary`].

use crate::events::audio::{AudioRequest, VoiceCmd, VoiceFinished};
use crate::systems::audio::{BackendSummary, voice_backend_thread};
use bevy_ecs::prelude::*;
use crossbeam_channel::{Sender, unbounded};

/// Shared bridge between the ECS world and the backend thread.
///
/// Created by [`setup_audio`]. Systems send commands through
/// [`AudioBridge::tx_cmd`].
#[derive(Resource)]
pub struct AudioBridge {
    /// Sender for [`VoiceCmd`] messages (ECS -> backend thread).
    pub tx_cmd: Sender<VoiceCmd>,
    /// Join handle for the backend thread.
    pub handle: std::thread::JoinHandle<BackendSummary>,
}

/// Register the audio message queues without starting a backend.
///
/// Commands written to `Messages<VoiceCmd>` simply expire when no bridge is
/// present.
pub fn init_audio_messages(world: &mut World) {
    world.init_resource::<Messages<AudioRequest>>();
    world.init_resource::<Messages<VoiceCmd>>();
    world.init_resource::<Messages<VoiceFinished>>();
}

/// Spawn the backend thread and register bridge resources.
pub fn setup_audio(world: &mut World) {
    let (tx_cmd, rx_cmd) = unbounded::<VoiceCmd>();

    let handle = std::thread::spawn(move || voice_backend_thread(rx_cmd));

    world.insert_resource(AudioBridge { tx_cmd, handle });
    init_audio_messages(world);
}

/// Request shutdown of the backend thread and join it.
///
/// Returns the backend's summary, or `None` when no bridge was installed or
/// the thread panicked.
pub fn shutdown_audio(world: &mut World) -> Option<BackendSummary> {
    let bridge = world.remove_resource::<AudioBridge>()?;
    let _ = bridge.tx_cmd.send(VoiceCmd::Shutdown);
    bridge.handle.join().ok()
}
