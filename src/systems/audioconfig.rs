//! Audio configuration change detection system.
//!
//! Monitors [`AudioConfig`] for changes and pushes them to the running game:
//! the clip list is reconciled with [`ClipStore`], and pool sizing goes to
//! every live [`AudioPlayer`]. Singleton options only affect players spawned
//! afterwards.

use crate::components::audioplayer::AudioPlayer;
use crate::resources::audioconfig::AudioConfig;
use crate::resources::clipstore::ClipStore;
use bevy_ecs::prelude::*;
use log::{debug, info};

/// System that applies audio configuration changes.
///
/// Runs every frame but only does work when the config was added or modified.
///
/// Clips are reconciled against the previous config: names dropped from
/// [`AudioConfig::clips`] are removed from the store, clips registered by
/// other code are left alone. Voices already playing a removed clip keep
/// playing it until they are reclaimed.
pub fn apply_audio_config_changes(
    maybe_config: Option<Res<AudioConfig>>,
    clips: Option<ResMut<ClipStore>>,
    mut players: Query<&mut AudioPlayer>,
    mut applied_clips: Local<Vec<String>>,
) {
    let Some(config) = maybe_config else {
        return;
    };
    if !config.is_changed() {
        return;
    }

    if let Some(mut clips) = clips {
        for name in applied_clips.iter() {
            if config.clip_length(name).is_none() && clips.remove(name).is_some() {
                debug!("clip '{}' dropped from config, removed", name);
            }
        }
        for (name, length) in &config.clips {
            clips.insert(name.clone(), *length);
        }
        *applied_clips = config.clips.iter().map(|(name, _)| name.clone()).collect();
        info!("ClipStore holds {} clips", clips.len());
    }

    for mut player in players.iter_mut() {
        if player.pool().max_size() != config.max_size {
            info!(
                "audio player {:?}: max_size {} -> {}",
                player.owner(),
                player.pool().max_size(),
                config.max_size
            );
            player.set_max_size(config.max_size);
        }
        if player.pool().default_capacity() != config.default_capacity {
            player.set_default_capacity(config.default_capacity);
        }
    }

    info!("AudioConfig changes applied.");
}
