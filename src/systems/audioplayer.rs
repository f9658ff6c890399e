//! Audio player lifecycle and per-frame systems.
//!
//! Lifecycle (exclusive, `&mut World`):
//!
//! - [`attach_audio_player`] registers the entity as the [`AudioPlayer`]
//!   singleton and, only if accepted, inserts the player component.
//! - [`detach_audio_player`] stops and destroys every voice, flushes the host
//!   commands and releases the singleton slot.
//! - [`switch_audio_player_mode`] re-registers under another
//!   [`SingletonMode`], tearing the player down when it loses.
//!
//! Systems:
//!
//! - [`update_audio_players`] advances timed reclamation with
//!   [`WorldTime::delta`] and writes a [`VoiceFinished`] per finished one-shot.
//! - [`handle_audio_requests`] applies [`AudioRequest`]s to the current
//!   singleton instance.

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::audioplayer::AudioPlayer;
use crate::components::audioplayer::pool::{DEFAULT_CAPACITY, DEFAULT_MAX_SIZE};
use crate::components::scopemember::ScopeMember;
use crate::components::singleton::Singleton;
use crate::events::audio::{AudioRequest, VoiceCmd, VoiceFinished};
use crate::resources::activescope::{ActiveScope, ScopeKey};
use crate::resources::audioconfig::AudioConfig;
use crate::resources::clipstore::{AudioClip, ClipStore};
use crate::resources::identity::{IdentityRegistry, SingletonMode};
use crate::resources::worldtime::WorldTime;
use crate::systems::singleton::{attach_singleton, detach_singleton, switch_singleton_mode};

/// "On create" hook of an audio player.
///
/// Returns `false` when the entity lost its singleton registration; it has
/// been despawned and never received a pool.
pub fn attach_audio_player(world: &mut World, entity: Entity) -> bool {
    if !attach_singleton::<AudioPlayer>(world, entity) {
        return false;
    }
    let (default_capacity, max_size) = world
        .get_resource::<AudioConfig>()
        .map(|c| (c.default_capacity, c.max_size))
        .unwrap_or((DEFAULT_CAPACITY, DEFAULT_MAX_SIZE));
    world
        .entity_mut(entity)
        .insert(AudioPlayer::new(entity, default_capacity, max_size));
    info!(
        "audio player {:?} attached (capacity={}, max_size={})",
        entity, default_capacity, max_size
    );
    true
}

/// "On destroy" hook of an audio player. Does not despawn the entity.
pub fn detach_audio_player(world: &mut World, entity: Entity) {
    let player = world
        .get_entity_mut(entity)
        .ok()
        .and_then(|mut e| e.take::<AudioPlayer>());
    if let Some(mut player) = player {
        player.teardown();
        flush_commands(world, player.drain_commands());
        info!("audio player {:?} detached", entity);
    }
    detach_singleton::<AudioPlayer>(world, entity);
}

/// Spawn an entity with the given singleton options and attach a player.
///
/// `scope` pins the entity to a scope; `None` leaves it in whatever scope is
/// active. Returns `None` when the new entity lost its registration.
pub fn spawn_audio_player(
    world: &mut World,
    singleton: Singleton,
    scope: Option<ScopeKey>,
) -> Option<Entity> {
    let entity = match scope {
        Some(scope) => world.spawn((singleton, ScopeMember(scope))).id(),
        None => world.spawn(singleton).id(),
    };
    attach_audio_player(world, entity).then_some(entity)
}

/// Spawn a player using the singleton options of [`AudioConfig`], pinned to
/// the active scope.
pub fn spawn_configured_audio_player(world: &mut World) -> Option<Entity> {
    let singleton = world
        .get_resource::<AudioConfig>()
        .map(|c| Singleton::new(c.singleton_mode).with_persist_when_global(c.persist_when_global))
        .unwrap_or_default();
    let scope = world.get_resource::<ActiveScope>().map(|s| s.get());
    spawn_audio_player(world, singleton, scope)
}

/// Detach and despawn an audio player.
pub fn despawn_audio_player(world: &mut World, entity: Entity) -> bool {
    detach_audio_player(world, entity);
    world.get_entity(entity).is_ok() && world.despawn(entity)
}

/// Change the singleton mode of a live player.
///
/// Returns `false` when the player lost the new slot; its voices are destroyed
/// before the entity goes away.
pub fn switch_audio_player_mode(world: &mut World, entity: Entity, mode: SingletonMode) -> bool {
    let player = world
        .get_entity_mut(entity)
        .ok()
        .and_then(|mut e| e.take::<AudioPlayer>());
    let accepted = switch_singleton_mode::<AudioPlayer>(world, entity, mode);
    if let Some(mut player) = player {
        if accepted {
            world.entity_mut(entity).insert(player);
        } else {
            player.teardown();
            flush_commands(world, player.drain_commands());
        }
    }
    accepted
}

fn flush_commands(world: &mut World, cmds: Vec<VoiceCmd>) {
    if cmds.is_empty() {
        return;
    }
    match world.get_resource_mut::<Messages<VoiceCmd>>() {
        Some(mut messages) => {
            messages.write_batch(cmds);
        }
        None => debug!("no VoiceCmd queue, dropping {} commands", cmds.len()),
    }
}

/// Advance every player's reclamation timers by the scaled frame delta.
pub fn update_audio_players(
    world_time: Res<WorldTime>,
    mut players: Query<(Entity, &mut AudioPlayer)>,
    mut finished: MessageWriter<VoiceFinished>,
) {
    let dt = world_time.delta; // delta is already scaled by time_scale
    for (entity, mut player) in players.iter_mut() {
        for (voice, clip) in player.tick(dt) {
            debug!("audio player {:?}: {} finished '{}'", entity, voice, clip.id());
            finished.write(VoiceFinished {
                player: entity,
                voice,
                clip,
            });
        }
    }
}

/// Apply pending [`AudioRequest`]s to the current [`AudioPlayer`] instance.
///
/// Requests are dropped when no live player owns the global slot or the
/// active scope.
pub fn handle_audio_requests(
    mut reader: MessageReader<AudioRequest>,
    clips: Res<ClipStore>,
    registry: Option<Res<IdentityRegistry<AudioPlayer>>>,
    active_scope: Option<Res<ActiveScope>>,
    mut players: Query<&mut AudioPlayer>,
) {
    let requests: Vec<AudioRequest> = reader.read().cloned().collect();
    if requests.is_empty() {
        return;
    }
    let scope = active_scope.map(|s| s.get()).unwrap_or_default();
    let target = registry.and_then(|r| r.live_instance(scope, |e| players.contains(e)));
    let Some(target) = target else {
        debug!("no audio player instance, dropping {} requests", requests.len());
        return;
    };
    let Ok(mut player) = players.get_mut(target) else {
        return;
    };
    for request in &requests {
        apply_audio_request(&mut player, &clips, request);
    }
}

/// Apply one request to `player`. Unknown clips are ignored.
pub fn apply_audio_request(player: &mut AudioPlayer, clips: &ClipStore, request: &AudioRequest) {
    match request {
        AudioRequest::PlayOnce { clip, volume } => {
            if let Some(clip) = lookup(clips, clip) {
                player.play_once(clip, *volume);
            }
        }
        AudioRequest::PlayLooped { clip, volume } => {
            if let Some(clip) = lookup(clips, clip) {
                player.play_looped(clip, *volume);
            }
        }
        AudioRequest::PlayLoopedExclusive { clip, volume } => {
            if player.is_sole_active_loop(clip) {
                debug!("'{}' is already looping, request skipped", clip);
                return;
            }
            if let Some(clip) = lookup(clips, clip) {
                player.play_looped(clip, *volume);
            }
        }
        AudioRequest::StopOne { clip } => {
            player.stop_one(clip);
        }
        AudioRequest::StopAll { clip } => {
            player.stop_all_for(clip);
        }
        AudioRequest::SetVolume { clip, volume } => {
            player.set_volume_for(clip, *volume);
        }
    }
}

fn lookup<'a>(clips: &'a ClipStore, name: &str) -> Option<&'a AudioClip> {
    let clip = clips.get(name);
    if clip.is_none() {
        debug!("unknown clip '{}', request ignored", name);
    }
    clip
}
