//! Scope transitions.
//!
//! [`switch_scope`] unloads the active scope: every entity tagged with its
//! [`ScopeMember`] is despawned unless it is [`Persistent`]. Audio players
//! among them are detached first so their voices are destroyed on the host
//! and their singleton slot is released.

use bevy_ecs::prelude::*;
use log::info;

use crate::components::audioplayer::AudioPlayer;
use crate::components::persistent::Persistent;
use crate::components::scopemember::ScopeMember;
use crate::resources::activescope::{ActiveScope, ScopeKey};
use crate::systems::audioplayer::detach_audio_player;

/// Unload the active scope and make `next` active.
///
/// Returns the number of entities despawned.
pub fn switch_scope(world: &mut World, next: ScopeKey) -> usize {
    let current = world
        .get_resource::<ActiveScope>()
        .map(|s| s.get())
        .unwrap_or_default();

    let doomed: Vec<Entity> = {
        let mut query = world.query_filtered::<(Entity, &ScopeMember), Without<Persistent>>();
        query
            .iter(world)
            .filter(|(_, member)| member.0 == current)
            .map(|(entity, _)| entity)
            .collect()
    };

    for entity in &doomed {
        if world.get::<AudioPlayer>(*entity).is_some() {
            detach_audio_player(world, *entity);
        }
    }

    let mut despawned = 0;
    for entity in doomed {
        // children of an earlier entity may already be gone
        if world.get_entity(entity).is_ok() && world.despawn(entity) {
            despawned += 1;
        }
    }

    world.insert_resource(ActiveScope(next));

    info!(
        "Switched scope {} -> {} ({} entities despawned)",
        current, next, despawned
    );
    despawned
}
