//! World-level singleton lifecycle.
//!
//! These functions take `&mut World` like the other exclusive helpers and
//! enforce what [`IdentityRegistry`] decides:
//!
//! - [`attach_singleton`] is the "on create" hook. A rejected entity is
//!   despawned on the spot; callers must check the return value and stop
//!   initializing when it is `false`.
//! - [`detach_singleton`] is the "on destroy" hook. Call it before despawning
//!   a registered entity.
//! - [`switch_singleton_mode`] re-runs registration under a new mode.
//!
//! Owners that were despawned without detaching are pruned before a new
//! candidate is judged, so a dead owner never blocks its slot.

use bevy_ecs::hierarchy::ChildOf;
use bevy_ecs::prelude::*;
use log::{debug, info, warn};

use crate::components::persistent::Persistent;
use crate::components::scopemember::ScopeMember;
use crate::components::singleton::Singleton;
use crate::resources::activescope::{ActiveScope, ScopeKey};
use crate::resources::identity::{IdentityRegistry, SingletonMode};

/// Scope an entity registers under: its [`ScopeMember`] if present, else the
/// [`ActiveScope`], else the default key.
pub fn scope_of(world: &World, entity: Entity) -> ScopeKey {
    world
        .get::<ScopeMember>(entity)
        .map(|m| m.0)
        .or_else(|| world.get_resource::<ActiveScope>().map(|s| s.get()))
        .unwrap_or_default()
}

/// Register `entity` as the singleton of role `T`.
///
/// Uses the entity's [`Singleton`] options, inserting the defaults when it has
/// none. Returns `false` and despawns the entity when another live entity
/// already owns the slot.
pub fn attach_singleton<T: 'static>(world: &mut World, entity: Entity) -> bool {
    if world.get_entity(entity).is_err() {
        warn!("attach_singleton: entity {:?} does not exist", entity);
        return false;
    }
    let options = match world.get::<Singleton>(entity) {
        Some(options) => *options,
        None => {
            let options = Singleton::default();
            world.entity_mut(entity).insert(options);
            options
        }
    };
    let scope = scope_of(world, entity);

    world.get_resource_or_insert_with(IdentityRegistry::<T>::default);
    let accepted = world.resource_scope(|world, mut registry: Mut<IdentityRegistry<T>>| {
        registry.prune(|e| world.get_entity(e).is_ok());
        registry.register(entity, options.mode, scope)
    });

    if !accepted {
        let owner = world
            .resource::<IdentityRegistry<T>>()
            .current_owner(options.mode, scope);
        info!(
            "{} singleton {:?} rejected ({} owned by {:?}), despawning",
            short_type_name::<T>(),
            entity,
            options.mode,
            owner
        );
        world.despawn(entity);
        return false;
    }

    if options.mode != SingletonMode::Disabled {
        if let Some(mut singleton) = world.get_mut::<Singleton>(entity) {
            singleton.registered_scope = Some(scope);
        }
    }

    if options.mode == SingletonMode::GlobalUnique && options.persist_when_global {
        world
            .entity_mut(entity)
            .remove::<ChildOf>()
            .insert(Persistent);
    }

    debug!(
        "{} singleton {:?} registered as {} in {}",
        short_type_name::<T>(),
        entity,
        options.mode,
        scope
    );
    true
}

/// Release whatever slot `entity` holds for role `T`.
pub fn detach_singleton<T: 'static>(world: &mut World, entity: Entity) {
    let Some(options) = world.get::<Singleton>(entity).copied() else {
        return;
    };
    let Some(scope) = options.registered_scope else {
        return;
    };
    if let Some(mut registry) = world.get_resource_mut::<IdentityRegistry<T>>() {
        registry.unregister(entity, options.mode, scope);
    }
    if let Some(mut singleton) = world.get_mut::<Singleton>(entity) {
        singleton.registered_scope = None;
    }
    debug!(
        "{} singleton {:?} unregistered from {}",
        short_type_name::<T>(),
        entity,
        scope
    );
}

/// Change the singleton mode of `entity` at runtime.
///
/// Unregisters under the old mode, then registers under the new one with the
/// usual conflict resolution. Returns `false` when the entity lost and was
/// despawned. Switching to the current mode does nothing.
pub fn switch_singleton_mode<T: 'static>(
    world: &mut World,
    entity: Entity,
    mode: SingletonMode,
) -> bool {
    let Some(current) = world.get::<Singleton>(entity).copied() else {
        warn!("switch_singleton_mode: {:?} has no Singleton", entity);
        return false;
    };
    if current.mode == mode {
        return true;
    }
    detach_singleton::<T>(world, entity);
    if let Some(mut singleton) = world.get_mut::<Singleton>(entity) {
        singleton.mode = mode;
    }
    attach_singleton::<T>(world, entity)
}

/// The live instance of role `T`: the global owner, else the owner of the
/// active scope.
pub fn singleton_instance<T: 'static>(world: &World) -> Option<Entity> {
    let registry = world.get_resource::<IdentityRegistry<T>>()?;
    let active = world
        .get_resource::<ActiveScope>()
        .map(|s| s.get())
        .unwrap_or_default();
    registry.live_instance(active, |e| world.get_entity(e).is_ok())
}

fn short_type_name<T: 'static>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
