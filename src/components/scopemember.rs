//! Scope membership component.

use bevy_ecs::prelude::Component;

use crate::resources::activescope::ScopeKey;

/// The scope an entity was spawned into.
///
/// Per-scope singletons register under this key, and
/// [`switch_scope`](crate::systems::scope::switch_scope) despawns members of
/// the outgoing scope unless they are [`Persistent`](super::persistent::Persistent).
/// Entities without it belong to whatever scope is active when asked.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeMember(pub ScopeKey);
