//! Persistent entity marker component.
//!
//! Entities with the [`Persistent`] component survive
//! [`switch_scope`](crate::systems::scope::switch_scope). Global singletons
//! configured to persist receive it when their registration is accepted.

use bevy_ecs::prelude::Component;

/// Tag component used to mark entities that outlive scope transitions.
#[derive(Component, Clone, Debug)]
pub struct Persistent;
