//! Singleton options component.
//!
//! Attach [`Singleton`] to an entity before calling
//! [`attach_singleton`](crate::systems::singleton::attach_singleton). The
//! component remembers the slot the entity registered under so
//! [`detach_singleton`](crate::systems::singleton::detach_singleton) releases
//! exactly that slot even if the entity changed scope in between.

use bevy_ecs::prelude::Component;

use crate::resources::activescope::ScopeKey;
use crate::resources::identity::SingletonMode;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Singleton {
    pub mode: SingletonMode,
    /// Detach from the parent and mark [`Persistent`](super::persistent::Persistent)
    /// when registered as [`SingletonMode::GlobalUnique`].
    pub persist_when_global: bool,
    /// Scope of the current registration, set while registered.
    pub registered_scope: Option<ScopeKey>,
}

impl Default for Singleton {
    fn default() -> Self {
        Singleton::new(SingletonMode::GlobalUnique)
    }
}

impl Singleton {
    pub fn new(mode: SingletonMode) -> Self {
        Singleton {
            mode,
            persist_when_global: true,
            registered_scope: None,
        }
    }

    pub fn with_persist_when_global(mut self, persist: bool) -> Self {
        self.persist_when_global = persist;
        self
    }

    pub fn is_registered(&self) -> bool {
        self.registered_scope.is_some()
    }
}
