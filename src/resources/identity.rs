//! Single-instance registry.
//!
//! [`IdentityRegistry<T>`] records which entity owns the singleton role `T`,
//! either once for the whole process ([`SingletonMode::GlobalUnique`]) or once
//! per [`ScopeKey`] ([`SingletonMode::PerScopeUnique`]). One registry exists
//! per role type, so independent roles never collide and tests can build a
//! fresh registry per case.
//!
//! The registry itself only answers "accepted or rejected". Enforcing the
//! outcome (despawning the loser, detaching a global owner from its parent)
//! happens in [`crate::systems::singleton`].
//!
//! # Rules
//!
//! | mode           | slot             | accept when                          |
//! |----------------|------------------|--------------------------------------|
//! | Disabled       | none             | always, nothing recorded             |
//! | PerScopeUnique | `scope`          | slot empty or already the candidate  |
//! | GlobalUnique   | one, scope unused| slot empty or already the candidate  |

use bevy_ecs::prelude::{Entity, Resource};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::resources::activescope::ScopeKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SingletonMode {
    Disabled,
    PerScopeUnique,
    #[default]
    GlobalUnique,
}

impl fmt::Display for SingletonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SingletonMode::Disabled => "disabled",
            SingletonMode::PerScopeUnique => "scene",
            SingletonMode::GlobalUnique => "global",
        };
        f.write_str(s)
    }
}

impl FromStr for SingletonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "none" => Ok(SingletonMode::Disabled),
            "scene" | "scope" | "per_scene" | "per_scope" => Ok(SingletonMode::PerScopeUnique),
            "global" => Ok(SingletonMode::GlobalUnique),
            other => Err(format!("unknown singleton mode '{}'", other)),
        }
    }
}

/// Owners of the singleton role `T`.
#[derive(Resource)]
pub struct IdentityRegistry<T: 'static> {
    global: Option<Entity>,
    scoped: FxHashMap<ScopeKey, Entity>,
    _role: PhantomData<fn() -> T>,
}

impl<T: 'static> Default for IdentityRegistry<T> {
    fn default() -> Self {
        IdentityRegistry {
            global: None,
            scoped: FxHashMap::default(),
            _role: PhantomData,
        }
    }
}

impl<T: 'static> fmt::Debug for IdentityRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityRegistry")
            .field("role", &std::any::type_name::<T>())
            .field("global", &self.global)
            .field("scoped", &self.scoped)
            .finish()
    }
}

impl<T: 'static> IdentityRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to make `candidate` the owner of its slot.
    ///
    /// Returns `false` when another entity already owns it. A rejected
    /// candidate must not stay alive.
    pub fn register(&mut self, candidate: Entity, mode: SingletonMode, scope: ScopeKey) -> bool {
        match mode {
            SingletonMode::Disabled => true,
            SingletonMode::GlobalUnique => match self.global {
                Some(owner) if owner != candidate => false,
                _ => {
                    self.global = Some(candidate);
                    true
                }
            },
            SingletonMode::PerScopeUnique => match self.scoped.get(&scope) {
                Some(owner) if *owner != candidate => false,
                _ => {
                    self.scoped.insert(scope, candidate);
                    true
                }
            },
        }
    }

    /// Release the slot if `candidate` owns it. Anything else is ignored.
    pub fn unregister(&mut self, candidate: Entity, mode: SingletonMode, scope: ScopeKey) {
        match mode {
            SingletonMode::Disabled => {}
            SingletonMode::GlobalUnique => {
                if self.global == Some(candidate) {
                    self.global = None;
                }
            }
            SingletonMode::PerScopeUnique => {
                if self.scoped.get(&scope) == Some(&candidate) {
                    self.scoped.remove(&scope);
                }
            }
        }
    }

    pub fn current_owner(&self, mode: SingletonMode, scope: ScopeKey) -> Option<Entity> {
        match mode {
            SingletonMode::Disabled => None,
            SingletonMode::GlobalUnique => self.global,
            SingletonMode::PerScopeUnique => self.scoped.get(&scope).copied(),
        }
    }

    /// The instance callers should talk to: the global owner if any, else
    /// the owner of `active_scope`.
    pub fn instance(&self, active_scope: ScopeKey) -> Option<Entity> {
        self.global
            .or_else(|| self.scoped.get(&active_scope).copied())
    }

    /// Like [`instance`](Self::instance), skipping owners for which
    /// `is_alive` returns `false`.
    pub fn live_instance(
        &self,
        active_scope: ScopeKey,
        is_alive: impl Fn(Entity) -> bool,
    ) -> Option<Entity> {
        self.global.filter(|e| is_alive(*e)).or_else(|| {
            self.scoped
                .get(&active_scope)
                .copied()
                .filter(|e| is_alive(*e))
        })
    }

    /// Forget owners for which `is_alive` returns `false`.
    pub fn prune(&mut self, mut is_alive: impl FnMut(Entity) -> bool) {
        if self.global.is_some_and(|e| !is_alive(e)) {
            self.global = None;
        }
        self.scoped.retain(|_, e| is_alive(*e));
    }

    /// Whether `entity` owns any slot.
    pub fn is_owner(&self, entity: Entity) -> bool {
        self.global == Some(entity) || self.scoped.values().any(|e| *e == entity)
    }

    pub fn scoped_count(&self) -> usize {
        self.scoped.len()
    }
}
