//! Current logical scope (the loaded scene).
//!
//! Per-scope singletons are keyed by [`ScopeKey`]. The engine never looks
//! inside a key; it only compares them.

use bevy_ecs::prelude::Resource;
use serde::Serialize;
use std::fmt;

/// Opaque identifier of a logical scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct ScopeKey(pub u32);

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// The scope that is currently loaded.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveScope(pub ScopeKey);

impl ActiveScope {
    pub fn get(&self) -> ScopeKey {
        self.0
    }

    pub fn set(&mut self, key: ScopeKey) {
        self.0 = key;
    }
}
