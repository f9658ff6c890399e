//! Voicepool library.
//!
//! Pooled audio playback and scoped singletons for a `bevy_ecs` world. This
//! module exposes the components, resources, systems, and messages for use in
//! integration tests and by host games.

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;
