//! Named clip catalogue.
//!
//! An [`AudioClip`] is the immutable description of a playable asset: an id
//! and its intrinsic length. The host loads the actual audio data; this crate
//! only needs to know how long a one-shot keeps its voice busy.
//!
//! Clips are registered from the `[clips]` section of
//! [`AudioConfig`](crate::resources::audioconfig::AudioConfig) or directly by
//! game code, and looked up by name when an
//! [`AudioRequest`](crate::events::audio::AudioRequest) is handled.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Immutable playable asset. Cloning is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    id: Arc<str>,
    length: f32,
}

impl AudioClip {
    /// Create a clip. Negative or NaN lengths are stored as zero.
    pub fn new(id: impl Into<Arc<str>>, length: f32) -> Self {
        let length = if length.is_nan() { 0.0 } else { length.max(0.0) };
        AudioClip {
            id: id.into(),
            length,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Intrinsic duration in seconds.
    pub fn length(&self) -> f32 {
        self.length
    }
}

/// Resource mapping clip names to [`AudioClip`]s.
#[derive(Resource, Debug, Clone, Default)]
pub struct ClipStore {
    clips: FxHashMap<String, AudioClip>,
}

impl ClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a clip under its own id.
    pub fn insert(&mut self, id: impl Into<String>, length: f32) -> AudioClip {
        let id = id.into();
        let clip = AudioClip::new(id.as_str(), length);
        self.clips.insert(id, clip.clone());
        clip
    }

    pub fn get(&self, id: &str) -> Option<&AudioClip> {
        self.clips.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<AudioClip> {
        self.clips.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.clips.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
