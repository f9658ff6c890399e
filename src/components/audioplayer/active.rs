//! Active voice registry keyed by clip id.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::voice::VoiceId;

/// Voices playing one clip, in activation order.
pub type VoiceSet = SmallVec<[VoiceId; 4]>;

/// Maps clip ids to the voices currently playing them.
///
/// A voice is listed under at most one clip, and a clip with no voices has no
/// entry.
#[derive(Debug, Clone, Default)]
pub struct ActiveVoices {
    by_clip: FxHashMap<String, VoiceSet>,
}

impl ActiveVoices {
    pub fn insert(&mut self, clip_id: &str, voice: VoiceId) {
        let set = self.by_clip.entry(clip_id.to_string()).or_default();
        if !set.contains(&voice) {
            set.push(voice);
        }
    }

    /// Remove `voice` from the set of `clip_id`. Returns `false` when it was
    /// not listed there.
    pub fn remove(&mut self, clip_id: &str, voice: VoiceId) -> bool {
        let Some(set) = self.by_clip.get_mut(clip_id) else {
            return false;
        };
        let Some(pos) = set.iter().position(|v| *v == voice) else {
            return false;
        };
        set.remove(pos);
        if set.is_empty() {
            self.by_clip.remove(clip_id);
        }
        true
    }

    pub fn first(&self, clip_id: &str) -> Option<VoiceId> {
        self.by_clip.get(clip_id).and_then(|set| set.first().copied())
    }

    pub fn voices(&self, clip_id: &str) -> &[VoiceId] {
        self.by_clip.get(clip_id).map(|s| s.as_slice()).unwrap_or(&[])
    }

    /// Copy of the set for `clip_id`, safe to iterate while mutating `self`.
    pub fn snapshot(&self, clip_id: &str) -> VoiceSet {
        self.by_clip.get(clip_id).cloned().unwrap_or_default()
    }

    pub fn contains(&self, voice: VoiceId) -> bool {
        self.by_clip.values().any(|set| set.contains(&voice))
    }

    /// Every listed voice, across all clips.
    pub fn all_voices(&self) -> Vec<VoiceId> {
        self.by_clip.values().flatten().copied().collect()
    }

    pub fn clip_count(&self) -> usize {
        self.by_clip.len()
    }

    pub fn voice_count(&self) -> usize {
        self.by_clip.values().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_clip.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[VoiceId])> {
        self.by_clip.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sets_are_dropped() {
        let mut active = ActiveVoices::default();
        active.insert("a", VoiceId(1));
        active.insert("a", VoiceId(2));
        assert_eq!(active.voices("a"), &[VoiceId(1), VoiceId(2)]);

        assert!(active.remove("a", VoiceId(1)));
        assert_eq!(active.first("a"), Some(VoiceId(2)));
        assert!(active.remove("a", VoiceId(2)));
        assert!(active.is_empty());
        assert_eq!(active.clip_count(), 0);
    }

    #[test]
    fn removing_unknown_voice_is_a_no_op() {
        let mut active = ActiveVoices::default();
        active.insert("a", VoiceId(1));
        assert!(!active.remove("a", VoiceId(9)));
        assert!(!active.remove("b", VoiceId(1)));
        assert_eq!(active.voice_count(), 1);
    }

    #[test]
    fn duplicate_insert_is_ignored() {
        let mut active = ActiveVoices::default();
        active.insert("a", VoiceId(3));
        active.insert("a", VoiceId(3));
        assert_eq!(active.voices("a").len(), 1);
        assert!(active.contains(VoiceId(3)));
    }
}
