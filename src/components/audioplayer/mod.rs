//! Pooled audio player component.
//!
//! An [`AudioPlayer`] hands out reusable voices from a bounded
//! [`VoicePool`](pool::VoicePool), remembers which voices are playing which
//! clip in [`ActiveVoices`](active::ActiveVoices), and returns one-shot voices
//! to the pool once their clip has played through.
//!
//! # Voice lifecycle
//!
//! ```text
//! Idle --play--> Active --reclaim (stop or timer)--> Idle --evict/teardown--> Destroyed
//! ```
//!
//! Every transition the host needs to know about is queued as a
//! [`VoiceCmd`](crate::events::audio::VoiceCmd) in the player's outbox.
//! [`collect_voice_cmds`](crate::systems::audio::collect_voice_cmds) drains it
//! into the ECS message queue each frame.
//!
//! # Insertion
//!
//! The component is only inserted by
//! [`attach_audio_player`](crate::systems::audioplayer::attach_audio_player)
//! after the entity won its singleton registration, so a rejected candidate
//! never owns a pool.
//!
//! # Timed reclamation
//!
//! One-shots are reclaimed after exactly the clip length of scaled world time.
//! Each activation bumps the voice generation; a timer that fires for an older
//! generation is ignored, so a voice stopped and reused before its timer ran
//! out is never reclaimed by the stale timer.

pub mod active;
pub mod pool;
pub mod reclaim;
pub mod voice;

use bevy_ecs::prelude::*;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;

use self::active::ActiveVoices;
use self::pool::{Acquired, Released, VoicePool};
use self::reclaim::{ReclaimSchedule, ReclaimTicket};
use self::voice::{Voice, VoiceId, clamp_volume};
use crate::events::audio::VoiceCmd;
use crate::resources::clipstore::AudioClip;

/// Snapshot of a player's bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub live_voices: usize,
    pub idle_voices: usize,
    pub active_voices: usize,
    pub active_clips: usize,
    pub pending_reclaims: usize,
    pub max_size: usize,
    pub created_total: u64,
    pub destroyed_total: u64,
    pub rejected_total: u64,
}

#[derive(Component, Debug)]
pub struct AudioPlayer {
    owner: Entity,
    pool: VoicePool,
    voices: FxHashMap<VoiceId, Voice>,
    active: ActiveVoices,
    schedule: ReclaimSchedule,
    outbox: Vec<VoiceCmd>,
    created_total: u64,
    destroyed_total: u64,
    rejected_total: u64,
}

impl AudioPlayer {
    /// Create a player whose voices are parented to `owner`.
    pub fn new(owner: Entity, default_capacity: usize, max_size: usize) -> Self {
        AudioPlayer {
            owner,
            pool: VoicePool::new(default_capacity, max_size),
            voices: FxHashMap::default(),
            active: ActiveVoices::default(),
            schedule: ReclaimSchedule::default(),
            outbox: Vec::new(),
            created_total: 0,
            destroyed_total: 0,
            rejected_total: 0,
        }
    }

    pub fn owner(&self) -> Entity {
        self.owner
    }

    /// Play `clip` once. The voice returns to the pool after `clip.length()`.
    pub fn play_once(&mut self, clip: &AudioClip, volume: f32) -> Option<VoiceId> {
        self.play(clip, false, volume)
    }

    /// Play `clip` in a loop until it is stopped.
    pub fn play_looped(&mut self, clip: &AudioClip, volume: f32) -> Option<VoiceId> {
        self.play(clip, true, volume)
    }

    fn play(&mut self, clip: &AudioClip, looped: bool, volume: f32) -> Option<VoiceId> {
        let Some(acquired) = self.pool.acquire() else {
            self.rejected_total += 1;
            warn!(
                "audio player {:?}: no voice available for '{}' ({} live, max {})",
                self.owner,
                clip.id(),
                self.pool.count_all(),
                self.pool.max_size()
            );
            return None;
        };

        let id = acquired.id();
        if let Acquired::Created(_) = acquired {
            self.created_total += 1;
            self.voices.insert(id, Voice::default());
            self.outbox.push(VoiceCmd::Create {
                player: self.owner,
                voice: id,
            });
        }

        let voice = self.voices.entry(id).or_default();
        let generation = voice.activate(clip.clone(), looped, volume);
        let volume = voice.volume;
        self.active.insert(clip.id(), id);
        self.outbox.push(VoiceCmd::Start {
            player: self.owner,
            voice: id,
            clip: clip.clone(),
            looped,
            volume,
        });

        if !looped {
            self.schedule.schedule(
                ReclaimTicket {
                    voice: id,
                    generation,
                },
                clip.length(),
            );
        }

        debug!(
            "audio player {:?}: {} playing '{}' looped={} volume={}",
            self.owner,
            id,
            clip.id(),
            looped,
            volume
        );
        Some(id)
    }

    /// Stop one voice playing `clip_id` (the earliest started) and return it
    /// to the pool.
    pub fn stop_one(&mut self, clip_id: &str) -> Option<VoiceId> {
        let id = self.active.first(clip_id)?;
        self.reclaim(id).then_some(id)
    }

    /// Stop every voice playing `clip_id`. Returns how many were stopped.
    pub fn stop_all_for(&mut self, clip_id: &str) -> usize {
        self.active
            .snapshot(clip_id)
            .into_iter()
            .filter(|id| self.reclaim(*id))
            .count()
    }

    /// Set the volume of every voice currently playing `clip_id`.
    ///
    /// Future plays are unaffected; they use the volume they are given.
    pub fn set_volume_for(&mut self, clip_id: &str, volume: f32) -> usize {
        let volume = clamp_volume(volume);
        let ids = self.active.snapshot(clip_id);
        for id in &ids {
            if let Some(voice) = self.voices.get_mut(id) {
                voice.volume = volume;
                self.outbox.push(VoiceCmd::SetVolume {
                    player: self.owner,
                    voice: *id,
                    volume,
                });
            }
        }
        ids.len()
    }

    /// Any voice currently playing `clip_id`.
    pub fn voice_with_clip(&self, clip_id: &str) -> Option<VoiceId> {
        self.active.first(clip_id)
    }

    /// Whether exactly one voice plays `clip_id` and it is looping.
    pub fn is_sole_active_loop(&self, clip_id: &str) -> bool {
        match self.active.voices(clip_id) {
            [only] => self.voices.get(only).is_some_and(|v| v.looped),
            _ => false,
        }
    }

    /// Return an active voice to the pool.
    ///
    /// Reclaiming an idle or unknown voice does nothing and returns `false`.
    pub fn reclaim(&mut self, id: VoiceId) -> bool {
        let Some(voice) = self.voices.get_mut(&id) else {
            return false;
        };
        if !voice.is_active() {
            return false;
        }
        if let Some(clip_id) = voice.clip_id() {
            self.active.remove(clip_id, id);
        }
        voice.reset();
        self.schedule.cancel(id);
        self.outbox.push(VoiceCmd::Stop {
            player: self.owner,
            voice: id,
        });

        if self.pool.release(id) == Released::Evicted {
            self.destroy_voice(id);
        }
        true
    }

    /// Advance timed reclamation by `dt` seconds.
    ///
    /// Returns the voices reclaimed this call together with the clip they had
    /// finished.
    pub fn tick(&mut self, dt: f32) -> Vec<(VoiceId, AudioClip)> {
        let mut finished = Vec::new();
        for ticket in self.schedule.advance(dt) {
            let Some(voice) = self.voices.get(&ticket.voice) else {
                continue;
            };
            if !voice.is_active() || voice.generation != ticket.generation {
                debug!(
                    "audio player {:?}: stale reclaim for {} ignored",
                    self.owner, ticket.voice
                );
                continue;
            }
            let clip = voice.clip.clone();
            if self.reclaim(ticket.voice) {
                if let Some(clip) = clip {
                    finished.push((ticket.voice, clip));
                }
            }
        }
        finished
    }

    /// Change the pool cap. Idle voices above the new cap are destroyed now,
    /// active ones when they are reclaimed.
    pub fn set_max_size(&mut self, max_size: usize) {
        for id in self.pool.set_max_size(max_size) {
            self.destroy_voice(id);
        }
    }

    /// Change the idle storage reserved by the pool.
    pub fn set_default_capacity(&mut self, default_capacity: usize) {
        self.pool.set_default_capacity(default_capacity);
    }

    /// Stop every voice and destroy the whole pool.
    pub fn teardown(&mut self) {
        for id in self.active.all_voices() {
            self.reclaim(id);
        }
        self.schedule.clear();
        for id in self.pool.drain_idle() {
            self.destroy_voice(id);
        }
    }

    fn destroy_voice(&mut self, id: VoiceId) {
        self.voices.remove(&id);
        self.destroyed_total += 1;
        self.outbox.push(VoiceCmd::Destroy {
            player: self.owner,
            voice: id,
        });
    }

    /// Take the queued host commands.
    pub fn drain_commands(&mut self) -> Vec<VoiceCmd> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending_commands(&self) -> &[VoiceCmd] {
        &self.outbox
    }

    pub fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.get(&id)
    }

    pub fn active(&self) -> &ActiveVoices {
        &self.active
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    pub fn is_reclaim_pending(&self, id: VoiceId) -> bool {
        self.schedule.is_pending(id)
    }

    /// Seconds left before the one-shot `id` returns to the pool.
    pub fn reclaim_remaining(&self, id: VoiceId) -> Option<f32> {
        self.schedule.remaining(id)
    }

    pub fn stats(&self) -> PlayerStats {
        PlayerStats {
            live_voices: self.pool.count_all(),
            idle_voices: self.pool.count_idle(),
            active_voices: self.active.voice_count(),
            active_clips: self.active.clip_count(),
            pending_reclaims: self.schedule.len(),
            max_size: self.pool.max_size(),
            created_total: self.created_total,
            destroyed_total: self.destroyed_total,
            rejected_total: self.rejected_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(default_capacity: usize, max_size: usize) -> AudioPlayer {
        let owner = World::new().spawn_empty().id();
        AudioPlayer::new(owner, default_capacity, max_size)
    }

    /// Every listed voice is active and every active voice is listed once.
    fn assert_consistent(p: &AudioPlayer) {
        for (clip, ids) in p.active().iter() {
            assert!(!ids.is_empty());
            for id in ids {
                let voice = p.voice(*id).expect("listed voice exists");
                assert!(voice.is_active());
                assert_eq!(voice.clip_id(), Some(clip));
            }
        }
        let active = p.voices.values().filter(|v| v.is_active()).count();
        assert_eq!(active, p.active().voice_count());
        assert_eq!(p.pool().count_active(), active);
    }

    #[test]
    fn one_shot_returns_to_idle_after_its_length() {
        let mut p = player(10, 100);
        let clip = AudioClip::new("boom", 1.0);
        let id = p.play_once(&clip, 0.8).unwrap();
        assert!(p.voice(id).unwrap().is_active());

        assert!(p.tick(0.5).is_empty());
        assert!(p.voice(id).unwrap().is_active());

        let finished = p.tick(0.5);
        assert_eq!(finished, vec![(id, clip.clone())]);
        assert!(!p.voice(id).unwrap().is_active());
        assert!(p.tick(5.0).is_empty());
        assert_eq!(p.pool().count_idle(), 1);
        assert_consistent(&p);
    }

    #[test]
    fn looped_voice_is_never_auto_reclaimed() {
        let mut p = player(10, 100);
        let clip = AudioClip::new("theme", 0.5);
        let id = p.play_looped(&clip, 1.0).unwrap();
        assert!(!p.is_reclaim_pending(id));
        p.tick(60.0);
        assert!(p.voice(id).unwrap().is_active());
        assert_eq!(p.stop_one("theme"), Some(id));
        assert!(!p.voice(id).unwrap().is_active());
    }

    #[test]
    fn explicit_then_timer_reclaim_is_idempotent() {
        let mut p = player(10, 100);
        let clip = AudioClip::new("boom", 1.0);
        let id = p.play_once(&clip, 1.0).unwrap();
        assert!(p.reclaim(id));
        assert!(!p.reclaim(id));
        assert!(p.tick(2.0).is_empty());
        assert_eq!(p.pool().count_idle(), 1);
        assert_eq!(p.pool().count_all(), 1);
    }

    #[test]
    fn timer_then_explicit_reclaim_is_idempotent() {
        let mut p = player(10, 100);
        let clip = AudioClip::new("boom", 1.0);
        let id = p.play_once(&clip, 1.0).unwrap();
        assert_eq!(p.tick(1.0), vec![(id, clip.clone())]);
        let stops = p
            .drain_commands()
            .iter()
            .filter(|c| matches!(c, VoiceCmd::Stop { .. }))
            .count();
        assert_eq!(stops, 1);

        assert!(!p.reclaim(id));
        assert_eq!(p.stop_one("boom"), None);
        assert_eq!(p.stop_all_for("boom"), 0);
        assert_eq!(p.pool().count_idle(), 1);
        assert_eq!(p.pool().count_all(), 1);
        assert!(p.drain_commands().is_empty());
        assert_consistent(&p);
    }

    #[test]
    fn stale_timer_does_not_reclaim_reused_voice() {
        let mut p = player(10, 100);
        let short = AudioClip::new("short", 1.0);
        let theme = AudioClip::new("theme", 1.0);
        let id = p.play_once(&short, 1.0).unwrap();
        p.stop_one("short");

        let reused = p.play_looped(&theme, 1.0).unwrap();
        assert_eq!(reused, id);
        p.tick(2.0);
        assert!(p.voice(id).unwrap().is_active());
        assert_eq!(p.voice_with_clip("theme"), Some(id));
    }

    #[test]
    fn fails_closed_when_pool_is_exhausted() {
        let mut p = player(1, 2);
        let a = AudioClip::new("a", 10.0);
        let b = AudioClip::new("b", 10.0);
        let c = AudioClip::new("c", 10.0);
        assert!(p.play_once(&a, 1.0).is_some());
        assert!(p.play_once(&b, 1.0).is_some());
        assert!(p.play_once(&c, 1.0).is_none());
        assert!(p.play_once(&c, 1.0).is_none());

        let stats = p.stats();
        assert_eq!(stats.live_voices, 2);
        assert_eq!(stats.created_total, 2);
        assert_eq!(stats.rejected_total, 2);
        assert!(p.voice_with_clip("c").is_none());
        assert_consistent(&p);
    }

    #[test]
    fn set_volume_updates_every_active_voice_but_not_future_plays() {
        let mut p = player(10, 100);
        let clip = AudioClip::new("theme", 3.0);
        let looped = p.play_looped(&clip, 1.0).unwrap();
        let extra = p.play_looped(&clip, 0.9).unwrap();

        assert_eq!(p.set_volume_for("theme", 0.3), 2);
        assert_eq!(p.voice(looped).unwrap().volume, 0.3);
        assert_eq!(p.voice(extra).unwrap().volume, 0.3);

        let once = p.play_once(&clip, 0.7).unwrap();
        assert_eq!(p.voice(once).unwrap().volume, 0.7);
        assert_eq!(p.set_volume_for("missing", 0.1), 0);
    }

    #[test]
    fn stop_all_empties_the_clip_entry() {
        let mut p = player(10, 100);
        let clip = AudioClip::new("boom", 5.0);
        for _ in 0..3 {
            p.play_once(&clip, 1.0);
        }
        assert_eq!(p.stop_all_for("boom"), 3);
        assert!(p.active().is_empty());
        assert_eq!(p.stop_all_for("boom"), 0);
        assert_eq!(p.stop_one("boom"), None);
        assert_eq!(p.stats().pending_reclaims, 0);
        assert_consistent(&p);
    }

    #[test]
    fn sole_loop_detection() {
        let mut p = player(10, 100);
        let clip = AudioClip::new("theme", 3.0);
        assert!(!p.is_sole_active_loop("theme"));
        p.play_looped(&clip, 1.0);
        assert!(p.is_sole_active_loop("theme"));
        p.play_once(&clip, 1.0);
        assert!(!p.is_sole_active_loop("theme"));
    }

    #[test]
    fn commands_follow_the_voice_lifecycle() {
        let mut p = player(10, 100);
        let owner = p.owner();
        let clip = AudioClip::new("boom", 1.0);
        let id = p.play_once(&clip, 0.5).unwrap();
        p.tick(1.0);

        let cmds = p.drain_commands();
        assert_eq!(
            cmds,
            vec![
                VoiceCmd::Create {
                    player: owner,
                    voice: id
                },
                VoiceCmd::Start {
                    player: owner,
                    voice: id,
                    clip,
                    looped: false,
                    volume: 0.5
                },
                VoiceCmd::Stop {
                    player: owner,
                    voice: id
                },
            ]
        );
        assert!(p.pending_commands().is_empty());
    }

    #[test]
    fn teardown_destroys_every_voice() {
        let mut p = player(10, 100);
        let clip = AudioClip::new("boom", 1.0);
        let theme = AudioClip::new("theme", 1.0);
        let a = p.play_once(&clip, 1.0).unwrap();
        p.play_looped(&theme, 1.0);
        p.reclaim(a);
        p.drain_commands();

        p.teardown();
        let stats = p.stats();
        assert_eq!(stats.live_voices, 0);
        assert_eq!(stats.destroyed_total, 2);
        assert!(p.active().is_empty());
        let destroyed = p
            .drain_commands()
            .into_iter()
            .filter(|c| matches!(c, VoiceCmd::Destroy { .. }))
            .count();
        assert_eq!(destroyed, 2);
    }

    #[test]
    fn shrinking_capacity_evicts_on_release() {
        let mut p = player(4, 4);
        let clip = AudioClip::new("boom", 10.0);
        let ids: Vec<VoiceId> = (0..3).map(|_| p.play_once(&clip, 1.0).unwrap()).collect();
        p.set_max_size(1);
        for id in &ids {
            p.reclaim(*id);
        }
        assert_eq!(p.stats().live_voices, 1);
        assert_eq!(p.stats().destroyed_total, 2);
        assert!(p.voice(ids[0]).is_none());
        assert!(p.voice(ids[2]).is_some());
    }
}
