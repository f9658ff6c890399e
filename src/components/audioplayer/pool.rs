//! Bounded pool of voice ids.
//!
//! The pool only does accounting: which ids are idle and how many are alive.
//! Voice state itself lives in the owning [`AudioPlayer`](super::AudioPlayer).
//!
//! # Capacity policy
//!
//! - Voices are created lazily. `default_capacity` only reserves idle storage.
//! - Live voices (idle + active) never exceed `max_size`. Acquiring at the cap
//!   with no idle voice fails and the caller gets `None`.
//! - Releasing into a full idle set, or while live voices exceed `max_size`
//!   after [`VoicePool::set_max_size`] shrank it, destroys the voice instead.

use super::voice::VoiceId;

pub const DEFAULT_CAPACITY: usize = 10;
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Result of a successful [`VoicePool::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquired {
    /// An idle voice was handed out again.
    Reused(VoiceId),
    /// A brand new voice was created; the host must be told about it.
    Created(VoiceId),
}

impl Acquired {
    pub fn id(self) -> VoiceId {
        match self {
            Acquired::Reused(id) | Acquired::Created(id) => id,
        }
    }
}

/// What happened to a voice handed back with [`VoicePool::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    Retained,
    Evicted,
}

#[derive(Debug, Clone)]
pub struct VoicePool {
    idle: Vec<VoiceId>,
    count_all: usize,
    default_capacity: usize,
    max_size: usize,
    next_id: u32,
}

impl Default for VoicePool {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_MAX_SIZE)
    }
}

impl VoicePool {
    /// Create an empty pool. `max_size` is raised to at least 1.
    pub fn new(default_capacity: usize, max_size: usize) -> Self {
        let max_size = max_size.max(1);
        let default_capacity = default_capacity.min(max_size);
        VoicePool {
            idle: Vec::with_capacity(default_capacity),
            count_all: 0,
            default_capacity,
            max_size,
            next_id: 0,
        }
    }

    /// Take an idle voice or create one while below the cap.
    pub fn acquire(&mut self) -> Option<Acquired> {
        if let Some(id) = self.idle.pop() {
            return Some(Acquired::Reused(id));
        }
        if self.count_all >= self.max_size {
            return None;
        }
        let id = VoiceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.count_all += 1;
        Some(Acquired::Created(id))
    }

    /// Hand a voice back. The caller guarantees `id` came from this pool and
    /// is not already idle.
    pub fn release(&mut self, id: VoiceId) -> Released {
        if self.idle.len() >= self.max_size || self.count_all > self.max_size {
            self.count_all = self.count_all.saturating_sub(1);
            return Released::Evicted;
        }
        self.idle.push(id);
        Released::Retained
    }

    /// Remove every idle voice from the pool, forgetting them.
    pub fn drain_idle(&mut self) -> Vec<VoiceId> {
        let drained: Vec<VoiceId> = self.idle.drain(..).collect();
        self.count_all = self.count_all.saturating_sub(drained.len());
        drained
    }

    /// Change the cap. Idle voices above the new cap are returned so the
    /// caller can destroy them; active voices above it are evicted on release.
    pub fn set_max_size(&mut self, max_size: usize) -> Vec<VoiceId> {
        self.max_size = max_size.max(1);
        self.default_capacity = self.default_capacity.min(self.max_size);
        let mut evicted = Vec::new();
        while self.count_all > self.max_size {
            let Some(id) = self.idle.pop() else {
                break;
            };
            self.count_all -= 1;
            evicted.push(id);
        }
        evicted
    }

    /// Change how much idle storage is reserved. Never creates voices.
    pub fn set_default_capacity(&mut self, default_capacity: usize) {
        self.default_capacity = default_capacity.min(self.max_size);
        self.idle
            .reserve(self.default_capacity.saturating_sub(self.idle.len()));
    }

    /// Live voices, idle and active.
    pub fn count_all(&self) -> usize {
        self.count_all
    }

    pub fn count_idle(&self) -> usize {
        self.idle.len()
    }

    pub fn count_active(&self) -> usize {
        self.count_all - self.idle.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_capacity(&self) -> usize {
        self.default_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_lazily_and_reuses_idle_first() {
        let mut pool = VoicePool::new(10, 100);
        assert_eq!(pool.count_all(), 0);

        let a = pool.acquire().unwrap();
        assert!(matches!(a, Acquired::Created(_)));
        assert_eq!(pool.count_all(), 1);

        assert_eq!(pool.release(a.id()), Released::Retained);
        let b = pool.acquire().unwrap();
        assert_eq!(b, Acquired::Reused(a.id()));
        assert_eq!(pool.count_all(), 1);
    }

    #[test]
    fn acquiring_n_creates_only_the_shortfall() {
        let mut pool = VoicePool::new(1, 10);
        let ids: Vec<VoiceId> = (0..3).map(|_| pool.acquire().unwrap().id()).collect();
        for id in &ids {
            pool.release(*id);
        }
        assert_eq!(pool.count_idle(), 3);

        let created = (0..5)
            .map(|_| pool.acquire().unwrap())
            .filter(|a| matches!(a, Acquired::Created(_)))
            .count();
        assert_eq!(created, 2);
        assert_eq!(pool.count_all(), 5);
    }

    #[test]
    fn fails_closed_at_the_cap() {
        let mut pool = VoicePool::new(1, 2);
        assert!(pool.acquire().is_some());
        assert!(pool.acquire().is_some());
        assert!(pool.acquire().is_none());
        assert_eq!(pool.count_all(), 2);
    }

    #[test]
    fn shrinking_evicts_idle_then_active_on_release() {
        let mut pool = VoicePool::new(4, 4);
        let ids: Vec<VoiceId> = (0..4).map(|_| pool.acquire().unwrap().id()).collect();
        pool.release(ids[0]);
        pool.release(ids[1]);

        let evicted = pool.set_max_size(1);
        assert_eq!(evicted.len(), 2);
        assert_eq!(pool.count_all(), 2);

        assert_eq!(pool.release(ids[2]), Released::Evicted);
        assert_eq!(pool.count_all(), 1);
        assert_eq!(pool.release(ids[3]), Released::Retained);
        assert_eq!(pool.count_idle(), 1);
    }

    #[test]
    fn default_capacity_is_bounded_by_max_size() {
        let mut pool = VoicePool::new(2, 4);
        pool.set_default_capacity(16);
        assert_eq!(pool.default_capacity(), 4);
        assert_eq!(pool.count_all(), 0);
    }

    #[test]
    fn drain_idle_forgets_voices() {
        let mut pool = VoicePool::default();
        let a = pool.acquire().unwrap().id();
        let _b = pool.acquire().unwrap().id();
        pool.release(a);
        assert_eq!(pool.drain_idle(), vec![a]);
        assert_eq!(pool.count_all(), 1);
        assert_eq!(pool.count_active(), 1);
    }
}
