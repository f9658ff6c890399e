//! Deferred reclamation of one-shot voices.
//!
//! Each pending entry counts down like a time-to-live:
//! `remaining -= dt` every frame, firing once `remaining <= 0`. Entries
//! carry a [`ReclaimTicket`] so the player can reject tickets whose voice has
//! been reclaimed and reused since scheduling.

use super::voice::VoiceId;

/// Identifies the activation a timed reclamation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReclaimTicket {
    pub voice: VoiceId,
    pub generation: u32,
}

#[derive(Debug, Clone)]
struct PendingReclaim {
    ticket: ReclaimTicket,
    remaining: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ReclaimSchedule {
    pending: Vec<PendingReclaim>,
}

impl ReclaimSchedule {
    /// Schedule `ticket` to fire after `delay` seconds. A voice has at most
    /// one pending entry; scheduling again replaces the old one.
    pub fn schedule(&mut self, ticket: ReclaimTicket, delay: f32) {
        self.cancel(ticket.voice);
        self.pending.push(PendingReclaim {
            ticket,
            remaining: delay.max(0.0),
        });
    }

    /// Drop the pending entry of `voice`. Returns whether one existed.
    pub fn cancel(&mut self, voice: VoiceId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.ticket.voice != voice);
        before != self.pending.len()
    }

    /// Advance every entry by `dt` and return the tickets that came due,
    /// earliest first.
    pub fn advance(&mut self, dt: f32) -> Vec<ReclaimTicket> {
        let mut due: Vec<(f32, ReclaimTicket)> = Vec::new();
        self.pending.retain_mut(|p| {
            p.remaining -= dt;
            if p.remaining <= 0.0 {
                due.push((p.remaining, p.ticket));
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        due.into_iter().map(|(_, t)| t).collect()
    }

    pub fn is_pending(&self, voice: VoiceId) -> bool {
        self.pending.iter().any(|p| p.ticket.voice == voice)
    }

    /// Seconds left before `voice` is reclaimed.
    pub fn remaining(&self, voice: VoiceId) -> Option<f32> {
        self.pending
            .iter()
            .find(|p| p.ticket.voice == voice)
            .map(|p| p.remaining)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(v: u32, g: u32) -> ReclaimTicket {
        ReclaimTicket {
            voice: VoiceId(v),
            generation: g,
        }
    }

    #[test]
    fn fires_once_after_the_delay() {
        let mut schedule = ReclaimSchedule::default();
        schedule.schedule(ticket(0, 1), 1.0);

        assert!(schedule.advance(0.5).is_empty());
        assert!(schedule.advance(0.25).is_empty());
        assert_eq!(schedule.advance(0.25), vec![ticket(0, 1)]);
        assert!(schedule.advance(10.0).is_empty());
    }

    #[test]
    fn cancelled_entries_never_fire() {
        let mut schedule = ReclaimSchedule::default();
        schedule.schedule(ticket(0, 1), 0.5);
        assert!(schedule.cancel(VoiceId(0)));
        assert!(!schedule.cancel(VoiceId(0)));
        assert!(schedule.advance(1.0).is_empty());
    }

    #[test]
    fn due_tickets_come_out_earliest_first() {
        let mut schedule = ReclaimSchedule::default();
        schedule.schedule(ticket(0, 1), 0.9);
        schedule.schedule(ticket(1, 1), 0.1);
        schedule.schedule(ticket(2, 1), 0.5);
        let due = schedule.advance(1.0);
        assert_eq!(due, vec![ticket(1, 1), ticket(2, 1), ticket(0, 1)]);
    }

    #[test]
    fn rescheduling_replaces_the_previous_entry() {
        let mut schedule = ReclaimSchedule::default();
        schedule.schedule(ticket(0, 1), 0.2);
        schedule.schedule(ticket(0, 2), 2.0);
        assert_eq!(schedule.len(), 1);
        assert!(schedule.advance(0.5).is_empty());
        assert_eq!(schedule.remaining(VoiceId(0)), Some(1.5));
    }
}
