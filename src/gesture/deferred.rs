//! Cancellable deferred task keyed by a generation counter.

use std::time::{Duration, Instant};

/// Handle to one scheduling of the single-touch promotion.
///
/// A token only fires if it is still the current schedule; cancelling or
/// rescheduling bumps the generation, so stale tokens are inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionToken {
    generation: u64,
    deadline: Instant,
}

impl PromotionToken {
    /// When the promotion becomes due.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

#[derive(Debug, Default)]
pub(crate) struct DeferredTask {
    generation: u64,
    scheduled: Option<PromotionToken>,
}

impl DeferredTask {
    pub(crate) fn schedule(&mut self, now: Instant, delay: Duration) -> PromotionToken {
        self.generation = self.generation.wrapping_add(1);
        let token = PromotionToken {
            generation: self.generation,
            deadline: now + delay,
        };
        self.scheduled = Some(token);
        token
    }

    /// Returns true if a live schedule was cancelled.
    pub(crate) fn cancel(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        self.scheduled.take().is_some()
    }

    pub(crate) fn scheduled(&self) -> Option<PromotionToken> {
        self.scheduled
    }

    /// Consume the schedule if `token` is the current one.
    pub(crate) fn take_if_current(&mut self, token: PromotionToken) -> bool {
        if self.scheduled == Some(token) {
            self.scheduled = None;
            true
        } else {
            false
        }
    }

    /// Consume the schedule if its deadline has passed.
    pub(crate) fn take_due(&mut self, now: Instant) -> Option<PromotionToken> {
        match self.scheduled {
            Some(token) if now >= token.deadline => self.scheduled.take(),
            _ => None,
        }
    }
}
