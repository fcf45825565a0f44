//! Multi-touch highlight gesture recognition.
//!
//! [`HighlightGestureRecognizer`] classifies raw touch lifecycle events into a
//! [`GestureIntent`]: no touch, one touch, or two touches.
//!
//! # State Machine
//!
//! A lone touch is held as *pending* while a promotion is scheduled
//! [`GestureConfig::promotion_delay`] in the future. If a second touch lands
//! first, the promotion is cancelled and both touches become the intent. If
//! the pending touch travels further than
//! [`GestureConfig::move_fail_threshold`] before promotion, the gesture fails.
//! Otherwise the promotion fires and the touch becomes a one-touch intent.
//!
//! # Invariants
//!
//! 1. At most two touches take part in a gesture. Later touches are ignored
//!    while they stay down, never cancelling. Once lifted, their ids may
//!    be reused by new touches.
//! 2. A promotion token from a cancelled or superseded schedule never fires.
//! 3. Once resolved (ended, cancelled or failed), events are dropped until
//!    `reset`.
//! 4. After `reset()`, the recognizer is idle with no pending touch and no
//!    live promotion.
//!
//! # Timers
//!
//! The recognizer owns no clock. Hosts either call
//! [`poll`](HighlightGestureRecognizer::poll) from their event loop or keep the
//! token from [`pending_promotion`](HighlightGestureRecognizer::pending_promotion)
//! and call [`fire`](HighlightGestureRecognizer::fire) when their timer elapses.

mod deferred;

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::geom::ScreenPoint;

use deferred::DeferredTask;
pub use deferred::PromotionToken;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Identity of a touch for the duration of its contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TouchId(pub u64);

/// A touch and its current location in chart pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub id: TouchId,
    pub location: ScreenPoint,
}

impl Touch {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id: TouchId(id),
            location: ScreenPoint::new(x, y),
        }
    }
}

/// Raw touch lifecycle event. Each variant carries the touches that changed.
#[derive(Debug, Clone, PartialEq)]
pub enum TouchEvent {
    Began(Vec<Touch>),
    Moved(Vec<Touch>),
    Ended(Vec<Touch>),
    Cancelled(Vec<Touch>),
}

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Which touches currently drive the highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureIntent {
    #[default]
    NoTouch,
    OneTouch(TouchId),
    TwoTouches(TouchId, TouchId),
}

impl GestureIntent {
    /// Touch identities taking part in the intent.
    pub fn touches(&self) -> Vec<TouchId> {
        match *self {
            GestureIntent::NoTouch => Vec::new(),
            GestureIntent::OneTouch(id) => vec![id],
            GestureIntent::TwoTouches(a, b) => vec![a, b],
        }
    }

    fn contains(&self, id: TouchId) -> bool {
        match *self {
            GestureIntent::NoTouch => false,
            GestureIntent::OneTouch(one) => one == id,
            GestureIntent::TwoTouches(a, b) => a == id || b == id,
        }
    }
}

/// Recognizer lifecycle state reported to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognizerState {
    #[default]
    Possible,
    Began,
    Changed,
    Ended,
    Cancelled,
    Failed,
}

impl RecognizerState {
    /// Ended, cancelled or failed.
    pub fn is_resolved(self) -> bool {
        matches!(
            self,
            RecognizerState::Ended | RecognizerState::Cancelled | RecognizerState::Failed
        )
    }

    fn next_active(self) -> Self {
        match self {
            RecognizerState::Began | RecognizerState::Changed => RecognizerState::Changed,
            _ => RecognizerState::Began,
        }
    }
}

/// How a gesture finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Ended,
    Cancelled,
    Failed,
}

/// Condensed view of the recognizer combining state, intent and pending touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    ArmedPending,
    OneActive,
    TwoActive,
    Resolved(Resolution),
}

/// State change produced by the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureUpdate {
    pub state: RecognizerState,
    pub intent: GestureIntent,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing and distance thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Delay before a lone touch becomes a one-touch intent (default: 100ms).
    pub promotion_delay: Duration,
    /// Distance in pixels a pending touch may travel before the gesture
    /// fails (default: 5.0).
    pub move_fail_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            promotion_delay: Duration::from_millis(100),
            move_fail_threshold: 5.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Recognizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct PendingTouch {
    id: TouchId,
    initial: ScreenPoint,
}

/// Touch state machine resolving one- and two-finger highlight gestures.
///
/// Feed events with [`process`](Self::process) or the per-phase
/// `touches_*` methods.
#[derive(Debug, Default)]
pub struct HighlightGestureRecognizer {
    config: GestureConfig,
    state: RecognizerState,
    intent: GestureIntent,
    pending: Option<PendingTouch>,
    promotion: DeferredTask,
    locations: HashMap<TouchId, ScreenPoint>,
    ignored: HashSet<TouchId>,
}

impl HighlightGestureRecognizer {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Apply a due promotion, then the event.
    ///
    /// Updates are returned in the order they happened.
    pub fn process(&mut self, event: &TouchEvent, now: Instant) -> Vec<GestureUpdate> {
        let mut updates = Vec::with_capacity(2);
        updates.extend(self.poll(now));
        let update = match event {
            TouchEvent::Began(touches) => self.touches_began(touches, now),
            TouchEvent::Moved(touches) => self.touches_moved(touches),
            TouchEvent::Ended(touches) => self.touches_ended(touches),
            TouchEvent::Cancelled(touches) => self.touches_cancelled(touches),
        };
        updates.extend(update);
        updates
    }

    pub fn touches_began(&mut self, touches: &[Touch], now: Instant) -> Option<GestureUpdate> {
        if self.state.is_resolved() {
            tracing::trace!(state = ?self.state, "dropping touch-begin after resolution");
            return None;
        }
        let mut fresh: Vec<Touch> = Vec::with_capacity(touches.len());
        for touch in touches {
            if !self.is_known(touch.id) && !fresh.iter().any(|seen| seen.id == touch.id) {
                fresh.push(*touch);
            }
        }
        let (first, rest) = fresh.split_first()?;

        // A pending touch counts as one touch even before promotion.
        let effective = match (self.intent, self.pending) {
            (GestureIntent::NoTouch, Some(pending)) => GestureIntent::OneTouch(pending.id),
            (intent, _) => intent,
        };

        match effective {
            GestureIntent::NoTouch => {
                self.track(first);
                match rest.split_first() {
                    None => {
                        self.pending = Some(PendingTouch {
                            id: first.id,
                            initial: first.location,
                        });
                        let token = self.promotion.schedule(now, self.config.promotion_delay);
                        tracing::trace!(touch = first.id.0, deadline = ?token.deadline(), "promotion scheduled");
                        None
                    }
                    Some((second, extra)) => {
                        self.track(second);
                        self.ignore(extra);
                        Some(self.transition(
                            self.state.next_active(),
                            GestureIntent::TwoTouches(first.id, second.id),
                        ))
                    }
                }
            }
            GestureIntent::OneTouch(existing) => {
                if self.promotion.cancel() {
                    tracing::trace!("promotion cancelled by second touch");
                }
                self.pending = None;
                self.track(first);
                self.ignore(rest);
                Some(self.transition(
                    self.state.next_active(),
                    GestureIntent::TwoTouches(existing, first.id),
                ))
            }
            GestureIntent::TwoTouches(..) => {
                self.ignore(&fresh);
                Some(self.transition(self.state.next_active(), self.intent))
            }
        }
    }

    pub fn touches_moved(&mut self, touches: &[Touch]) -> Option<GestureUpdate> {
        if self.state.is_resolved() {
            return None;
        }
        let mut moved_active = false;
        for touch in touches {
            if self.ignored.contains(&touch.id) {
                continue;
            }
            let Some(location) = self.locations.get_mut(&touch.id) else {
                continue;
            };
            *location = touch.location;
            moved_active |= self.intent.contains(touch.id);

            if let Some(pending) = self.pending
                && self.state == RecognizerState::Possible
                && pending.id == touch.id
                && pending.initial.distance(touch.location) > self.config.move_fail_threshold
            {
                self.pending = None;
                self.promotion.cancel();
                self.locations.remove(&touch.id);
                return Some(self.transition(RecognizerState::Failed, GestureIntent::NoTouch));
            }
        }

        if moved_active && matches!(self.state, RecognizerState::Began | RecognizerState::Changed) {
            self.state = RecognizerState::Changed;
            return Some(self.update());
        }
        None
    }

    pub fn touches_ended(&mut self, touches: &[Touch]) -> Option<GestureUpdate> {
        self.finish(touches, RecognizerState::Ended)
    }

    pub fn touches_cancelled(&mut self, touches: &[Touch]) -> Option<GestureUpdate> {
        self.finish(touches, RecognizerState::Cancelled)
    }

    /// Promote the pending touch if its promotion is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<GestureUpdate> {
        let token = self.promotion.take_due(now)?;
        tracing::trace!(deadline = ?token.deadline(), "promotion due");
        self.promote()
    }

    /// Promote the pending touch if `token` is still the live schedule.
    pub fn fire(&mut self, token: PromotionToken) -> Option<GestureUpdate> {
        if !self.promotion.take_if_current(token) {
            tracing::trace!("stale promotion token");
            return None;
        }
        self.promote()
    }

    /// Token of the live promotion schedule, if any.
    pub fn pending_promotion(&self) -> Option<PromotionToken> {
        self.promotion.scheduled()
    }

    /// Return to idle: no pending touch, no ignored touches, no live timer.
    pub fn reset(&mut self) {
        self.promotion.cancel();
        self.state = RecognizerState::Possible;
        self.intent = GestureIntent::NoTouch;
        self.pending = None;
        self.locations.clear();
        self.ignored.clear();
    }

    pub fn state(&self) -> RecognizerState {
        self.state
    }

    pub fn intent(&self) -> GestureIntent {
        self.intent
    }

    pub fn phase(&self) -> GesturePhase {
        match self.state {
            RecognizerState::Ended => GesturePhase::Resolved(Resolution::Ended),
            RecognizerState::Cancelled => GesturePhase::Resolved(Resolution::Cancelled),
            RecognizerState::Failed => GesturePhase::Resolved(Resolution::Failed),
            _ if self.pending.is_some() => GesturePhase::ArmedPending,
            _ => match self.intent {
                GestureIntent::NoTouch => GesturePhase::Idle,
                GestureIntent::OneTouch(_) => GesturePhase::OneActive,
                GestureIntent::TwoTouches(..) => GesturePhase::TwoActive,
            },
        }
    }

    /// Latest location of a tracked touch.
    pub fn location(&self, id: TouchId) -> Option<ScreenPoint> {
        self.locations.get(&id).copied()
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Replace the configuration. A live promotion keeps its deadline.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn finish(&mut self, touches: &[Touch], terminal: RecognizerState) -> Option<GestureUpdate> {
        if self.state.is_resolved() {
            return None;
        }
        let mut lifted: Vec<TouchId> = Vec::with_capacity(touches.len());
        for touch in touches {
            if self.ignored.remove(&touch.id) {
                tracing::trace!(touch = touch.id.0, "ignored touch lifted");
            } else {
                lifted.push(touch.id);
            }
        }
        let is_lifted = |id: TouchId| lifted.contains(&id);

        match self.intent {
            GestureIntent::NoTouch => {
                let pending = self.pending.filter(|pending| is_lifted(pending.id))?;
                self.pending = None;
                self.promotion.cancel();
                self.locations.remove(&pending.id);
                tracing::trace!(touch = pending.id.0, "pending touch lifted before promotion");
                None
            }
            GestureIntent::OneTouch(id) if is_lifted(id) => {
                self.locations.remove(&id);
                Some(self.transition(terminal, GestureIntent::NoTouch))
            }
            GestureIntent::OneTouch(_) => None,
            GestureIntent::TwoTouches(a, b) => match (is_lifted(a), is_lifted(b)) {
                (true, true) => {
                    self.locations.remove(&a);
                    self.locations.remove(&b);
                    Some(self.transition(terminal, GestureIntent::NoTouch))
                }
                (true, false) => {
                    self.locations.remove(&a);
                    Some(self.transition(RecognizerState::Changed, GestureIntent::OneTouch(b)))
                }
                (false, true) => {
                    self.locations.remove(&b);
                    Some(self.transition(RecognizerState::Changed, GestureIntent::OneTouch(a)))
                }
                (false, false) => None,
            },
        }
    }

    fn promote(&mut self) -> Option<GestureUpdate> {
        if self.state != RecognizerState::Possible {
            return None;
        }
        let pending = self.pending.take()?;
        Some(self.transition(RecognizerState::Began, GestureIntent::OneTouch(pending.id)))
    }

    fn transition(&mut self, state: RecognizerState, intent: GestureIntent) -> GestureUpdate {
        tracing::debug!(from = ?self.state, to = ?state, ?intent, "gesture transition");
        self.state = state;
        self.intent = intent;
        self.update()
    }

    fn update(&self) -> GestureUpdate {
        GestureUpdate {
            state: self.state,
            intent: self.intent,
        }
    }

    fn is_known(&self, id: TouchId) -> bool {
        self.locations.contains_key(&id) || self.ignored.contains(&id)
    }

    fn track(&mut self, touch: &Touch) {
        self.locations.insert(touch.id, touch.location);
    }

    fn ignore(&mut self, touches: &[Touch]) {
        for touch in touches {
            tracing::trace!(touch = touch.id.0, "ignoring extra touch");
            self.ignored.insert(touch.id);
        }
    }
}
