//! Property tests for the highlight gesture recognizer.
//!
//! 1. A second touch inside the promotion window yields a two-touch intent
//!    and the promotion never fires afterwards.
//! 2. A lone touch that stays within the movement threshold is promoted
//!    exactly once, no earlier than the promotion delay.
//! 3. A lone touch moving past the threshold before promotion fails the
//!    gesture, and no touch intent is ever reported.
//! 4. Lifting one of two touches demotes to the survivor; lifting both
//!    resolves with no touch.
//! 5. `reset()` returns to idle from any event sequence.

use std::time::{Duration, Instant};

use gradient_liveplot::{
    GestureIntent, GesturePhase, HighlightGestureRecognizer, RecognizerState, Touch, TouchEvent,
    TouchId,
};
use proptest::prelude::*;

const DELAY_MS: u64 = 100;

fn at(start: Instant, millis: u64) -> Instant {
    start + Duration::from_millis(millis)
}

// ── Random event sequences ──────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Began(Vec<Touch>),
    Moved(Touch),
    Ended(Touch),
    Cancelled(Touch),
    Poll,
}

fn touch_strategy() -> impl Strategy<Value = Touch> {
    (0u64..4, 0f32..200.0, 0f32..200.0).prop_map(|(id, x, y)| Touch::new(id, x, y))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::collection::vec(touch_strategy(), 1..4).prop_map(Op::Began),
        touch_strategy().prop_map(Op::Moved),
        touch_strategy().prop_map(Op::Ended),
        touch_strategy().prop_map(Op::Cancelled),
        Just(Op::Poll),
    ]
}

fn apply(rec: &mut HighlightGestureRecognizer, op: Op, now: Instant) {
    match op {
        Op::Began(touches) => {
            rec.process(&TouchEvent::Began(touches), now);
        }
        Op::Moved(touch) => {
            rec.process(&TouchEvent::Moved(vec![touch]), now);
        }
        Op::Ended(touch) => {
            rec.process(&TouchEvent::Ended(vec![touch]), now);
        }
        Op::Cancelled(touch) => {
            rec.process(&TouchEvent::Cancelled(vec![touch]), now);
        }
        Op::Poll => {
            rec.poll(now);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Second touch inside the window
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn second_touch_in_window_is_two_touches(
        second_at in 0u64..DELAY_MS,
        polls in prop::collection::vec(0u64..1_000, 0..8),
    ) {
        let start = Instant::now();
        let mut rec = HighlightGestureRecognizer::default();
        rec.process(&TouchEvent::Began(vec![Touch::new(1, 10.0, 10.0)]), start);
        let token = rec.pending_promotion().expect("promotion scheduled");

        let updates = rec.process(
            &TouchEvent::Began(vec![Touch::new(2, 60.0, 10.0)]),
            at(start, second_at),
        );
        prop_assert_eq!(updates.len(), 1);
        prop_assert_eq!(updates[0].intent, GestureIntent::TwoTouches(TouchId(1), TouchId(2)));
        prop_assert!(rec.pending_promotion().is_none());

        for offset in polls {
            prop_assert_eq!(rec.poll(at(start, second_at + offset)), None);
        }
        prop_assert_eq!(rec.fire(token), None);
        prop_assert_eq!(rec.intent(), GestureIntent::TwoTouches(TouchId(1), TouchId(2)));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Single touch promotion
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn lone_touch_promotes_exactly_once(
        steps in prop::collection::vec((-3.0f32..3.0, -3.0f32..3.0, 0u64..40), 1..12),
    ) {
        let start = Instant::now();
        let mut rec = HighlightGestureRecognizer::default();
        rec.process(&TouchEvent::Began(vec![Touch::new(7, 100.0, 100.0)]), start);

        let mut elapsed = 0;
        let mut promotions = Vec::new();
        for (dx, dy, wait) in steps {
            elapsed += wait;
            let event = TouchEvent::Moved(vec![Touch::new(7, 100.0 + dx, 100.0 + dy)]);
            for update in rec.process(&event, at(start, elapsed)) {
                prop_assert_ne!(update.state, RecognizerState::Failed);
                if update.state == RecognizerState::Began {
                    promotions.push(elapsed);
                }
            }
        }

        if elapsed >= DELAY_MS {
            prop_assert_eq!(promotions.len(), 1);
            prop_assert!(promotions[0] >= DELAY_MS);
            prop_assert_eq!(rec.intent(), GestureIntent::OneTouch(TouchId(7)));
        } else {
            prop_assert!(promotions.is_empty());
            prop_assert_eq!(rec.phase(), GesturePhase::ArmedPending);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Movement failure
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn large_move_fails_without_intent(
        radius in 5.01f32..60.0,
        angle in 0.0f32..std::f32::consts::TAU,
        move_at in 0u64..DELAY_MS,
        later in prop::collection::vec(op_strategy(), 0..10),
    ) {
        let start = Instant::now();
        let mut rec = HighlightGestureRecognizer::default();
        let mut updates = rec.process(&TouchEvent::Began(vec![Touch::new(9, 100.0, 100.0)]), start);

        let moved = Touch::new(9, 100.0 + radius * angle.cos(), 100.0 + radius * angle.sin());
        updates.extend(rec.process(&TouchEvent::Moved(vec![moved]), at(start, move_at)));
        prop_assert_eq!(rec.state(), RecognizerState::Failed);

        for (index, op) in later.into_iter().enumerate() {
            apply(&mut rec, op, at(start, move_at + 50 * index as u64));
        }
        prop_assert_eq!(rec.state(), RecognizerState::Failed);
        prop_assert!(updates.iter().all(|update| update.intent == GestureIntent::NoTouch));
        prop_assert_eq!(rec.intent(), GestureIntent::NoTouch);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Demotion
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn lifting_touches_demotes_then_resolves(
        first in 0u64..1_000,
        offset in 1u64..1_000,
        lift_first in any::<bool>(),
        cancel in any::<bool>(),
    ) {
        let second = first + offset;
        let start = Instant::now();
        let mut rec = HighlightGestureRecognizer::default();
        rec.process(
            &TouchEvent::Began(vec![Touch::new(first, 0.0, 0.0), Touch::new(second, 50.0, 0.0)]),
            start,
        );
        prop_assert_eq!(rec.intent(), GestureIntent::TwoTouches(TouchId(first), TouchId(second)));

        let (lifted, survivor) = if lift_first { (first, second) } else { (second, first) };
        let lift = |id: u64| {
            let touches = vec![Touch::new(id, 0.0, 0.0)];
            if cancel { TouchEvent::Cancelled(touches) } else { TouchEvent::Ended(touches) }
        };

        let updates = rec.process(&lift(lifted), at(start, 10));
        prop_assert_eq!(updates.len(), 1);
        prop_assert_eq!(updates[0].state, RecognizerState::Changed);
        prop_assert_eq!(updates[0].intent, GestureIntent::OneTouch(TouchId(survivor)));

        let updates = rec.process(&lift(survivor), at(start, 20));
        let terminal = if cancel { RecognizerState::Cancelled } else { RecognizerState::Ended };
        prop_assert_eq!(updates.len(), 1);
        prop_assert_eq!(updates[0].state, terminal);
        prop_assert_eq!(updates[0].intent, GestureIntent::NoTouch);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Reset and general invariants
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reset_always_returns_to_idle(ops in prop::collection::vec(op_strategy(), 0..24)) {
        let start = Instant::now();
        let mut rec = HighlightGestureRecognizer::default();
        for (index, op) in ops.into_iter().enumerate() {
            apply(&mut rec, op, at(start, 30 * index as u64));
            if let GestureIntent::TwoTouches(a, b) = rec.intent() {
                prop_assert_ne!(a, b);
            }
        }
        rec.reset();
        prop_assert_eq!(rec.phase(), GesturePhase::Idle);
        prop_assert_eq!(rec.state(), RecognizerState::Possible);
        prop_assert_eq!(rec.intent(), GestureIntent::NoTouch);
        prop_assert!(rec.pending_promotion().is_none());
        prop_assert_eq!(rec.poll(at(start, 10_000)), None);
    }
}
