use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, PoisonError};

/// The position counter shared by the input and render loops.
///
/// Writers serialize on `write_lock` for the whole read-modify-write, so a
/// delta and a reset never interleave. Readers take a lock-free snapshot of
/// the atomic, which can only ever hold a completed write.
#[derive(Debug)]
pub struct SharedPosition {
    counter: AtomicI32,
    write_lock: Mutex<()>,
    min: i32,
    max: i32,
}

impl SharedPosition {
    /// Counter in `[-steps, steps]`, starting at 0.
    pub fn new(steps: i32) -> Self {
        let steps = steps.max(0);
        Self::with_bounds(-steps, steps)
    }

    pub fn with_bounds(min: i32, max: i32) -> Self {
        debug_assert!(min <= 0 && 0 <= max);
        Self {
            counter: AtomicI32::new(0),
            write_lock: Mutex::new(()),
            min,
            max,
        }
    }

    pub fn bounds(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    /// Adds `delta` and clamps to the bounds. Returns the new value.
    pub fn apply_delta(&self, delta: i32) -> i32 {
        // The guarded data is (), so a poisoned lock carries no broken state.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let current = self.counter.load(Ordering::Relaxed);
        let next = current.saturating_add(delta).clamp(self.min, self.max);
        self.counter.store(next, Ordering::Release);
        next
    }

    pub fn reset(&self) {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.counter.store(0, Ordering::Release);
    }

    pub fn read(&self) -> i32 {
        self.counter.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_at_zero() {
        let position = SharedPosition::new(30);
        assert_eq!(position.read(), 0);
        assert_eq!(position.bounds(), (-30, 30));
    }

    #[test]
    fn clamps_at_the_upper_bound() {
        let position = SharedPosition::new(30);
        for _ in 0..29 {
            position.apply_delta(1);
        }
        assert_eq!(position.read(), 29);
        assert_eq!(position.apply_delta(1), 30);
        assert_eq!(position.apply_delta(1), 30);
        assert_eq!(position.read(), 30);
    }

    #[test]
    fn clamps_at_the_lower_bound() {
        let position = SharedPosition::new(3);
        assert_eq!(position.apply_delta(-10), -3);
        assert_eq!(position.apply_delta(-1), -3);
        assert_eq!(position.apply_delta(1), -2);
    }

    #[test]
    fn huge_deltas_do_not_overflow() {
        let position = SharedPosition::new(30);
        assert_eq!(position.apply_delta(i32::MAX), 30);
        assert_eq!(position.apply_delta(i32::MIN), -30);
    }

    #[test]
    fn reset_returns_to_zero() {
        let position = SharedPosition::new(30);
        position.apply_delta(-17);
        position.reset();
        assert_eq!(position.read(), 0);
    }

    proptest! {
        #[test]
        fn counter_never_leaves_its_bounds(
            steps in 1i32..=120,
            deltas in proptest::collection::vec(-3i32..=3, 0..400),
        ) {
            let position = SharedPosition::new(steps);
            for delta in deltas {
                let value = position.apply_delta(delta);
                prop_assert!((-steps..=steps).contains(&value));
                prop_assert_eq!(value, position.read());
            }
        }

        #[test]
        fn reset_from_any_reachable_value(
            steps in 1i32..=120,
            deltas in proptest::collection::vec(-5i32..=5, 0..200),
        ) {
            let position = SharedPosition::new(steps);
            for delta in deltas {
                position.apply_delta(delta);
            }
            position.reset();
            prop_assert_eq!(position.read(), 0);
        }
    }
}
