// ============================================================================
// QUADRATURE DECODER
// ============================================================================

/// One decoded detent of the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Increment,
    Decrement,
    Idle,
}

impl Step {
    pub const fn delta(self) -> i32 {
        match self {
            Step::Increment => 1,
            Step::Decrement => -1,
            Step::Idle => 0,
        }
    }
}

/// Decodes a single sample against the previous clock level.
///
/// Only a change of the clock line produces a step. On an edge, a data level
/// that differs from the new clock level counts up, an equal one counts down.
pub fn decode(last_clock: bool, clock: bool, data: bool) -> Step {
    if clock == last_clock {
        Step::Idle
    } else if data != clock {
        Step::Increment
    } else {
        Step::Decrement
    }
}

/// Edge-triggered decoder holding the last observed clock level.
///
/// Bounds are not enforced here; see [`crate::position::SharedPosition`].
#[derive(Debug, Clone)]
pub struct QuadratureDecoder {
    last_clock: bool,
}

impl QuadratureDecoder {
    pub fn new(initial_clock: bool) -> Self {
        Self {
            last_clock: initial_clock,
        }
    }

    pub fn last_clock(&self) -> bool {
        self.last_clock
    }

    pub fn step(&mut self, clock: bool, data: bool) -> Step {
        let step = decode(self.last_clock, clock, data);
        self.last_clock = clock;
        step
    }
}
