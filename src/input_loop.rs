use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, trace};

use crate::decoder::{QuadratureDecoder, Step};
use crate::error::GaugeError;
use crate::pins::EncoderPins;
use crate::position::SharedPosition;
use crate::stop::StopSignal;

/// What a single poll did to the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub step: Step,
    pub reset: bool,
    /// Counter value after the poll.
    pub counter: i32,
}

/// Polls the encoder and feeds the shared position.
pub struct InputLoop<P> {
    pins: P,
    decoder: QuadratureDecoder,
    position: Arc<SharedPosition>,
    interval: Duration,
    button_held: bool,
}

impl<P: EncoderPins> InputLoop<P> {
    /// Takes one sample to seed the decoder with the current clock level.
    pub fn new(
        mut pins: P,
        position: Arc<SharedPosition>,
        interval: Duration,
    ) -> Result<Self, GaugeError> {
        let initial = pins.sample()?;
        Ok(Self {
            pins,
            decoder: QuadratureDecoder::new(initial.clock),
            position,
            interval,
            button_held: false,
        })
    }

    /// One iteration: sample, decode, apply the step, then the reset.
    ///
    /// A reset seen in the same sample as a step is applied after it.
    pub fn poll_once(&mut self) -> Result<PollOutcome, GaugeError> {
        let sample = self.pins.sample()?;

        let step = self.decoder.step(sample.clock, sample.data);
        let mut counter = if step == Step::Idle {
            self.position.read()
        } else {
            let counter = self.position.apply_delta(step.delta());
            trace!(?step, counter, "encoder step");
            counter
        };

        let reset = sample.button_pressed();
        if reset {
            self.position.reset();
            counter = 0;
            if !self.button_held {
                info!("button pressed, rudder position reset");
            }
        }
        self.button_held = reset;

        Ok(PollOutcome {
            step,
            reset,
            counter,
        })
    }

    /// Polls until `stop` is raised. Returns the number of polls.
    ///
    /// A failed pin read ends the loop with that error.
    pub fn run(&mut self, stop: &StopSignal) -> Result<u64, GaugeError> {
        debug!(interval = ?self.interval, "input loop started");
        let mut iterations = 0u64;
        while !stop.is_stopped() {
            self.poll_once()?;
            iterations += 1;
            thread::sleep(self.interval);
        }
        debug!(iterations, "input loop stopped");
        Ok(iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::{PinSample, SimulatedEncoder};

    fn input(encoder: &SimulatedEncoder, steps: i32) -> InputLoop<SimulatedEncoder> {
        InputLoop::new(
            encoder.clone(),
            Arc::new(SharedPosition::new(steps)),
            Duration::from_millis(1),
        )
        .unwrap()
    }

    #[test]
    fn idle_lines_leave_the_counter_alone() {
        let encoder = SimulatedEncoder::new();
        let mut input = input(&encoder, 30);
        let outcome = input.poll_once().unwrap();
        assert_eq!(outcome.step, Step::Idle);
        assert!(!outcome.reset);
        assert_eq!(outcome.counter, 0);
    }

    #[test]
    fn each_edge_moves_one_step() {
        let encoder = SimulatedEncoder::new();
        let mut input = input(&encoder, 30);
        encoder.rotate_clockwise();
        assert_eq!(input.poll_once().unwrap().counter, 1);
        // The same level again is not an edge.
        assert_eq!(input.poll_once().unwrap().counter, 1);
        encoder.rotate_counter_clockwise();
        encoder.rotate_counter_clockwise();
        // Two toggles between polls leave the clock where it was.
        assert_eq!(input.poll_once().unwrap().step, Step::Idle);
        encoder.rotate_counter_clockwise();
        assert_eq!(input.poll_once().unwrap().counter, 0);
    }

    #[test]
    fn steps_clamp_at_the_bound() {
        let encoder = SimulatedEncoder::new();
        let mut input = input(&encoder, 2);
        for _ in 0..5 {
            encoder.rotate_clockwise();
            input.poll_once().unwrap();
        }
        assert_eq!(input.position.read(), 2);
    }

    #[test]
    fn reset_wins_over_a_step_in_the_same_poll() {
        let encoder = SimulatedEncoder::new();
        let mut input = input(&encoder, 30);
        for _ in 0..3 {
            encoder.rotate_clockwise();
            input.poll_once().unwrap();
        }
        encoder.rotate_clockwise();
        encoder.press();
        let outcome = input.poll_once().unwrap();
        assert_eq!(outcome.step, Step::Increment);
        assert!(outcome.reset);
        assert_eq!(outcome.counter, 0);
        assert_eq!(input.position.read(), 0);
    }

    #[test]
    fn held_button_keeps_resetting() {
        let encoder = SimulatedEncoder::new();
        let mut input = input(&encoder, 30);
        encoder.press();
        input.poll_once().unwrap();
        encoder.rotate_clockwise();
        let outcome = input.poll_once().unwrap();
        assert_eq!(outcome.step, Step::Increment);
        assert_eq!(outcome.counter, 0);
    }

    struct FailingPins {
        reads_left: usize,
    }

    impl EncoderPins for FailingPins {
        fn sample(&mut self) -> Result<PinSample, GaugeError> {
            if self.reads_left == 0 {
                return Err(GaugeError::PinRead {
                    pin: 17,
                    reason: "line went away".to_string(),
                });
            }
            self.reads_left -= 1;
            Ok(PinSample {
                clock: false,
                data: false,
                button: true,
            })
        }
    }

    #[test]
    fn pin_failure_is_fatal() {
        let mut input = InputLoop::new(
            FailingPins { reads_left: 3 },
            Arc::new(SharedPosition::new(30)),
            Duration::from_millis(1),
        )
        .unwrap();
        let err = input.run(&StopSignal::new()).unwrap_err();
        assert!(matches!(err, GaugeError::PinRead { pin: 17, .. }));
    }

    #[test]
    fn initial_sample_failure_is_reported() {
        let result = InputLoop::new(
            FailingPins { reads_left: 0 },
            Arc::new(SharedPosition::new(30)),
            Duration::from_millis(1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn run_returns_once_stopped() {
        let encoder = SimulatedEncoder::new();
        let mut input = input(&encoder, 30);
        let stop = StopSignal::new();
        stop.stop();
        assert_eq!(input.run(&stop).unwrap(), 0);
    }
}
