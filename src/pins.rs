// ============================================================================
// ENCODER PINS
// ============================================================================

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::error::GaugeError;

/// Levels of the three encoder lines read in one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinSample {
    pub clock: bool,
    pub data: bool,
    pub button: bool,
}

impl PinSample {
    /// The push-button is active-low.
    pub fn button_pressed(&self) -> bool {
        !self.button
    }
}

/// Source of encoder pin samples.
pub trait EncoderPins {
    fn sample(&mut self) -> Result<PinSample, GaugeError>;
}

const CLOCK: u8 = 0b001;
const DATA: u8 = 0b010;
const BUTTON: u8 = 0b100;

/// Software encoder used by the panel simulator and tests.
///
/// All three line levels share one atomic word, so a sample never mixes an
/// old data level with a new clock level.
#[derive(Debug, Clone)]
pub struct SimulatedEncoder {
    lines: Arc<AtomicU8>,
}

impl Default for SimulatedEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedEncoder {
    /// Clock and data low, button released (high).
    pub fn new() -> Self {
        Self {
            lines: Arc::new(AtomicU8::new(BUTTON)),
        }
    }

    /// Toggles the clock with data opposite to the new clock level.
    pub fn rotate_clockwise(&self) {
        self.toggle_clock(true);
    }

    /// Toggles the clock with data equal to the new clock level.
    pub fn rotate_counter_clockwise(&self) {
        self.toggle_clock(false);
    }

    pub fn press(&self) {
        self.lines.fetch_and(!BUTTON, Ordering::AcqRel);
    }

    pub fn release(&self) {
        self.lines.fetch_or(BUTTON, Ordering::AcqRel);
    }

    pub fn levels(&self) -> PinSample {
        let bits = self.lines.load(Ordering::Acquire);
        PinSample {
            clock: bits & CLOCK != 0,
            data: bits & DATA != 0,
            button: bits & BUTTON != 0,
        }
    }

    fn toggle_clock(&self, data_differs: bool) {
        let _ = self
            .lines
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                let clock = bits & CLOCK == 0;
                let data = clock != data_differs;
                let mut next = bits & BUTTON;
                if clock {
                    next |= CLOCK;
                }
                if data {
                    next |= DATA;
                }
                Some(next)
            });
    }
}

impl EncoderPins for SimulatedEncoder {
    fn sample(&mut self) -> Result<PinSample, GaugeError> {
        Ok(self.levels())
    }
}

#[cfg(feature = "gpio")]
pub use gpio::GpioEncoder;

#[cfg(feature = "gpio")]
mod gpio {
    use rppal::gpio::{Gpio, InputPin};
    use tracing::info;

    use super::{EncoderPins, PinSample};
    use crate::config::GaugeConfig;
    use crate::error::GaugeError;

    impl From<rppal::gpio::Error> for GaugeError {
        fn from(err: rppal::gpio::Error) -> Self {
            GaugeError::Gpio(err.to_string())
        }
    }

    /// Encoder wired to the Raspberry Pi header.
    pub struct GpioEncoder {
        clock: InputPin,
        data: InputPin,
        button: InputPin,
    }

    impl GpioEncoder {
        pub fn open(config: &GaugeConfig) -> Result<Self, GaugeError> {
            let gpio = Gpio::new()?;
            let clock = gpio.get(config.clock_pin)?.into_input_pulldown();
            let data = gpio.get(config.data_pin)?.into_input_pulldown();
            let button = gpio.get(config.button_pin)?.into_input_pullup();
            info!(
                clock = config.clock_pin,
                data = config.data_pin,
                button = config.button_pin,
                "encoder pins configured"
            );
            Ok(Self {
                clock,
                data,
                button,
            })
        }
    }

    impl EncoderPins for GpioEncoder {
        fn sample(&mut self) -> Result<PinSample, GaugeError> {
            Ok(PinSample {
                clock: self.clock.is_high(),
                data: self.data.is_high(),
                button: self.button.is_high(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{decode, Step};

    #[test]
    fn starts_idle_with_button_released() {
        let encoder = SimulatedEncoder::new();
        let levels = encoder.levels();
        assert!(!levels.clock);
        assert!(!levels.data);
        assert!(!levels.button_pressed());
    }

    #[test]
    fn clockwise_turn_decodes_as_increment() {
        let encoder = SimulatedEncoder::new();
        let mut last = encoder.levels().clock;
        for _ in 0..4 {
            encoder.rotate_clockwise();
            let sample = encoder.levels();
            assert_eq!(decode(last, sample.clock, sample.data), Step::Increment);
            last = sample.clock;
        }
    }

    #[test]
    fn counter_clockwise_turn_decodes_as_decrement() {
        let encoder = SimulatedEncoder::new();
        let mut last = encoder.levels().clock;
        for _ in 0..4 {
            encoder.rotate_counter_clockwise();
            let sample = encoder.levels();
            assert_eq!(decode(last, sample.clock, sample.data), Step::Decrement);
            last = sample.clock;
        }
    }

    #[test]
    fn button_is_active_low() {
        let mut encoder = SimulatedEncoder::new();
        encoder.press();
        let sample = encoder.sample().unwrap();
        assert!(!sample.button);
        assert!(sample.button_pressed());
        encoder.release();
        assert!(!encoder.sample().unwrap().button_pressed());
    }

    #[test]
    fn clones_share_the_same_lines() {
        let encoder = SimulatedEncoder::new();
        let mut reader = encoder.clone();
        encoder.rotate_clockwise();
        encoder.press();
        let sample = reader.sample().unwrap();
        assert!(sample.clock);
        assert!(sample.button_pressed());
    }
}
