use std::time::Duration;

use bon::Builder;
use thiserror::Error;

/// Side length of the square panel, in pixels.
pub const PANEL_SIZE: u32 = 128;

/// Color representation for gauge elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);
    pub const YELLOW: Color = Color::new(0xff, 0xff, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Runtime configuration for the indicator.
///
/// Pin numbers are BCM numbers and only matter to the GPIO adapter. The
/// degree range must be symmetric because the counter range is `[-steps, steps]`.
#[derive(Debug, Clone, Builder)]
pub struct GaugeConfig {
    #[builder(default = 17)]
    pub clock_pin: u8,
    #[builder(default = 27)]
    pub data_pin: u8,
    #[builder(default = 22)]
    pub button_pin: u8,

    #[builder(default = -60.0)]
    pub min_degree: f64,
    #[builder(default = 60.0)]
    pub max_degree: f64,
    #[builder(default = 30)]
    pub steps: i32,

    #[builder(default = 1)]
    pub poll_interval_ms: u64,
    #[builder(default = 10)]
    pub render_interval_ms: u64,

    // Panel simulator window
    #[builder(default = "Rudder".to_string(), into)]
    pub title: String,
    #[builder(default = 4)]
    pub window_scale: u32,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GaugeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps <= 0 {
            return Err(ConfigError::NonPositiveSteps(self.steps));
        }
        if !self.max_degree.is_finite() || self.max_degree <= 0.0 {
            return Err(ConfigError::InvalidMaxDegree(self.max_degree));
        }
        if self.min_degree != -self.max_degree {
            return Err(ConfigError::AsymmetricRange {
                min: self.min_degree,
                max: self.max_degree,
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("poll"));
        }
        if self.render_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("render"));
        }
        let pins = [self.clock_pin, self.data_pin, self.button_pin];
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(ConfigError::DuplicatePin(*pin));
            }
        }
        if self.window_scale == 0 {
            return Err(ConfigError::ZeroWindowScale);
        }
        Ok(())
    }

    pub fn counter_to_degree(&self) -> f64 {
        self.max_degree / self.steps as f64
    }

    pub fn min_counter(&self) -> i32 {
        -self.steps
    }

    pub fn max_counter(&self) -> i32 {
        self.steps
    }

    /// Rudder angle in degrees for a position counter value.
    pub fn rudder_angle(&self, counter: i32) -> f64 {
        counter as f64 * self.counter_to_degree()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("steps must be positive, got {0}")]
    NonPositiveSteps(i32),
    #[error("max_degree must be a positive finite number, got {0}")]
    InvalidMaxDegree(f64),
    #[error("degree range must be symmetric, got [{min}, {max}]")]
    AsymmetricRange { min: f64, max: f64 },
    #[error("{0} interval must be at least 1 ms")]
    ZeroInterval(&'static str),
    #[error("pin {0} is assigned to more than one encoder line")]
    DuplicatePin(u8),
    #[error("window scale must be at least 1")]
    ZeroWindowScale,
}
