use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum GaugeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read encoder pin {pin}: {reason}")]
    PinRead { pin: u8, reason: String },

    #[error("GPIO error: {0}")]
    Gpio(String),

    #[error("display write failed: {0}")]
    Display(String),

    #[error("panel window has been closed")]
    PanelClosed,

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("pixel surface error: {0}")]
    Pixels(#[from] pixels::Error),

    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}
