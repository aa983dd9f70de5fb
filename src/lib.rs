// ============================================================================
// RUDDER GAUGE
// ============================================================================
//
// A rotary encoder sets a bounded position counter and a small square panel
// shows it as a gauge. Two loops run side by side and share nothing but the
// counter:
//
// - `InputLoop` polls the encoder lines about every millisecond, decodes
//   clock edges into steps and applies them to the `SharedPosition`. The
//   push-button resets the counter to zero.
// - `RenderLoop` reads the counter about every 10 ms, turns it into an angle
//   and hands a `Frame` from the `GaugeRenderer` to a `Display`.
//
// Pins and panel sit behind `EncoderPins` and `Display`; the crate ships a
// keyboard-driven `SimulatedEncoder`, a desktop `PanelWindow`, a
// `HeadlessDisplay`, and, with the `gpio` feature, a Raspberry Pi
// `GpioEncoder`.

pub mod canvas;
pub mod config;
pub mod decoder;
pub mod display;
pub mod error;
pub mod input_loop;
pub mod panel;
pub mod pins;
pub mod position;
pub mod render;
pub mod render_loop;
pub mod stop;

pub use canvas::Canvas;
pub use config::{Color, ConfigError, GaugeConfig, PANEL_SIZE};
pub use decoder::{QuadratureDecoder, Step};
pub use display::{Display, HeadlessDisplay, PanelEvent, SharedFramebuffer, WindowDisplay};
pub use error::GaugeError;
pub use input_loop::{InputLoop, PollOutcome};
pub use panel::PanelWindow;
#[cfg(feature = "gpio")]
pub use pins::GpioEncoder;
pub use pins::{EncoderPins, PinSample, SimulatedEncoder};
pub use position::SharedPosition;
pub use render::{DrawCommand, Frame, GaugeGeometry, GaugeRenderer};
pub use render_loop::RenderLoop;
pub use stop::StopSignal;
