use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::config::GaugeConfig;
use crate::display::Display;
use crate::error::GaugeError;
use crate::position::SharedPosition;
use crate::render::GaugeRenderer;
use crate::stop::StopSignal;

/// Periodically paints the current rudder angle.
pub struct RenderLoop {
    renderer: GaugeRenderer,
    position: Arc<SharedPosition>,
    counter_to_degree: f64,
    interval: Duration,
}

impl RenderLoop {
    pub fn new(
        renderer: GaugeRenderer,
        config: &GaugeConfig,
        position: Arc<SharedPosition>,
    ) -> Self {
        Self {
            renderer,
            position,
            counter_to_degree: config.counter_to_degree(),
            interval: config.render_interval(),
        }
    }

    /// Reads the counter, renders and presents one frame. Returns the angle shown.
    pub fn render_once<D: Display>(&self, display: &mut D) -> Result<f64, GaugeError> {
        let counter = self.position.read();
        let angle = counter as f64 * self.counter_to_degree;
        let frame = self.renderer.render(angle);
        display.present(&frame)?;
        trace!(counter, angle, "frame presented");
        Ok(angle)
    }

    /// Renders until `stop` is raised, then blanks the display.
    ///
    /// A failed frame write ends the loop with that error, unless the panel
    /// closed after `stop` was raised. Clearing on the way out is best effort.
    pub fn run<D: Display>(&self, display: &mut D, stop: &StopSignal) -> Result<u64, GaugeError> {
        debug!(interval = ?self.interval, "render loop started");
        let mut frames = 0u64;
        while !stop.is_stopped() {
            match self.render_once(display) {
                Ok(_) => frames += 1,
                // The window went away mid-frame during shutdown.
                Err(GaugeError::PanelClosed) if stop.is_stopped() => break,
                Err(err) => return Err(err),
            }
            thread::sleep(self.interval);
        }
        match display.clear() {
            Ok(()) => debug!("panel cleared"),
            Err(GaugeError::PanelClosed) => debug!("panel already closed"),
            Err(err) => warn!(%err, "failed to clear panel"),
        }
        debug!(frames, "render loop stopped");
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PANEL_SIZE;
    use crate::display::HeadlessDisplay;
    use crate::render::{DrawCommand, Frame};

    fn render_loop(position: Arc<SharedPosition>) -> RenderLoop {
        let config = GaugeConfig::default();
        let renderer = GaugeRenderer::new(PANEL_SIZE, PANEL_SIZE, &config);
        RenderLoop::new(renderer, &config, position)
    }

    fn readout(frame: &Frame) -> &str {
        match frame.commands().last() {
            Some(DrawCommand::Text { text, .. }) => text,
            _ => panic!("expected the readout"),
        }
    }

    #[test]
    fn shows_the_current_counter() {
        let position = Arc::new(SharedPosition::new(30));
        let render = render_loop(Arc::clone(&position));
        let mut display = HeadlessDisplay::new(PANEL_SIZE as usize, PANEL_SIZE as usize);

        assert_eq!(render.render_once(&mut display).unwrap(), 0.0);
        for _ in 0..15 {
            position.apply_delta(1);
        }
        assert_eq!(render.render_once(&mut display).unwrap(), 30.0);
        assert_eq!(readout(display.last_frame().unwrap()), "30.0°");
    }

    #[test]
    fn same_counter_gives_the_same_frame() {
        let position = Arc::new(SharedPosition::new(30));
        position.apply_delta(-7);
        let render = render_loop(position);
        let mut display = HeadlessDisplay::new(PANEL_SIZE as usize, PANEL_SIZE as usize);
        render.render_once(&mut display).unwrap();
        let first = display.last_frame().cloned();
        render.render_once(&mut display).unwrap();
        assert_eq!(display.last_frame().cloned(), first);
    }

    struct BrokenDisplay;

    impl Display for BrokenDisplay {
        fn present(&mut self, _frame: &Frame) -> Result<(), GaugeError> {
            Err(GaugeError::Display("bus write failed".to_string()))
        }

        fn clear(&mut self) -> Result<(), GaugeError> {
            Ok(())
        }
    }

    #[test]
    fn display_failure_is_fatal() {
        let render = render_loop(Arc::new(SharedPosition::new(30)));
        let err = render.run(&mut BrokenDisplay, &StopSignal::new()).unwrap_err();
        assert!(matches!(err, GaugeError::Display(_)));
    }

    struct ClosingPanel {
        stop: StopSignal,
    }

    impl Display for ClosingPanel {
        fn present(&mut self, _frame: &Frame) -> Result<(), GaugeError> {
            self.stop.stop();
            Err(GaugeError::PanelClosed)
        }

        fn clear(&mut self) -> Result<(), GaugeError> {
            Err(GaugeError::PanelClosed)
        }
    }

    #[test]
    fn window_closed_mid_frame_is_a_clean_stop() {
        let render = render_loop(Arc::new(SharedPosition::new(30)));
        let stop = StopSignal::new();
        let mut panel = ClosingPanel { stop: stop.clone() };
        assert_eq!(render.run(&mut panel, &stop).unwrap(), 0);
    }

    #[test]
    fn panel_closed_without_stop_is_fatal() {
        let render = render_loop(Arc::new(SharedPosition::new(30)));
        let mut panel = ClosingPanel {
            stop: StopSignal::new(),
        };
        let err = render.run(&mut panel, &StopSignal::new()).unwrap_err();
        assert!(matches!(err, GaugeError::PanelClosed));
    }

    #[test]
    fn stopping_clears_the_panel() {
        let render = render_loop(Arc::new(SharedPosition::new(30)));
        let mut display = HeadlessDisplay::new(PANEL_SIZE as usize, PANEL_SIZE as usize);
        render.render_once(&mut display).unwrap();
        let stop = StopSignal::new();
        stop.stop();
        assert_eq!(render.run(&mut display, &stop).unwrap(), 0);
        assert!(display.is_blank());
    }
}
