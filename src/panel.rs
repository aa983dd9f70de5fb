// ============================================================================
// PANEL SIMULATOR WINDOW
// ============================================================================
//
// Emulates the 128x128 panel in a desktop window. The render loop commits
// frames into a `SharedFramebuffer` from its own thread and posts
// `PanelEvent::FrameReady`; this side only copies the committed image into the
// `pixels` surface. The keyboard stands in for the encoder: arrow keys turn
// it, space holds the push-button.

use std::sync::Arc;

use pixels::{Pixels, SurfaceTexture};
use tracing::{debug, error, info};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::config::{GaugeConfig, PANEL_SIZE};
use crate::display::{PanelEvent, SharedFramebuffer, WindowDisplay};
use crate::error::GaugeError;
use crate::pins::SimulatedEncoder;
use crate::stop::StopSignal;

pub struct PanelWindow {
    event_loop: EventLoop<PanelEvent>,
    framebuffer: SharedFramebuffer,
    title: String,
    scale: u32,
}

impl PanelWindow {
    /// Must be called on the main thread.
    pub fn new(config: &GaugeConfig) -> Result<Self, GaugeError> {
        let event_loop = EventLoopBuilder::<PanelEvent>::with_user_event().build()?;
        Ok(Self {
            event_loop,
            framebuffer: SharedFramebuffer::new(PANEL_SIZE as usize, PANEL_SIZE as usize),
            title: config.title.clone(),
            scale: config.window_scale,
        })
    }

    pub fn proxy(&self) -> EventLoopProxy<PanelEvent> {
        self.event_loop.create_proxy()
    }

    /// A [`crate::display::Display`] that paints into this window.
    pub fn display(&self) -> WindowDisplay {
        WindowDisplay::new(self.framebuffer.clone(), self.proxy())
    }

    /// Runs the window until it is closed or a loop asks for shutdown.
    ///
    /// `encoder`, when present, is driven from the keyboard. The stop signal
    /// is raised on the way out.
    pub fn run(
        self,
        encoder: Option<SimulatedEncoder>,
        stop: StopSignal,
    ) -> Result<(), GaugeError> {
        let side = (PANEL_SIZE * self.scale) as f64;
        let window = WindowBuilder::new()
            .with_title(&self.title)
            .with_inner_size(LogicalSize::new(side, side))
            .with_resizable(false)
            .build(&self.event_loop)?;
        let window = Arc::new(window);

        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(PANEL_SIZE, PANEL_SIZE, surface_texture)?;

        info!(
            width = PANEL_SIZE,
            height = PANEL_SIZE,
            scale = self.scale,
            "panel window opened"
        );

        let framebuffer = self.framebuffer;
        let window_clone = Arc::clone(&window);
        let stop_clone = stop.clone();
        let mut failure: Option<GaugeError> = None;
        let failure_slot = &mut failure;

        self.event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Wait);
            match event {
                Event::UserEvent(PanelEvent::FrameReady) => window_clone.request_redraw(),
                Event::UserEvent(PanelEvent::Shutdown) => {
                    debug!("shutdown requested by a loop");
                    window_target.exit();
                }
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        stop_clone.stop();
                        blank(&mut pixels);
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if is_escape(&event) {
                            stop_clone.stop();
                            blank(&mut pixels);
                            window_target.exit();
                        } else if let Some(encoder) = &encoder {
                            drive_encoder(encoder, &event);
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let presented = framebuffer
                            .copy_into(pixels.frame_mut())
                            .and_then(|()| pixels.render().map_err(GaugeError::from));
                        if let Err(err) = presented {
                            error!(%err, "panel refresh failed");
                            *failure_slot = Some(err);
                            stop_clone.stop();
                            window_target.exit();
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        })?;

        stop.stop();
        info!("panel window closed");
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn is_escape(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && matches!(event.logical_key, Key::Named(NamedKey::Escape))
}

fn drive_encoder(encoder: &SimulatedEncoder, event: &KeyEvent) {
    match (&event.logical_key, event.state) {
        (Key::Named(NamedKey::ArrowRight), ElementState::Pressed) => encoder.rotate_clockwise(),
        (Key::Named(NamedKey::ArrowLeft), ElementState::Pressed) => {
            encoder.rotate_counter_clockwise()
        }
        (Key::Named(NamedKey::Space), ElementState::Pressed) => encoder.press(),
        (Key::Named(NamedKey::Space), ElementState::Released) => encoder.release(),
        _ => {}
    }
}

/// Best-effort blanking of the panel before the window goes away.
fn blank(pixels: &mut Pixels) {
    for chunk in pixels.frame_mut().chunks_exact_mut(4) {
        chunk.copy_from_slice(&[0x00, 0x00, 0x00, 0xff]);
    }
    if let Err(err) = pixels.render() {
        debug!(%err, "could not blank the panel");
    }
}
