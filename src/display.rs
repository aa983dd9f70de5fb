// ============================================================================
// DISPLAY ADAPTERS
// ============================================================================

use std::sync::{Arc, Mutex};

use tracing::trace;
use winit::event_loop::EventLoopProxy;

use crate::canvas::Canvas;
use crate::config::Color;
use crate::error::GaugeError;
use crate::render::Frame;

/// A raster panel that accepts whole frames.
pub trait Display {
    /// Rasterizes and shows one frame. Either the whole frame is shown or
    /// nothing is.
    fn present(&mut self, frame: &Frame) -> Result<(), GaugeError>;

    /// Blanks the panel.
    fn clear(&mut self) -> Result<(), GaugeError>;
}

fn check_size(frame: &Frame, width: usize, height: usize) -> Result<(), GaugeError> {
    if frame.width() as usize != width || frame.height() as usize != height {
        return Err(GaugeError::Display(format!(
            "frame is {}x{}, panel is {width}x{height}",
            frame.width(),
            frame.height()
        )));
    }
    Ok(())
}

/// The committed panel image, shared between the render thread and the
/// window thread.
#[derive(Debug, Clone)]
pub struct SharedFramebuffer {
    pixels: Arc<Mutex<Vec<u8>>>,
    width: usize,
    height: usize,
}

impl SharedFramebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let mut pixels = vec![0; width * height * 4];
        Canvas::new(&mut pixels, width, height).clear(Color::BLACK);
        Self {
            pixels: Arc::new(Mutex::new(pixels)),
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Replaces the committed image with `back`.
    pub fn commit(&self, back: &[u8]) -> Result<(), GaugeError> {
        let mut pixels = self.lock()?;
        if pixels.len() != back.len() {
            return Err(GaugeError::Display(format!(
                "back buffer holds {} bytes, framebuffer holds {}",
                back.len(),
                pixels.len()
            )));
        }
        pixels.copy_from_slice(back);
        Ok(())
    }

    /// Copies the committed image into `target`, e.g. a `pixels` frame.
    pub fn copy_into(&self, target: &mut [u8]) -> Result<(), GaugeError> {
        let pixels = self.lock()?;
        if pixels.len() != target.len() {
            return Err(GaugeError::Display(format!(
                "target holds {} bytes, framebuffer holds {}",
                target.len(),
                pixels.len()
            )));
        }
        target.copy_from_slice(&pixels);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<u8>>, GaugeError> {
        self.pixels
            .lock()
            .map_err(|_| GaugeError::Display("framebuffer lock poisoned".to_string()))
    }
}

/// Wakes the panel window when a new image has been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    FrameReady,
    Shutdown,
}

/// [`Display`] backed by the panel simulator window.
pub struct WindowDisplay {
    framebuffer: SharedFramebuffer,
    back: Vec<u8>,
    proxy: EventLoopProxy<PanelEvent>,
}

impl WindowDisplay {
    pub fn new(framebuffer: SharedFramebuffer, proxy: EventLoopProxy<PanelEvent>) -> Self {
        let back = vec![0; framebuffer.width() * framebuffer.height() * 4];
        Self {
            framebuffer,
            back,
            proxy,
        }
    }

    fn commit(&mut self) -> Result<(), GaugeError> {
        self.framebuffer.commit(&self.back)?;
        self.proxy
            .send_event(PanelEvent::FrameReady)
            .map_err(|_| GaugeError::PanelClosed)
    }
}

impl Display for WindowDisplay {
    fn present(&mut self, frame: &Frame) -> Result<(), GaugeError> {
        let (width, height) = (self.framebuffer.width(), self.framebuffer.height());
        check_size(frame, width, height)?;
        Canvas::new(&mut self.back, width, height).draw_frame(frame);
        self.commit()
    }

    fn clear(&mut self) -> Result<(), GaugeError> {
        let (width, height) = (self.framebuffer.width(), self.framebuffer.height());
        Canvas::new(&mut self.back, width, height).clear(Color::BLACK);
        self.commit()
    }
}

/// In-memory [`Display`], for tests and runs without a window.
#[derive(Debug, Clone)]
pub struct HeadlessDisplay {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
    frames_presented: u64,
    last_frame: Option<Frame>,
}

impl HeadlessDisplay {
    pub fn new(width: usize, height: usize) -> Self {
        let mut display = Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
            frames_presented: 0,
            last_frame: None,
        };
        display.canvas().clear(Color::BLACK);
        display
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        Some(Color::new(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
        ))
    }

    pub fn is_blank(&self) -> bool {
        self.pixels
            .chunks_exact(4)
            .all(|px| px == [0x00, 0x00, 0x00, 0xff])
    }

    fn canvas(&mut self) -> Canvas<'_> {
        Canvas::new(&mut self.pixels, self.width, self.height)
    }
}

impl Display for HeadlessDisplay {
    fn present(&mut self, frame: &Frame) -> Result<(), GaugeError> {
        check_size(frame, self.width, self.height)?;
        self.canvas().draw_frame(frame);
        self.frames_presented += 1;
        self.last_frame = Some(frame.clone());
        trace!(frames = self.frames_presented, "headless frame presented");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), GaugeError> {
        self.canvas().clear(Color::BLACK);
        Ok(())
    }
}
