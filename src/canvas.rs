// ============================================================================
// RASTER CANVAS
// ============================================================================

use std::convert::Infallible;
use std::f64::consts::TAU;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Point, Size};
use embedded_graphics::mono_font::iso_8859_1::FONT_9X15;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::{Drawable, Pixel};

use crate::config::Color;
use crate::render::{DrawCommand, Frame};

/// RGBA8 drawing surface over a borrowed pixel buffer.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        debug_assert_eq!(frame.len(), width * height * 4);
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let px = &self.frame[idx..idx + 4];
        Some(Color::new(px[0], px[1], px[2]))
    }

    /// Replays a frame's commands in order.
    pub fn draw_frame(&mut self, frame: &Frame) {
        for command in frame.commands() {
            match command {
                DrawCommand::FillRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => self.fill_rect(*x, *y, *width, *height, *color),
                DrawCommand::Arc {
                    cx,
                    cy,
                    radius,
                    width,
                    start_angle,
                    sweep,
                    color,
                } => self.stroke_arc(*cx, *cy, *radius, *width, *start_angle, *sweep, *color),
                DrawCommand::Line {
                    from,
                    to,
                    width,
                    color,
                } => self.draw_line(*from, *to, *width, *color),
                DrawCommand::Ellipse {
                    cx,
                    cy,
                    rx,
                    ry,
                    color,
                } => self.fill_ellipse(*cx, *cy, *rx, *ry, *color),
                DrawCommand::Text { x, y, text, color } => self.draw_text(*x, *y, text, *color),
            }
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Color) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width as i32).min(self.width as i32);
        let y1 = (y + height as i32).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, 1.0);
            }
        }
    }

    pub fn stroke_arc(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        width: f64,
        start_angle: f64,
        sweep: f64,
        color: Color,
    ) {
        let inner = radius - width;
        let Some((x0, x1)) = self.clip_x(cx - radius - 1.0, cx + radius + 1.0) else {
            return;
        };
        let Some((y0, y1)) = self.clip_y(cy - radius - 1.0, cy + radius + 1.0) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist < inner - 1.0 || dist > radius + 1.0 {
                    continue;
                }
                let angle = dy.atan2(dx);
                if (angle - start_angle).rem_euclid(TAU) > sweep {
                    continue;
                }
                let aa = if dist > radius {
                    1.0 - (dist - radius)
                } else if dist < inner {
                    1.0 - (inner - dist)
                } else {
                    1.0
                };
                if aa > 0.0 {
                    self.blend(x, y, color, aa as f32);
                }
            }
        }
    }

    /// Anti-aliased line with round caps.
    pub fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), width: f32, color: Color) {
        let half = width as f64 / 2.0;
        let pad = half.ceil() + 1.0;
        let Some((x0, x1)) = self.clip_x(from.0.min(to.0) - pad, from.0.max(to.0) + pad) else {
            return;
        };
        let Some((y0, y1)) = self.clip_y(from.1.min(to.1) - pad, from.1.max(to.1) + pad) else {
            return;
        };
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let len_sq = dx * dx + dy * dy;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let px = x as f64 - from.0;
                let py = y as f64 - from.1;
                let t = if len_sq > 0.0 {
                    ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let lx = from.0 + t * dx;
                let ly = from.1 + t * dy;
                let dist = ((lx - x as f64).powi(2) + (ly - y as f64).powi(2)).sqrt();
                let aa = 1.0 - (dist - half).clamp(0.0, 1.0);
                if aa > 0.01 {
                    self.blend(x, y, color, aa as f32);
                }
            }
        }
    }

    pub fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, color: Color) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let Some((x0, x1)) = self.clip_x(cx - rx - 1.0, cx + rx + 1.0) else {
            return;
        };
        let Some((y0, y1)) = self.clip_y(cy - ry - 1.0, cy + ry + 1.0) else {
            return;
        };
        let scale = rx.min(ry);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let nx = (x as f64 - cx) / rx;
                let ny = (y as f64 - cy) / ry;
                // Approximate distance outside the edge, in pixels.
                let outside = ((nx * nx + ny * ny).sqrt() - 1.0) * scale;
                let aa = 1.0 - outside.clamp(0.0, 1.0);
                if aa > 0.0 {
                    self.blend(x, y, color, aa as f32);
                }
            }
        }
    }

    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color) {
        let style = MonoTextStyle::new(&FONT_9X15, Rgb888::new(color.r, color.g, color.b));
        // Drawing onto the canvas cannot fail.
        let _ = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(self);
    }

    fn blend(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let a = alpha.clamp(0.0, 1.0);
        let src = [color.r, color.g, color.b];
        for (dst, src) in self.frame[idx..idx + 3].iter_mut().zip(src) {
            *dst = (src as f32 * a + *dst as f32 * (1.0 - a)).round() as u8;
        }
        self.frame[idx + 3] = 0xff;
    }

    fn clip_x(&self, lo: f64, hi: f64) -> Option<(i32, i32)> {
        clip(lo, hi, self.width)
    }

    fn clip_y(&self, lo: f64, hi: f64) -> Option<(i32, i32)> {
        clip(lo, hi, self.height)
    }
}

fn clip(lo: f64, hi: f64, limit: usize) -> Option<(i32, i32)> {
    let lo = lo.floor().max(0.0);
    let hi = hi.ceil().min(limit as f64 - 1.0);
    (lo <= hi).then_some((lo as i32, hi as i32))
}

impl OriginDimensions for Canvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for Canvas<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.blend(
                point.x,
                point.y,
                Color::new(color.r(), color.g(), color.b()),
                1.0,
            );
        }
        Ok(())
    }
}
