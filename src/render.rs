// ============================================================================
// GAUGE RENDERER
// ============================================================================
//
// The renderer is retained-mode: `GaugeRenderer::render` only records draw
// commands into a `Frame`, and the display adapter rasterizes them. Keeping the
// geometry out of the raster code makes every frame comparable in tests.

use crate::config::{Color, GaugeConfig};

// Gauge geometry, relative to the panel.
const CENTER_DROP: u32 = 20;
const MARGIN: u32 = 10;
const INDICATOR_LENGTH: f64 = 0.8;
const TICK_INNER: f64 = 0.85;
const TICK_OUTER: f64 = 0.95;
const HUB_RADIUS: f64 = 5.0;
const TRACK_WIDTH: f64 = 2.0;
const INDICATOR_WIDTH: f32 = 8.0;
const TICK_WIDTH: f32 = 2.0;
const READOUT_POSITION: (i32, i32) = (10, 5);

// Palette
const BACKGROUND: Color = Color::BLACK;
const TRACK: Color = Color::WHITE;
const TICK: Color = Color::WHITE;
const INDICATOR: Color = Color::YELLOW;
const READOUT: Color = Color::YELLOW;

/// Screen-space direction for a rudder angle.
///
/// Screen angles grow clockwise from the positive x axis because y points
/// down, so subtracting 90° puts a rudder angle of 0 at the top.
pub fn screen_radians(angle_degrees: f64) -> f64 {
    (angle_degrees - 90.0).to_radians()
}

/// Readout text, one decimal place.
pub fn format_readout(angle: f64) -> String {
    format!("{angle:.1}°")
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: Color,
    },
    /// Stroke along the circle, `width` pixels inward from `radius`.
    Arc {
        cx: f64,
        cy: f64,
        radius: f64,
        width: f64,
        start_angle: f64,
        sweep: f64,
        color: Color,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        width: f32,
        color: Color,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        color: Color,
    },
    /// `(x, y)` is the top-left corner of the text box.
    Text {
        x: i32,
        y: i32,
        text: String,
        color: Color,
    },
}

/// One render cycle worth of draw commands, in painting order.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }
}

/// Fixed placement of the gauge on a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeGeometry {
    pub width: u32,
    pub height: u32,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl GaugeGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        let cx = (width / 2) as f64;
        let cy = (height / 2 + CENTER_DROP) as f64;
        let radius = (width.min(height) / 2).saturating_sub(MARGIN) as f64;
        Self {
            width,
            height,
            cx,
            cy,
            radius,
        }
    }

    /// Point `distance` pixels from the center in the direction of `angle_degrees`.
    pub fn point_at(&self, angle_degrees: f64, distance: f64) -> (f64, f64) {
        let direction = screen_radians(angle_degrees);
        (
            self.cx + distance * direction.cos(),
            self.cy + distance * direction.sin(),
        )
    }

    pub fn indicator_length(&self) -> f64 {
        self.radius * INDICATOR_LENGTH
    }

    pub fn indicator_tip(&self, angle_degrees: f64) -> (f64, f64) {
        self.point_at(angle_degrees, self.indicator_length())
    }
}

/// Paints the rudder gauge. Holds only constants, so rendering is a pure
/// function of the angle.
#[derive(Debug, Clone)]
pub struct GaugeRenderer {
    geometry: GaugeGeometry,
    min_degree: f64,
    max_degree: f64,
}

impl GaugeRenderer {
    pub fn new(width: u32, height: u32, config: &GaugeConfig) -> Self {
        Self {
            geometry: GaugeGeometry::new(width, height),
            min_degree: config.min_degree,
            max_degree: config.max_degree,
        }
    }

    pub fn geometry(&self) -> &GaugeGeometry {
        &self.geometry
    }

    pub fn render(&self, angle: f64) -> Frame {
        let g = &self.geometry;
        let mut frame = Frame::new(g.width, g.height);

        frame.push(DrawCommand::FillRect {
            x: 0,
            y: 0,
            width: g.width,
            height: g.height,
            color: BACKGROUND,
        });

        // Reference track over the whole legal range
        frame.push(DrawCommand::Arc {
            cx: g.cx,
            cy: g.cy,
            radius: g.radius,
            width: TRACK_WIDTH,
            start_angle: screen_radians(self.min_degree),
            sweep: (self.max_degree - self.min_degree).to_radians(),
            color: TRACK,
        });

        frame.push(DrawCommand::Line {
            from: (g.cx, g.cy),
            to: g.indicator_tip(angle),
            width: INDICATOR_WIDTH,
            color: INDICATOR,
        });

        frame.push(DrawCommand::Ellipse {
            cx: g.cx,
            cy: g.cy,
            rx: HUB_RADIUS,
            ry: HUB_RADIUS,
            color: INDICATOR,
        });

        for marker in [self.min_degree, 0.0, self.max_degree] {
            frame.push(DrawCommand::Line {
                from: g.point_at(marker, g.radius * TICK_INNER),
                to: g.point_at(marker, g.radius * TICK_OUTER),
                width: TICK_WIDTH,
                color: TICK,
            });
        }

        frame.push(DrawCommand::Text {
            x: READOUT_POSITION.0,
            y: READOUT_POSITION.1,
            text: format_readout(angle),
            color: READOUT,
        });

        frame
    }
}
