//! A [`Surface`] backed by a ratatui braille canvas. Every terminal cell is
//! two dots wide and four dots tall, and each dot counts as a pixel.

use crate::layout::ScreenPoint;
use crate::renderer::Surface;

use ratatui::{
    style::Color,
    symbols::Marker,
    widgets::canvas::{Canvas, Context, Painter, Shape},
};
use std::f64::consts::TAU;

/// Pixel dimensions of a terminal area `cols` x `rows` cells large.
pub fn pixel_size(cols: u16, rows: u16) -> (u32, u32) {
    (cols as u32 * 2, rows as u32 * 4)
}

fn gray(level: u8) -> Color {
    Color::Rgb(level, level, level)
}

/// A one dot wide circle outline in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Ring {
    x: f64,
    y: f64,
    radius: f64,
    color: Color,
}

impl Shape for Ring {
    fn draw(&self, painter: &mut Painter) {
        // about two points per dot of circumference, so the outline is closed
        let steps = ((TAU * self.radius * 2.0).ceil() as usize).max(16);
        for i in 0..steps {
            let angle = TAU * i as f64 / steps as f64;
            let x = self.x + self.radius * angle.cos();
            let y = self.y + self.radius * angle.sin();
            if let Some((px, py)) = painter.get_point(x, y) {
                painter.paint(px, py, self.color);
            }
        }
    }
}

/// Collects a frame's draw commands until the terminal paints them.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSurface {
    width: u32,
    height: u32,
    background: Color,
    rings: Vec<Ring>,
}

impl CanvasSurface {
    /// An empty black surface of `width` x `height` pixels.
    pub fn new((width, height): (u32, u32)) -> Self {
        Self {
            width,
            height,
            background: Color::Black,
            rings: Vec::new(),
        }
    }

    /// Changes the pixel size used for the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn ring(&mut self, (x, y): ScreenPoint, radius: u32, level: u8) {
        // canvas y grows upwards, screen y downwards
        self.rings.push(Ring {
            x: x as f64,
            y: self.height as f64 - y as f64,
            radius: radius as f64,
            color: gray(level),
        });
    }

    /// The widget that paints this frame, in draw order.
    pub fn canvas(&self) -> Canvas<'_, impl Fn(&mut Context) + '_> {
        Canvas::default()
            .background_color(self.background)
            .marker(Marker::Braille)
            .x_bounds([0.0, self.width as f64])
            .y_bounds([0.0, self.height as f64])
            .paint(move |ctx| {
                for ring in &self.rings {
                    ctx.draw(ring);
                }
            })
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill(&mut self, level: u8) {
        self.background = gray(level);
        self.rings.clear();
    }

    fn aa_circle(&mut self, center: ScreenPoint, radius: u32, level: u8) {
        self.ring(center, radius, level);
    }

    fn stroked_circle(&mut self, center: ScreenPoint, radius: u32, width: u32, level: u8) {
        let inner = radius.saturating_sub(width.saturating_sub(1));
        for r in (inner..=radius).rev() {
            self.ring(center, r, level);
        }
    }
}
