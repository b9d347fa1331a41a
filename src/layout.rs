//! Where each receiver's circles are drawn.

use rand::Rng;
use std::f64::consts::TAU;

/// A position in normalized space, both axes in [-1, 1].
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Center {
    /// Left to right.
    pub x: f64,
    /// Top to bottom.
    pub y: f64,
}

/// A position on the drawing surface, in pixels from the top left.
pub type ScreenPoint = (i32, i32);

/// Radius of the ring receivers sit on when there is more than one.
pub const RING_RADIUS: f64 = 1.0 / 3.0;

/// One center per receiver. A lone receiver sits in the middle, otherwise
/// they are spread evenly around a ring, rotated by a random offset so no
/// receiver is always drawn in the same spot.
pub fn generate_centers<R: Rng>(receiver_count: usize, rng: &mut R) -> Vec<Center> {
    match receiver_count {
        0 => Vec::new(),
        1 => vec![Center { x: 0.0, y: 0.0 }],
        n => {
            let offset = rng.gen_range(0.0..TAU);
            (0..n)
                .map(|i| offset + TAU * i as f64 / n as f64)
                .map(|angle| Center {
                    x: angle.cos() * RING_RADIUS,
                    y: angle.sin() * RING_RADIUS,
                })
                .collect()
        }
    }
}

/// Maps normalized centers onto a `width` x `height` surface.
pub fn to_screen_space(centers: &[Center], width: u32, height: u32) -> Vec<ScreenPoint> {
    let half_w = (width / 2) as f64;
    let half_h = (height / 2) as f64;
    centers
        .iter()
        .map(|c| ((half_w + c.x * half_w) as i32, (half_h + c.y * half_h) as i32))
        .collect()
}
