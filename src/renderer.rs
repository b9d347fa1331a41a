//! Draws one frame from the render queues, fading elements that have gone
//! quiet.

use crate::animator::Animator;
use crate::layout::ScreenPoint;

/// Brightness an element has at proximity 1 before any fading.
pub const MIN_COLOR: u8 = 20;

/// Time constant of the fade, in seconds.
pub const FADE_TIME_S: f64 = 10.0;

/// Width of the stroked ring drawn under each circle's outlines.
pub const STROKE_WIDTH: u32 = 2;

/// Something circles can be drawn on. Colors are gray levels, 0 is black.
pub trait Surface {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Paints the whole surface.
    fn fill(&mut self, gray: u8);

    /// An antialiased one pixel outline.
    fn aa_circle(&mut self, center: ScreenPoint, radius: u32, gray: u8);

    /// A ring `width` pixels wide whose outer edge is at `radius`.
    fn stroked_circle(&mut self, center: ScreenPoint, radius: u32, width: u32, gray: u8);
}

/// A circle waiting to be drawn. Ordering is by brightness first so that a
/// sorted list draws brighter circles over dimmer ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DrawCall {
    /// Brightness, 0 is black.
    pub gray: u8,
    /// Radius in pixels.
    pub radius: u32,
    /// Center on the surface.
    pub center: ScreenPoint,
}

/// Largest radius an element may have on a `width` x `height` surface.
/// A lone receiver gets the whole surface, otherwise the circles share it.
pub fn max_radius(width: u32, height: u32, receiver_count: usize) -> f64 {
    let half = width.min(height) as f64 / 2.0;
    if receiver_count == 1 {
        half
    } else {
        half / 2.0
    }
}

/// 1 until `last_touched_at`, then tending to 0 as the element goes
/// untouched.
pub fn distance_fading(now: f64, last_touched_at: f64) -> f64 {
    let idle = (now - last_touched_at).max(0.0);
    1.0 - (idle / FADE_TIME_S).tanh()
}

/// Gray level for proximity `rssi` after `fading` has been applied.
pub fn gray_level(rssi: f64, fading: f64) -> u8 {
    let min = MIN_COLOR as f64;
    (fading * (min + (255.0 - min) * (1.0 - rssi))) as u8
}

/// Advances every queue by one frame and returns the circles to draw,
/// dimmest first.
pub fn collect_draw_calls(
    animator: &mut Animator,
    centers: &[ScreenPoint],
    max_radius: f64,
    now: f64,
) -> Vec<DrawCall> {
    let mut calls: Vec<DrawCall> = animator
        .entries_mut()
        .filter_map(|(&(_, receiver), entry)| {
            let rssi = entry.next_frame()?;
            let center = *centers.get(receiver)?;

            let fading = if entry.is_animating() {
                1.0
            } else {
                distance_fading(now, entry.last_touched_at)
            };

            Some(DrawCall {
                gray: gray_level(rssi, fading),
                radius: (max_radius * rssi) as u32,
                center,
            })
        })
        .collect();

    calls.sort();
    calls
}

/// Clears the surface and draws the calls in order.
pub fn draw<S: Surface + ?Sized>(surface: &mut S, calls: &[DrawCall]) {
    surface.fill(0);
    for call in calls {
        surface.aa_circle(call.center, call.radius, call.gray);
        surface.aa_circle(
            call.center,
            call.radius.saturating_sub(STROKE_WIDTH - 1),
            call.gray,
        );
        surface.stroked_circle(call.center, call.radius, STROKE_WIDTH, call.gray);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::reading_store::{ReadingStore, Sample};
    use crate::record::DeviceId;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Op {
        Fill(u8),
        Outline(ScreenPoint, u32, u8),
        Stroke(ScreenPoint, u32, u32, u8),
    }

    /// Remembers what was drawn on it.
    pub(crate) struct RecordingSurface {
        pub size: (u32, u32),
        pub ops: Vec<Op>,
    }

    impl RecordingSurface {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                size: (width, height),
                ops: Vec::new(),
            }
        }
    }

    impl Surface for RecordingSurface {
        fn size(&self) -> (u32, u32) {
            self.size
        }
        fn fill(&mut self, gray: u8) {
            self.ops.push(Op::Fill(gray));
        }
        fn aa_circle(&mut self, center: ScreenPoint, radius: u32, gray: u8) {
            self.ops.push(Op::Outline(center, radius, gray));
        }
        fn stroked_circle(&mut self, center: ScreenPoint, radius: u32, width: u32, gray: u8) {
            self.ops.push(Op::Stroke(center, radius, width, gray));
        }
    }

    fn push(store: &ReadingStore, device: &str, receiver: usize, strength: i32) {
        let device = DeviceId::from_token(device.as_bytes()).unwrap();
        for _ in 0..10 {
            store.append(
                device,
                receiver,
                Sample {
                    strength,
                    timestamp: 0.0,
                },
            );
        }
    }

    #[test]
    fn test_max_radius() {
        assert_eq!(max_radius(400, 300, 1), 150.0);
        assert_eq!(max_radius(400, 300, 3), 75.0);
    }

    #[test]
    fn test_gray_level() {
        assert_eq!(gray_level(0.0, 1.0), 255);
        assert_eq!(gray_level(1.0, 1.0), MIN_COLOR);
        assert_eq!(gray_level(0.0, 0.0), 0);
        assert_eq!(gray_level(0.5, 0.5), 68);
    }

    #[test]
    fn test_fading_is_monotonic() {
        assert_eq!(distance_fading(0.0, 5.0), 1.0);
        let mut prev = distance_fading(0.0, 0.0);
        assert_eq!(prev, 1.0);
        for step in 1..200 {
            let fading = distance_fading(step as f64 * 0.5, 0.0);
            assert!(fading <= prev);
            assert!(fading >= 0.0);
            prev = fading;
        }
        assert!(prev < 1e-6);
    }

    #[test]
    fn test_sorted_dim_to_bright() {
        let store = ReadingStore::new();
        push(&store, "AAAAAAAAAAAA", 0, -90);
        push(&store, "BBBBBBBBBBBB", 1, -70);
        push(&store, "CCCCCCCCCCCC", 0, -80);

        let mut animator = Animator::new();
        animator.sample(&store, 0.0);

        let centers = [(10, 10), (20, 20)];
        let calls = collect_draw_calls(&mut animator, &centers, 100.0, 0.0);

        assert_eq!(calls.len(), 3);
        assert!(calls.windows(2).all(|w| w[0].gray <= w[1].gray));
        // strongest signal is the brightest and sits on its own receiver
        assert_eq!(calls[2].center, (20, 20));
        assert_eq!(calls[2].radius, 0);
        assert_eq!(calls[0].radius, 80);
    }

    #[test]
    fn test_no_fade_mid_transition() {
        let store = ReadingStore::new();
        push(&store, "AAAAAAAAAAAA", 0, -95);

        let mut animator = Animator::new();
        animator.sample(&store, 0.0);
        push(&store, "AAAAAAAAAAAA", 0, -70);
        animator.sample(&store, 0.0);

        // long after the grace period, but frames are still queued
        let calls = collect_draw_calls(&mut animator, &[(0, 0)], 100.0, 1000.0);
        assert_eq!(calls[0].gray, gray_level(1.0, 1.0));
    }

    #[test]
    fn test_resting_element_fades() {
        let store = ReadingStore::new();
        push(&store, "AAAAAAAAAAAA", 0, -70);

        let mut animator = Animator::new();
        animator.sample(&store, 0.0);

        let fresh = collect_draw_calls(&mut animator, &[(0, 0)], 100.0, 0.0);
        let stale = collect_draw_calls(&mut animator, &[(0, 0)], 100.0, 30.0);
        assert_eq!(fresh[0].gray, 255);
        assert!(stale[0].gray < 10);
    }

    #[test]
    fn test_draw_sequence() {
        let mut surface = RecordingSurface::new(100, 100);
        let calls = [
            DrawCall {
                gray: 40,
                radius: 0,
                center: (1, 2),
            },
            DrawCall {
                gray: 200,
                radius: 30,
                center: (3, 4),
            },
        ];

        draw(&mut surface, &calls);

        assert_eq!(
            surface.ops,
            vec![
                Op::Fill(0),
                Op::Outline((1, 2), 0, 40),
                Op::Outline((1, 2), 0, 40),
                Op::Stroke((1, 2), 0, 2, 40),
                Op::Outline((3, 4), 30, 200),
                Op::Outline((3, 4), 29, 200),
                Op::Stroke((3, 4), 30, 2, 200),
            ]
        );
    }
}
