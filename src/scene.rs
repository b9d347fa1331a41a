//! Per frame work: draw what the last frame sampled, then sample again.

use crate::animator::Animator;
use crate::layout::{generate_centers, to_screen_space, Center, ScreenPoint};
use crate::reading_store::ReadingStore;
use crate::renderer::{collect_draw_calls, draw, max_radius, Surface};

use rand::Rng;

/// Input the frame loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// The surface is now this many pixels wide and tall.
    Resize(u32, u32),
    /// The user wants to quit.
    Close,
}

/// Everything the frame loop carries from one frame to the next.
#[derive(Debug)]
pub struct Scene {
    centers: Vec<Center>,
    screen_centers: Vec<ScreenPoint>,
    size: (u32, u32),
    animator: Animator,
}

impl Scene {
    /// Lays out `receiver_count` receivers on a `width` x `height` surface.
    pub fn new<R: Rng>(receiver_count: usize, (width, height): (u32, u32), rng: &mut R) -> Self {
        let centers = generate_centers(receiver_count, rng);
        let screen_centers = to_screen_space(&centers, width, height);
        Self {
            centers,
            screen_centers,
            size: (width, height),
            animator: Animator::new(),
        }
    }

    /// Moves the receivers to match a new surface size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.screen_centers = to_screen_space(&self.centers, width, height);
    }

    /// Where each receiver is drawn, indexed by receiver.
    pub fn screen_centers(&self) -> &[ScreenPoint] {
        &self.screen_centers
    }

    /// The render queues as of the last tick.
    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Draws the queues as the previous tick left them, then samples the
    /// store so the next tick has something new to draw.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S, store: &ReadingStore, now: f64) {
        if surface.size() != self.size {
            let (width, height) = surface.size();
            self.resize(width, height);
        }

        let (width, height) = self.size;
        let radius = max_radius(width, height, self.centers.len());
        let calls = collect_draw_calls(&mut self.animator, &self.screen_centers, radius, now);
        draw(surface, &calls);

        self.animator.sample(store, now);
    }
}
