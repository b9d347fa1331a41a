//! Turns the raw readings in the [`ReadingStore`] into per element queues
//! of animation frames.

use crate::reading_store::{ReadingStore, RenderKey};

use std::collections::{HashMap, VecDeque};

/// How many of the latest samples are averaged to smooth out noise.
pub const SMOOTHING_WINDOW: usize = 10;

/// Number of frames a transition between two proximities takes.
pub const ANIMATION_FRAMES: usize = 60;

/// Seconds after a transition is queued before its element starts fading.
/// Roughly the length of one transition at 60 frames per second.
pub const FADE_GRACE_S: f64 = 1.0;

/// Absolute strength mapped to proximity 0.
const NEAR_STRENGTH: f64 = 70.0;
/// Strength span between proximity 0 and proximity 1.
const STRENGTH_SPAN: f64 = 25.0;

/// Maps a mean signal strength onto 0 (strongest, closest) to 1 (weakest).
pub fn normalize(raw_average: f64) -> f64 {
    ((raw_average.abs() - NEAR_STRENGTH) / STRENGTH_SPAN).clamp(0.0, 1.0)
}

/// Equal within an absolute tolerance of 1e-8 plus a relative one of 1e-5.
fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}

/// `steps` evenly spaced values from `start` to `end`, both inclusive.
pub fn interpolate(start: f64, end: f64, steps: usize) -> impl Iterator<Item = f64> {
    let last = steps.saturating_sub(1).max(1) as f64;
    (0..steps).map(move |i| {
        let t = i as f64 / last;
        start * (1.0 - t) + end * t
    })
}

/// The frames still to be shown for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderQueueEntry {
    /// Time at and after which the element fades.
    pub last_touched_at: f64,
    /// Proximities to show, oldest first. Never empty once created.
    pub queue: VecDeque<f64>,
}

impl RenderQueueEntry {
    fn new(proximity: f64, now: f64) -> Self {
        Self {
            last_touched_at: now + FADE_GRACE_S,
            queue: VecDeque::from([proximity]),
        }
    }

    /// The value this element comes to rest on once the queue drains.
    pub fn resting(&self) -> Option<f64> {
        self.queue.back().copied()
    }

    /// Takes this frame's value. The last value is only peeked so the
    /// element stays on screen at rest.
    pub fn next_frame(&mut self) -> Option<f64> {
        if self.queue.len() > 1 {
            self.queue.pop_front()
        } else {
            self.queue.front().copied()
        }
    }

    /// True while there is still a transition to play.
    pub fn is_animating(&self) -> bool {
        self.queue.len() > 1
    }
}

/// Samples the store once per frame and keeps the render queues.
#[derive(Debug, Default)]
pub struct Animator {
    entries: HashMap<RenderKey, RenderQueueEntry>,
}

impl Animator {
    /// An animator with no elements yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates every element that has readings. A queue only grows when the
    /// smoothed proximity actually moved.
    pub fn sample(&mut self, store: &ReadingStore, now: f64) {
        for key in store.keys() {
            let (device, receiver) = key;
            let tail = store.snapshot_tail(&device, receiver, SMOOTHING_WINDOW);
            if tail.is_empty() {
                continue;
            }

            let sum: f64 = tail.iter().map(|s| s.strength as f64).sum();
            let proximity = normalize(sum / tail.len() as f64);

            let entry = self
                .entries
                .entry(key)
                .or_insert_with(|| RenderQueueEntry::new(proximity, now));

            let Some(start) = entry.resting() else {
                entry.queue.push_back(proximity);
                continue;
            };
            if is_close(start, proximity) {
                continue;
            }

            entry.last_touched_at = now + FADE_GRACE_S;
            entry
                .queue
                .extend(interpolate(start, proximity, ANIMATION_FRAMES));
        }
    }

    /// The queue for one element, if it has been sampled.
    pub fn get(&self, key: &RenderKey) -> Option<&RenderQueueEntry> {
        self.entries.get(key)
    }

    /// Every element and its queue, in no particular order.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = (&RenderKey, &mut RenderQueueEntry)> {
        self.entries.iter_mut()
    }

    /// Number of elements sampled so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before anything has been sampled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading_store::Sample;
    use crate::record::DeviceId;

    fn id(s: &str) -> DeviceId {
        DeviceId::from_token(s.as_bytes()).unwrap()
    }

    fn push(store: &ReadingStore, key: RenderKey, strengths: &[i32]) {
        for &strength in strengths {
            store.append(
                key.0,
                key.1,
                Sample {
                    strength,
                    timestamp: 0.0,
                },
            );
        }
    }

    #[test]
    fn test_normalize_bounds() {
        assert_eq!(normalize(-70.0), 0.0);
        assert_eq!(normalize(-95.0), 1.0);
        assert_eq!(normalize(-120.0), 1.0);
        assert_eq!(normalize(-65.0), 0.0);
        assert_eq!(normalize(-82.5), 0.5);
    }

    #[test]
    fn test_interpolate_endpoints() {
        let frames: Vec<f64> = interpolate(0.2, 0.9, ANIMATION_FRAMES).collect();
        assert_eq!(frames.len(), ANIMATION_FRAMES);
        assert_eq!(frames[0], 0.2);
        assert_eq!(frames[ANIMATION_FRAMES - 1], 0.9);
        assert!(frames.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_first_observation_is_not_animated() {
        let store = ReadingStore::new();
        let key = (id("A1B2C3D4E5F6"), 0);
        push(&store, key, &[-65]);

        let mut animator = Animator::new();
        animator.sample(&store, 100.0);

        let entry = animator.get(&key).unwrap();
        assert_eq!(entry.queue, VecDeque::from([0.0]));
        assert_eq!(entry.last_touched_at, 100.0 + FADE_GRACE_S);
    }

    #[test]
    fn test_averages_last_ten() {
        let store = ReadingStore::new();
        let key = (id("A1B2C3D4E5F6"), 1);
        // the leading outliers fall out of the window
        push(&store, key, &[-10, -10, -10]);
        push(&store, key, &[-80; 5]);
        push(&store, key, &[-90; 5]);

        let mut animator = Animator::new();
        animator.sample(&store, 0.0);

        assert_eq!(animator.get(&key).unwrap().resting(), Some(normalize(-85.0)));
    }

    #[test]
    fn test_unchanged_value_is_a_noop() {
        let store = ReadingStore::new();
        let key = (id("A1B2C3D4E5F6"), 0);
        push(&store, key, &[-80]);

        let mut animator = Animator::new();
        animator.sample(&store, 0.0);
        let before = animator.get(&key).cloned();
        animator.sample(&store, 5.0);

        assert_eq!(animator.get(&key).cloned(), before);
        assert_eq!(animator.get(&key).unwrap().queue.len(), 1);
    }

    #[test]
    fn test_change_queues_transition() {
        let store = ReadingStore::new();
        let key = (id("A1B2C3D4E5F6"), 0);
        push(&store, key, &[-70]);

        let mut animator = Animator::new();
        animator.sample(&store, 0.0);

        push(&store, key, &[-95; 10]);
        animator.sample(&store, 10.0);

        let entry = animator.get(&key).unwrap();
        assert_eq!(entry.queue.len(), 1 + ANIMATION_FRAMES);
        assert_eq!(entry.last_touched_at, 10.0 + FADE_GRACE_S);
        assert_eq!(entry.resting(), Some(1.0));
    }

    #[test]
    fn test_transition_drains_to_target() {
        let store = ReadingStore::new();
        let key = (id("A1B2C3D4E5F6"), 0);
        push(&store, key, &[-75]);

        let mut animator = Animator::new();
        animator.sample(&store, 0.0);
        push(&store, key, &[-90; 10]);
        animator.sample(&store, 0.0);

        let (_, entry) = animator.entries_mut().next().unwrap();
        let mut last = None;
        for _ in 0..(2 * ANIMATION_FRAMES) {
            last = entry.next_frame();
        }

        assert!(!entry.is_animating());
        assert!((last.unwrap() - normalize(-90.0)).abs() < 1e-12);
    }
}
