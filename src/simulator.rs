//! Stand-in receivers for running without hardware.
//!
//! A [`SimulatedPort`] behaves like an opened serial port: reading it blocks
//! until the next record is due or the read timeout passes, and it prints
//! the odd channel notice between records just like the real firmware.

use crate::record::DEVICE_ID_LEN;

use rand::prelude::*;
use std::{
    collections::VecDeque,
    io::{self, ErrorKind, Read},
    thread,
    time::{Duration, Instant},
};

/// Weakest and strongest strength a simulated device wanders between.
const STRENGTH_RANGE: (f64, f64) = (-100.0, -50.0);

/// Chance that a record is preceded by a channel notice.
const CHANNEL_NOTICE_ODDS: f64 = 0.05;

#[derive(Debug)]
struct FakeDevice {
    id: String,
    strength: f64,
}

/// A source of records for fake devices whose signal strength drifts.
#[derive(Debug)]
pub struct SimulatedPort {
    rng: StdRng,
    devices: Vec<FakeDevice>,
    interval: Duration,
    timeout: Duration,
    next_due: Instant,
    pending: VecDeque<u8>,
}

fn fake_id<R: Rng>(rng: &mut R) -> String {
    (0..DEVICE_ID_LEN)
        .map(|_| char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0').to_ascii_uppercase())
        .collect()
}

impl SimulatedPort {
    /// `device_ids` are shared across ports so the same device shows up on
    /// every simulated receiver.
    pub fn new(seed: u64, device_ids: &[String], interval: Duration, timeout: Duration) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let devices = device_ids
            .iter()
            .map(|id| FakeDevice {
                id: id.clone(),
                strength: rng.gen_range(STRENGTH_RANGE.0..STRENGTH_RANGE.1),
            })
            .collect();
        Self {
            rng,
            devices,
            interval,
            timeout,
            next_due: Instant::now(),
            pending: VecDeque::new(),
        }
    }

    /// Makes up `count` device ids.
    pub fn device_ids(seed: u64, count: usize) -> Vec<String> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count).map(|_| fake_id(&mut rng)).collect()
    }

    fn emit(&mut self) {
        if self.devices.is_empty() {
            return;
        }
        if self.rng.gen_bool(CHANNEL_NOTICE_ODDS) {
            let channel = self.rng.gen_range(1..=13);
            self.pending.extend(channel_notice(channel).bytes());
        }

        let i = self.rng.gen_range(0..self.devices.len());
        let step = self.rng.gen_range(-3.0..3.0);
        let device = &mut self.devices[i];
        device.strength = (device.strength + step).clamp(STRENGTH_RANGE.0, STRENGTH_RANGE.1);
        let line = format!("{} {}\n", device.id, device.strength.round() as i32);
        self.pending.extend(line.bytes());
    }
}

impl Read for SimulatedPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            let now = Instant::now();
            let wait = self.next_due.saturating_duration_since(now);
            if wait > self.timeout {
                thread::sleep(self.timeout);
                return Err(ErrorKind::TimedOut.into());
            }
            thread::sleep(wait);
            self.next_due = Instant::now() + self.interval;
            self.emit();
        }

        let n = buf.len().min(self.pending.len());
        for (dst, src) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

/// The line a receiver prints when it hops to another wifi channel.
fn channel_notice(channel: u32) -> String {
    format!("chan {channel:2}\n")
}
