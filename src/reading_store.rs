//! The thread-safe store every port reader appends its samples into.

use crate::record::DeviceId;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

/// Index of a receiver, assigned in discovery order.
pub type ReceiverIndex = usize;

/// Identifies one animated element: a device as seen by one receiver.
pub type RenderKey = (DeviceId, ReceiverIndex);

/// A single signal strength reading and the wall time it arrived at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Signal strength as printed by the receiver, usually negative.
    pub strength: i32,
    /// Arrival time, see [`crate::seconds_passed`].
    pub timestamp: f64,
}

type Sequence = Arc<Mutex<Vec<Sample>>>;

/// Append-only mapping of device -> receiver -> samples in arrival order.
///
/// Each (device, receiver) sequence has its own lock, so readers on
/// different ports never wait on each other once their sequence exists.
/// The outer map is only write-locked the first time a pair is seen.
#[derive(Debug, Default)]
pub struct ReadingStore {
    devices: RwLock<HashMap<DeviceId, HashMap<ReceiverIndex, Sequence>>>,
}

impl ReadingStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn sequence(&self, device: &DeviceId, receiver: ReceiverIndex) -> Option<Sequence> {
        let devices = self.devices.read().unwrap_or_else(PoisonError::into_inner);
        devices.get(device)?.get(&receiver).cloned()
    }

    /// Appends a sample to the sequence for `(device, receiver)`, creating
    /// the sequence if this is the first sample for the pair.
    pub fn append(&self, device: DeviceId, receiver: ReceiverIndex, sample: Sample) {
        let seq = match self.sequence(&device, receiver) {
            Some(seq) => seq,
            None => self
                .devices
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(device)
                .or_default()
                .entry(receiver)
                .or_default()
                .clone(),
        };

        // Samples are only ever pushed, so a poisoned lock still guards a
        // sequence of complete elements.
        seq.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sample);
    }

    /// Copies out the most recent `count` samples (fewer if the pair has
    /// fewer), oldest first.
    pub fn snapshot_tail(
        &self,
        device: &DeviceId,
        receiver: ReceiverIndex,
        count: usize,
    ) -> Vec<Sample> {
        let Some(seq) = self.sequence(device, receiver) else {
            return Vec::new();
        };
        let seq = seq.lock().unwrap_or_else(PoisonError::into_inner);
        seq[seq.len().saturating_sub(count)..].to_vec()
    }

    /// Every pair that has at least one sample.
    pub fn keys(&self) -> Vec<RenderKey> {
        let devices = self.devices.read().unwrap_or_else(PoisonError::into_inner);
        devices
            .iter()
            .flat_map(|(device, receivers)| receivers.keys().map(|&r| (*device, r)))
            .collect()
    }

    /// Number of samples stored for a pair.
    pub fn len(&self, device: &DeviceId, receiver: ReceiverIndex) -> usize {
        self.sequence(device, receiver)
            .map(|seq| seq.lock().unwrap_or_else(PoisonError::into_inner).len())
            .unwrap_or(0)
    }

    /// True until the first sample arrives.
    pub fn is_empty(&self) -> bool {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}
