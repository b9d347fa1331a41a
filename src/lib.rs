//! rssi-viz shows how close nearby radio devices are to a set of receivers.
//!
//! Each receiver is a small board attached over USB serial that prints one
//! line per sighting: the hardware address of the device it heard and the
//! signal strength it heard it at. The host runs one reader thread per
//! receiver, collecting those readings into a shared [`ReadingStore`], and a
//! frame loop that turns them into circles around each receiver. The weaker
//! the signal, the larger and dimmer the circle; devices that stop being
//! heard slowly fade to black.
//!
//! ```text
//! port readers -> reading store -> animator -> render queues -> renderer -> terminal
//! ```
//!
//! [`ReadingStore`]: reading_store::ReadingStore

#![warn(missing_docs)]
pub mod animator;
pub mod args;
pub mod discovery;
pub mod gui;
pub mod layout;
pub mod port_reader;
pub mod reading_store;
pub mod record;
pub mod renderer;
pub mod scene;
pub mod simulator;

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock time in seconds, as a float.
pub fn seconds_passed() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
