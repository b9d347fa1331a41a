//! One blocking reader per receiver, feeding the [`ReadingStore`].

use crate::reading_store::{ReadingStore, ReceiverIndex, Sample};
use crate::record::{parse_record, RecordError};
use crate::seconds_passed;

use log::{debug, error, info, trace, warn};
use std::{
    error::Error,
    fmt::Display,
    io::{self, BufRead, BufReader, ErrorKind, Read},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

/// Pause after a non-transient I/O error before reading again.
const ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// A stop signal shared by every reader. Cancelling is one-way.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks every holder of this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`CancelToken::cancel`] has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Why a reader stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderOutcome {
    /// The cancel token was set.
    Cancelled,
    /// The source reported end of file.
    EndOfStream,
}

/// A reader-fatal failure. Only the reader that hit it stops.
#[derive(Debug)]
pub enum ReaderError {
    /// A line was neither a record nor a noise line.
    Record(RecordError),
    /// Reading failed in a way that cannot be retried.
    IOError(io::Error),
}

impl Display for ReaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReaderError::Record(e) => write!(f, "malformed record: {e}"),
            ReaderError::IOError(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl Error for ReaderError {}

impl From<RecordError> for ReaderError {
    fn from(value: RecordError) -> Self {
        Self::Record(value)
    }
}

impl From<io::Error> for ReaderError {
    fn from(value: io::Error) -> Self {
        Self::IOError(value)
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

/// Owns one connection and appends every valid record it reads to the
/// store under its receiver index.
pub struct PortReader<R: Read> {
    index: ReceiverIndex,
    source: BufReader<R>,
    store: Arc<ReadingStore>,
    cancel: CancelToken,
}

impl<R: Read> PortReader<R> {
    /// A reader for receiver `index` that reads from `source`.
    pub fn new(
        index: ReceiverIndex,
        source: R,
        store: Arc<ReadingStore>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            index,
            source: BufReader::new(source),
            store,
            cancel,
        }
    }

    /// Reads until cancelled, until the source ends, or until a malformed
    /// record is seen.
    ///
    /// The source is expected to time out periodically when idle so the
    /// cancellation flag gets checked. A line cut off by a timeout is kept
    /// and completed by the next read.
    pub fn run(mut self) -> Result<ReaderOutcome, ReaderError> {
        let mut line = Vec::new();

        loop {
            let res = self.source.read_until(b'\n', &mut line);

            match res {
                Ok(0) => return Ok(ReaderOutcome::EndOfStream),
                Ok(_) if line.ends_with(b"\n") => {
                    self.handle_line(&line)?;
                    line.clear();
                }
                // a final line with no terminator, the next read reports EOF
                Ok(_) => {}
                Err(e) if is_transient(&e) => {}
                Err(e) => {
                    warn!("Receiver {}: read failed, retrying: {}", self.index, e);
                    thread::sleep(ERROR_BACKOFF);
                }
            }

            if self.cancel.is_cancelled() {
                return Ok(ReaderOutcome::Cancelled);
            }
        }
    }

    fn handle_line(&self, line: &[u8]) -> Result<(), ReaderError> {
        match parse_record(line)? {
            Some(record) => {
                self.store.append(
                    record.device,
                    self.index,
                    Sample {
                        strength: record.strength,
                        timestamp: seconds_passed(),
                    },
                );
            }
            None => trace!(
                "Receiver {}: skipping {:?}",
                self.index,
                String::from_utf8_lossy(line)
            ),
        }
        Ok(())
    }
}

impl<R: Read + Send + 'static> PortReader<R> {
    /// Runs the reader on its own named thread. The outcome is logged; the
    /// connection is dropped when the thread ends.
    pub fn spawn(self) -> io::Result<JoinHandle<Result<ReaderOutcome, ReaderError>>> {
        let index = self.index;
        thread::Builder::new()
            .name(format!("port-reader-{index}"))
            .spawn(move || {
                info!("Receiver {index}: reading");
                let res = self.run();
                match &res {
                    Ok(outcome) => debug!("Receiver {index}: stopped ({outcome:?})"),
                    Err(e) => error!("Receiver {index}: giving up, no further updates: {e}"),
                }
                res
            })
    }
}
