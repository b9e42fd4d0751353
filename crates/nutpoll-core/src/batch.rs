//! Grouping of streamed output lines into reading batches.
//!
//! A batch is the run of lines belonging to one logical reading. A line
//! matching the leading-timestamp pattern closes the batch in progress and
//! opens the next one; a receive timeout flushes whatever has accumulated so
//! the consumer can re-check process liveness between flushes.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::parse::is_reading_boundary;

/// Default bounded wait per received line.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Consumer end of the stdout channel, batching lines by reading boundary.
pub struct BatchAssembler {
    rx: Receiver<String>,
    timeout: Duration,
    pending: Vec<String>,
}

impl BatchAssembler {
    pub fn new(rx: Receiver<String>) -> Self {
        Self::with_timeout(rx, DEFAULT_RECV_TIMEOUT)
    }

    pub fn with_timeout(rx: Receiver<String>, timeout: Duration) -> Self {
        Self {
            rx,
            timeout,
            pending: Vec::new(),
        }
    }

    /// Block until the next batch is complete.
    ///
    /// A boundary line arriving while lines are buffered flushes the buffered
    /// batch and becomes the first member of the next one, so a batch never
    /// starts mid-reading. When no line arrives within the timeout (or the
    /// sender is gone), whatever has accumulated is flushed — possibly an
    /// empty batch, which bounds the caller's wait latency.
    pub fn next_batch(&mut self) -> Vec<String> {
        loop {
            match self.rx.recv_timeout(self.timeout) {
                Ok(line) => {
                    if is_reading_boundary(&line) && !self.pending.is_empty() {
                        return std::mem::replace(&mut self.pending, vec![line]);
                    }
                    self.pending.push(line);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return std::mem::take(&mut self.pending);
                }
            }
        }
    }

    /// Final non-blocking flush: everything still queued plus the buffered
    /// lines, as one batch. Used once after the process has died.
    pub fn drain(&mut self) -> Vec<String> {
        while let Ok(line) = self.rx.try_recv() {
            self.pending.push(line);
        }
        std::mem::take(&mut self.pending)
    }
}
