//! Background line reader for one process output stream.
//!
//! One [`LineReader`] per stream. The reader thread owns exclusive read access
//! to its stream and sends each non-empty line into an mpsc channel; the
//! consumer owns the receiving end. Stopping is cooperative: the flag is
//! checked once per line, so a stop is only observed after the current
//! blocking read returns. In practice killing the process closes the stream
//! and unblocks the read.

use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

/// Reader thread state: the stop flag and the join handle.
pub struct LineReader {
    label: &'static str,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl LineReader {
    /// Spawn a reader thread draining `stream` into `tx` line by line.
    ///
    /// Empty lines are dropped. The thread ends when the stream closes, the
    /// channel is disconnected, or a stop is requested.
    pub fn spawn<R>(label: &'static str, stream: R, tx: Sender<String>) -> Self
    where
        R: Read + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::spawn(move || {
            debug!("start {label} reader");
            let reader = BufReader::new(stream);
            for line in reader.lines() {
                let Ok(line) = line else { break };
                if !line.is_empty() && tx.send(line).is_err() {
                    break;
                }
                if !flag.load(Ordering::SeqCst) {
                    break;
                }
            }
            debug!("{label} reader finished");
        });
        Self {
            label,
            running,
            handle: Some(handle),
        }
    }

    /// Request a stop. Observed at the next line iteration.
    pub fn stop_running(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the reader thread is still running.
    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Bounded wait for the reader thread to finish.
    ///
    /// Returns `true` when the thread ended within `timeout`. On timeout the
    /// thread is left running (it cannot be preempted mid-read) and a warning
    /// is logged; it will end on its own once the stream closes.
    pub fn join(&mut self, timeout: Duration) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };
        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!("timed out waiting for {} reader", self.label);
                self.handle = Some(handle);
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
        let _ = handle.join();
        true
    }
}
