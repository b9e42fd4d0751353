//! Lifecycle of the long-lived client process.
//!
//! [`ProcManager`] owns the child process, its two output pipes, and the two
//! background readers draining them. It is created on startup and torn down
//! exactly once on shutdown; after a shutdown the handles are gone and every
//! accessor reports the process as not running.

use std::io;
use std::process::{Child, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use log::{debug, info, warn};

use crate::batch::BatchAssembler;
use crate::command::CommandSpec;
use crate::error::Error;
use crate::reader::LineReader;

/// Bounded wait for each reader thread at shutdown.
pub const READER_JOIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Owns the streaming client process and its reader threads.
pub struct ProcManager {
    cmd: CommandSpec,
    child: Option<Child>,
    stdout: Option<BatchAssembler>,
    stdout_reader: Option<LineReader>,
    stderr_rx: Option<Receiver<String>>,
    stderr_reader: Option<LineReader>,
}

impl ProcManager {
    /// Spawn the client process and wire up both stream readers.
    pub fn startup(cmd: CommandSpec) -> Result<Self, Error> {
        info!("startup process '{cmd}'");
        let mut child = cmd
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Launch {
                cmd: cmd.to_string(),
                source: e,
            })?;

        let (Some(stdout_pipe), Some(stderr_pipe)) = (child.stdout.take(), child.stderr.take())
        else {
            return Err(Error::Launch {
                cmd: cmd.to_string(),
                source: io::Error::other("failed to capture output pipes"),
            });
        };

        let (stdout_tx, stdout_rx) = mpsc::channel();
        let (stderr_tx, stderr_rx) = mpsc::channel();
        let stdout_reader = LineReader::spawn("stdout", stdout_pipe, stdout_tx);
        let stderr_reader = LineReader::spawn("stderr", stderr_pipe, stderr_tx);

        Ok(Self {
            cmd,
            child: Some(child),
            stdout: Some(BatchAssembler::new(stdout_rx)),
            stdout_reader: Some(stdout_reader),
            stderr_rx: Some(stderr_rx),
            stderr_reader: Some(stderr_reader),
        })
    }

    /// Whether the client process is still running.
    pub fn running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Everything queued on stderr, without blocking.
    pub fn drain_stderr(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(rx) = &self.stderr_rx {
            while let Ok(line) = rx.try_recv() {
                lines.push(line);
            }
        }
        lines
    }

    /// The next stdout batch, waiting up to the assembler timeout.
    pub fn next_batch(&mut self) -> Vec<String> {
        self.stdout
            .as_mut()
            .map(BatchAssembler::next_batch)
            .unwrap_or_default()
    }

    /// One final non-blocking flush of whatever stdout lines remain.
    pub fn final_flush(&mut self) -> Vec<String> {
        self.stdout
            .as_mut()
            .map(BatchAssembler::drain)
            .unwrap_or_default()
    }

    /// Lazy sequence of stdout batches.
    ///
    /// Yields batches while the process runs, checking liveness on every
    /// iteration; after the process dies it yields one final flush of the
    /// remaining lines and then ends. Not restartable in the sense that
    /// consumed lines are gone; a fresh iterator continues where the last
    /// one stopped.
    pub fn batches(&mut self) -> Batches<'_> {
        Batches {
            mgr: self,
            done: false,
        }
    }

    /// Tear the process down: kill it, reap it, stop and join both readers
    /// with a bounded wait. A reader still alive after the wait is logged as
    /// a warning and abandoned; the closed pipe ends it in practice. Calling
    /// this twice is harmless.
    pub fn shutdown(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        info!("shutdown process '{}'", self.cmd);
        if let Err(e) = child.kill() {
            warn!("process did not respond to kill: {e}");
        }
        match child.wait() {
            Ok(status) => debug!("process exited with {status}"),
            Err(e) => warn!("failed to reap process: {e}"),
        }

        if let Some(mut reader) = self.stdout_reader.take() {
            debug!("shutdown stdout reader");
            reader.stop_running();
            reader.join(READER_JOIN_TIMEOUT);
        }
        if let Some(mut reader) = self.stderr_reader.take() {
            debug!("shutdown stderr reader");
            reader.stop_running();
            reader.join(READER_JOIN_TIMEOUT);
        }

        self.stdout = None;
        self.stderr_rx = None;
        info!("shutdown complete");
    }
}

impl Drop for ProcManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Iterator over stdout batches; see [`ProcManager::batches`].
pub struct Batches<'a> {
    mgr: &'a mut ProcManager,
    done: bool,
}

impl Iterator for Batches<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Vec<String>> {
        if self.done {
            return None;
        }
        if !self.mgr.running() {
            self.done = true;
            return Some(self.mgr.final_flush());
        }
        Some(self.mgr.next_batch())
    }
}
