//! Driver error taxonomy.
//!
//! Every fatal condition ends the current record sequence; nothing is retried
//! internally. Restarting the pipeline is the caller's decision.

use std::io;

use thiserror::Error;

/// Errors surfaced by the driver.
#[derive(Debug, Error)]
pub enum Error {
    /// The external command could not be started (missing executable, bad
    /// arguments). Fatal for the current poll cycle.
    #[error("failed to start process '{cmd}': {source}")]
    Launch {
        cmd: String,
        #[source]
        source: io::Error,
    },

    /// A selected field's text value could not be converted to a number.
    /// Fatal for the record being assembled; no partial record is produced.
    #[error("cannot convert '{value}' to a number for field '{field}'")]
    Conversion { field: String, value: String },

    /// The external client process was observed not running.
    #[error("nut client not running")]
    ProcessDied,
}
