//! # nutpoll-core
//!
//! Poll UPS/PDU readings through a Network UPS Tools client and turn its text
//! output into timestamped observation records for a data-collection host.
//!
//! ## Quick Start
//!
//! ```no_run
//! use nutpoll_core::{DriverConfig, loader};
//!
//! let config = DriverConfig {
//!     device: "ups@localhost".to_string(),
//!     poll_interval: 30,
//!     ..DriverConfig::default()
//! };
//!
//! let mut driver = loader(config).expect("driver");
//! for record in driver.records().take(3) {
//!     println!("{}", record.expect("record"));
//! }
//! ```
//!
//! ## Architecture
//!
//! Command → process → parsed key/value reading → observation record
//!
//! Two variants share that pipeline:
//! - **Polling** ([`NutDriver`]): runs the query command to completion on
//!   every cycle and maps its captured output. Used for periodic sampling.
//! - **Streaming** ([`StreamingDriver`]): starts a long-lived client once;
//!   background readers drain its stdout/stderr into channels, and a batch
//!   assembler groups stdout lines into readings split at timestamp lines.
//!
//! Nothing is retried internally. Every fatal condition ends the record
//! sequence and it is the embedding application's decision to rebuild the
//! pipeline.

pub mod batch;
pub mod command;
pub mod config;
pub mod driver;
pub mod error;
pub mod parse;
pub mod proc;
pub mod reader;
pub mod record;
pub mod schema;

pub use batch::{BatchAssembler, DEFAULT_RECV_TIMEOUT};
pub use command::CommandSpec;
pub use config::DriverConfig;
pub use driver::{DRIVER_NAME, NutDriver, StreamingDriver, loader};
pub use error::Error;
pub use parse::{is_reading_boundary, parse_fields, parse_timestamp};
pub use proc::{ProcManager, READER_JOIN_TIMEOUT};
pub use reader::LineReader;
pub use record::{OBSERVATION_FIELDS, ObservationRecord, UnitSystem, epoch_now, map_reading};
pub use schema::{ARCHIVE_COLUMNS, ColumnSpec};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
