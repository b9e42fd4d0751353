//! The drivers the host loads: synchronous polling and streaming.
//!
//! Both drivers expose a hardware name, a close operation, and a lazy record
//! sequence. The sequence ends the moment a fatal condition is observed;
//! neither driver self-heals. Recreating the driver after a failure is the
//! caller's job.

use std::thread;
use std::time::Duration;

use log::{debug, error, info};

use crate::command::CommandSpec;
use crate::config::DriverConfig;
use crate::error::Error;
use crate::parse::{parse_fields, parse_timestamp};
use crate::proc::ProcManager;
use crate::record::{ObservationRecord, UnitSystem, epoch_now, map_reading};

/// Name this driver registers under.
pub const DRIVER_NAME: &str = "NUT";

/// Factory the host calls with the typed configuration stanza.
pub fn loader(config: DriverConfig) -> Result<NutDriver, Error> {
    NutDriver::new(config)
}

/// Synchronous polling driver: sleep the poll interval, run the query command
/// to completion, map one record.
pub struct NutDriver {
    model: String,
    query: CommandSpec,
    poll_interval: Duration,
}

impl NutDriver {
    pub fn new(config: DriverConfig) -> Result<Self, Error> {
        info!("driver version is {}", crate::VERSION);
        info!("model is {}", config.model);
        info!("device is {}", config.device);
        Ok(Self {
            query: config.query_spec(),
            poll_interval: config.poll_interval(),
            model: config.model,
        })
    }

    /// Read-only hardware name shown by the host.
    pub fn hardware_name(&self) -> &str {
        &self.model
    }

    /// Release driver resources. The synchronous variant holds nothing open
    /// between polls.
    pub fn close(&mut self) {}

    /// One poll cycle: run the query and map the reading at the current time.
    pub fn poll_once(&self) -> Result<ObservationRecord, Error> {
        let reading = self.query.run_query()?;
        map_reading(epoch_now(), UnitSystem::Metric, &reading)
    }

    /// Lazy record sequence. Each iteration sleeps the poll interval and then
    /// polls once; the first error ends the sequence.
    pub fn records(&mut self) -> impl Iterator<Item = Result<ObservationRecord, Error>> + '_ {
        let mut failed = false;
        std::iter::from_fn(move || {
            if failed {
                return None;
            }
            if !self.poll_interval.is_zero() {
                thread::sleep(self.poll_interval);
            }
            let result = self.poll_once();
            failed = result.is_err();
            Some(result)
        })
    }
}

/// Streaming driver: a long-lived client process tailed through background
/// readers, one record per batch of lines.
pub struct StreamingDriver {
    model: String,
    mgr: ProcManager,
}

impl StreamingDriver {
    pub fn new(config: DriverConfig) -> Result<Self, Error> {
        info!("driver version is {}", crate::VERSION);
        info!("model is {}", config.model);
        let mgr = ProcManager::startup(config.query_spec())?;
        Ok(Self {
            model: config.model,
            mgr,
        })
    }

    pub fn hardware_name(&self) -> &str {
        &self.model
    }

    /// Shut the client process and its readers down.
    pub fn close(&mut self) {
        self.mgr.shutdown();
    }

    /// Lazy record sequence. Ends with [`Error::ProcessDied`] once the client
    /// process is observed not running; any remaining lines are mapped into a
    /// last record first.
    pub fn records(&mut self) -> Records<'_> {
        Records {
            driver: self,
            done: false,
            died: false,
        }
    }

    fn record_from_batch(&self, batch: &[String]) -> Result<ObservationRecord, Error> {
        debug!("batch of {} lines", batch.len());
        let timestamp = batch
            .first()
            .and_then(|line| parse_timestamp(line))
            .unwrap_or_else(epoch_now);
        let reading = parse_fields(&batch.join("\n"));
        map_reading(timestamp, UnitSystem::Metric, &reading)
    }
}

/// Record iterator for [`StreamingDriver`].
pub struct Records<'a> {
    driver: &'a mut StreamingDriver,
    done: bool,
    died: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<ObservationRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.died {
            self.done = true;
            return Some(Err(Error::ProcessDied));
        }
        loop {
            for line in self.driver.mgr.drain_stderr() {
                error!("{line}");
            }
            let alive = self.driver.mgr.running();
            let batch = if alive {
                self.driver.mgr.next_batch()
            } else {
                self.died = true;
                self.driver.mgr.final_flush()
            };
            if batch.is_empty() {
                if self.died {
                    self.done = true;
                    return Some(Err(Error::ProcessDied));
                }
                // bounded-wait flush with nothing in it; re-check liveness
                continue;
            }
            let result = self.driver.record_from_batch(&batch);
            if result.is_err() {
                // fatal for the sequence, like every other failure
                self.done = true;
            }
            return Some(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_reports_hardware_name() {
        let config = DriverConfig {
            model: "Back-UPS 650".to_string(),
            ..DriverConfig::default()
        };
        let driver = loader(config).unwrap();
        assert_eq!(driver.hardware_name(), "Back-UPS 650");
    }

    #[test]
    fn default_hardware_name_is_driver_name() {
        let driver = loader(DriverConfig::default()).unwrap();
        assert_eq!(driver.hardware_name(), DRIVER_NAME);
    }

    #[test]
    fn launch_failure_ends_the_sequence() {
        let config = DriverConfig {
            cmd: "/nonexistent/binary-xyz-12345".to_string(),
            poll_interval: 0,
            ..DriverConfig::default()
        };
        let mut driver = loader(config).unwrap();
        let mut records = driver.records();
        match records.next() {
            Some(Err(Error::Launch { .. })) => {}
            other => panic!("expected launch error, got {:?}", other.is_some()),
        }
        assert!(records.next().is_none());
    }

    #[test]
    fn streaming_launch_failure_is_immediate() {
        let config = DriverConfig {
            cmd: "/nonexistent/binary-xyz-12345".to_string(),
            ..DriverConfig::default()
        };
        match StreamingDriver::new(config) {
            Err(Error::Launch { .. }) => {}
            other => panic!("expected launch error, got {:?}", other.is_ok()),
        }
    }
}
