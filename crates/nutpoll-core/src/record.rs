//! Observation records and the mapping from parsed fields.
//!
//! A record is a flat mapping from field name to numeric value, always
//! carrying an epoch timestamp and a unit-system tag. Only the fixed
//! observation fields are copied from the parsed mapping; everything else the
//! client reports is ignored.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::Error;

/// Unit system tag attached to every record, with the host's integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitSystem {
    Us,
    Metric,
}

impl UnitSystem {
    /// Integer code used by the host's storage layer.
    pub fn code(self) -> u8 {
        match self {
            Self::Us => 1,
            Self::Metric => 16,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Us => write!(f, "US"),
            Self::Metric => write!(f, "METRIC"),
        }
    }
}

/// The fields copied from a parsed reading, by client key. Record field names
/// are these keys with dots replaced by underscores.
pub const OBSERVATION_FIELDS: &[&str] = &[
    "battery.charge",
    "battery.runtime",
    "battery.voltage",
    "input.voltage",
    "output.voltage",
    "ups.load",
];

/// One observation: timestamp, unit system, and the numeric fields present in
/// the reading it was mapped from.
#[derive(Debug, Clone, Serialize)]
pub struct ObservationRecord {
    /// Seconds since the epoch, rounded.
    pub timestamp: i64,
    pub units: UnitSystem,
    pub fields: BTreeMap<String, f64>,
}

impl fmt::Display for ObservationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.timestamp, self.units)?;
        for (name, value) in &self.fields {
            write!(f, " {name}={value}")?;
        }
        Ok(())
    }
}

/// Current wall-clock time as rounded epoch seconds.
pub fn epoch_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
        .round() as i64
}

/// Build a record from a parsed key/value mapping.
///
/// Each observation field present in the mapping is parsed to a float and
/// stored under its underscore name; absent fields are simply omitted. A
/// present field whose value does not parse fails the whole record — no
/// partial record is produced.
pub fn map_reading(
    timestamp: i64,
    units: UnitSystem,
    reading: &HashMap<String, String>,
) -> Result<ObservationRecord, Error> {
    let mut fields = BTreeMap::new();
    for key in OBSERVATION_FIELDS {
        let Some(raw) = reading.get(*key) else {
            continue;
        };
        let value: f64 = raw.trim().parse().map_err(|_| Error::Conversion {
            field: (*key).to_string(),
            value: raw.clone(),
        })?;
        fields.insert(key.replace('.', "_"), value);
    }
    Ok(ObservationRecord {
        timestamp,
        units,
        fields,
    })
}
