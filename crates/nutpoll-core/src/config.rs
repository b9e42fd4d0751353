//! Driver configuration.
//!
//! The embedding application hands the driver a configuration mapping; this
//! struct is its typed form. Every option has a default so a bare `{}` stanza
//! produces a working driver that polls `upsc ups` every 30 seconds.

use std::time::Duration;

use serde::Deserialize;

use crate::command::CommandSpec;

/// Default query command. The device identifier is appended as its final
/// argument.
pub const DEFAULT_CMD: &str = "upsc";

/// Default device identifier (`<upsname>[@<hostname>[:<port>]]`).
pub const DEFAULT_DEVICE: &str = "ups";

/// Default hardware name reported to the host.
pub const DEFAULT_MODEL: &str = "NUT";

/// Default seconds between synchronous polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Recognized driver options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Device identifier passed to the query command.
    pub device: String,
    /// Query command with options; split on whitespace into tokens.
    pub cmd: String,
    /// Seconds between synchronous polls.
    pub poll_interval: u64,
    /// Prepended to the child's search path when set.
    pub path: Option<String>,
    /// Overrides the child's dynamic-library path when set.
    pub ld_library_path: Option<String>,
    /// Hardware name reported to the host.
    pub model: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            cmd: DEFAULT_CMD.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL_SECS,
            path: None,
            ld_library_path: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl DriverConfig {
    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    /// The query command for this configuration: the configured command
    /// tokens with the device identifier appended, carrying the path
    /// overrides.
    pub fn query_spec(&self) -> CommandSpec {
        let mut tokens: Vec<String> = self.cmd.split_whitespace().map(str::to_string).collect();
        tokens.push(self.device.clone());
        CommandSpec::new(tokens, self.path.clone(), self.ld_library_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.device, "ups");
        assert_eq!(config.cmd, "upsc");
        assert_eq!(config.poll_interval, 30);
        assert_eq!(config.model, "NUT");
        assert!(config.path.is_none());
        assert!(config.ld_library_path.is_none());
    }

    #[test]
    fn empty_stanza_deserializes_to_defaults() {
        let config: DriverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.device, "ups");
        assert_eq!(config.poll_interval, 30);
    }

    #[test]
    fn stanza_overrides_are_applied() {
        let config: DriverConfig = serde_json::from_str(
            r#"{"device": "rack@10.0.0.5", "poll_interval": 10, "path": "/opt/nut/bin"}"#,
        )
        .unwrap();
        assert_eq!(config.device, "rack@10.0.0.5");
        assert_eq!(config.poll_interval, 10);
        assert_eq!(config.path.as_deref(), Some("/opt/nut/bin"));
        // untouched options keep their defaults
        assert_eq!(config.model, "NUT");
    }

    #[test]
    fn query_spec_appends_device() {
        let config = DriverConfig {
            cmd: "upsc -s".to_string(),
            device: "rack@localhost".to_string(),
            ..DriverConfig::default()
        };
        let spec = config.query_spec();
        assert_eq!(spec.to_string(), "upsc -s rack@localhost");
    }

    #[test]
    fn poll_interval_duration() {
        let config = DriverConfig {
            poll_interval: 5,
            ..DriverConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
    }
}
