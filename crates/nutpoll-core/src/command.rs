//! Query command construction and synchronous invocation.
//!
//! A [`CommandSpec`] is the immutable description of one external invocation:
//! the token sequence plus optional search-path and dynamic-library-path
//! overrides. [`CommandSpec::run_query`] runs the command to completion and
//! parses its captured output into a key/value mapping.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::process::Command;

use log::{debug, warn};

use crate::error::Error;
use crate::parse::parse_fields;

/// An external command: program, arguments, and environment overrides.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    tokens: Vec<String>,
    path: Option<String>,
    ld_library_path: Option<String>,
}

impl CommandSpec {
    /// Build a spec from explicit tokens (program first).
    pub fn new(tokens: Vec<String>, path: Option<String>, ld_library_path: Option<String>) -> Self {
        Self {
            tokens,
            path,
            ld_library_path,
        }
    }

    /// Build a spec from a command line, split on whitespace.
    pub fn from_line(line: &str, path: Option<String>, ld_library_path: Option<String>) -> Self {
        let tokens = line.split_whitespace().map(str::to_string).collect();
        Self::new(tokens, path, ld_library_path)
    }

    /// The program token. Empty when the spec was built from an empty line;
    /// spawning then fails with a launch error instead of panicking.
    pub fn program(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or("")
    }

    /// The [`Command`] for this spec with its child environment: the current
    /// environment, the search path prepended when overridden, the
    /// dynamic-library path replaced when overridden.
    pub fn command(&self) -> Command {
        let mut command = Command::new(self.program());
        if self.tokens.len() > 1 {
            command.args(&self.tokens[1..]);
        }
        if let Some(path) = &self.path {
            let current = env::var("PATH").unwrap_or_default();
            command.env("PATH", format!("{path}:{current}"));
        }
        if let Some(ld_library_path) = &self.ld_library_path {
            command.env("LD_LIBRARY_PATH", ld_library_path);
        }
        command
    }

    /// Run the command to completion and parse its stdout into a key/value
    /// mapping.
    ///
    /// Blocks until the process exits; no timeout is enforced, so a hung
    /// command blocks the whole poll cycle. A spawn failure is a fatal
    /// [`Error::Launch`]. A non-zero exit status is logged and whatever
    /// stdout was captured is still parsed.
    pub fn run_query(&self) -> Result<HashMap<String, String>, Error> {
        debug!("run query '{self}'");
        let output = self.command().output().map_err(|e| Error::Launch {
            cmd: self.to_string(),
            source: e,
        })?;

        if !output.status.success() {
            warn!("query '{self}' exited with {}", output.status);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            if !line.trim().is_empty() {
                warn!("{}: {line}", self.program());
            }
        }

        Ok(parse_fields(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}
