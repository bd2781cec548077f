//! Environment-based configuration.

use std::collections::HashMap;
use std::time::Duration;

use super::RotationConfig;
use crate::error::{Result, RotationError};

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "PASSROLL";

/// Recognised variable names (without prefix).
pub mod vars {
    /// Per-prompt timeout in seconds.
    pub const TIMEOUT: &str = "TIMEOUT";
    /// Result grace period in milliseconds.
    pub const RESULT_GRACE_MS: &str = "RESULT_GRACE_MS";
    /// Targets processed at once.
    pub const CONCURRENCY: &str = "CONCURRENCY";
    /// Pause between sequential targets in milliseconds.
    pub const PACING_MS: &str = "PACING_MS";
    /// Remote SSH port.
    pub const PORT: &str = "PORT";
    /// Password-change command.
    pub const COMMAND: &str = "COMMAND";
    /// Host key policy.
    pub const HOST_KEY_POLICY: &str = "HOST_KEY_POLICY";
}

/// Environment variable reader.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
    /// Fixed values used instead of the process environment.
    source: Option<HashMap<String, String>>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Create a reader over the process environment.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            source: None,
        }
    }

    /// Create a reader over a fixed set of variables.
    #[must_use]
    pub fn from_map(prefix: impl Into<String>, vars: HashMap<String, String>) -> Self {
        Self {
            prefix: prefix.into(),
            source: Some(vars),
        }
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        match &self.source {
            Some(map) => map.get(&var_name).cloned(),
            None => std::env::var(&var_name).ok(),
        }
    }

    /// Get a parsed value, failing on malformed input.
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>> {
        self.get(name)
            .map(|raw| {
                raw.trim().parse().map_err(|_| {
                    RotationError::config(format!(
                        "{} has invalid value '{raw}'",
                        self.var_name(name)
                    ))
                })
            })
            .transpose()
    }

    /// Get a duration given in seconds.
    pub fn duration_secs(&self, name: &str) -> Result<Option<Duration>> {
        Ok(self.parse::<u64>(name)?.map(Duration::from_secs))
    }

    /// Get a duration given in milliseconds.
    pub fn duration_millis(&self, name: &str) -> Result<Option<Duration>> {
        Ok(self.parse::<u64>(name)?.map(Duration::from_millis))
    }

    /// Layer the variables present in the environment over `config`.
    pub fn apply(&self, config: &mut RotationConfig) -> Result<()> {
        if let Some(timeout) = self.duration_secs(vars::TIMEOUT)? {
            config.timeout = timeout;
        }
        if let Some(grace) = self.duration_millis(vars::RESULT_GRACE_MS)? {
            config.result_grace = grace;
        }
        if let Some(concurrency) = self.parse(vars::CONCURRENCY)? {
            config.concurrency = concurrency;
        }
        if let Some(pacing) = self.duration_millis(vars::PACING_MS)? {
            config.pacing = pacing;
        }
        if let Some(port) = self.parse(vars::PORT)? {
            config.port = port;
        }
        if let Some(command) = self.get(vars::COMMAND) {
            config.command = command;
        }
        if let Some(policy) = self.parse(vars::HOST_KEY_POLICY)? {
            config.host_key_policy = policy;
        }
        Ok(())
    }
}
