//! Configuration types for passroll.
//!
//! [`RotationConfig`] gathers every tunable of a batch. It is layered from
//! built-in defaults, an optional TOML file ([`file`]), and `PASSROLL_*`
//! environment variables ([`env`]); the CLI applies its flags last.

pub mod env;
pub mod file;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::channel::{ConnectParams, DEFAULT_PORT};
use crate::dialog::PromptTable;
use crate::error::{Result, RotationError};

/// Default per-prompt timeout (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time spent draining output after the final answer.
pub const DEFAULT_RESULT_GRACE: Duration = Duration::from_secs(3);

/// Default slice of a single read while waiting for a prompt.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default pause between targets in sequential mode.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// Default password-change command.
pub const DEFAULT_COMMAND: &str = "passwd";

/// Line terminator written after commands and secrets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Unix line feed.
    #[default]
    Lf,
    /// Carriage return only.
    Cr,
    /// Carriage return + line feed.
    Crlf,
}

impl LineEnding {
    /// The terminator bytes.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Cr => "\r",
            Self::Crlf => "\r\n",
        }
    }
}

/// SSH host key verification policy.
///
/// The default is [`HostKeyPolicy::Tofu`]: unknown hosts are accepted and
/// recorded in `known_hosts`, but a changed key is always rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum HostKeyPolicy {
    /// Require the host to be present in `known_hosts` with a matching key.
    KnownHosts,
    /// Trust on first use.
    #[default]
    Tofu,
    /// Accept any key without verification.
    ///
    /// Only available with the `insecure-skip-verify` feature.
    #[cfg(feature = "insecure-skip-verify")]
    AcceptAll,
}

impl FromStr for HostKeyPolicy {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "known-hosts" | "known_hosts" | "strict" => Ok(Self::KnownHosts),
            "tofu" => Ok(Self::Tofu),
            #[cfg(feature = "insecure-skip-verify")]
            "accept-all" | "accept_all" => Ok(Self::AcceptAll),
            other => Err(RotationError::config(format!(
                "unknown host key policy '{other}'"
            ))),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-field output.
    #[default]
    Pretty,
    /// Single-line compact output.
    Compact,
    /// JSON objects, one per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(RotationError::config(format!("unknown log format '{other}'"))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        })
    }
}

/// Every tunable of a rotation batch.
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Bound on connection setup and on each awaited prompt.
    pub timeout: Duration,

    /// How long output is drained after the confirmation is sent.
    pub result_grace: Duration,

    /// Upper bound of a single read while waiting.
    pub poll_interval: Duration,

    /// Pause between targets when running sequentially.
    pub pacing: Duration,

    /// Number of targets processed at once.
    pub concurrency: usize,

    /// The password-change command issued on each host.
    pub command: String,

    /// Terminator written after the command and each secret.
    pub line_ending: LineEnding,

    /// Remote SSH port.
    pub port: u16,

    /// Host key verification policy.
    pub host_key_policy: HostKeyPolicy,

    /// Keyword sets recognised in remote output.
    pub prompts: PromptTable,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            result_grace: DEFAULT_RESULT_GRACE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            pacing: DEFAULT_PACING,
            concurrency: 1,
            command: DEFAULT_COMMAND.to_string(),
            line_ending: LineEnding::default(),
            port: DEFAULT_PORT,
            host_key_policy: HostKeyPolicy::default(),
            prompts: PromptTable::default(),
        }
    }
}

impl RotationConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load defaults, then `path` if given, then `PASSROLL_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = path {
            file::FileConfig::load(path)?.apply(&mut config);
        }
        env::EnvConfig::default().apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the per-prompt timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the result grace period.
    #[must_use]
    pub const fn result_grace(mut self, grace: Duration) -> Self {
        self.result_grace = grace;
        self
    }

    /// Set the poll interval.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the pacing delay between targets.
    #[must_use]
    pub const fn pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Set how many targets run at once.
    #[must_use]
    pub const fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the password-change command.
    #[must_use]
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Set the line ending.
    #[must_use]
    pub const fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Set the SSH port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the host key policy.
    #[must_use]
    pub const fn host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    /// Replace the prompt table.
    #[must_use]
    pub fn prompts(mut self, prompts: PromptTable) -> Self {
        self.prompts = prompts;
        self
    }

    /// Connection parameters for `username` under this configuration.
    #[must_use]
    pub fn connect_params(&self, username: impl Into<String>) -> ConnectParams {
        ConnectParams::new(username)
            .port(self.port)
            .timeout(self.timeout)
    }

    /// Reject values that would make a batch meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(RotationError::config("timeout must be greater than zero"));
        }
        if self.poll_interval.is_zero() {
            return Err(RotationError::config(
                "poll interval must be greater than zero",
            ));
        }
        if self.concurrency == 0 {
            return Err(RotationError::config("concurrency must be at least 1"));
        }
        if self.command.trim().is_empty() {
            return Err(RotationError::config("command must not be empty"));
        }
        self.prompts.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behaviour() {
        let config = RotationConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.result_grace, Duration::from_secs(3));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.pacing, Duration::from_secs(1));
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.command, "passwd");
        assert_eq!(config.line_ending.as_str(), "\n");
        assert_eq!(config.host_key_policy, HostKeyPolicy::Tofu);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_setters() {
        let config = RotationConfig::new()
            .timeout(Duration::from_secs(5))
            .concurrency(4)
            .port(2222)
            .command("sudo passwd admin")
            .line_ending(LineEnding::Crlf);

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.command, "sudo passwd admin");
        assert_eq!(config.line_ending.as_str(), "\r\n");

        let params = config.connect_params("ops");
        assert_eq!(params.username, "ops");
        assert_eq!(params.port, 2222);
        assert_eq!(params.timeout, Duration::from_secs(5));
    }

    #[test]
    fn validate_rejects_nonsense() {
        assert!(RotationConfig::new().concurrency(0).validate().is_err());
        assert!(RotationConfig::new().timeout(Duration::ZERO).validate().is_err());
        assert!(RotationConfig::new().command("  ").validate().is_err());
    }

    #[test]
    fn parse_enums() {
        assert_eq!("tofu".parse::<HostKeyPolicy>().unwrap(), HostKeyPolicy::Tofu);
        assert_eq!(
            "known-hosts".parse::<HostKeyPolicy>().unwrap(),
            HostKeyPolicy::KnownHosts
        );
        assert!("yolo".parse::<HostKeyPolicy>().is_err());

        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::Compact.to_string(), "compact");
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
