//! File-based configuration loading.
//!
//! ```toml
//! [session]
//! timeout_secs = 20
//! result_grace_ms = 2000
//! command = "passwd"
//!
//! [batch]
//! concurrency = 4
//! pacing_ms = 0
//!
//! [ssh]
//! port = 2222
//! host_key_policy = "known-hosts"
//!
//! [prompts]
//! confirm = ["repeat"]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::{HostKeyPolicy, LineEnding, RotationConfig};
use crate::dialog::PromptTable;
use crate::error::{Result, RotationError};

/// Contents of a configuration file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Dialogue settings.
    pub session: SessionSection,
    /// Batch settings.
    pub batch: BatchSection,
    /// SSH transport settings.
    pub ssh: SshSection,
    /// Keyword overrides.
    pub prompts: PromptsSection,
}

/// `[session]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionSection {
    /// Per-prompt timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Result grace period in milliseconds.
    pub result_grace_ms: Option<u64>,
    /// Poll slice in milliseconds.
    pub poll_interval_ms: Option<u64>,
    /// Password-change command.
    pub command: Option<String>,
    /// Line terminator (`lf`, `cr`, `crlf`).
    pub line_ending: Option<LineEnding>,
}

/// `[batch]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchSection {
    /// Targets processed at once.
    pub concurrency: Option<usize>,
    /// Pause between sequential targets in milliseconds.
    pub pacing_ms: Option<u64>,
}

/// `[ssh]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SshSection {
    /// Remote port.
    pub port: Option<u16>,
    /// Host key verification policy.
    pub host_key_policy: Option<HostKeyPolicy>,
}

/// `[prompts]` table.
///
/// Lists extend the built-in keyword sets unless `replace_defaults` is set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PromptsSection {
    /// Start from empty keyword sets instead of the built-in ones.
    pub replace_defaults: bool,
    /// Keywords of the current-password prompt.
    pub current: Vec<String>,
    /// Keywords of the new-password prompt.
    pub new: Vec<String>,
    /// Keywords of the confirmation prompt.
    pub confirm: Vec<String>,
    /// Keywords of a successful result.
    pub success: Vec<String>,
    /// Keywords of a failed result.
    pub failure: Vec<String>,
}

impl FileConfig {
    /// Load and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RotationError::io_context(format!("reading config file {}", path.display()), e)
        })?;
        Self::parse(&content)
    }

    /// Parse TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RotationError::config(e.to_string()))
    }

    /// Layer the values present in the file over `config`.
    pub fn apply(self, config: &mut RotationConfig) {
        let Self {
            session,
            batch,
            ssh,
            prompts,
        } = self;

        if let Some(secs) = session.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = session.result_grace_ms {
            config.result_grace = Duration::from_millis(ms);
        }
        if let Some(ms) = session.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(command) = session.command {
            config.command = command;
        }
        if let Some(line_ending) = session.line_ending {
            config.line_ending = line_ending;
        }

        if let Some(concurrency) = batch.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(ms) = batch.pacing_ms {
            config.pacing = Duration::from_millis(ms);
        }

        if let Some(port) = ssh.port {
            config.port = port;
        }
        if let Some(policy) = ssh.host_key_policy {
            config.host_key_policy = policy;
        }

        prompts.apply(&mut config.prompts);
    }
}

impl PromptsSection {
    fn apply(self, table: &mut PromptTable) {
        if self.replace_defaults {
            *table = PromptTable::empty();
        }
        table.current.extend(self.current);
        table.new.extend(self.new);
        table.confirm.extend(self.confirm);
        table.success.extend(self.success);
        table.failure.extend(self.failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let mut config = RotationConfig::default();
        FileConfig::parse("").unwrap().apply(&mut config);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.command, "passwd");
    }

    #[test]
    fn sections_override_defaults() {
        let content = r#"
            [session]
            timeout_secs = 12
            result_grace_ms = 750
            command = "sudo passwd deploy"
            line_ending = "crlf"

            [batch]
            concurrency = 8
            pacing_ms = 0

            [ssh]
            port = 2200
            host_key_policy = "known-hosts"
        "#;

        let mut config = RotationConfig::default();
        FileConfig::parse(content).unwrap().apply(&mut config);

        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.result_grace, Duration::from_millis(750));
        assert_eq!(config.command, "sudo passwd deploy");
        assert_eq!(config.line_ending, LineEnding::Crlf);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.pacing, Duration::ZERO);
        assert_eq!(config.port, 2200);
        assert_eq!(config.host_key_policy, HostKeyPolicy::KnownHosts);
    }

    #[test]
    fn prompts_extend_by_default() {
        let content = r#"
            [prompts]
            confirm = ["repeat"]
        "#;

        let mut config = RotationConfig::default();
        FileConfig::parse(content).unwrap().apply(&mut config);

        assert!(config.prompts.confirm.matches("Repeat password:"));
        assert!(config.prompts.confirm.matches("Retype new password:"));
    }

    #[test]
    fn prompts_can_replace_defaults() {
        let content = r#"
            [prompts]
            replace_defaults = true
            current = ["old password"]
            new = ["enter new"]
            confirm = ["re-enter"]
            success = ["changed"]
        "#;

        let mut config = RotationConfig::default();
        FileConfig::parse(content).unwrap().apply(&mut config);

        assert!(config.prompts.current.matches("Old Password:"));
        assert!(!config.prompts.current.matches("Current password:"));
        assert!(config.prompts.failure.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FileConfig::parse("[session]\ntimeout = 5\n").unwrap_err();
        assert!(matches!(err, RotationError::Config { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = FileConfig::load(Path::new("/nonexistent/passroll.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/passroll.toml"));
    }
}
