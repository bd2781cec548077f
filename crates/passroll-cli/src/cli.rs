//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use passroll::{HostKeyPolicy, LogFormat, RotationConfig, TargetRange};

/// Rotate an account's password across a range of SSH hosts.
///
/// Values not given as flags are asked for interactively. Passwords are
/// always read from the terminal without echo.
#[derive(Debug, Parser)]
#[command(name = "passroll", version)]
pub struct CommandLine {
    /// Login name on every host
    #[arg(short, long, env = "PASSROLL_USER")]
    pub user: Option<String>,

    /// Address range, e.g. 192.168.1.10-20
    #[arg(short, long, conflicts_with_all = ["base", "start", "end"])]
    pub range: Option<TargetRange>,

    /// First three octets of the range, e.g. 192.168.1
    #[arg(long)]
    pub base: Option<String>,

    /// First value of the last octet
    #[arg(long, allow_negative_numbers = true)]
    pub start: Option<i64>,

    /// Last value of the last octet (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    pub end: Option<i64>,

    /// TOML configuration file
    #[arg(short, long, env = "PASSROLL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Hosts processed at once
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Seconds to wait for the connection and for each prompt
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Remote SSH port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host key policy: tofu or known-hosts
    #[arg(long)]
    pub host_key_policy: Option<HostKeyPolicy>,

    /// Password-change command run on each host
    #[arg(long = "passwd-command", value_name = "COMMAND")]
    pub passwd_command: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Log format: pretty, compact or json
    #[arg(long, default_value = "pretty", env = "PASSROLL_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// More log output (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CommandLine {
    /// Parse the process arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Layer flag values over a loaded configuration.
    pub fn apply(&self, mut config: RotationConfig) -> RotationConfig {
        if let Some(concurrency) = self.concurrency {
            config = config.concurrency(concurrency);
        }
        if let Some(secs) = self.timeout {
            config = config.timeout(Duration::from_secs(secs));
        }
        if let Some(port) = self.port {
            config = config.port(port);
        }
        if let Some(policy) = self.host_key_policy {
            config = config.host_key_policy(policy);
        }
        if let Some(command) = &self.passwd_command {
            config = config.command(command.clone());
        }
        config
    }
}
