//! passroll: batch password rotation over interactive SSH shells
//!
//! This crate changes one account's password on a contiguous range of
//! hosts by driving the stock `passwd` dialogue through an interactive
//! shell. There is no structured protocol on the remote side, so every step
//! is decided by matching prompt keywords in free text under a timeout.
//!
//! # Architecture
//!
//! - [`target`]: expands `a.b.c` + `[start, end]` into ordered targets
//! - [`probe`]: authenticate-then-disconnect pre-filter
//! - [`dialog`]: the per-target state machine that runs `passwd`
//! - [`batch`]: probe, drive and account for every target
//! - [`channel`]: the shell-channel capability the engine consumes
//!
//! # Features
//!
//! - **SSH backend** over russh (feature: `ssh`, default)
//! - **Mock backend** with scripted and simulated hosts (feature: `mock`, default)
//! - **Unverified host keys** for lab networks (feature: `insecure-skip-verify`)
//!
//! # Example
//!
//! ```ignore
//! use passroll::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = RotationConfig::load(None)?;
//!     let opener = SshOpener::new(config.host_key_policy);
//!     let orchestrator = BatchOrchestrator::from_config(
//!         ConnectivityProber::new(opener.clone()),
//!         SessionDriver::new(opener, &config),
//!         &config,
//!     );
//!
//!     let targets = enumerate("192.168.1", 10, 20)?;
//!     let credentials = CredentialSet::new("old-secret", "new-secret")?;
//!     let report = orchestrator
//!         .run(&targets, &config.connect_params("admin"), &credentials, &Cancellation::never())
//!         .await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod batch;
pub mod channel;
pub mod config;
pub mod credential;
pub mod dialog;
pub mod error;
pub mod prelude;
pub mod probe;
pub mod redact;
pub mod target;
pub mod util;

/// Mock backend for testing.
#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(feature = "ssh")]
pub use backend::{KnownHosts, SshOpener, SshShell};
pub use batch::{BatchOrchestrator, BatchReport, FailedTarget, TargetResult};
pub use channel::{ChannelOpener, ConnectParams, ShellChannel};
pub use config::{HostKeyPolicy, LineEnding, LogFormat, RotationConfig};
pub use credential::{Credential, CredentialSet};
pub use dialog::{Drive, DialogueOutcome, DialogueState, KeywordSet, PromptTable, SessionDriver};
pub use error::{ChannelError, Result, RotationError};
pub use probe::{ConnectivityProber, Probe, Reachability};
pub use target::{Target, TargetRange, enumerate};
pub use util::{CancelHandle, Cancellation, cancellation};
