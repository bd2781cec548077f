//! Convenient re-exports for common passroll usage.
//!
//! ```ignore
//! use passroll::prelude::*;
//! ```

// Inputs
pub use crate::credential::{Credential, CredentialSet};
pub use crate::target::{Target, TargetRange, enumerate};

// Configuration
pub use crate::config::{HostKeyPolicy, LineEnding, RotationConfig};

// Error handling
pub use crate::error::{ChannelError, Result, RotationError};

// Engine
pub use crate::batch::{BatchOrchestrator, BatchReport};
pub use crate::channel::{ChannelOpener, ConnectParams, ShellChannel};
pub use crate::dialog::{Drive, DialogueOutcome, SessionDriver};
pub use crate::probe::{ConnectivityProber, Probe, Reachability};
pub use crate::util::{CancelHandle, Cancellation, cancellation};

// Backends
#[cfg(feature = "ssh")]
pub use crate::backend::SshOpener;
