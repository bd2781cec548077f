//! Error types for passroll.
//!
//! Two layers exist. [`ChannelError`] describes what went wrong while opening
//! or talking to a remote shell; it is always absorbed per target and turned
//! into a [`DialogueOutcome`](crate::dialog::DialogueOutcome). [`RotationError`]
//! is reserved for structurally invalid input that stops a run before any
//! network activity.

use std::time::Duration;

use thiserror::Error;

/// The main error type for passroll operations.
#[derive(Debug, Error)]
pub enum RotationError {
    /// The address range could not be enumerated.
    #[error("invalid range: {reason}")]
    InvalidRange {
        /// Description of what's wrong with the range.
        reason: String,
    },

    /// A credential required for the batch is empty.
    #[error("{which} credential must not be empty")]
    EmptyCredential {
        /// Which credential was empty ("current" or "new").
        which: &'static str,
    },

    /// The new credential and its confirmation differ.
    #[error("new credential and confirmation do not match")]
    CredentialMismatch,

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// An I/O error occurred with additional context.
    #[error("{context}: {source}")]
    Io {
        /// What operation was being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a shell channel or while opening one.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The host could not be reached.
    #[error("failed to connect to {host}:{port}: {reason}")]
    Connect {
        /// The host that could not be connected to.
        host: String,
        /// The port that was used.
        port: u16,
        /// The reason for the failure.
        reason: String,
    },

    /// The remote side rejected the credential.
    #[error("authentication failed for user '{user}': {reason}")]
    Auth {
        /// The user that failed to authenticate.
        user: String,
        /// The reason for the failure.
        reason: String,
    },

    /// Host key verification failed.
    #[error("host key verification failed for {host}: {reason}")]
    HostKey {
        /// The host whose key verification failed.
        host: String,
        /// The reason for the failure.
        reason: String,
    },

    /// Opening the channel took longer than allowed.
    #[error("operation timed out after {duration:?}")]
    Timeout {
        /// The duration that elapsed.
        duration: Duration,
    },

    /// Protocol-level channel failure (PTY, shell or data request).
    #[error("channel error: {reason}")]
    Channel {
        /// The reason for the channel error.
        reason: String,
    },

    /// The remote side closed the channel.
    #[error("channel closed by remote")]
    Closed,
}

/// Result type alias for passroll operations.
pub type Result<T> = std::result::Result<T, RotationError>;

impl RotationError {
    /// Create an invalid range error.
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_context(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Check if this error was caused by the operator's input.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. } | Self::EmptyCredential { .. } | Self::CredentialMismatch
        )
    }
}

impl ChannelError {
    /// Create a connection error.
    pub fn connect(host: impl Into<String>, port: u16, reason: impl Into<String>) -> Self {
        Self::Connect {
            host: host.into(),
            port,
            reason: reason.into(),
        }
    }

    /// Create an authentication error.
    pub fn auth(user: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Auth {
            user: user.into(),
            reason: reason.into(),
        }
    }

    /// Create a host key verification error.
    pub fn host_key(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HostKey {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// Create a channel error.
    pub fn channel(reason: impl Into<String>) -> Self {
        Self::Channel {
            reason: reason.into(),
        }
    }

    /// Create a timeout error.
    #[must_use]
    pub const fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Check if the remote side went away.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
