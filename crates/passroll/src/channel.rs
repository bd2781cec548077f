//! The shell-channel capability consumed by the prober and the driver.
//!
//! A [`ChannelOpener`] turns an address and a credential into an
//! authenticated interactive [`ShellChannel`]. The SSH backend and the mock
//! backend both implement these traits; the dialogue engine never sees the
//! transport behind them.

use std::future::Future;
use std::time::Duration;

use crate::config::DEFAULT_TIMEOUT;
use crate::credential::Credential;
use crate::error::ChannelError;

/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// Connection parameters shared by every target of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    /// Login name on every host.
    pub username: String,
    /// Remote port.
    pub port: u16,
    /// Bound on connection setup and on each awaited prompt.
    pub timeout: Duration,
}

impl ConnectParams {
    /// Create parameters for a username with default port and timeout.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// An authenticated interactive shell.
pub trait ShellChannel: Send {
    /// Write raw bytes to the remote shell.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Return whatever output arrives within `max_wait`.
    ///
    /// Returns as soon as some data is available; an empty vector means
    /// nothing arrived in time. Returns [`ChannelError::Closed`] once the
    /// remote side has gone away and no buffered data is left.
    fn read_available(
        &mut self,
        max_wait: Duration,
    ) -> impl Future<Output = Result<Vec<u8>, ChannelError>> + Send;

    /// Close the channel and release the session behind it.
    fn close(&mut self) -> impl Future<Output = Result<(), ChannelError>> + Send;
}

/// Factory for authenticated shell channels.
pub trait ChannelOpener: Send + Sync {
    /// The channel type this opener produces.
    type Channel: ShellChannel;

    /// Open an authenticated interactive shell on `address`.
    ///
    /// Implementations must bound the whole setup by `params.timeout` and
    /// report it as [`ChannelError::Timeout`].
    fn open(
        &self,
        address: &str,
        params: &ConnectParams,
        credential: &Credential,
    ) -> impl Future<Output = Result<Self::Channel, ChannelError>> + Send;
}
