//! SSH shell channels over russh.
//!
//! [`SshOpener`] connects, verifies the server key according to the
//! configured [`HostKeyPolicy`], authenticates with a password and starts an
//! interactive shell on a PTY so that `passwd` prompts on the terminal.

mod host_key;
mod shell;

use std::sync::Arc;

use russh::client;
use russh::keys::PublicKey;

pub use host_key::KnownHosts;
pub use shell::SshShell;

use crate::channel::{ChannelOpener, ConnectParams};
use crate::config::HostKeyPolicy;
use crate::credential::Credential;
use crate::error::ChannelError;

/// Terminal type requested for the PTY.
const TERM: &str = "xterm";

/// PTY width in columns.
const COLS: u32 = 80;

/// PTY height in rows.
const ROWS: u32 = 24;

/// russh client handler that applies the host key policy.
struct ClientHandler {
    policy: HostKeyPolicy,
    known_hosts: KnownHosts,
    host: String,
    port: u16,
}

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        Ok(host_key::verify(
            self.policy,
            &self.known_hosts,
            &self.host,
            self.port,
            server_public_key,
        ))
    }
}

/// Opens password-authenticated interactive shells over SSH.
#[derive(Debug, Clone)]
pub struct SshOpener {
    policy: HostKeyPolicy,
    known_hosts: KnownHosts,
}

impl SshOpener {
    /// Create an opener using the default `known_hosts` file.
    #[must_use]
    pub fn new(policy: HostKeyPolicy) -> Self {
        Self {
            policy,
            known_hosts: KnownHosts::default(),
        }
    }

    /// Use a specific `known_hosts` file.
    #[must_use]
    pub fn known_hosts(mut self, known_hosts: KnownHosts) -> Self {
        self.known_hosts = known_hosts;
        self
    }

    /// Get the host key policy.
    #[must_use]
    pub const fn policy(&self) -> HostKeyPolicy {
        self.policy
    }

    async fn connect(
        &self,
        address: &str,
        params: &ConnectParams,
        credential: &Credential,
    ) -> Result<SshShell, ChannelError> {
        let config = Arc::new(client::Config::default());
        let handler = ClientHandler {
            policy: self.policy,
            known_hosts: self.known_hosts.clone(),
            host: address.to_string(),
            port: params.port,
        };

        tracing::debug!(host = %address, port = params.port, "connecting to SSH server");
        let mut handle = client::connect(config, (address, params.port), handler)
            .await
            .map_err(|e| match e {
                russh::Error::UnknownKey => {
                    ChannelError::host_key(address, format!("server key rejected by {:?} policy", self.policy))
                }
                other => ChannelError::connect(address, params.port, other.to_string()),
            })?;

        tracing::debug!(user = %params.username, "authenticating with password");
        let auth = handle
            .authenticate_password(params.username.as_str(), credential.expose_secret())
            .await
            .map_err(|e| ChannelError::auth(&params.username, e.to_string()))?;
        if !auth.success() {
            return Err(ChannelError::auth(&params.username, "password rejected"));
        }

        let channel = handle
            .channel_open_session()
            .await
            .map_err(|e| ChannelError::channel(format!("session open failed: {e}")))?;
        channel
            .request_pty(false, TERM, COLS, ROWS, 0, 0, &[])
            .await
            .map_err(|e| ChannelError::channel(format!("PTY request failed: {e}")))?;
        channel
            .request_shell(false)
            .await
            .map_err(|e| ChannelError::channel(format!("shell request failed: {e}")))?;

        Ok(SshShell::new(handle, channel))
    }
}

impl Default for SshOpener {
    fn default() -> Self {
        Self::new(HostKeyPolicy::default())
    }
}

impl ChannelOpener for SshOpener {
    type Channel = SshShell;

    async fn open(
        &self,
        address: &str,
        params: &ConnectParams,
        credential: &Credential,
    ) -> Result<SshShell, ChannelError> {
        tokio::time::timeout(params.timeout, self.connect(address, params, credential))
            .await
            .map_err(|_| ChannelError::timeout(params.timeout))?
    }
}
