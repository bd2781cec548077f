//! The interactive shell channel.

use std::time::Duration;

use russh::client::{Handle, Msg};
use russh::{Channel, ChannelMsg, Disconnect};

use super::ClientHandler;
use crate::channel::ShellChannel;
use crate::error::ChannelError;

/// An interactive shell on an authenticated SSH session.
///
/// Owns both the channel and the session handle; [`ShellChannel::close`]
/// releases both.
pub struct SshShell {
    handle: Handle<ClientHandler>,
    channel: Channel<Msg>,
    eof: bool,
    released: bool,
}

impl SshShell {
    pub(super) const fn new(handle: Handle<ClientHandler>, channel: Channel<Msg>) -> Self {
        Self {
            handle,
            channel,
            eof: false,
            released: false,
        }
    }
}

impl std::fmt::Debug for SshShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshShell")
            .field("channel", &self.channel.id())
            .field("eof", &self.eof)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl ShellChannel for SshShell {
    async fn write(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        if self.eof || self.released {
            return Err(ChannelError::Closed);
        }
        self.channel
            .data(data)
            .await
            .map_err(|e| ChannelError::channel(format!("write failed: {e}")))
    }

    async fn read_available(&mut self, max_wait: Duration) -> Result<Vec<u8>, ChannelError> {
        if self.eof || self.released {
            return Err(ChannelError::Closed);
        }

        let deadline = tokio::time::Instant::now() + max_wait;
        loop {
            let Ok(msg) = tokio::time::timeout_at(deadline, self.channel.wait()).await else {
                return Ok(Vec::new());
            };
            match msg {
                Some(ChannelMsg::Data { data }) => return Ok(data.to_vec()),
                Some(ChannelMsg::ExtendedData { data, .. }) => return Ok(data.to_vec()),
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    tracing::debug!(exit_status, "remote shell exited");
                }
                Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                    self.eof = true;
                    return Err(ChannelError::Closed);
                }
                Some(_) => {}
            }
        }
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        if !self.eof {
            if let Err(e) = self.channel.close().await {
                tracing::debug!(error = %e, "channel close failed");
            }
        }
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(|e| ChannelError::channel(format!("disconnect failed: {e}")))
    }
}
