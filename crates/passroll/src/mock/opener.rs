//! The mock channel opener.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::channel::{ChannelLog, MockChannel};
use super::host::MockHost;
use super::script::Script;
use crate::channel::{ChannelOpener, ConnectParams};
use crate::credential::Credential;
use crate::error::ChannelError;

/// How an address responds to `open`.
#[derive(Debug, Clone)]
pub enum HostBehavior {
    /// Accept any credential and play back a script.
    Script(Script),
    /// Authenticate against a simulated host and run its `passwd`.
    Passwd(MockHost),
    /// Refuse the connection with a reason.
    Refuse(String),
    /// Reject every credential.
    RejectAuth,
    /// Never answer; fails with a timeout after `params.timeout`.
    Hang,
}

#[derive(Debug, Default)]
struct OpenerState {
    hosts: HashMap<String, HostBehavior>,
    opens: HashMap<String, usize>,
    channels: HashMap<String, Vec<Arc<Mutex<ChannelLog>>>>,
}

/// A [`ChannelOpener`] over configured in-memory hosts.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect another. Unknown addresses fail with a connection error.
#[derive(Debug, Clone, Default)]
pub struct MockOpener {
    state: Arc<Mutex<OpenerState>>,
}

impl MockOpener {
    /// Create an opener with no hosts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure how `address` behaves.
    #[must_use]
    pub fn host(self, address: impl Into<String>, behavior: HostBehavior) -> Self {
        self.lock().hosts.insert(address.into(), behavior);
        self
    }

    /// Serve `script` on `address`.
    #[must_use]
    pub fn script(self, address: impl Into<String>, script: Script) -> Self {
        self.host(address, HostBehavior::Script(script))
    }

    /// Serve a simulated `passwd` host on `address`.
    #[must_use]
    pub fn passwd(self, address: impl Into<String>, host: MockHost) -> Self {
        self.host(address, HostBehavior::Passwd(host))
    }

    /// Number of `open` calls made for `address`.
    #[must_use]
    pub fn open_count(&self, address: &str) -> usize {
        self.lock().opens.get(address).copied().unwrap_or(0)
    }

    /// Number of `open` calls across all addresses.
    #[must_use]
    pub fn total_opens(&self) -> usize {
        self.lock().opens.values().sum()
    }

    /// Logs of every channel opened on `address`, oldest first.
    #[must_use]
    pub fn channels(&self, address: &str) -> Vec<ChannelLog> {
        self.lock()
            .channels
            .get(address)
            .map(|logs| {
                logs.iter()
                    .map(|log| log.lock().unwrap_or_else(PoisonError::into_inner).clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, OpenerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChannelOpener for MockOpener {
    type Channel = MockChannel;

    async fn open(
        &self,
        address: &str,
        params: &ConnectParams,
        credential: &Credential,
    ) -> Result<MockChannel, ChannelError> {
        let behavior = {
            let mut state = self.lock();
            *state.opens.entry(address.to_string()).or_default() += 1;
            state.hosts.get(address).cloned()
        };

        let channel = match behavior {
            None => {
                return Err(ChannelError::connect(address, params.port, "no route to host"));
            }
            Some(HostBehavior::Refuse(reason)) => {
                return Err(ChannelError::connect(address, params.port, reason));
            }
            Some(HostBehavior::RejectAuth) => {
                return Err(ChannelError::auth(&params.username, "permission denied"));
            }
            Some(HostBehavior::Hang) => {
                tokio::time::sleep(params.timeout).await;
                return Err(ChannelError::timeout(params.timeout));
            }
            Some(HostBehavior::Script(script)) => MockChannel::scripted(&script),
            Some(HostBehavior::Passwd(host)) => {
                if !host.accepts(credential.expose_secret()) {
                    return Err(ChannelError::auth(&params.username, "permission denied"));
                }
                MockChannel::passwd(host)
            }
        };

        self.lock()
            .channels
            .entry(address.to_string())
            .or_default()
            .push(channel.log_handle());
        Ok(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_opens_per_address() {
        let opener = MockOpener::new().script("a", Script::new());
        let params = ConnectParams::new("admin");
        let cred = Credential::new("pw");

        assert!(opener.open("a", &params, &cred).await.is_ok());
        assert!(opener.open("a", &params, &cred).await.is_ok());
        assert!(opener.open("b", &params, &cred).await.is_err());

        assert_eq!(opener.open_count("a"), 2);
        assert_eq!(opener.open_count("b"), 1);
        assert_eq!(opener.total_opens(), 3);
        assert_eq!(opener.channels("a").len(), 2);
        assert!(opener.channels("b").is_empty());
    }

    #[tokio::test]
    async fn passwd_host_checks_credential() {
        let opener = MockOpener::new().passwd("h", MockHost::new("right"));
        let params = ConnectParams::new("admin");

        let err = opener.open("h", &params, &Credential::new("wrong")).await.unwrap_err();
        assert!(matches!(err, ChannelError::Auth { .. }));
        assert!(opener.open("h", &params, &Credential::new("right")).await.is_ok());
    }

    #[tokio::test]
    async fn error_text_never_contains_credential() {
        let opener = MockOpener::new().host("h", HostBehavior::RejectAuth);
        let err = opener
            .open("h", &ConnectParams::new("admin"), &Credential::new("hunter2"))
            .await
            .unwrap_err();
        assert!(!err.to_string().contains("hunter2"));
    }
}
