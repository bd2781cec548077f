//! Connectivity probing: authenticate, then disconnect.
//!
//! The prober is a cheap pre-filter. A target that cannot even be logged
//! into with the current credential is reported unreachable and never
//! reaches the dialogue.

use std::fmt;
use std::future::Future;

use tracing::Instrument;

use crate::channel::{ChannelOpener, ConnectParams, ShellChannel};
use crate::credential::Credential;
use crate::target::Target;

/// Whether a target accepted the current credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    /// An authenticated shell could be opened.
    Reachable,
    /// Connection or authentication failed.
    Unreachable(String),
}

impl Reachability {
    /// Check if the target is reachable.
    #[must_use]
    pub const fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable)
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachable => f.write_str("reachable"),
            Self::Unreachable(reason) => write!(f, "unreachable: {reason}"),
        }
    }
}

/// Checks that a target accepts a credential.
pub trait Probe: Send + Sync {
    /// Make exactly one connection attempt against `target`.
    fn probe(
        &self,
        target: &Target,
        params: &ConnectParams,
        credential: &Credential,
    ) -> impl Future<Output = Reachability> + Send;
}

/// Probes targets by opening and immediately closing a shell channel.
#[derive(Debug, Clone)]
pub struct ConnectivityProber<O> {
    opener: O,
}

impl<O: ChannelOpener> ConnectivityProber<O> {
    /// Create a prober over `opener`.
    #[must_use]
    pub const fn new(opener: O) -> Self {
        Self { opener }
    }
}

impl<O: ChannelOpener> Probe for ConnectivityProber<O> {
    async fn probe(
        &self,
        target: &Target,
        params: &ConnectParams,
        credential: &Credential,
    ) -> Reachability {
        let span = tracing::debug_span!("probe", host = %target);
        async {
            match self.opener.open(target.address(), params, credential).await {
                Ok(mut channel) => {
                    if let Err(e) = channel.close().await {
                        tracing::debug!(error = %e, "error while closing probe channel");
                    }
                    tracing::debug!("target reachable");
                    Reachability::Reachable
                }
                Err(e) => {
                    tracing::warn!(error = %e, "target unreachable");
                    Reachability::Unreachable(e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }
}
