//! Transport backends for shell channels.

#[cfg(feature = "ssh")]
pub mod ssh;

#[cfg(feature = "ssh")]
pub use ssh::{KnownHosts, SshOpener, SshShell};
