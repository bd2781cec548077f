//! Mock shell channels for testing.
//!
//! This module provides an in-memory [`ChannelOpener`](crate::ChannelOpener)
//! so that the prober, the driver and the orchestrator can be exercised
//! without a network. It includes:
//!
//! - [`Script`]: timed output released as the client writes lines
//! - [`MockHost`]: a stateful host that runs a simulated `passwd`
//! - [`MockOpener`]: per-address behaviours with open and close accounting
//! - Built-in scripts for common dialogues
//!
//! # Example
//!
//! ```rust
//! use passroll::mock::{MockHost, MockOpener, builtin};
//!
//! let host = MockHost::new("old-secret");
//! let opener = MockOpener::new()
//!     .script("10.0.0.1", builtin::passwd_success())
//!     .passwd("10.0.0.2", host.clone());
//! assert_eq!(opener.open_count("10.0.0.1"), 0);
//! ```

pub mod builtin;
pub mod channel;
pub mod host;
pub mod opener;
pub mod script;

pub use channel::{ChannelLog, MockChannel};
pub use host::MockHost;
pub use opener::{HostBehavior, MockOpener};
pub use script::{Script, ScriptStep};
