//! Utility types shared by the dialogue driver and the batch runner.

pub mod cancel;
pub mod deadline;

pub use cancel::{CancelHandle, Cancellation, cancellation};
pub use deadline::Deadline;
