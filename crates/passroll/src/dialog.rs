//! The interactive password-change dialogue.
//!
//! The remote side offers no machine-readable protocol, only free text, so
//! the dialogue is modelled as a linear state machine in which every waiting
//! state owns a keyword set and a timeout. Prompt detection is heuristic:
//! a state advances as soon as its accumulated output contains any of its
//! keywords, compared case-insensitively.

pub mod driver;
pub mod keywords;
pub mod state;

pub use driver::{Drive, SessionDriver};
pub use keywords::{KeywordSet, PromptTable};
pub use state::{DialogueOutcome, DialogueState};
