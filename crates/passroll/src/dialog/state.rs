//! Dialogue states and per-target outcomes.

use std::fmt;

use serde::Serialize;

/// A state of the password-change dialogue.
///
/// States are strictly ordered; a dialogue never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DialogueState {
    /// Opening an authenticated shell.
    Connecting,
    /// Waiting for the prompt asking for the credential in place.
    AwaitingCurrentPrompt,
    /// The current credential has been written.
    SentCurrent,
    /// Waiting for the prompt asking for the new credential.
    AwaitingNewPrompt,
    /// The new credential has been written.
    SentNew,
    /// Waiting for the prompt asking to re-type the new credential.
    AwaitingConfirmPrompt,
    /// The confirmation has been written.
    SentConfirm,
    /// Draining output to classify the result.
    AwaitingResult,
    /// An outcome has been produced.
    Terminal,
}

impl DialogueState {
    /// The prompt-waiting states in dialogue order.
    pub const PROMPTS: [Self; 3] = [
        Self::AwaitingCurrentPrompt,
        Self::AwaitingNewPrompt,
        Self::AwaitingConfirmPrompt,
    ];

    /// The state entered after answering this prompt state.
    #[must_use]
    pub const fn answered(self) -> Self {
        match self {
            Self::AwaitingCurrentPrompt => Self::SentCurrent,
            Self::AwaitingNewPrompt => Self::SentNew,
            Self::AwaitingConfirmPrompt => Self::SentConfirm,
            other => other,
        }
    }

    /// The stable upper-case name used in logs and failure reasons.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Connecting => "CONNECTING",
            Self::AwaitingCurrentPrompt => "AWAITING_CURRENT_PROMPT",
            Self::SentCurrent => "SENT_CURRENT",
            Self::AwaitingNewPrompt => "AWAITING_NEW_PROMPT",
            Self::SentNew => "SENT_NEW",
            Self::AwaitingConfirmPrompt => "AWAITING_CONFIRM_PROMPT",
            Self::SentConfirm => "SENT_CONFIRM",
            Self::AwaitingResult => "AWAITING_RESULT",
            Self::Terminal => "TERMINAL",
        }
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The result of processing one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DialogueOutcome {
    /// The remote side confirmed the change.
    Succeeded,
    /// The target was reached but the change was not confirmed.
    Failed(String),
    /// The target could not be reached or authenticated.
    Unreachable(String),
}

impl DialogueOutcome {
    /// Create a failed outcome.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    /// Create an unreachable outcome.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::Unreachable(reason.into())
    }

    /// Check if the change was confirmed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Check if the target was never reached.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// The failure reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Succeeded => None,
            Self::Failed(reason) | Self::Unreachable(reason) => Some(reason),
        }
    }
}

impl fmt::Display for DialogueOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            Self::Unreachable(reason) => write!(f, "unreachable: {reason}"),
        }
    }
}
