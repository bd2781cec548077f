//! Keyword sets recognised in remote output.

use super::state::DialogueState;
use crate::error::{Result, RotationError};

/// A set of case-insensitive substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    /// Keywords, stored lowercased.
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Create a set from keywords.
    #[must_use]
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        set.extend(keywords);
        set
    }

    /// Add keywords to the set, skipping blanks and duplicates.
    pub fn extend<I, S>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for keyword in keywords {
            let keyword = keyword.into().trim().to_lowercase();
            if !keyword.is_empty() && !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
    }

    /// The keyword that occurs in `text`, if any.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        self.keywords
            .iter()
            .find(|k| haystack.contains(k.as_str()))
            .map(String::as_str)
    }

    /// Check if any keyword occurs in `text`.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    /// Iterate over the keywords.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Number of keywords.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Check if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// The keyword table driving the dialogue.
///
/// Defaults cover the English and Spanish wording of the common `passwd`
/// implementations. Other locales and dialects are handled by extending the
/// table from the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTable {
    /// Prompt for the credential in place.
    pub current: KeywordSet,
    /// Prompt for the new credential.
    pub new: KeywordSet,
    /// Prompt to re-type the new credential.
    pub confirm: KeywordSet,
    /// Output of a successful change.
    pub success: KeywordSet,
    /// Output of a rejected change. Checked before `success`.
    pub failure: KeywordSet,
}

impl Default for PromptTable {
    fn default() -> Self {
        Self {
            current: KeywordSet::new(["current", "actual"]),
            new: KeywordSet::new(["new", "nueva"]),
            confirm: KeywordSet::new(["retype", "confirm", "again", "vuelva"]),
            success: KeywordSet::new(["successfully", "success", "correctamente"]),
            failure: KeywordSet::new(["failure", "error", "unchanged", "incorrect", "mismatch"]),
        }
    }
}

impl PromptTable {
    /// A table with every set empty.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            current: KeywordSet::default(),
            new: KeywordSet::default(),
            confirm: KeywordSet::default(),
            success: KeywordSet::default(),
            failure: KeywordSet::default(),
        }
    }

    /// The keyword set a waiting state listens for.
    #[must_use]
    pub const fn prompt_for(&self, state: DialogueState) -> Option<&KeywordSet> {
        match state {
            DialogueState::AwaitingCurrentPrompt => Some(&self.current),
            DialogueState::AwaitingNewPrompt => Some(&self.new),
            DialogueState::AwaitingConfirmPrompt => Some(&self.confirm),
            _ => None,
        }
    }

    /// Reject tables that can never complete a dialogue.
    ///
    /// The failure set may be empty; everything else needs a keyword.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("current", &self.current),
            ("new", &self.new),
            ("confirm", &self.confirm),
            ("success", &self.success),
        ];
        for (name, set) in required {
            if set.is_empty() {
                return Err(RotationError::config(format!(
                    "prompt keyword set '{name}' is empty"
                )));
            }
        }
        Ok(())
    }
}
