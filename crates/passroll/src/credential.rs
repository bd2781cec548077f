//! Credentials used by a rotation batch.
//!
//! Secrets are wrapped in [`secrecy::Secret`] so they never show up in
//! `Debug` output, logs, or serialized reports.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, RotationError};

/// An opaque secret string.
pub struct Credential(SecretString);

impl Credential {
    /// Wrap a secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(SecretString::new(secret.into()))
    }

    /// Access the secret text.
    ///
    /// Only channel backends and the dialogue driver should call this.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    /// Check if the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl From<String> for Credential {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

impl From<&str> for Credential {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

/// The pair of credentials a batch works with.
///
/// `current` authenticates the session and answers the first prompt;
/// `next` is the value being installed.
#[derive(Debug)]
pub struct CredentialSet {
    current: Credential,
    next: Credential,
}

impl CredentialSet {
    /// Create a credential set, rejecting empty secrets.
    pub fn new(current: impl Into<Credential>, next: impl Into<Credential>) -> Result<Self> {
        let set = Self {
            current: current.into(),
            next: next.into(),
        };
        set.validate()?;
        Ok(set)
    }

    /// Create a credential set from a new secret and its re-typed confirmation.
    pub fn confirmed(
        current: impl Into<Credential>,
        next: impl Into<Credential>,
        confirmation: &Credential,
    ) -> Result<Self> {
        let next = next.into();
        if next.expose_secret() != confirmation.expose_secret() {
            return Err(RotationError::CredentialMismatch);
        }
        Self::new(current, next)
    }

    /// Check that both secrets are usable.
    pub fn validate(&self) -> Result<()> {
        if self.current.is_empty() {
            return Err(RotationError::EmptyCredential { which: "current" });
        }
        if self.next.is_empty() {
            return Err(RotationError::EmptyCredential { which: "new" });
        }
        Ok(())
    }

    /// The credential in place on the hosts today.
    #[must_use]
    pub const fn current(&self) -> &Credential {
        &self.current
    }

    /// The credential being rolled out.
    #[must_use]
    pub const fn next(&self) -> &Credential {
        &self.next
    }

    /// Build a set without validation.
    #[cfg(test)]
    pub(crate) fn unchecked(current: &str, next: &str) -> Self {
        Self {
            current: current.into(),
            next: next.into(),
        }
    }

    /// All secrets in the set, for output scrubbing.
    #[must_use]
    pub fn secrets(&self) -> [&str; 2] {
        [self.current.expose_secret(), self.next.expose_secret()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_secret() {
        let cred = Credential::new("hunter2");
        let debug = format!("{cred:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));

        let set = CredentialSet::new("old-pass", "new-pass").unwrap();
        let debug = format!("{set:?}");
        assert!(!debug.contains("old-pass"));
        assert!(!debug.contains("new-pass"));
    }

    #[test]
    fn empty_current_rejected() {
        let err = CredentialSet::new("", "next").unwrap_err();
        assert!(matches!(
            err,
            RotationError::EmptyCredential { which: "current" }
        ));
    }

    #[test]
    fn empty_next_rejected() {
        let err = CredentialSet::new("current", "").unwrap_err();
        assert!(matches!(err, RotationError::EmptyCredential { which: "new" }));
    }

    #[test]
    fn confirmation_must_match() {
        let err = CredentialSet::confirmed("old", "new-1", &Credential::new("new-2")).unwrap_err();
        assert!(matches!(err, RotationError::CredentialMismatch));

        let set = CredentialSet::confirmed("old", "new-1", &Credential::new("new-1")).unwrap();
        assert_eq!(set.next().expose_secret(), "new-1");
        assert_eq!(set.secrets(), ["old", "new-1"]);
    }
}
