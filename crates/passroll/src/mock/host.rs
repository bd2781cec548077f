//! A simulated host with a real password.
//!
//! [`MockHost`] keeps its password behind shared state so a batch can be
//! replayed against it: once the password changed, the old credential no
//! longer authenticates.

use std::sync::{Arc, Mutex, PoisonError};

/// A host whose password can be changed through a simulated `passwd`.
#[derive(Debug, Clone)]
pub struct MockHost {
    password: Arc<Mutex<String>>,
}

impl MockHost {
    /// Create a host with an initial password.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: Arc::new(Mutex::new(password.into())),
        }
    }

    /// The password in place right now.
    #[must_use]
    pub fn password(&self) -> String {
        self.password
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check a candidate against the current password.
    #[must_use]
    pub fn accepts(&self, candidate: &str) -> bool {
        *self.password.lock().unwrap_or_else(PoisonError::into_inner) == candidate
    }

    fn set_password(&self, password: &str) {
        *self.password.lock().unwrap_or_else(PoisonError::into_inner) = password.to_string();
    }
}

#[derive(Debug)]
enum Stage {
    Shell,
    Current,
    New,
    Confirm(String),
}

/// Line-by-line simulation of a shell running `passwd`.
#[derive(Debug)]
pub(crate) struct PasswdSession {
    host: MockHost,
    stage: Stage,
}

const PROMPT: &str = "$ ";
const UNCHANGED: &str = "passwd: Authentication token manipulation error\r\n\
                         passwd: password unchanged\r\n";

impl PasswdSession {
    pub(crate) const fn new(host: MockHost) -> Self {
        Self {
            host,
            stage: Stage::Shell,
        }
    }

    /// Text shown right after login.
    pub(crate) const fn banner() -> &'static str {
        "Last login: Mon Jan  1 00:00:00 2024 from 10.0.0.254\r\n$ "
    }

    /// React to one line typed by the client.
    pub(crate) fn on_line(&mut self, line: &str) -> String {
        match std::mem::replace(&mut self.stage, Stage::Shell) {
            Stage::Shell => match line.trim() {
                "" => PROMPT.to_string(),
                "passwd" => {
                    self.stage = Stage::Current;
                    "Changing password for user.\r\nCurrent password: ".to_string()
                }
                other => format!("-sh: {other}: command not found\r\n{PROMPT}"),
            },
            Stage::Current => {
                if self.host.accepts(line) {
                    self.stage = Stage::New;
                    "New password: ".to_string()
                } else {
                    format!("{UNCHANGED}{PROMPT}")
                }
            }
            Stage::New => {
                self.stage = Stage::Confirm(line.to_string());
                "Retype new password: ".to_string()
            }
            Stage::Confirm(candidate) => {
                if candidate == line {
                    self.host.set_password(line);
                    format!("passwd: password updated successfully\r\n{PROMPT}")
                } else {
                    format!("Sorry, passwords do not match.\r\n{UNCHANGED}{PROMPT}")
                }
            }
        }
    }
}
