//! Deadline tracking for bounded waits.

use std::time::Duration;

use tokio::time::Instant;

/// A deadline tracker for operations made of several reads.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    /// The deadline instant.
    deadline: Instant,
}

impl Deadline {
    /// Create a new deadline from now.
    #[must_use]
    pub fn from_now(duration: Duration) -> Self {
        Self {
            deadline: Instant::now() + duration,
        }
    }

    /// Check if the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Get the remaining time until the deadline.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Remaining time, capped at `step`.
    ///
    /// Used to slice a long wait into poll-sized reads.
    #[must_use]
    pub fn next_wait(&self, step: Duration) -> Duration {
        self.remaining().min(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deadline_remaining() {
        let deadline = Deadline::from_now(Duration::from_secs(10));
        assert!(!deadline.is_expired());
        assert!(deadline.remaining() > Duration::from_secs(9));
    }

    #[tokio::test]
    async fn deadline_expires() {
        let deadline = Deadline::from_now(Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }

    #[tokio::test]
    async fn next_wait_is_capped() {
        let deadline = Deadline::from_now(Duration::from_secs(30));
        assert_eq!(
            deadline.next_wait(Duration::from_millis(500)),
            Duration::from_millis(500)
        );
    }
}
