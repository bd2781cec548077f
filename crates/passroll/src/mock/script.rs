//! Scripted remote output.
//!
//! A script is a list of output chunks, each gated on how many complete
//! lines the client has written so far. The command line counts, so the
//! first prompt of a `passwd` dialogue is gated on one line.

use std::time::Duration;

/// One chunk of scripted output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    /// Lines the client must have written before this chunk is released.
    pub after_lines: usize,
    /// Delay before the chunk becomes readable once released.
    pub delay: Duration,
    /// The chunk itself.
    pub output: Vec<u8>,
}

/// Output a [`MockChannel`](super::MockChannel) plays back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<ScriptStep>,
    eof: bool,
    gate: usize,
    next_delay: Duration,
}

impl Script {
    /// Create an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `text` without waiting for further input.
    #[must_use]
    pub fn output(mut self, text: impl AsRef<str>) -> Self {
        self.steps.push(ScriptStep {
            after_lines: self.gate,
            delay: std::mem::take(&mut self.next_delay),
            output: text.as_ref().as_bytes().to_vec(),
        });
        self
    }

    /// Emit `text` once the client has written one more line.
    #[must_use]
    pub fn respond(mut self, text: impl AsRef<str>) -> Self {
        self.gate += 1;
        self.output(text)
    }

    /// Delay the next chunk.
    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.next_delay = delay;
        self
    }

    /// Delay the next chunk by `ms` milliseconds.
    #[must_use]
    pub const fn delay_ms(self, ms: u64) -> Self {
        self.delay(Duration::from_millis(ms))
    }

    /// Close the channel from the remote side after the last chunk.
    #[must_use]
    pub const fn eof(mut self) -> Self {
        self.eof = true;
        self
    }

    /// Get the steps.
    #[must_use]
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// Check if the remote side closes after the last chunk.
    #[must_use]
    pub const fn ends_with_eof(&self) -> bool {
        self.eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respond_advances_gate() {
        let script = Script::new()
            .output("banner\n")
            .respond("Current password: ")
            .delay_ms(20)
            .respond("New password: ")
            .output("(hint)")
            .eof();

        let gates: Vec<_> = script.steps().iter().map(|s| s.after_lines).collect();
        assert_eq!(gates, [0, 1, 2, 2]);
        assert_eq!(script.steps()[2].delay, Duration::from_millis(20));
        assert_eq!(script.steps()[3].delay, Duration::ZERO);
        assert!(script.ends_with_eof());
    }
}
