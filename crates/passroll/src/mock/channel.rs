//! The mock shell channel.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::host::{MockHost, PasswdSession};
use super::script::{Script, ScriptStep};
use crate::channel::ShellChannel;
use crate::error::ChannelError;

/// What the client did with a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelLog {
    /// Everything written, lossily decoded.
    pub written: String,
    /// Complete lines written.
    pub lines: usize,
    /// Number of `close` calls.
    pub close_count: usize,
}

#[derive(Debug)]
enum Engine {
    Script {
        steps: VecDeque<ScriptStep>,
        eof: bool,
    },
    Passwd(PasswdSession),
}

/// An in-memory [`ShellChannel`].
///
/// Lines are terminated by `\n`; a preceding `\r` is ignored.
#[derive(Debug)]
pub struct MockChannel {
    engine: Engine,
    pending: VecDeque<u8>,
    partial: Vec<u8>,
    lines: usize,
    closed: bool,
    log: Arc<Mutex<ChannelLog>>,
}

impl MockChannel {
    fn with_engine(engine: Engine) -> Self {
        Self {
            engine,
            pending: VecDeque::new(),
            partial: Vec::new(),
            lines: 0,
            closed: false,
            log: Arc::new(Mutex::new(ChannelLog::default())),
        }
    }

    /// Create a channel that plays back `script`.
    #[must_use]
    pub fn scripted(script: &Script) -> Self {
        Self::with_engine(Engine::Script {
            steps: script.steps().iter().cloned().collect(),
            eof: script.ends_with_eof(),
        })
    }

    /// Create a channel logged into `host`'s simulated shell.
    #[must_use]
    pub fn passwd(host: MockHost) -> Self {
        let mut channel = Self::with_engine(Engine::Passwd(PasswdSession::new(host)));
        channel.pending.extend(PasswdSession::banner().as_bytes());
        channel
    }

    /// A snapshot of what the client did so far.
    #[must_use]
    pub fn log(&self) -> ChannelLog {
        self.lock_log().clone()
    }

    pub(super) fn log_handle(&self) -> Arc<Mutex<ChannelLog>> {
        Arc::clone(&self.log)
    }

    fn lock_log(&self) -> MutexGuard<'_, ChannelLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(pos) = self.partial.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.partial.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            lines.push(line.trim_end_matches(['\n', '\r']).to_string());
        }
        lines
    }
}

impl ShellChannel for MockChannel {
    async fn write(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.partial.extend_from_slice(data);
        let lines = self.take_lines();
        self.lines += lines.len();
        {
            let mut log = self.lock_log();
            log.written.push_str(&String::from_utf8_lossy(data));
            log.lines += lines.len();
        }

        if let Engine::Passwd(session) = &mut self.engine {
            for line in lines {
                self.pending.extend(session.on_line(&line).into_bytes());
            }
        }
        Ok(())
    }

    async fn read_available(&mut self, max_wait: Duration) -> Result<Vec<u8>, ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }

        if self.pending.is_empty() {
            let written = self.lines;
            match &mut self.engine {
                Engine::Script { steps, eof } => match steps.front_mut() {
                    Some(step) if step.after_lines <= written => {
                        if step.delay > max_wait {
                            step.delay -= max_wait;
                            tokio::time::sleep(max_wait).await;
                            return Ok(Vec::new());
                        }
                        if !step.delay.is_zero() {
                            tokio::time::sleep(step.delay).await;
                        }
                        if let Some(step) = steps.pop_front() {
                            self.pending.extend(step.output);
                        }
                    }
                    None if *eof => return Err(ChannelError::Closed),
                    _ => {
                        tokio::time::sleep(max_wait).await;
                        return Ok(Vec::new());
                    }
                },
                Engine::Passwd(_) => {
                    tokio::time::sleep(max_wait).await;
                    return Ok(Vec::new());
                }
            }
        }

        Ok(self.pending.drain(..).collect())
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        self.closed = true;
        self.lock_log().close_count += 1;
        Ok(())
    }
}
