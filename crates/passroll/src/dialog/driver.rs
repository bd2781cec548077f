//! The session driver: runs one password-change dialogue on one target.

use std::future::Future;
use std::time::Duration;

use tracing::Instrument;

use super::keywords::PromptTable;
use super::state::{DialogueOutcome, DialogueState};
use crate::channel::{ChannelOpener, ConnectParams, ShellChannel};
use crate::config::{LineEnding, RotationConfig};
use crate::credential::{Credential, CredentialSet};
use crate::error::ChannelError;
use crate::redact::{capture_for_reason, scrub, strip_ansi};
use crate::target::Target;
use crate::util::{Cancellation, Deadline};

/// Runs the full dialogue against one target.
///
/// Implementations never fail: every error is folded into the returned
/// [`DialogueOutcome`].
pub trait Drive: Send + Sync {
    /// Drive the dialogue on `target` and classify its result.
    fn drive(
        &self,
        target: &Target,
        params: &ConnectParams,
        credentials: &CredentialSet,
        cancel: &Cancellation,
    ) -> impl Future<Output = DialogueOutcome> + Send;
}

/// Dialogue tunables taken from a [`RotationConfig`].
#[derive(Debug, Clone)]
struct DriverSettings {
    command: String,
    line_ending: LineEnding,
    poll_interval: Duration,
    result_grace: Duration,
    prompts: PromptTable,
}

/// Drives the `passwd` dialogue over channels from an opener.
#[derive(Debug, Clone)]
pub struct SessionDriver<O> {
    opener: O,
    settings: DriverSettings,
}

impl<O: ChannelOpener> SessionDriver<O> {
    /// Create a driver using `opener` and the dialogue settings of `config`.
    #[must_use]
    pub fn new(opener: O, config: &RotationConfig) -> Self {
        Self {
            opener,
            settings: DriverSettings {
                command: config.command.clone(),
                line_ending: config.line_ending,
                poll_interval: config.poll_interval,
                result_grace: config.result_grace,
                prompts: config.prompts.clone(),
            },
        }
    }

    /// Get the underlying opener.
    #[must_use]
    pub const fn opener(&self) -> &O {
        &self.opener
    }

    async fn run(
        &self,
        target: &Target,
        params: &ConnectParams,
        credentials: &CredentialSet,
        cancel: &Cancellation,
    ) -> DialogueOutcome {
        tracing::debug!(state = %DialogueState::Connecting, "opening shell");
        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return DialogueOutcome::failed(cancelled_in(DialogueState::Connecting));
            }
            opened = self.opener.open(target.address(), params, credentials.current()) => opened,
        };

        let mut channel = match opened {
            Ok(channel) => channel,
            Err(e) => {
                tracing::warn!(error = %e, "could not open shell");
                return DialogueOutcome::failed(format!("connection failed: {e}"));
            }
        };

        let outcome = Dialogue {
            channel: &mut channel,
            settings: &self.settings,
            secrets: credentials.secrets(),
            cancel,
            timeout: params.timeout,
            state: DialogueState::Connecting,
            buffer: String::new(),
        }
        .run(credentials)
        .await;

        if let Err(e) = channel.close().await {
            tracing::debug!(error = %e, "error while closing channel");
        }

        match &outcome {
            DialogueOutcome::Succeeded => tracing::info!("credential changed"),
            other => tracing::warn!(outcome = %other, "credential not changed"),
        }
        outcome
    }
}

impl<O: ChannelOpener> Drive for SessionDriver<O> {
    async fn drive(
        &self,
        target: &Target,
        params: &ConnectParams,
        credentials: &CredentialSet,
        cancel: &Cancellation,
    ) -> DialogueOutcome {
        let span = tracing::info_span!("dialogue", host = %target, user = %params.username);
        self.run(target, params, credentials, cancel)
            .instrument(span)
            .await
    }
}

/// State of one dialogue on an open channel.
///
/// Lives exactly as long as the channel is open; the caller closes the
/// channel once [`Dialogue::run`] returns.
struct Dialogue<'a, C> {
    channel: &'a mut C,
    settings: &'a DriverSettings,
    secrets: [&'a str; 2],
    cancel: &'a Cancellation,
    timeout: Duration,
    state: DialogueState,
    buffer: String,
}

/// What a single bounded read produced.
enum Read {
    Data(Vec<u8>),
    Closed,
    Failed(ChannelError),
    Cancelled,
}

impl<'a, C: ShellChannel> Dialogue<'a, C> {
    async fn run(&mut self, credentials: &CredentialSet) -> DialogueOutcome {
        let command = format!("{}{}", self.settings.command, self.settings.line_ending.as_str());
        if let Err(e) = self.channel.write(command.as_bytes()).await {
            return self.channel_failure(&e);
        }

        for prompt in DialogueState::PROMPTS {
            self.enter(prompt);
            if let Err(outcome) = self.await_prompt().await {
                return outcome;
            }

            let answer = match prompt {
                DialogueState::AwaitingCurrentPrompt => credentials.current(),
                _ => credentials.next(),
            };
            if let Err(e) = self.send_secret(answer).await {
                return self.channel_failure(&e);
            }
            self.enter(prompt.answered());
        }

        self.enter(DialogueState::AwaitingResult);
        let outcome = match self.drain_result().await {
            Ok(()) => self.classify(),
            Err(outcome) => outcome,
        };
        self.enter(DialogueState::Terminal);
        outcome
    }

    fn enter(&mut self, state: DialogueState) {
        tracing::debug!(from = %self.state, to = %state, "dialogue transition");
        self.state = state;
    }

    async fn send_secret(&mut self, secret: &Credential) -> Result<(), ChannelError> {
        self.channel.write(secret.expose_secret().as_bytes()).await?;
        self.channel
            .write(self.settings.line_ending.as_str().as_bytes())
            .await
    }

    /// Output seen in the current state, without escapes or secrets.
    fn visible(&self) -> String {
        scrub(&strip_ansi(&self.buffer), &self.secrets)
    }

    /// Read until the current state's keywords show up.
    async fn await_prompt(&mut self) -> Result<(), DialogueOutcome> {
        let settings: &'a DriverSettings = self.settings;
        let Some(keywords) = settings.prompts.prompt_for(self.state) else {
            return Ok(());
        };
        let deadline = Deadline::from_now(self.timeout);
        self.buffer.clear();

        loop {
            match self.read(deadline.next_wait(settings.poll_interval)).await {
                Read::Data(bytes) => self.buffer.push_str(&String::from_utf8_lossy(&bytes)),
                Read::Closed => {
                    return Err(self.failure(format!(
                        "channel closed by remote in state {}",
                        self.state
                    )));
                }
                Read::Failed(e) => return Err(self.channel_failure(&e)),
                Read::Cancelled => return Err(DialogueOutcome::failed(cancelled_in(self.state))),
            }

            if let Some(keyword) = keywords.find(&self.visible()) {
                tracing::debug!(state = %self.state, keyword, "prompt observed");
                return Ok(());
            }
            if deadline.is_expired() {
                return Err(self.failure(format!(
                    "prompt not observed within timeout for state {}",
                    self.state
                )));
            }
        }
    }

    /// Collect output for the grace period or until the remote closes.
    async fn drain_result(&mut self) -> Result<(), DialogueOutcome> {
        let deadline = Deadline::from_now(self.settings.result_grace);
        self.buffer.clear();

        while !deadline.is_expired() {
            match self.read(deadline.next_wait(self.settings.poll_interval)).await {
                Read::Data(bytes) => self.buffer.push_str(&String::from_utf8_lossy(&bytes)),
                Read::Closed => break,
                Read::Failed(e) => {
                    tracing::debug!(error = %e, "read failed while draining result");
                    break;
                }
                Read::Cancelled => return Err(self.interrupted_result()),
            }
        }
        Ok(())
    }

    /// Outcome when cancellation lands after the final answer was sent.
    ///
    /// The remote may already have applied the change, so a verdict in the
    /// output seen so far wins over the cancellation.
    fn interrupted_result(&self) -> DialogueOutcome {
        if let Some(outcome) = self.verdict() {
            tracing::warn!(outcome = %outcome, "cancelled after the result was printed");
            return outcome;
        }
        self.failure(cancelled_in(self.state))
    }

    /// One read bounded by `wait` that gives way to cancellation.
    async fn read(&mut self, wait: Duration) -> Read {
        let cancel = self.cancel;
        tokio::select! {
            biased;
            () = cancel.cancelled() => Read::Cancelled,
            read = self.channel.read_available(wait) => match read {
                Ok(bytes) => Read::Data(bytes),
                Err(e) if e.is_closed() => Read::Closed,
                Err(e) => Read::Failed(e),
            },
        }
    }

    fn classify(&self) -> DialogueOutcome {
        if let Some(outcome) = self.verdict() {
            return outcome;
        }

        let captured = capture_for_reason(&self.buffer, &self.secrets);
        if captured.is_empty() {
            DialogueOutcome::failed("unclassified result: (no output)")
        } else {
            DialogueOutcome::failed(format!("unclassified result: {captured}"))
        }
    }

    /// Failure keywords first, then success keywords.
    fn verdict(&self) -> Option<DialogueOutcome> {
        let text = self.visible();
        let prompts = &self.settings.prompts;

        if prompts.failure.matches(&text) {
            return Some(DialogueOutcome::failed(format!(
                "remote reported failure: {}",
                capture_for_reason(&text, &self.secrets)
            )));
        }
        prompts.success.matches(&text).then_some(DialogueOutcome::Succeeded)
    }

    /// A failed outcome carrying whatever output the current state saw.
    fn failure(&self, reason: String) -> DialogueOutcome {
        let captured = capture_for_reason(&self.buffer, &self.secrets);
        if captured.is_empty() {
            DialogueOutcome::Failed(reason)
        } else {
            DialogueOutcome::Failed(format!("{reason} (last output: {captured})"))
        }
    }

    fn channel_failure(&self, error: &ChannelError) -> DialogueOutcome {
        let reason = scrub(&error.to_string(), &self.secrets);
        DialogueOutcome::failed(format!("channel error in state {}: {reason}", self.state))
    }
}

fn cancelled_in(state: DialogueState) -> String {
    format!("cancelled by operator in state {state}")
}
