//! Batch orchestration.
//!
//! The orchestrator probes every target, drives the dialogue on reachable
//! ones, and folds each outcome into a [`BatchReport`]. Per-target failures
//! never escape; only a structurally unusable credential set stops a batch,
//! and it does so before any connection is made.

pub mod report;

use std::time::Duration;

use futures::stream::{self, StreamExt};

pub use report::{BatchReport, FailedTarget, TargetResult};

use crate::channel::ConnectParams;
use crate::config::{DEFAULT_PACING, RotationConfig};
use crate::credential::CredentialSet;
use crate::dialog::{DialogueOutcome, Drive};
use crate::error::Result;
use crate::probe::{Probe, Reachability};
use crate::target::Target;
use crate::util::Cancellation;

/// Reason recorded for targets skipped after cancellation.
pub const SKIPPED_REASON: &str = "batch cancelled before this target was processed";

/// Runs the probe-then-drive pipeline over a list of targets.
#[derive(Debug, Clone)]
pub struct BatchOrchestrator<P, D> {
    prober: P,
    driver: D,
    pacing: Duration,
    concurrency: usize,
}

impl<P: Probe, D: Drive> BatchOrchestrator<P, D> {
    /// Create a sequential orchestrator with the default pacing.
    #[must_use]
    pub const fn new(prober: P, driver: D) -> Self {
        Self {
            prober,
            driver,
            pacing: DEFAULT_PACING,
            concurrency: 1,
        }
    }

    /// Create an orchestrator using the batch settings of `config`.
    #[must_use]
    pub const fn from_config(prober: P, driver: D, config: &RotationConfig) -> Self {
        Self::new(prober, driver)
            .pacing(config.pacing)
            .concurrency(config.concurrency)
    }

    /// Set the pause between targets in sequential mode.
    #[must_use]
    pub const fn pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Set how many targets run at once. Values below 1 mean sequential.
    #[must_use]
    pub const fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = if concurrency == 0 { 1 } else { concurrency };
        self
    }

    /// Get the prober.
    #[must_use]
    pub const fn prober(&self) -> &P {
        &self.prober
    }

    /// Get the driver.
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Process every target and report the outcome of each.
    ///
    /// # Errors
    ///
    /// Fails without touching the network if either credential is empty.
    pub async fn run(
        &self,
        targets: &[Target],
        params: &ConnectParams,
        credentials: &CredentialSet,
        cancel: &Cancellation,
    ) -> Result<BatchReport> {
        credentials.validate()?;
        tracing::info!(
            targets = targets.len(),
            concurrency = self.concurrency,
            user = %params.username,
            "starting batch"
        );

        let results = if self.concurrency == 1 {
            self.run_sequential(targets, params, credentials, cancel).await
        } else {
            self.run_parallel(targets, params, credentials, cancel).await
        };

        let report = BatchReport::from_results(results);
        tracing::info!(
            succeeded = report.succeeded().len(),
            failed = report.failed().len(),
            cancelled = cancel.is_cancelled(),
            "batch finished"
        );
        Ok(report)
    }

    async fn run_sequential(
        &self,
        targets: &[Target],
        params: &ConnectParams,
        credentials: &CredentialSet,
        cancel: &Cancellation,
    ) -> Vec<TargetResult> {
        let mut results = Vec::with_capacity(targets.len());
        for (index, target) in targets.iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() && !cancel.is_cancelled() {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {}
                    () = tokio::time::sleep(self.pacing) => {}
                }
            }
            let outcome = self.process(target, params, credentials, cancel).await;
            results.push(TargetResult::new(target.clone(), outcome));
        }
        results
    }

    /// Up to `concurrency` targets in flight, results kept in target order.
    async fn run_parallel(
        &self,
        targets: &[Target],
        params: &ConnectParams,
        credentials: &CredentialSet,
        cancel: &Cancellation,
    ) -> Vec<TargetResult> {
        stream::iter(targets)
            .map(|target| async move {
                let outcome = self.process(target, params, credentials, cancel).await;
                TargetResult::new(target.clone(), outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn process(
        &self,
        target: &Target,
        params: &ConnectParams,
        credentials: &CredentialSet,
        cancel: &Cancellation,
    ) -> DialogueOutcome {
        if cancel.is_cancelled() {
            return DialogueOutcome::failed(SKIPPED_REASON);
        }

        let reachability = tokio::select! {
            biased;
            () = cancel.cancelled() => return DialogueOutcome::failed(SKIPPED_REASON),
            reachability = self.prober.probe(target, params, credentials.current()) => reachability,
        };

        match reachability {
            Reachability::Unreachable(reason) => DialogueOutcome::Unreachable(reason),
            Reachability::Reachable => self.driver.drive(target, params, credentials, cancel).await,
        }
    }
}
