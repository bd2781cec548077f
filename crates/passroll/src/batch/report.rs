//! The per-batch accounting.

use std::fmt;

use serde::Serialize;

use crate::dialog::DialogueOutcome;
use crate::target::Target;

/// The outcome recorded for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetResult {
    /// The target.
    pub target: Target,
    /// What happened to it.
    pub outcome: DialogueOutcome,
}

impl TargetResult {
    /// Create a result.
    #[must_use]
    pub const fn new(target: Target, outcome: DialogueOutcome) -> Self {
        Self { target, outcome }
    }
}

/// A target whose credential was not changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedTarget {
    /// Host address.
    pub address: String,
    /// A `Failed` or `Unreachable` outcome.
    pub outcome: DialogueOutcome,
}

impl FailedTarget {
    /// Short reason for the summary: `unreachable` for hosts that could not
    /// be reached, the failure reason otherwise.
    #[must_use]
    pub fn reason(&self) -> &str {
        match &self.outcome {
            DialogueOutcome::Unreachable(_) => "unreachable",
            DialogueOutcome::Failed(reason) => reason,
            DialogueOutcome::Succeeded => "",
        }
    }

    /// The full reason, including why an unreachable host failed to connect.
    #[must_use]
    pub fn detail(&self) -> &str {
        self.outcome.reason().unwrap_or_default()
    }
}

/// Ordered partition of a batch's outcomes.
///
/// Every target of the batch appears exactly once, either in `succeeded`
/// or in `failed`, in target order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    succeeded: Vec<String>,
    failed: Vec<FailedTarget>,
}

impl BatchReport {
    /// Partition results into succeeded and failed targets.
    #[must_use]
    pub fn from_results(results: impl IntoIterator<Item = TargetResult>) -> Self {
        let mut report = Self::default();
        for TargetResult { target, outcome } in results {
            let address = target.address().to_string();
            if outcome.is_success() {
                report.succeeded.push(address);
            } else {
                report.failed.push(FailedTarget { address, outcome });
            }
        }
        report
    }

    /// Addresses whose credential was changed.
    #[must_use]
    pub fn succeeded(&self) -> &[String] {
        &self.succeeded
    }

    /// Targets whose credential was not changed.
    #[must_use]
    pub fn failed(&self) -> &[FailedTarget] {
        &self.failed
    }

    /// Number of targets accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Check if every target succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Render the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Succeeded ({}):", self.succeeded.len())?;
        for address in &self.succeeded {
            writeln!(f, "  {address}")?;
        }
        writeln!(f, "Failed ({}):", self.failed.len())?;
        for failed in &self.failed {
            writeln!(f, "  {}: {}", failed.address, failed.detail())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BatchReport {
        BatchReport::from_results([
            TargetResult::new(Target::new("10.0.0.1"), DialogueOutcome::Succeeded),
            TargetResult::new(
                Target::new("10.0.0.2"),
                DialogueOutcome::unreachable("connection refused"),
            ),
            TargetResult::new(
                Target::new("10.0.0.3"),
                DialogueOutcome::failed("unclassified result: ?"),
            ),
        ])
    }

    #[test]
    fn partitions_in_order() {
        let report = sample();
        assert_eq!(report.succeeded(), ["10.0.0.1"]);
        let failed: Vec<_> = report
            .failed()
            .iter()
            .map(|f| (f.address.as_str(), f.reason()))
            .collect();
        assert_eq!(
            failed,
            [("10.0.0.2", "unreachable"), ("10.0.0.3", "unclassified result: ?")]
        );
        assert_eq!(report.total(), 3);
        assert!(!report.is_clean());
    }

    #[test]
    fn detail_keeps_connection_reason() {
        let report = sample();
        assert_eq!(report.failed()[0].detail(), "connection refused");
    }

    #[test]
    fn text_rendering() {
        let text = sample().to_string();
        assert!(text.starts_with("Succeeded (1):\n  10.0.0.1\n"));
        assert!(text.contains("Failed (2):\n  10.0.0.2: connection refused\n"));
    }

    #[test]
    fn json_rendering() {
        let value: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(value["succeeded"][0], "10.0.0.1");
        assert_eq!(value["failed"][0]["address"], "10.0.0.2");
        assert_eq!(value["failed"][0]["outcome"]["status"], "unreachable");
        assert_eq!(value["failed"][1]["outcome"]["reason"], "unclassified result: ?");
    }

    #[test]
    fn empty_report_is_clean() {
        let report = BatchReport::from_results([]);
        assert!(report.is_clean());
        assert_eq!(report.total(), 0);
    }
}
