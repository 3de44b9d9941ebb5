use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::metrics::Metrics;

/// The result of a single case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Ko,
}

impl Verdict {
    pub fn from_equivalence(equivalent: bool) -> Self {
        if equivalent {
            Verdict::Ok
        } else {
            Verdict::Ko
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Verdict::Ok)
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Ok => f.write_str("ok"),
            Verdict::Ko => f.write_str("ko"),
        }
    }
}

/// Overall status of a run.
///
/// A run starts out [RunStatus::Passed] and can only ever move to [RunStatus::Failed].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunStatus {
    #[default]
    Passed,
    Failed,
}

impl RunStatus {
    /// Fold one case verdict into the status. Once failed, always failed.
    #[must_use]
    pub fn record(self, verdict: Verdict) -> Self {
        match (self, verdict) {
            (RunStatus::Passed, Verdict::Ok) => RunStatus::Passed,
            _ => RunStatus::Failed,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, RunStatus::Passed)
    }
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Passed => f.write_str("passed"),
            RunStatus::Failed => f.write_str("failed"),
        }
    }
}

/// What happened when a case was executed.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseOutcome {
    /// The case label, as written to the report.
    pub case: String,
    pub verdict: Verdict,
    /// Timings parsed from every tool invocation the case made, in invocation order.
    pub timings: Vec<Metrics>,
    pub elapsed: Duration,
}

/// The result of a run that reached teardown.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub status: RunStatus,
    pub failed_cases: Vec<String>,
    pub outcomes: Vec<CaseOutcome>,
    pub elapsed: Duration,
}

impl RunResult {
    pub fn from_outcomes(outcomes: Vec<CaseOutcome>, elapsed: Duration) -> Self {
        let status = outcomes
            .iter()
            .fold(RunStatus::default(), |status, outcome| {
                status.record(outcome.verdict)
            });
        let failed_cases = outcomes
            .iter()
            .filter(|outcome| !outcome.verdict.is_ok())
            .map(|outcome| outcome.case.clone())
            .collect();

        Self {
            status,
            failed_cases,
            outcomes,
            elapsed,
        }
    }

    /// The working directory is only removed when every case passed.
    pub fn should_remove_work_dir(&self) -> bool {
        self.status.is_passed()
    }
}
