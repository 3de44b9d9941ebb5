mod extract;
mod report;

use std::time::Instant;

use cipher_tunnel_core::prelude::{CaseOutcome, Metrics, Verdict};

pub use extract::{extract_metrics, OutputFormat};
pub use report::SummaryReportCollector;

/// Tracks a case from the moment it starts until its verdict is known.
///
/// The case is identified by its id, which is what ends up in run results and summaries.
pub struct CaseRecord {
    case: String,
    started: Instant,
}

impl CaseRecord {
    pub fn new(case: String) -> Self {
        Self {
            case,
            started: Instant::now(),
        }
    }

    pub fn case(&self) -> &str {
        &self.case
    }

    pub fn finish(self, verdict: Verdict, timings: Vec<Metrics>) -> CaseOutcome {
        let elapsed = self.started.elapsed();
        log::debug!(
            "Case {} took {}ms, verdict {}",
            self.case,
            elapsed.as_millis(),
            verdict
        );

        CaseOutcome {
            case: self.case,
            verdict,
            timings,
            elapsed,
        }
    }
}
