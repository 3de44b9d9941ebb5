mod cases_table;

use cipher_tunnel_core::prelude::CaseOutcome;
use tabled::settings::Style;
use tabled::Table;

use crate::report::summary_report::cases_table::CaseRow;

/// Collects case outcomes during a run and prints them as a table once the run is over.
#[derive(Default)]
pub struct SummaryReportCollector {
    outcomes: Vec<CaseOutcome>,
}

impl SummaryReportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_case(&mut self, outcome: &CaseOutcome) {
        self.outcomes.push(outcome.clone());
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Render the table of cases in execution order.
    ///
    /// The timing columns are totals over every tool invocation a case made.
    pub fn render(&self) -> String {
        let rows = self
            .outcomes
            .iter()
            .map(|outcome| CaseRow {
                case: outcome.case.clone(),
                result: outcome.verdict.to_string(),
                elapsed_ms: outcome.elapsed.as_micros() as f64 / 1000.0,
                crypt_ms: outcome.timings.iter().map(|m| m.encrypt_time_ms).sum(),
                write_ms: outcome.timings.iter().map(|m| m.write_time_ms).sum(),
                read_ms: outcome.timings.iter().map(|m| m.read_time_ms).sum(),
            })
            .collect::<Vec<_>>();

        let mut table = Table::new(&rows);
        table.with(Style::modern());

        table.to_string()
    }

    pub fn finalize(&self) {
        if self.is_empty() {
            log::warn!("No cases were recorded");
            return;
        }

        println!("\nSummary of {} cases", self.len());
        println!("{}", self.render());
    }
}
