use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Summary of a run that reached teardown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// The unique run id
    ///
    /// Chosen by the runner. Unique for each run.
    pub run_id: String,
    /// The name of the scenario that was run
    pub scenario_name: String,
    /// The device the parallel tool was asked to use, `cpu` or `gpu`
    pub device: String,
    /// The host the run executed on
    pub hostname: String,
    /// The time the run started
    ///
    /// This is a Unix timestamp in seconds.
    pub started_at: i64,
    /// Wall clock duration of the run, in seconds
    pub elapsed_s: f64,
    /// `passed` if every case passed, otherwise `failed`
    pub status: String,
    /// The number of cases that were executed
    pub case_count: usize,
    /// Labels of the cases that failed, in execution order
    pub failed_cases: Vec<String>,
    /// The version of the harness that produced this summary
    pub harness_version: String,
}

impl RunSummary {
    /// Create a new run summary for a run with no failures
    pub fn new(
        run_id: String,
        scenario_name: String,
        device: String,
        hostname: String,
        started_at: i64,
        harness_version: String,
    ) -> Self {
        Self {
            run_id,
            scenario_name,
            device,
            hostname,
            started_at,
            elapsed_s: 0.0,
            status: "passed".to_string(),
            case_count: 0,
            failed_cases: Vec::with_capacity(0),
            harness_version,
        }
    }

    /// Record how the run ended
    pub fn set_outcome(
        &mut self,
        status: String,
        case_count: usize,
        failed_cases: Vec<String>,
        elapsed_s: f64,
    ) {
        self.status = status;
        self.case_count = case_count;
        self.failed_cases = failed_cases;
        self.elapsed_s = elapsed_s;
    }
}

/// Append the run summary to a file
///
/// The summary will be serialized to JSON and output as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_run_summary(run_summary: &RunSummary, path: &Path) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    store_run_summary(run_summary, &mut file)?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Serialize the run summary to a writer
pub fn store_run_summary<W: Write>(run_summary: &RunSummary, writer: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer(writer, run_summary)?;
    Ok(())
}
