use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use cipher_tunnel_core::prelude::{
    BuildError, RunResult, SetupError, Verdict, EXIT_BUILD_FAILURE, EXIT_SETUP_FAILURE,
};
use cipher_tunnel_instruments::{CaseRecord, SummaryReportCollector};
use cipher_tunnel_summary_model::{append_run_summary, RunSummary};

use crate::build::BuildOrchestrator;
use crate::context::{RunnerContext, UserValuesConstraint};
use crate::definition::{CaseConstraint, CaseReport, ScenarioDefinitionBuilder};
use crate::environment::bootstrap;
use crate::executor::Executor;
use crate::process::ProcessRunner;
use crate::progress::start_progress;
use crate::types::HarnessResult;

/// Run a scenario from start to finish.
///
/// The run bootstraps its environment, runs the setup hook and then every case in order. A case
/// that fails is recorded and the run moves on to the next case. Only setup and build failures
/// stop the run early, and they skip teardown entirely so the working directory is left behind
/// untouched.
///
/// Once every case has run, teardown writes the end of the report, prints a summary and removes
/// the working directory if, and only if, every case passed.
pub fn run<RV: UserValuesConstraint, C: CaseConstraint>(
    definition: ScenarioDefinitionBuilder<RV, C>,
) -> HarnessResult<RunResult> {
    let definition = definition.build()?;

    log::info!("Running scenario: {}", definition.name);

    let (environment, report) = bootstrap(&definition.name, &definition.config)?;
    let executor = Arc::new(Executor::new()?);
    let mut runner_context = RunnerContext::<RV>::new(
        environment,
        report,
        ProcessRunner::new(executor, definition.config.timeout),
        BuildOrchestrator::new(definition.config.make_path.clone()),
        definition.config.paes_src.clone(),
        definition.config.aes_src.clone(),
        definition.cooldown,
    );

    let started = Instant::now();

    if let Some(setup_fn) = definition.setup_fn {
        setup_fn(&mut runner_context)?;
    }

    let progress = start_progress(definition.cases.len(), definition.config.no_progress)?;
    let mut summary = SummaryReportCollector::new();
    let mut outcomes = Vec::with_capacity(definition.cases.len());

    for (index, case) in definition.cases.iter().enumerate() {
        if index > 0 && !definition.cooldown.is_zero() {
            std::thread::sleep(definition.cooldown);
        }

        let label = case.to_string();
        let record = CaseRecord::new(case.id());
        let report = match (definition.case_behaviour)(&mut runner_context, case) {
            Ok(report) => report,
            Err(e) if e.is::<BuildError>() => {
                progress.finish_and_clear();
                return Err(e);
            }
            Err(e) => {
                progress.suspend(|| log::error!("EXCEPTION in case {}: {e:#}", record.case()));
                runner_context
                    .report_mut()
                    .append(&format!("EXCEPTION: {e:#}"))?;
                CaseReport::new(Verdict::Ko)
            }
        };

        let line = report.line(&label);
        runner_context.report_mut().append(&line)?;
        progress.suspend(|| log::info!("{line}"));

        let outcome = record.finish(report.verdict, report.timings);
        summary.add_case(&outcome);
        outcomes.push(outcome);
        progress.inc(1);
    }

    progress.finish_and_clear();

    let result = RunResult::from_outcomes(outcomes, started.elapsed());
    teardown(&mut runner_context, &result, &summary)?;

    Ok(result)
}

fn teardown<RV: UserValuesConstraint>(
    runner_context: &mut RunnerContext<RV>,
    result: &RunResult,
    summary: &SummaryReportCollector,
) -> HarnessResult<()> {
    let environment = runner_context.environment().clone();
    let elapsed_s = result.elapsed.as_secs();

    log::info!("{}", "-".repeat(60));
    log::info!("{} took {} seconds", environment.name(), elapsed_s);

    let report = runner_context.report_mut();
    report.append("")?;
    report.append(&format!("End time: {}", Local::now()))?;
    report.append(&format!("Time elapsed: {elapsed_s} seconds"))?;

    summary.finalize();

    let mut run_summary = RunSummary::new(
        nanoid::nanoid!(),
        environment.name().to_string(),
        environment.device().to_string(),
        environment.hostname().to_string(),
        environment.started_at().timestamp(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    run_summary.set_outcome(
        result.status.to_string(),
        result.outcomes.len(),
        result.failed_cases.clone(),
        result.elapsed.as_secs_f64(),
    );
    // The run summary is a convenience for tooling, losing it shouldn't fail the run.
    if let Err(e) = append_run_summary(&run_summary, &environment.run_summary_path()) {
        log::warn!("Failed to write the run summary: {e:?}");
    }

    if result.should_remove_work_dir() {
        if let Err(e) = std::fs::remove_dir_all(environment.work_dir()) {
            log::warn!(
                "Failed to remove the temporary directory {}: {e}",
                environment.work_dir().display()
            );
        }
    } else {
        log::warn!(
            "Something went wrong in cases [{}], keeping the temporary directory {}",
            result.failed_cases.join(", "),
            environment.work_dir().display()
        );
    }

    Ok(())
}

/// Map the result of [run] to the process exit code.
pub fn exit_code(result: &HarnessResult<RunResult>) -> ExitCode {
    ExitCode::from(exit_status(result))
}

/// The numeric exit status for the result of [run].
///
/// A run that reached teardown exits with `0`, even if some cases failed. A build failure exits
/// with [EXIT_BUILD_FAILURE] and every other fatal error, all of which happen before the first
/// case, exits with [EXIT_SETUP_FAILURE].
pub fn exit_status(result: &HarnessResult<RunResult>) -> u8 {
    match result {
        Ok(run_result) => {
            if !run_result.status.is_passed() {
                log::warn!(
                    "{} of {} cases failed",
                    run_result.failed_cases.len(),
                    run_result.outcomes.len()
                );
            }
            0
        }
        Err(e) if e.is::<BuildError>() => {
            log::error!("DANGER: {e:#}");
            EXIT_BUILD_FAILURE
        }
        Err(e) if e.is::<SetupError>() => {
            log::error!("{e:#}");
            EXIT_SETUP_FAILURE
        }
        Err(e) => {
            log::error!("Scenario could not be started: {e:?}");
            EXIT_SETUP_FAILURE
        }
    }
}
