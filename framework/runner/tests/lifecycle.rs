use std::path::{Path, PathBuf};

use cipher_tunnel_runner::prelude::*;
use cipher_tunnel_summary_model::RunSummary;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[derive(Default, Debug)]
struct RunnerContextValue {
    setups: usize,
}

impl UserValuesConstraint for RunnerContextValue {}

fn sample_cfg(base_dir: &Path) -> HarnessConfig {
    let mut config = HarnessConfig::with_base_dir(base_dir);
    config.device = Some(Device::Cpu);
    config
}

fn report_lines(base_dir: &Path, name: &str) -> Vec<String> {
    let reports = base_dir.join(REPORTS_DIR);
    let report = std::fs::read_dir(&reports)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| {
            let file_name = p.file_name().unwrap().to_string_lossy().to_string();
            file_name.starts_with(&format!("{name}_")) && file_name.ends_with(".log")
        })
        .expect("report file should exist");

    std::fs::read_to_string(report)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

fn run_summaries(base_dir: &Path) -> Vec<RunSummary> {
    std::fs::read_to_string(base_dir.join(REPORTS_DIR).join(RUN_SUMMARY_FILE))
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn work_dir(base_dir: &Path, name: &str) -> PathBuf {
    base_dir
        .canonicalize()
        .unwrap()
        .join(format!("{WORK_DIR_PREFIX}{name}"))
}

#[test]
fn one_failed_case_fails_the_run_and_keeps_the_work_dir() {
    fn behaviour(_ctx: &mut RunnerContext<RunnerContextValue>, case: &u64) -> CaseResult {
        Ok(CaseReport::from_equivalence(*case != 2))
    }

    let base = TempDir::new().unwrap();
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, u64>::new(
        "sticky_failure",
        sample_cfg(base.path()),
    )
    .with_cases([1, 2, 3])
    .use_case_behaviour(behaviour);

    let result = run(scenario).unwrap();

    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.failed_cases, vec!["2".to_string()]);
    assert_eq!(result.outcomes.len(), 3);
    assert!(work_dir(base.path(), "sticky_failure").is_dir());

    let lines = report_lines(base.path(), "sticky_failure");
    let case_lines = lines
        .iter()
        .filter(|l| l.ends_with(" ok") || l.ends_with(" ko"))
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(case_lines, vec!["1 ok", "2 ko", "3 ok"]);
    assert_eq!(lines[0], "Test name: sticky failure");
    assert!(lines.iter().any(|l| l.starts_with("Time elapsed: ")));
}

#[test]
fn passing_run_removes_the_work_dir() {
    fn setup(ctx: &mut RunnerContext<RunnerContextValue>) -> HookResult {
        ctx.get_mut().setups += 1;
        std::fs::write(ctx.artifact("scratch"), b"data")?;
        Ok(())
    }

    fn behaviour(ctx: &mut RunnerContext<RunnerContextValue>, _case: &u64) -> CaseResult {
        assert_eq!(ctx.get().setups, 1);
        Ok(CaseReport::from_equivalence(ctx.equivalent("scratch", "scratch")?))
    }

    let base = TempDir::new().unwrap();
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, u64>::new(
        "all_passing",
        sample_cfg(base.path()),
    )
    .with_cases([10, 20])
    .use_setup(setup)
    .use_case_behaviour(behaviour);

    let result = run(scenario);

    assert_eq!(exit_status(&result), 0);
    let result = result.unwrap();
    assert_eq!(result.status, RunStatus::Passed);
    assert!(!work_dir(base.path(), "all_passing").exists());

    let summaries = run_summaries(base.path());
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].scenario_name, "all_passing");
    assert_eq!(summaries[0].status, "passed");
    assert_eq!(summaries[0].case_count, 2);
    assert_eq!(summaries[0].device, "cpu");
}

#[test]
fn case_error_is_recorded_and_the_run_continues() {
    fn behaviour(_ctx: &mut RunnerContext<RunnerContextValue>, case: &u64) -> CaseResult {
        if *case == 1 {
            anyhow::bail!("Error in case behaviour");
        }
        Ok(CaseReport::new(Verdict::Ok))
    }

    let base = TempDir::new().unwrap();
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, u64>::new(
        "case_error",
        sample_cfg(base.path()),
    )
    .with_cases([1, 2])
    .use_case_behaviour(behaviour);

    let result = run(scenario).unwrap();

    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.outcomes[1].verdict, Verdict::Ok);

    let lines = report_lines(base.path(), "case_error");
    let exception = lines
        .iter()
        .position(|l| l == "EXCEPTION: Error in case behaviour")
        .expect("exception should be reported");
    assert_eq!(lines[exception + 1], "1 ko");
    assert_eq!(lines[exception + 2], "2 ok");
}

#[derive(Debug)]
struct DirectedStage {
    encrypt: bool,
    stage: u64,
}

impl std::fmt::Display for DirectedStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stage)
    }
}

impl CaseConstraint for DirectedStage {
    fn id(&self) -> String {
        let direction = if self.encrypt { "encrypt" } else { "decrypt" };
        format!("{direction}/{}", self.stage)
    }
}

#[test]
fn repeated_labels_are_told_apart_by_case_id() {
    fn behaviour(
        _ctx: &mut RunnerContext<RunnerContextValue>,
        case: &DirectedStage,
    ) -> CaseResult {
        Ok(CaseReport::from_equivalence(case.encrypt || case.stage != 1))
    }

    let base = TempDir::new().unwrap();
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, DirectedStage>::new(
        "repeated_labels",
        sample_cfg(base.path()),
    )
    .with_cases([true, false].into_iter().flat_map(|encrypt| {
        [1, 2]
            .into_iter()
            .map(move |stage| DirectedStage { encrypt, stage })
    }))
    .use_case_behaviour(behaviour);

    let result = run(scenario).unwrap();

    assert_eq!(result.failed_cases, vec!["decrypt/1".to_string()]);

    let lines = report_lines(base.path(), "repeated_labels");
    let case_lines = lines
        .iter()
        .filter(|l| l.ends_with(" ok") || l.ends_with(" ko"))
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(case_lines, vec!["1 ok", "2 ok", "1 ko", "2 ok"]);

    let summaries = run_summaries(base.path());
    assert_eq!(summaries[0].failed_cases, vec!["decrypt/1".to_string()]);
}

#[test]
fn propagate_error_in_setup_hook() {
    fn setup(_ctx: &mut RunnerContext<RunnerContextValue>) -> HookResult {
        Err(anyhow::anyhow!("Error in setup hook"))
    }

    fn behaviour(_ctx: &mut RunnerContext<RunnerContextValue>, _case: &u64) -> CaseResult {
        panic!("cases must not run when setup fails");
    }

    let base = TempDir::new().unwrap();
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, u64>::new(
        "setup_hook_error",
        sample_cfg(base.path()),
    )
    .with_cases([1])
    .use_setup(setup)
    .use_case_behaviour(behaviour);

    let result = run(scenario);

    assert_eq!(result.as_ref().unwrap_err().to_string(), "Error in setup hook");
    assert_eq!(exit_status(&result), 1);
}

#[test]
fn unusable_base_dir_is_a_setup_failure() {
    fn behaviour(_ctx: &mut RunnerContext<RunnerContextValue>, _case: &u64) -> CaseResult {
        Ok(CaseReport::new(Verdict::Ok))
    }

    let base = TempDir::new().unwrap();
    let file = base.path().join("occupied");
    std::fs::write(&file, b"").unwrap();

    let scenario =
        ScenarioDefinitionBuilder::<RunnerContextValue, u64>::new("no_room", sample_cfg(&file))
            .with_cases([1])
            .use_case_behaviour(behaviour);

    let result = run(scenario);

    assert!(result.as_ref().unwrap_err().is::<SetupError>());
    assert_eq!(exit_status(&result), 1);
}

#[cfg(unix)]
mod with_tools {
    use std::os::unix::fs::PermissionsExt as _;
    use std::time::Duration;

    use super::*;
    use pretty_assertions::assert_eq;

    const FAKE_PAES: &str = r#"while getopts "i:o:m:k:p:d:" opt; do
  case $opt in
    i) in="$OPTARG" ;;
    o) out="$OPTARG" ;;
  esac
done
cp "$in" "$out"
printf 'Encrypt time:\t1.500 ms\nWrite time:\t0.250 ms\nRead time:\t0.125 ms\n'"#;

    const FAKE_AES: &str =
        "cp \"$2\" \"$3\"\necho \"### Time of computation 2.000000 ms ###\"";

    fn write_script(path: &Path, body: &str) {
        std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).unwrap();
    }

    /// Lay out fake tool sources next to `base` and point the configuration at them.
    fn tool_cfg(base: &TempDir, make_body: &str, paes_body: &str) -> HarnessConfig {
        let paes_src = base.path().join("paes");
        let aes_src = base.path().join("aes");
        let run_dir = base.path().join("test");
        std::fs::create_dir_all(&paes_src).unwrap();
        std::fs::create_dir_all(&aes_src).unwrap();
        std::fs::create_dir_all(&run_dir).unwrap();

        let make = base.path().join("make");
        write_script(&make, make_body);
        write_script(&paes_src.join("paes"), paes_body);
        std::fs::write(paes_src.join("paes.cl"), b"__kernel void x() {}").unwrap();
        write_script(&aes_src.join("aes"), FAKE_AES);

        let mut config = sample_cfg(&run_dir);
        config.paes_src = paes_src;
        config.aes_src = aes_src;
        config.make_path = Some(make);
        config
    }

    fn build_paes(ctx: &mut RunnerContext<RunnerContextValue>) -> HookResult {
        ctx.build_tool(CipherTool::Parallel, OperationVariant::Full)?;
        Ok(())
    }

    fn round_trip(ctx: &mut RunnerContext<RunnerContextValue>, size: &u64) -> CaseResult {
        let clear_in = ctx.create_dummy(*size)?;
        let cypher = format!("{}.e", dummy_name(*size));
        let clear_out = format!("{cypher}.d");

        let encrypted = ctx.paes(&CipherRequest::new(&clear_in, &cypher, Mode::Encrypt))?;
        let decrypted = ctx.paes(&CipherRequest::new(&cypher, &clear_out, Mode::Decrypt))?;

        Ok(
            CaseReport::from_equivalence(ctx.equivalent(&clear_in, &clear_out)?)
                .with_timings(vec![encrypted, decrypted]),
        )
    }

    #[test]
    fn round_trip_of_128_bytes_is_ok() {
        let base = TempDir::new().unwrap();
        let config = tool_cfg(&base, "exit 0", FAKE_PAES);
        let run_dir = config.base_dir.clone();

        let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, u64>::new(
            "round_trip",
            config,
        )
        .with_cases([128])
        .use_setup(build_paes)
        .use_case_behaviour(round_trip);

        let result = run(scenario).unwrap();

        assert_eq!(result.status, RunStatus::Passed);
        assert_eq!(
            result.outcomes[0].timings,
            vec![Metrics::new(1.5, 0.25, 0.125), Metrics::new(1.5, 0.25, 0.125)]
        );
        assert!(report_lines(&run_dir, "round_trip").contains(&"128 ok".to_string()));
        assert!(!work_dir(&run_dir, "round_trip").exists());
    }

    #[test]
    fn unparseable_output_fails_the_case() {
        let base = TempDir::new().unwrap();
        let config = tool_cfg(&base, "exit 0", "echo 'nothing useful'");
        let run_dir = config.base_dir.clone();

        let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, u64>::new(
            "no_timings",
            config,
        )
        .with_cases([16, 32])
        .use_setup(build_paes)
        .use_case_behaviour(round_trip);

        let result = run(scenario).unwrap();

        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.failed_cases, vec!["16".to_string(), "32".to_string()]);

        let work = work_dir(&run_dir, "no_timings");
        assert!(work.join("paes").exists());
        assert!(work.join("paes.cl").exists());
    }

    #[test]
    fn timeout_fails_the_case_and_the_run_continues() {
        let base = TempDir::new().unwrap();
        let mut config = tool_cfg(&base, "exit 0", "sleep 5");
        config.timeout = Some(Duration::from_millis(200));

        let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, u64>::new(
            "slow_tool",
            config,
        )
        .with_cases([1, 2])
        .use_setup(build_paes)
        .use_case_behaviour(round_trip);

        let result = run(scenario).unwrap();

        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.outcomes.len(), 2);
    }

    #[test]
    fn build_failure_aborts_without_teardown() {
        let base = TempDir::new().unwrap();
        let config = tool_cfg(&base, "[ \"$1\" = clean ] && exit 0\nexit 1", FAKE_PAES);
        let run_dir = config.base_dir.clone();

        let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, u64>::new(
            "broken_build",
            config,
        )
        .with_cases([128])
        .use_setup(build_paes)
        .use_case_behaviour(round_trip);

        let result = run(scenario);

        assert!(result.as_ref().unwrap_err().is::<BuildError>());
        assert_eq!(exit_status(&result), 2);
        assert!(work_dir(&run_dir, "broken_build").is_dir());

        let lines = report_lines(&run_dir, "broken_build");
        assert!(!lines.iter().any(|l| l.starts_with("End time")));
        assert!(!run_dir.join(REPORTS_DIR).join(RUN_SUMMARY_FILE).exists());
    }

    #[test]
    fn build_failure_inside_a_case_aborts_the_run() {
        fn rebuild_then_compare(
            ctx: &mut RunnerContext<RunnerContextValue>,
            variant: &OperationVariant,
        ) -> CaseResult {
            ctx.build_tool(CipherTool::Parallel, *variant)?;
            ctx.build_tool(CipherTool::Reference, *variant)?;

            let clear = ctx.create_dummy(64)?;
            ctx.aes(&CipherRequest::new(&clear, "dummy-64.aes", Mode::Encrypt))?;
            ctx.paes(&CipherRequest::new(&clear, "dummy-64.paes", Mode::Encrypt))?;

            Ok(CaseReport::from_equivalence(
                ctx.equivalent("dummy-64.aes", "dummy-64.paes")?,
            ))
        }

        let base = TempDir::new().unwrap();
        // Only the MixColumns variant fails to build.
        let config = tool_cfg(
            &base,
            "case \"$*\" in *MIX_COLUMNS*) exit 1 ;; esac\nexit 0",
            FAKE_PAES,
        );
        let run_dir = config.base_dir.clone();

        let scenario =
            ScenarioDefinitionBuilder::<RunnerContextValue, OperationVariant>::new(
                "variant_build",
                config,
            )
            .with_cases(OperationVariant::ALL)
            .use_case_behaviour(rebuild_then_compare);

        let result = run(scenario);

        assert!(result.as_ref().unwrap_err().is::<BuildError>());

        let lines = report_lines(&run_dir, "variant_build");
        let case_lines = lines
            .iter()
            .filter(|l| l.ends_with(" ok") || l.ends_with(" ko"))
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(case_lines, vec!["ShiftRows ok", "SubBytes ok"]);
    }
}
