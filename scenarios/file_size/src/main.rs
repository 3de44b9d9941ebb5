use std::path::PathBuf;
use std::process::ExitCode;

use cipher_tunnel_runner::prelude::*;

/// The file grows by one byte per case, covering every size below a single 128 byte block.
const SIZES: std::ops::RangeInclusive<u64> = 1..=127;

const TEST_FILE: &str = "testfile";

#[derive(Debug, Default)]
struct ScenarioValues {
    test_file: Option<PathBuf>,
}

impl UserValuesConstraint for ScenarioValues {}

fn setup(ctx: &mut RunnerContext<ScenarioValues>) -> HookResult {
    ctx.build_tool(CipherTool::Parallel, OperationVariant::Full)?;

    let test_file = ctx.artifact(TEST_FILE);
    std::fs::write(&test_file, b"X")?;
    ctx.get_mut().test_file = Some(test_file);

    Ok(())
}

fn grow_and_round_trip(ctx: &mut RunnerContext<ScenarioValues>, size: &u64) -> CaseResult {
    let clear = ctx
        .get()
        .test_file
        .clone()
        .unwrap_or_else(|| ctx.artifact(TEST_FILE));

    let current = std::fs::metadata(&clear)?.len();
    if current < *size {
        append_random_digits(&clear, (*size - current) as usize)?;
    }

    let cypher = ctx.artifact(&format!("{TEST_FILE}.e"));
    let decyphered = ctx.artifact(&format!("{TEST_FILE}.e.d"));

    let encrypt = ctx.paes(&CipherRequest::new(&clear, &cypher, Mode::Encrypt))?;
    let decrypt = ctx.paes(&CipherRequest::new(&cypher, &decyphered, Mode::Decrypt))?;

    Ok(CaseReport::from_equivalence(ctx.equivalent(&clear, &decyphered)?)
        .with_timings(vec![encrypt, decrypt]))
}

fn main() -> ExitCode {
    let builder =
        ScenarioDefinitionBuilder::<ScenarioValues, u64>::new_with_init(env!("CARGO_PKG_NAME"))
            .with_cases(SIZES)
            .use_setup(setup)
            .use_case_behaviour(grow_and_round_trip);

    exit_code(&run(builder))
}
