use cipher_tunnel_runner::prelude::*;
use std::process::ExitCode;

const SIZES: [u64; 5] = [128, 1024, 1024 * 1024, 8 * 1024 * 1024, 64 * 1024 * 1024];

fn setup(ctx: &mut RunnerContext<()>) -> HookResult {
    ctx.build_tool(CipherTool::Parallel, OperationVariant::Full)?;
    Ok(())
}

/// Encrypt a random file, decrypt the result and expect the original back.
fn round_trip(ctx: &mut RunnerContext<()>, size: &u64) -> CaseResult {
    let clear = ctx.create_dummy(*size)?;
    let cypher = ctx.artifact(&format!("{}.e", dummy_name(*size)));
    let decyphered = ctx.artifact(&format!("{}.e.d", dummy_name(*size)));

    let encrypt = ctx.paes(&CipherRequest::new(&clear, &cypher, Mode::Encrypt))?;
    let decrypt = ctx.paes(&CipherRequest::new(&cypher, &decyphered, Mode::Decrypt))?;

    let equivalent = ctx.equivalent(&clear, &decyphered)?;
    if !equivalent {
        log::warn!("Round trip of {} bytes changed the data", size);
    }

    Ok(CaseReport::from_equivalence(equivalent).with_timings(vec![encrypt, decrypt]))
}

fn main() -> ExitCode {
    let builder = ScenarioDefinitionBuilder::<(), u64>::new_with_init(env!("CARGO_PKG_NAME"))
        .with_cases(SIZES)
        .use_setup(setup)
        .use_case_behaviour(round_trip);

    exit_code(&run(builder))
}
