use std::fmt::{Display, Formatter};
use std::process::ExitCode;

use cipher_tunnel_runner::prelude::*;

/// Large enough to span several work groups without being a multiple of the block count.
const SIZE: u64 = 1024 * 1024 + 16 * 1022;

/// Run one restricted stage of the pipeline through both tools in one direction.
#[derive(Debug, Clone, Copy)]
struct StageCase {
    mode: Mode,
    variant: OperationVariant,
}

impl Display for StageCase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.variant)
    }
}

impl CaseConstraint for StageCase {
    fn id(&self) -> String {
        format!("{}/{}", self.mode, self.variant)
    }
}

fn cases() -> impl Iterator<Item = StageCase> {
    Mode::ALL.into_iter().flat_map(|mode| {
        OperationVariant::ALL
            .into_iter()
            .map(move |variant| StageCase { mode, variant })
    })
}

fn compare_with_reference(ctx: &mut RunnerContext<()>, case: &StageCase) -> CaseResult {
    if case.variant == OperationVariant::ALL[0] {
        ctx.note("")?;
        ctx.note(&format!("AES mode: {}", case.mode))?;
        ctx.note("")?;
    }

    ctx.build_tool(CipherTool::Parallel, case.variant)?;
    ctx.build_tool(CipherTool::Reference, case.variant)?;

    let input = ctx.create_dummy(SIZE)?;
    let reference_out = ctx.artifact(&format!("{}.aes", dummy_name(SIZE)));
    let parallel_out = ctx.artifact(&format!("{}.paes", dummy_name(SIZE)));

    let reference = ctx.aes(&CipherRequest::new(&input, &reference_out, case.mode))?;
    let parallel = ctx.paes(&CipherRequest::new(&input, &parallel_out, case.mode))?;

    Ok(
        CaseReport::from_equivalence(ctx.equivalent(&reference_out, &parallel_out)?)
            .with_timings(vec![reference, parallel]),
    )
}

fn main() -> ExitCode {
    let builder = ScenarioDefinitionBuilder::<(), StageCase>::new_with_init(env!("CARGO_PKG_NAME"))
        .with_cases(cases())
        .use_case_behaviour(compare_with_reference);

    exit_code(&run(builder))
}
