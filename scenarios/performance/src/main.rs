use std::fmt::{Display, Formatter};
use std::process::ExitCode;

use cipher_tunnel_runner::prelude::*;

const SIZES: [u64; 22] = [
    128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768, 65536, 131072, 262144, 524288,
    1048576, 2097152, 4194304, 8388608, 16777216, 33554432, 67108864, 134217728, 234700800,
];

const COLUMN_WIDTH: usize = 15;

/// Input size in bytes, displayed as the left aligned first column of the table.
#[derive(Debug, Clone, Copy)]
struct SizeCase(u64);

impl Display for SizeCase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<width$}", self.0, width = COLUMN_WIDTH)
    }
}

impl CaseConstraint for SizeCase {}

fn setup(ctx: &mut RunnerContext<()>) -> HookResult {
    ctx.note(&format!("Key size = {}", DEFAULT_KEY_SIZE.bits()))?;
    ctx.note("")?;

    ctx.build_tool(CipherTool::Parallel, OperationVariant::Full)?;

    log::info!("Creating dummy files");
    for size in SIZES {
        ctx.create_dummy(size)?;
    }

    // Let the disk settle before the first measurement.
    std::thread::sleep(ctx.cooldown() / 2);

    ctx.note(&format!(
        "{:<w$} {:>w$} {:>w$} {:>w$} {:>w$}",
        "Size",
        "Encrypt",
        "Decrypt",
        "Write",
        "Read",
        w = COLUMN_WIDTH
    ))?;
    ctx.note("")?;

    Ok(())
}

fn measure(ctx: &mut RunnerContext<()>, case: &SizeCase) -> CaseResult {
    let clear = ctx.artifact(&dummy_name(case.0));
    let cypher = ctx.artifact(&format!("{}.e", dummy_name(case.0)));
    let decyphered = ctx.artifact(&format!("{}.d", dummy_name(case.0)));

    let encrypt = ctx.paes(&CipherRequest::new(&clear, &cypher, Mode::Encrypt))?;
    let decrypt = ctx.paes(&CipherRequest::new(&cypher, &decyphered, Mode::Decrypt))?;

    let equivalent = ctx.equivalent(&clear, &decyphered)?;

    Ok(CaseReport::from_equivalence(equivalent)
        .with_detail(timings_row(&encrypt, &decrypt))
        .with_timings(vec![encrypt, decrypt]))
}

/// Encrypt and decrypt times, then the mean write and read times of both runs.
fn timings_row(encrypt: &Metrics, decrypt: &Metrics) -> String {
    let write = (encrypt.write_time_ms + decrypt.write_time_ms) / 2.0;
    let read = (encrypt.read_time_ms + decrypt.read_time_ms) / 2.0;

    format!(
        "{:>w$.3} {:>w$.3} {:>w$.3} {:>w$.3}",
        encrypt.encrypt_time_ms,
        decrypt.encrypt_time_ms,
        write,
        read,
        w = COLUMN_WIDTH
    )
}

fn main() -> ExitCode {
    let builder = ScenarioDefinitionBuilder::<(), SizeCase>::new_with_init(env!("CARGO_PKG_NAME"))
        .with_cases(SIZES.map(SizeCase))
        .with_default_cooldown_s(20)
        .use_setup(setup)
        .use_case_behaviour(measure);

    exit_code(&run(builder))
}
