use crate::cli::HarnessCli;
use crate::config::HarnessConfig;
use clap::Parser;

/// Initialise the CLI and logging for the harness runner.
///
/// Logging defaults to `info` so that case results show up on the console. Set `RUST_LOG` to
/// change that.
pub fn init() -> HarnessConfig {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    HarnessConfig::from_cli(HarnessCli::parse())
}
