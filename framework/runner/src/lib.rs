mod artifacts;
mod build;
mod cli;
mod config;
mod context;
mod definition;
mod environment;
mod executor;
mod init;
mod process;
mod progress;
mod report;
mod run;
mod tools;
mod types;
mod verify;

pub mod prelude {
    pub use crate::artifacts::{append_random_digits, create_dummy, dummy_name};
    pub use crate::build::{make_path, BuildOrchestrator};
    pub use crate::cli::HarnessCli;
    pub use crate::config::{HarnessConfig, CT_CPU_HOSTS_ENV, CT_MAKE_PATH_ENV};
    pub use crate::context::{RunnerContext, UserValuesConstraint};
    pub use crate::definition::{
        CaseConstraint, CaseReport, CaseResult, HookResult, ScenarioDefinitionBuilder,
    };
    pub use crate::environment::{
        bootstrap, hostname, Environment, REPORTS_DIR, RUN_SUMMARY_FILE, WORK_DIR_PREFIX,
    };
    pub use crate::executor::Executor;
    pub use crate::init::init;
    pub use crate::process::ProcessRunner;
    pub use crate::report::ReportSink;
    pub use crate::run::{exit_code, exit_status, run};
    pub use crate::tools::{
        ArgGrammar, CipherRequest, CipherTool, KeySize, Mode, OperationVariant, DEFAULT_KEY_SIZE,
        DEFAULT_PASSWORD,
    };
    pub use crate::types::HarnessResult;
    pub use crate::verify::equivalent;

    pub use cipher_tunnel_core::prelude::{
        BuildError, CaseOutcome, Device, DevicePolicy, InvocationTimeoutError, Metrics,
        ParseError, RunResult, RunStatus, SetupError, Verdict,
    };
}
