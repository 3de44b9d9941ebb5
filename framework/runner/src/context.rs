use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use cipher_tunnel_core::prelude::{BuildError, Device, Metrics};
use cipher_tunnel_instruments::extract_metrics;

use crate::artifacts;
use crate::build::BuildOrchestrator;
use crate::environment::Environment;
use crate::process::ProcessRunner;
use crate::report::ReportSink;
use crate::tools::{CipherRequest, CipherTool, OperationVariant};
use crate::types::HarnessResult;
use crate::verify;

pub trait UserValuesConstraint: Default + Debug + 'static {}

impl UserValuesConstraint for () {}

/// Everything a scenario's hooks can reach during a run.
///
/// All relative artifact paths are resolved against the run's working directory, which is also
/// the current directory of every tool invocation.
#[derive(Debug)]
pub struct RunnerContext<RV: UserValuesConstraint> {
    environment: Environment,
    report: ReportSink,
    process_runner: ProcessRunner,
    build: BuildOrchestrator,
    paes_src: PathBuf,
    aes_src: PathBuf,
    cooldown: Duration,
    value: RV,
}

impl<RV: UserValuesConstraint> RunnerContext<RV> {
    pub(crate) fn new(
        environment: Environment,
        report: ReportSink,
        process_runner: ProcessRunner,
        build: BuildOrchestrator,
        paes_src: PathBuf,
        aes_src: PathBuf,
        cooldown: Duration,
    ) -> Self {
        Self {
            environment,
            report,
            process_runner,
            build,
            paes_src,
            aes_src,
            cooldown,
            value: Default::default(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn device(&self) -> Device {
        self.environment.device()
    }

    pub fn work_dir(&self) -> &Path {
        self.environment.work_dir()
    }

    /// Path of a named artifact inside the working directory.
    pub fn artifact(&self, name: &str) -> PathBuf {
        self.work_dir().join(name)
    }

    /// The pause the runner leaves between cases.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Append a free-form line to the report, e.g. a section header.
    pub fn note(&mut self, text: &str) -> HarnessResult<()> {
        self.report.append(text)
    }

    pub(crate) fn report_mut(&mut self) -> &mut ReportSink {
        &mut self.report
    }

    /// Build `tool` with the given operation variant and copy it into the working directory.
    pub fn build_tool(
        &self,
        tool: CipherTool,
        variant: OperationVariant,
    ) -> Result<PathBuf, BuildError> {
        let src_dir = match tool {
            CipherTool::Parallel => &self.paes_src,
            CipherTool::Reference => &self.aes_src,
        };

        self.build.build(tool, src_dir, variant, self.work_dir())
    }

    /// Invoke a previously built tool and parse the timings it reports.
    pub fn run_tool(&self, tool: CipherTool, request: &CipherRequest) -> HarnessResult<Metrics> {
        let executable = self.artifact(tool.binary_name());
        if !executable.exists() {
            anyhow::bail!(
                "{tool} has not been built into {}",
                self.work_dir().display()
            );
        }

        let args = request.to_args(tool.grammar(), self.device());
        let output = self
            .process_runner
            .invoke(&executable, &args, self.work_dir())?;
        log::trace!("{tool} output:\n{output}");

        let metrics = extract_metrics(tool.output_format(), &output)
            .with_context(|| format!("{tool} {} of {}", request.mode, request.input.display()))?;

        Ok(metrics)
    }

    /// Run the parallel tool under test.
    pub fn paes(&self, request: &CipherRequest) -> HarnessResult<Metrics> {
        self.run_tool(CipherTool::Parallel, request)
    }

    /// Run the serial reference tool.
    pub fn aes(&self, request: &CipherRequest) -> HarnessResult<Metrics> {
        self.run_tool(CipherTool::Reference, request)
    }

    /// Create a random input file of `size` bytes in the working directory.
    pub fn create_dummy(&self, size: u64) -> HarnessResult<PathBuf> {
        artifacts::create_dummy(self.work_dir(), size)
    }

    /// Byte-exact comparison of two artifacts in the working directory.
    pub fn equivalent(&self, a: impl AsRef<Path>, b: impl AsRef<Path>) -> HarnessResult<bool> {
        verify::equivalent(&self.artifact_path(a), &self.artifact_path(b))
    }

    fn artifact_path(&self, path: impl AsRef<Path>) -> PathBuf {
        // Joining an absolute path replaces the base, so absolute paths pass through.
        self.work_dir().join(path)
    }

    pub fn get_mut(&mut self) -> &mut RV {
        &mut self.value
    }

    pub fn get(&self) -> &RV {
        &self.value
    }
}
