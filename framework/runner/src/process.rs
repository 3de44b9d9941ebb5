use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cipher_tunnel_core::prelude::InvocationTimeoutError;

use crate::executor::Executor;
use crate::types::HarnessResult;

/// Invokes external executables and captures what they print.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    executor: Arc<Executor>,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(executor: Arc<Executor>, timeout: Option<Duration>) -> Self {
        Self { executor, timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run `program` with `args` from inside `cwd` and return its stdout followed by its stderr.
    ///
    /// Blocks until the process exits. If a timeout is configured and the process is still
    /// running when it expires, the process is killed and an [InvocationTimeoutError] is
    /// returned. A nonzero exit status is logged but the output is still returned, it's up to the
    /// caller to decide whether the output is usable.
    pub fn invoke(&self, program: &Path, args: &[OsString], cwd: &Path) -> HarnessResult<String> {
        let display = program.display().to_string();
        log::debug!("Running {display} {args:?} in {}", cwd.display());

        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let timeout = self.timeout;
        let output = self.executor.execute_in_place(async move {
            let output = match timeout {
                Some(limit) => match tokio::time::timeout(limit, command.output()).await {
                    Ok(output) => output,
                    Err(_) => return Err(InvocationTimeoutError::new(display, limit).into()),
                },
                None => command.output().await,
            }
            .with_context(|| format!("Failed to run {display}"))?;

            if !output.status.success() {
                log::warn!("{display} exited with {}", output.status);
            }

            Ok(output)
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(combined)
    }
}
