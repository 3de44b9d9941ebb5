use std::path::PathBuf;
use std::time::Duration;

/// Process exit code used when the isolated working directory cannot be prepared.
pub const EXIT_SETUP_FAILURE: u8 = 1;

/// Process exit code used when building a tool under test fails.
pub const EXIT_BUILD_FAILURE: u8 = 2;

/// The run environment could not be set up.
///
/// This is never a case failure. The run stops before any case executes.
#[derive(derive_more::Error, derive_more::Display, Debug)]
#[display("Unable to create the temporary test directory {}: {source}", path.display())]
pub struct SetupError {
    path: PathBuf,
    source: std::io::Error,
}

impl SetupError {
    pub fn new(path: PathBuf, source: std::io::Error) -> Self {
        Self { path, source }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// Building one of the tools failed.
///
/// Returning this from a hook or a case behaviour aborts the whole run. Teardown is skipped, so
/// the working directory is left exactly as the failed build left it.
#[derive(derive_more::Error, derive_more::Display, Debug)]
#[display("Error building {tool}: {reason}")]
pub struct BuildError {
    tool: String,
    reason: String,
}

impl BuildError {
    pub fn new(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }
}

/// A required timing line was missing from a tool's output, or its value was unusable.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq, Eq)]
#[display("Could not parse [{template}] from the tool output")]
pub struct ParseError {
    template: String,
}

impl ParseError {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

/// An external tool ran past its configured time limit and was killed.
#[derive(derive_more::Error, derive_more::Display, Debug)]
#[display("{program} did not finish within {timeout:?}")]
pub struct InvocationTimeoutError {
    program: String,
    timeout: Duration,
}

impl InvocationTimeoutError {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}
