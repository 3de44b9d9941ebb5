use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context};
use cipher_tunnel_core::prelude::BuildError;

use crate::config::CT_MAKE_PATH_ENV;
use crate::tools::{CipherTool, OperationVariant};
use crate::types::HarnessResult;

/// Get the path to the build tool.
///
/// If an override is given, it must point at an existing file. Otherwise `make` is looked up in
/// the user's `PATH`.
pub fn make_path(override_path: Option<&Path>) -> HarnessResult<PathBuf> {
    match override_path {
        Some(path) => {
            if !path.exists() {
                bail!(
                    "Path to the build tool overridden with '{CT_MAKE_PATH_ENV}={path}' but that path doesn't exist",
                    path = path.display()
                );
            }
            Ok(path.to_path_buf())
        }
        None => which::which("make").with_context(|| {
            format!(
                "make not found in PATH. Please install it or set '{CT_MAKE_PATH_ENV}' to the correct path."
            )
        }),
    }
}

/// Builds the tools from source and ships the results into a run's working directory.
#[derive(Debug, Clone, Default)]
pub struct BuildOrchestrator {
    make_override: Option<PathBuf>,
}

impl BuildOrchestrator {
    pub fn new(make_override: Option<PathBuf>) -> Self {
        Self { make_override }
    }

    /// Clean and build `tool` in `src_dir`, then copy the executable and its auxiliary files into
    /// `work_dir`.
    ///
    /// Selecting [OperationVariant::Full] builds the unrestricted pipeline. Every other variant
    /// passes its define to the build as `DEFINES=-D <DEFINE>`.
    ///
    /// Returns the path of the copied executable.
    pub fn build(
        &self,
        tool: CipherTool,
        src_dir: &Path,
        variant: OperationVariant,
        work_dir: &Path,
    ) -> Result<PathBuf, BuildError> {
        log::info!("Compiling {tool} ({variant})");

        let make = make_path(self.make_override.as_deref())
            .map_err(|e| BuildError::new(tool.binary_name(), format!("{e:#}")))?;

        self.run_make(tool, &make, src_dir, &["clean".to_string()])?;

        let mut args = Vec::new();
        if let Some(define) = variant.define() {
            args.push(format!("DEFINES=-D {define}"));
        }
        self.run_make(tool, &make, src_dir, &args)?;

        ship(tool, src_dir, work_dir)
            .map_err(|e| BuildError::new(tool.binary_name(), format!("{e:#}")))
    }

    fn run_make(
        &self,
        tool: CipherTool,
        make: &Path,
        src_dir: &Path,
        args: &[String],
    ) -> Result<(), BuildError> {
        let status = Command::new(make)
            .current_dir(src_dir)
            .args(args)
            .status()
            .map_err(|e| {
                BuildError::new(
                    tool.binary_name(),
                    format!("could not run {} in {}: {e}", make.display(), src_dir.display()),
                )
            })?;

        if !status.success() {
            return Err(BuildError::new(
                tool.binary_name(),
                format!("`make {}` failed with {status}", args.join(" ")),
            ));
        }

        Ok(())
    }
}

/// Copy the built executable plus any auxiliary files it needs at runtime.
fn ship(tool: CipherTool, src_dir: &Path, work_dir: &Path) -> HarnessResult<PathBuf> {
    let binary = src_dir.join(tool.binary_name());
    if !binary.exists() {
        bail!("Built executable not found at {}", binary.display());
    }

    let target = work_dir.join(tool.binary_name());
    std::fs::copy(&binary, &target)
        .with_context(|| format!("Failed to copy {} into the working directory", binary.display()))?;

    let extensions = tool.auxiliary_extensions();
    walkdir::WalkDir::new(src_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| extensions.iter().any(|wanted| ext == *wanted))
        })
        .try_for_each(|e| {
            std::fs::copy(e.path(), work_dir.join(e.file_name()))
                .map(|_| ())
                .with_context(|| format!("Failed to copy {}", e.path().display()))
        })?;

    Ok(target)
}
