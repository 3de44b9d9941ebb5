use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use cipher_tunnel_core::prelude::{Device, SetupError};

use crate::config::HarnessConfig;
use crate::report::ReportSink;
use crate::types::HarnessResult;

/// Prefix of the per-run working directory, e.g. `temp-bijectivity`.
pub const WORK_DIR_PREFIX: &str = "temp-";

/// Directory, relative to the base directory, that receives the report files.
pub const REPORTS_DIR: &str = "reports";

/// File inside [REPORTS_DIR] that collects one JSON summary per completed run.
pub const RUN_SUMMARY_FILE: &str = "run_summary.jsonl";

/// Identity and filesystem layout of a single run.
#[derive(Debug, Clone)]
pub struct Environment {
    name: String,
    device: Device,
    hostname: String,
    base_dir: PathBuf,
    work_dir: PathBuf,
    reports_dir: PathBuf,
    started_at: DateTime<Local>,
}

impl Environment {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// The report file for this run, `reports/<name>_<timestamp>.log`.
    pub fn report_path(&self) -> PathBuf {
        self.reports_dir.join(format!(
            "{}_{}.log",
            self.name,
            self.started_at.format("%F_%T")
        ))
    }

    pub fn run_summary_path(&self) -> PathBuf {
        self.reports_dir.join(RUN_SUMMARY_FILE)
    }

    fn display_name(&self) -> String {
        self.name.replace('_', " ")
    }
}

/// The name of the machine the harness is running on.
pub fn hostname() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string())
}

/// Prepare a fresh working directory and report file for the scenario `name`.
///
/// Any working directory left behind by a previous run of the same scenario is removed first.
/// Failing to create the working directory is reported as a [SetupError].
pub fn bootstrap(name: &str, config: &HarnessConfig) -> HarnessResult<(Environment, ReportSink)> {
    let hostname = hostname();
    let device = config.device_policy.resolve(config.device, &hostname);

    let base_dir = fs::create_dir_all(&config.base_dir)
        .and_then(|_| config.base_dir.canonicalize())
        .map_err(|e| SetupError::new(config.base_dir.clone(), e))?;
    let work_dir = base_dir.join(format!("{WORK_DIR_PREFIX}{name}"));

    if let Ok(stale) = fs::symlink_metadata(&work_dir) {
        log::debug!("Removing stale working directory {}", work_dir.display());
        let removed = if stale.is_dir() {
            fs::remove_dir_all(&work_dir)
        } else {
            fs::remove_file(&work_dir)
        };
        if let Err(e) = removed {
            log::warn!(
                "Could not remove stale working directory {}: {e}",
                work_dir.display()
            );
        }
    }
    fs::create_dir(&work_dir).map_err(|e| SetupError::new(work_dir.clone(), e))?;

    let reports_dir = base_dir.join(REPORTS_DIR);
    fs::create_dir_all(&reports_dir).map_err(|e| SetupError::new(reports_dir.clone(), e))?;

    let environment = Environment {
        name: name.to_string(),
        device,
        hostname,
        base_dir,
        work_dir,
        reports_dir,
        started_at: Local::now(),
    };

    log::info!("{}", "-".repeat(60));
    log::info!("####  RUNNING {}  ####", environment.display_name().to_uppercase());
    log::info!("DEVICE   : {}", environment.device);
    log::info!("HOSTNAME : {}", environment.hostname);

    let mut report = ReportSink::open(&environment.report_path())?;
    write_header(&environment, &mut report).context("Failed to write the report header")?;

    Ok((environment, report))
}

fn write_header(environment: &Environment, report: &mut ReportSink) -> HarnessResult<()> {
    report.append(&format!("Test name: {}", environment.display_name()))?;
    report.append(&format!("Device: {}", environment.device))?;
    report.append(&format!("Hostname: {}", environment.hostname))?;
    report.append("")?;
    report.append(&format!("Start time {}", environment.started_at))?;
    report.append("")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bootstrap_creates_work_dir_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HarnessConfig::with_base_dir(dir.path());
        config.device = Some(Device::Cpu);

        let (environment, report) = bootstrap("file_size", &config).unwrap();

        assert!(environment.work_dir().is_dir());
        assert!(environment.work_dir().is_absolute());
        assert!(environment
            .work_dir()
            .ends_with(format!("{WORK_DIR_PREFIX}file_size")));
        assert_eq!(environment.device(), Device::Cpu);
        assert_eq!(report.path(), environment.report_path());

        let header = fs::read_to_string(report.path()).unwrap();
        let lines = header.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Test name: file size");
        assert_eq!(lines[1], "Device: cpu");
        assert!(lines[2].starts_with("Hostname: "));
        assert!(lines[4].starts_with("Start time "));
    }

    #[test]
    fn stale_work_dir_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::with_base_dir(dir.path());

        let stale = dir.path().join(format!("{WORK_DIR_PREFIX}bijectivity"));
        fs::create_dir(&stale).unwrap();
        fs::write(stale.join("leftover"), b"old").unwrap();

        let (environment, _report) = bootstrap("bijectivity", &config).unwrap();

        assert!(environment.work_dir().is_dir());
        assert!(!environment.work_dir().join("leftover").exists());
    }

    #[test]
    fn stale_file_in_place_of_work_dir_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::with_base_dir(dir.path());

        let stale = dir.path().join(format!("{WORK_DIR_PREFIX}file_size"));
        fs::write(&stale, b"left by a crashed run").unwrap();

        let (environment, _report) = bootstrap("file_size", &config).unwrap();

        assert!(environment.work_dir().is_dir());
    }

    #[test]
    fn work_dir_creation_failure_is_a_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the base directory should be can't hold a working directory.
        let base = dir.path().join("not-a-dir");
        fs::write(&base, b"").unwrap();

        let err = bootstrap("bijectivity", &HarnessConfig::with_base_dir(&base)).unwrap_err();
        assert!(err.is::<SetupError>());
    }
}
