use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// The human readable report for a run.
///
/// The report is append-only. Every call to [ReportSink::append] writes one line to the end of
/// the file and nothing that has been written is ever changed.
#[derive(Debug)]
pub struct ReportSink {
    path: PathBuf,
    file: File,
}

impl ReportSink {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("Failed to open report file {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `text` followed by a newline.
    pub fn append(&mut self, text: &str) -> anyhow::Result<()> {
        self.file
            .write_all(format!("{text}\n").as_bytes())
            .and_then(|_| self.file.flush())
            .with_context(|| format!("Failed to write to report file {}", self.path.display()))
    }
}
