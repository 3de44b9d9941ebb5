use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::Context;

use crate::types::HarnessResult;

const CHUNK_SIZE: usize = 64 * 1024;

/// Byte-exact comparison of two files.
///
/// Returns `Ok(true)` only if both files have identical content. A file that can't be read is an
/// error, not a mismatch.
pub fn equivalent(a: &Path, b: &Path) -> HarnessResult<bool> {
    let len_a = std::fs::metadata(a)
        .with_context(|| format!("Failed to read metadata for {}", a.display()))?
        .len();
    let len_b = std::fs::metadata(b)
        .with_context(|| format!("Failed to read metadata for {}", b.display()))?
        .len();
    if len_a != len_b {
        log::debug!(
            "{} and {} differ in size ({len_a} vs {len_b} bytes)",
            a.display(),
            b.display()
        );
        return Ok(false);
    }

    let mut reader_a = open(a)?;
    let mut reader_b = open(b)?;
    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let read_a = fill(&mut reader_a, &mut buf_a)
            .with_context(|| format!("Failed to read {}", a.display()))?;
        let read_b = fill(&mut reader_b, &mut buf_b)
            .with_context(|| format!("Failed to read {}", b.display()))?;

        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

fn open(path: &Path) -> HarnessResult<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Read until `buf` is full or the reader is exhausted.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
