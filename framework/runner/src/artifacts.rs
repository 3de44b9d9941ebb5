use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::{Rng, RngCore};

use crate::types::HarnessResult;

const CHUNK_SIZE: usize = 1024 * 1024;

/// Name of the random input file for a given size.
pub fn dummy_name(size: u64) -> String {
    format!("dummy-{size}")
}

/// Create `dummy-<size>` in `dir`, filled with `size` random bytes.
pub fn create_dummy(dir: &Path, size: u64) -> HarnessResult<PathBuf> {
    let path = dir.join(dummy_name(size));
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut rng = rand::thread_rng();
    let mut chunk = vec![0u8; CHUNK_SIZE];

    let mut remaining = size;
    while remaining > 0 {
        let len = remaining.min(CHUNK_SIZE as u64) as usize;
        rng.fill_bytes(&mut chunk[..len]);
        writer
            .write_all(&chunk[..len])
            .with_context(|| format!("Failed to write {}", path.display()))?;
        remaining -= len as u64;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

/// Append `count` random ASCII digits to the file at `path`, creating it if needed.
pub fn append_random_digits(path: &Path, count: usize) -> HarnessResult<()> {
    let mut rng = rand::thread_rng();
    let digits = (0..count)
        .map(|_| b'0' + rng.gen_range(0..10u8))
        .collect::<Vec<_>>();

    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .and_then(|mut file| file.write_all(&digits))
        .with_context(|| format!("Failed to append to {}", path.display()))
}
