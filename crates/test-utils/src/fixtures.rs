//! Directory fixtures: mock run/store trees and real files on disk.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use daqsweep::fs::mock::MockFileSystem;

use crate::builders::{DEFAULT_ARCHIVE_DIR, DEFAULT_WORKING_DIR};

/// A mock filesystem holding the working and archive directories that
/// [`crate::builders::ConfigFileBuilder`] points at by default.
pub fn mock_dirs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_dir(DEFAULT_WORKING_DIR);
    fs.add_dir(DEFAULT_ARCHIVE_DIR);
    fs
}

/// Create `path` starting with `header` and extended (sparse) to `len` bytes.
pub fn make_file(path: &Path, header: &[u8], len: u64) -> io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(header)?;
    f.set_len(len)?;
    Ok(())
}

/// Sorted file names directly under `dir`.
pub fn names(dir: &Path) -> io::Result<Vec<String>> {
    let mut v = fs::read_dir(dir)?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<io::Result<Vec<_>>>()?;
    v.sort();
    Ok(v)
}
