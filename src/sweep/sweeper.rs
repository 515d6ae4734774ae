// src/sweep/sweeper.rs

//! One pass over the working directory.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result as AnyResult};
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::errors::{Result, SweepError};
use crate::fs::FileSystem;
use crate::sweep::classify::{classify, size_in_megabytes};
use crate::types::Disposition;

/// Step of the per-file handling that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Stat,
    Archive,
    Delete,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileAction::Stat => f.write_str("stat"),
            FileAction::Archive => f.write_str("archive"),
            FileAction::Delete => f.write_str("delete"),
        }
    }
}

/// A file that could not be handled. It stays where it was (or, for a
/// half-finished archive move, in both places).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub name: String,
    pub action: FileAction,
    pub message: String,
}

/// Outcome of a sweep, by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub archived: Vec<String>,
    pub deleted: Vec<String>,
    /// Subdirectories, which are left untouched.
    pub skipped: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn entries_seen(&self) -> usize {
        self.archived.len() + self.deleted.len() + self.skipped.len() + self.failures.len()
    }
}

/// Archives or deletes everything in `working_dir` according to size.
#[derive(Debug, Clone)]
pub struct Sweeper {
    working_dir: PathBuf,
    archive_dir: PathBuf,
    threshold_mb: f64,
    create_archive_dir: bool,
}

impl Sweeper {
    pub fn new(
        working_dir: impl Into<PathBuf>,
        archive_dir: impl Into<PathBuf>,
        threshold_mb: f64,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            archive_dir: archive_dir.into(),
            threshold_mb,
            create_archive_dir: true,
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            working_dir: cfg.sweep.working_dir.clone(),
            archive_dir: cfg.sweep.archive_dir.clone(),
            threshold_mb: cfg.sweep_threshold_mb(),
            create_archive_dir: cfg.sweep.create_archive_dir,
        }
    }

    pub fn with_create_archive_dir(mut self, create: bool) -> Self {
        self.create_archive_dir = create;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    pub fn threshold_mb(&self) -> f64 {
        self.threshold_mb
    }

    /// Sweep the working directory once.
    ///
    /// Failing to list the working directory is fatal. Anything that goes
    /// wrong with an individual file is recorded in the report and the
    /// sweep carries on with the next one.
    pub fn sweep(&self, fs: &dyn FileSystem) -> Result<SweepReport> {
        let mut entries = fs
            .read_dir(&self.working_dir)
            .map_err(|source| SweepError::ListDir {
                path: self.working_dir.clone(),
                source,
            })?;
        entries.sort();

        debug!(
            dir = ?self.working_dir,
            entries = entries.len(),
            threshold_mb = self.threshold_mb,
            "sweeping working directory"
        );

        let mut report = SweepReport::default();
        let mut archive_ready = false;

        for path in entries {
            let Some(file_name) = path.file_name().map(|n| n.to_os_string()) else {
                continue;
            };
            let name = file_name.to_string_lossy().into_owned();

            let meta = match fs.metadata(&path) {
                Ok(meta) => meta,
                Err(err) => {
                    record_failure(&mut report, name, FileAction::Stat, &err);
                    continue;
                }
            };

            if meta.is_dir {
                debug!(entry = %name, "skipping subdirectory");
                report.skipped.push(name);
                continue;
            }

            let disposition = classify(meta.len, self.threshold_mb);
            debug!(
                entry = %name,
                size_mb = size_in_megabytes(meta.len),
                %disposition,
                "classified file"
            );

            match disposition {
                Disposition::Archive => {
                    let dest = self.archive_dir.join(&file_name);
                    let moved = self
                        .ensure_archive_dir(fs, &mut archive_ready)
                        .and_then(|()| move_file(fs, &path, &dest));
                    match moved {
                        Ok(()) => {
                            info!(entry = %name, dest = ?dest, "archived file");
                            report.archived.push(name);
                        }
                        Err(err) => record_failure(&mut report, name, FileAction::Archive, &err),
                    }
                }
                Disposition::Delete => match fs.remove_file(&path) {
                    Ok(()) => {
                        debug!(entry = %name, "deleted file");
                        report.deleted.push(name);
                    }
                    Err(err) => record_failure(&mut report, name, FileAction::Delete, &err),
                },
            }
        }

        Ok(report)
    }

    fn ensure_archive_dir(&self, fs: &dyn FileSystem, ready: &mut bool) -> AnyResult<()> {
        if *ready || !self.create_archive_dir {
            return Ok(());
        }
        if !fs.is_dir(&self.archive_dir) {
            info!(dir = ?self.archive_dir, "creating archive directory");
            fs.create_dir_all(&self.archive_dir)?;
        }
        *ready = true;
        Ok(())
    }
}

/// Rename, falling back to copy-then-remove when the rename fails (for
/// example when the archive is on another filesystem).
fn move_file(fs: &dyn FileSystem, from: &Path, to: &Path) -> AnyResult<()> {
    match fs.rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!(
                from = ?from,
                to = ?to,
                error = %rename_err,
                "rename failed, falling back to copy"
            );
            fs.copy(from, to)
                .with_context(|| format!("rename failed ({rename_err:#}), copy fallback failed"))?;
            fs.remove_file(from)
                .context("copied into archive but could not remove the original")?;
            Ok(())
        }
    }
}

fn record_failure(
    report: &mut SweepReport,
    name: String,
    action: FileAction,
    err: &anyhow::Error,
) {
    let message = format!("{err:#}");
    warn!(entry = %name, %action, error = %message, "could not handle file, continuing sweep");
    report.failures.push(FileFailure {
        name,
        action,
        message,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::{MockFileSystem, MockOp};

    const MB: u64 = 1_000_000;

    fn sweeper() -> Sweeper {
        Sweeper::new("/run", "/store", 150.0)
    }

    #[test]
    fn archives_large_and_deletes_small() {
        let fs = MockFileSystem::new();
        fs.add_sized_file("/run/a.dat", 200 * MB);
        fs.add_sized_file("/run/b.dat", 50 * MB);
        fs.add_dir("/store");

        let report = sweeper().sweep(&fs).unwrap();

        assert_eq!(report.archived, vec!["a.dat".to_string()]);
        assert_eq!(report.deleted, vec!["b.dat".to_string()]);
        assert!(report.is_clean());
        assert!(fs.list("/run").is_empty());
        assert_eq!(fs.list("/store"), vec!["a.dat".to_string()]);
    }

    #[test]
    fn missing_working_dir_is_fatal() {
        let fs = MockFileSystem::new();
        match sweeper().sweep(&fs) {
            Err(SweepError::ListDir { path, .. }) => assert_eq!(path, PathBuf::from("/run")),
            other => panic!("expected ListDir, got {other:?}"),
        }
    }

    #[test]
    fn per_file_failure_does_not_abort() {
        let fs = MockFileSystem::new();
        fs.add_sized_file("/run/a.dat", MB);
        fs.add_sized_file("/run/b.dat", MB);
        fs.add_sized_file("/run/c.dat", MB);
        fs.fail(MockOp::RemoveFile, "/run/b.dat");

        let report = sweeper().sweep(&fs).unwrap();

        assert_eq!(report.deleted, vec!["a.dat".to_string(), "c.dat".to_string()]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "b.dat");
        assert_eq!(report.failures[0].action, FileAction::Delete);
        assert_eq!(fs.list("/run"), vec!["b.dat".to_string()]);
    }

    #[test]
    fn failed_stat_is_recorded() {
        let fs = MockFileSystem::new();
        fs.add_sized_file("/run/a.dat", MB);
        fs.fail(MockOp::Metadata, "/run/a.dat");

        let report = sweeper().sweep(&fs).unwrap();
        assert_eq!(report.failures[0].action, FileAction::Stat);
        assert!(fs.exists("/run/a.dat"));
    }

    #[test]
    fn rename_failure_falls_back_to_copy() {
        let fs = MockFileSystem::new();
        fs.add_file("/run/a.dat", b"payload".to_vec());
        fs.add_dir("/store");
        fs.fail(MockOp::Rename, "/run/a.dat");

        let report = Sweeper::new("/run", "/store", 0.0).sweep(&fs).unwrap();

        assert_eq!(report.archived, vec!["a.dat".to_string()]);
        assert!(!fs.exists("/run/a.dat"));
        assert_eq!(fs.contents("/store/a.dat").unwrap(), b"payload");
    }

    #[test]
    fn archive_dir_is_created_on_demand() {
        let fs = MockFileSystem::new();
        fs.add_sized_file("/run/a.dat", 200 * MB);

        let report = sweeper().sweep(&fs).unwrap();
        assert!(report.is_clean());
        assert!(fs.is_dir(Path::new("/store")));
        assert!(fs.exists("/store/a.dat"));
    }

    #[test]
    fn missing_archive_dir_without_creation_fails_per_file() {
        let fs = MockFileSystem::new();
        fs.add_sized_file("/run/a.dat", 200 * MB);
        fs.add_sized_file("/run/b.dat", MB);

        let report = sweeper()
            .with_create_archive_dir(false)
            .sweep(&fs)
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].action, FileAction::Archive);
        assert_eq!(report.deleted, vec!["b.dat".to_string()]);
        assert_eq!(fs.list("/run"), vec!["a.dat".to_string()]);
    }

    #[test]
    fn subdirectories_are_skipped() {
        let fs = MockFileSystem::new();
        fs.add_dir("/run/nested");
        fs.add_dir("/store");

        let report = sweeper().sweep(&fs).unwrap();
        assert_eq!(report.skipped, vec!["nested".to_string()]);
        assert!(fs.is_dir(Path::new("/run/nested")));
    }
}
