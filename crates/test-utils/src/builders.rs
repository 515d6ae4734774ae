#![allow(dead_code)]

use std::path::Path;

use daqsweep::config::{ConfigFile, RawConfigFile};
use daqsweep::types::LaunchFailurePolicy;

pub const DEFAULT_WORKING_DIR: &str = "/run";
pub const DEFAULT_ARCHIVE_DIR: &str = "/store";

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults with `/run` and `/store` as the
/// working and archive directories, which suits `MockFileSystem`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.sweep.working_dir = DEFAULT_WORKING_DIR.into();
        config.sweep.archive_dir = DEFAULT_ARCHIVE_DIR.into();
        Self { config }
    }

    pub fn binary(mut self, path: impl AsRef<Path>) -> Self {
        self.config.acquisition.binary = path.as_ref().to_path_buf();
        self
    }

    pub fn threshold(mut self, mb: f64) -> Self {
        self.config.acquisition.threshold = mb;
        self
    }

    pub fn sweep_threshold(mut self, mb: f64) -> Self {
        self.config.sweep.threshold_mb = Some(mb);
        self
    }

    pub fn dirs(mut self, working: impl AsRef<Path>, archive: impl AsRef<Path>) -> Self {
        self.config.sweep.working_dir = working.as_ref().to_path_buf();
        self.config.sweep.archive_dir = archive.as_ref().to_path_buf();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.config.acquisition.name = Some(name.to_string());
        self
    }

    pub fn allow_modified(mut self, val: bool) -> Self {
        self.config.acquisition.allow_modified = val;
        self
    }

    pub fn single_shot(mut self, val: bool) -> Self {
        self.config.run_loop.single_shot = val;
        self
    }

    pub fn max_iterations(mut self, n: u64) -> Self {
        self.config.run_loop.max_iterations = Some(n);
        self
    }

    pub fn on_launch_failure(mut self, policy: LaunchFailurePolicy) -> Self {
        self.config.run_loop.on_launch_failure = policy;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
