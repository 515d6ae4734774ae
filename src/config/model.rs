// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::LaunchFailurePolicy;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [acquisition]
/// binary = "../../bin/run"
/// threshold = 170
/// duration_secs = 300
/// nrun = -1
/// coincidence = true
/// name = "calib"
/// allow_modified = false
/// extra_args = ["-glib", "GLIB1,GLIB2"]
///
/// [sweep]
/// working_dir = "/data/fast/runatbr2/run/"
/// archive_dir = "/data/fast/runatbr2/storage/"
///
/// [loop]
/// single_shot = false
/// on_launch_failure = "abort"
/// ```
///
/// All sections are optional and have defaults. This is the unvalidated form;
/// convert it with `ConfigFile::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub acquisition: AcquisitionSection,

    #[serde(default)]
    pub sweep: SweepSection,

    #[serde(default, rename = "loop")]
    pub run_loop: LoopSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub acquisition: AcquisitionSection,
    pub sweep: SweepSection,
    pub run_loop: LoopSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        acquisition: AcquisitionSection,
        sweep: SweepSection,
        run_loop: LoopSection,
    ) -> Self {
        Self {
            acquisition,
            sweep,
            run_loop,
        }
    }

    /// Threshold used to classify files, in decimal megabytes.
    pub fn sweep_threshold_mb(&self) -> f64 {
        self.sweep.threshold_mb.unwrap_or(self.acquisition.threshold)
    }

    /// Effective iteration cap: `single_shot` wins over `max_iterations`.
    pub fn iteration_limit(&self) -> Option<u64> {
        if self.run_loop.single_shot {
            Some(1)
        } else {
            self.run_loop.max_iterations
        }
    }
}

/// `[acquisition]` section: everything passed to the external binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AcquisitionSection {
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    /// Threshold in MB. Passed as `-threshold` and, unless
    /// `sweep.threshold_mb` is set, also used by the sweep.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Length of each run in seconds (`-duration`).
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,

    /// Number of runs requested from the binary (`-nrun`); negative is unbounded.
    #[serde(default = "default_nrun")]
    pub nrun: i64,

    #[serde(default = "default_true")]
    pub coincidence: bool,

    /// Optional run tag (`-name`).
    #[serde(default)]
    pub name: Option<String>,

    /// Emit `-allowmod`.
    #[serde(default)]
    pub allow_modified: bool,

    /// Appended verbatim after the canonical flags.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_binary() -> PathBuf {
    PathBuf::from("../../bin/run")
}

fn default_threshold() -> f64 {
    170.0
}

fn default_duration_secs() -> u64 {
    300
}

fn default_nrun() -> i64 {
    -1
}

fn default_true() -> bool {
    true
}

impl Default for AcquisitionSection {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            threshold: default_threshold(),
            duration_secs: default_duration_secs(),
            nrun: default_nrun(),
            coincidence: true,
            name: None,
            allow_modified: false,
            extra_args: Vec::new(),
        }
    }
}

/// `[sweep]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepSection {
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Overrides `acquisition.threshold` for classification only.
    #[serde(default)]
    pub threshold_mb: Option<f64>,

    /// Create `archive_dir` on first use if it does not exist.
    #[serde(default = "default_true")]
    pub create_archive_dir: bool,
}

fn default_working_dir() -> PathBuf {
    PathBuf::from("/data/fast/runatbr2/run/")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("/data/fast/runatbr2/storage/")
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            archive_dir: default_archive_dir(),
            threshold_mb: None,
            create_archive_dir: true,
        }
    }
}

/// `[loop]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoopSection {
    /// Exactly one iteration, then stop.
    #[serde(default)]
    pub single_shot: bool,

    /// Stop after this many iterations; `None` runs until interrupted.
    #[serde(default)]
    pub max_iterations: Option<u64>,

    #[serde(default)]
    pub on_launch_failure: LaunchFailurePolicy,
}

/// Values that take precedence over the config file (usually from the CLI).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub binary: Option<PathBuf>,
    pub threshold: Option<f64>,
    pub sweep_threshold: Option<f64>,
    pub working_dir: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    pub name: Option<String>,
    pub allow_modified: Option<bool>,
    pub coincidence: Option<bool>,
    pub single_shot: Option<bool>,
    pub max_iterations: Option<u64>,
    pub on_launch_failure: Option<LaunchFailurePolicy>,
}

impl ConfigOverrides {
    pub fn apply(self, raw: &mut RawConfigFile) {
        let acq = &mut raw.acquisition;
        if let Some(v) = self.binary {
            acq.binary = v;
        }
        if let Some(v) = self.threshold {
            acq.threshold = v;
        }
        if let Some(v) = self.name {
            acq.name = Some(v);
        }
        if let Some(v) = self.allow_modified {
            acq.allow_modified = v;
        }
        if let Some(v) = self.coincidence {
            acq.coincidence = v;
        }

        let sweep = &mut raw.sweep;
        if let Some(v) = self.sweep_threshold {
            sweep.threshold_mb = Some(v);
        }
        if let Some(v) = self.working_dir {
            sweep.working_dir = v;
        }
        if let Some(v) = self.archive_dir {
            sweep.archive_dir = v;
        }

        let run_loop = &mut raw.run_loop;
        if let Some(v) = self.single_shot {
            run_loop.single_shot = v;
        }
        if let Some(v) = self.max_iterations {
            run_loop.max_iterations = Some(v);
        }
        if let Some(v) = self.on_launch_failure {
            run_loop.on_launch_failure = v;
        }
    }
}
