// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every flag here is optional and, when given, overrides the matching value
//! from the config file (see [`crate::config::ConfigOverrides`]).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ConfigOverrides;
use crate::types::LaunchFailurePolicy;

/// Command-line arguments for `daqsweep`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "daqsweep",
    version,
    about = "Repeatedly run the acquisition binary and archive or delete its output files by size.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Daqsweep.toml` is used when it exists; otherwise the
    /// built-in defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the acquisition binary.
    #[arg(long, value_name = "PATH")]
    pub binary: Option<PathBuf>,

    /// Threshold in whole MB, passed to the binary and used by the sweep.
    #[arg(long, value_name = "MB")]
    pub threshold: Option<f64>,

    /// Separate sweep threshold in MB (defaults to `--threshold`).
    #[arg(long, value_name = "MB")]
    pub sweep_threshold: Option<f64>,

    /// Working directory the binary writes into.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Archive directory for files above the threshold.
    #[arg(long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Run name tag passed to the binary.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Allow the acquisition binary to run with local modifications.
    #[arg(short = 'a', long)]
    pub allowmod: bool,

    /// Do not request coincidence triggering.
    #[arg(long)]
    pub no_coincidence: bool,

    /// Perform exactly one run-and-sweep iteration, then exit.
    #[arg(short = 't', long, visible_alias = "test")]
    pub once: bool,

    /// Stop after this many iterations.
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<u64>,

    /// What to do when the acquisition binary cannot be launched
    /// (`abort` or `continue`).
    #[arg(long, value_name = "POLICY")]
    pub on_launch_failure: Option<LaunchFailurePolicy>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAQSWEEP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the configuration and command line, run nothing.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Collect the flags that override config-file values.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            binary: self.binary.clone(),
            threshold: self.threshold,
            sweep_threshold: self.sweep_threshold,
            working_dir: self.dir.clone(),
            archive_dir: self.store.clone(),
            name: self.name.clone(),
            allow_modified: self.allowmod.then_some(true),
            coincidence: self.no_coincidence.then_some(false),
            single_shot: self.once.then_some(true),
            max_iterations: self.max_iterations,
            on_launch_failure: self.on_launch_failure,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_flags_produce_no_overrides() {
        let args = CliArgs::parse_from(["daqsweep"]);
        let o = args.overrides();
        assert!(o.threshold.is_none());
        assert!(o.allow_modified.is_none());
        assert!(o.coincidence.is_none());
        assert!(o.single_shot.is_none());
        assert!(o.on_launch_failure.is_none());
    }

    #[test]
    fn short_t_is_single_shot() {
        let args = CliArgs::parse_from(["daqsweep", "-t", "-a"]);
        let o = args.overrides();
        assert_eq!(o.single_shot, Some(true));
        assert_eq!(o.allow_modified, Some(true));
        assert!(o.threshold.is_none());
    }

    #[test]
    fn test_alias_and_long_threshold() {
        let args = CliArgs::parse_from(["daqsweep", "--test", "--threshold", "150"]);
        let o = args.overrides();
        assert_eq!(o.single_shot, Some(true));
        assert_eq!(o.threshold, Some(150.0));
    }

    #[test]
    fn launch_policy_flag_is_parsed() {
        let args = CliArgs::parse_from(["daqsweep", "--on-launch-failure", "Continue"]);
        assert_eq!(
            args.overrides().on_launch_failure,
            Some(LaunchFailurePolicy::Continue)
        );
        assert!(CliArgs::try_parse_from(["daqsweep", "--on-launch-failure", "retry"]).is_err());
    }
}
