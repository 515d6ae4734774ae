// src/exec/command.rs

//! The acquisition binary's command line, as a structured argv.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::config::ConfigFile;

/// Program plus argument list. Never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl AcquisitionCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    fn flag_value(self, flag: &str, value: impl AsRef<OsStr>) -> Self {
        self.arg(flag).arg(value)
    }

    /// Canonical flag order:
    /// `-threshold -duration -nrun [-coincidence] -dir -store [-name] [-allowmod] [extra...]`.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let acq = &cfg.acquisition;

        let mut cmd = Self::new(&acq.binary)
            .flag_value("-threshold", acq.threshold.to_string())
            .flag_value("-duration", acq.duration_secs.to_string())
            .flag_value("-nrun", acq.nrun.to_string());

        if acq.coincidence {
            cmd = cmd.arg("-coincidence");
        }

        cmd = cmd
            .flag_value("-dir", &cfg.sweep.working_dir)
            .flag_value("-store", &cfg.sweep.archive_dir);

        if let Some(name) = &acq.name {
            cmd = cmd.flag_value("-name", name);
        }
        if acq.allow_modified {
            cmd = cmd.arg("-allowmod");
        }

        for extra in &acq.extra_args {
            cmd = cmd.arg(extra);
        }

        cmd
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Build a `tokio::process::Command` with the program and arguments set.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Human-readable rendering for logs; arguments with whitespace or quotes are
/// single-quoted.
impl fmt::Display for AcquisitionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render_word(self.program.as_os_str()))?;
        for arg in &self.args {
            write!(f, " {}", render_word(arg))?;
        }
        Ok(())
    }
}

fn render_word(word: &OsStr) -> String {
    let s = word.to_string_lossy();
    if s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
        format!("'{}'", s.replace('\'', r"'\''"))
    } else {
        s.into_owned()
    }
}
