use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What the loop does when the acquisition binary cannot be launched at all
/// (missing binary, not executable, ...).
///
/// - `Abort`: stop the loop with [`crate::errors::SweepError::Launch`] (default).
/// - `Continue`: log the failure and still sweep the working directory.
///
/// A binary that starts and exits non-zero is never a launch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchFailurePolicy {
    Abort,
    Continue,
}

impl Default for LaunchFailurePolicy {
    fn default() -> Self {
        LaunchFailurePolicy::Abort
    }
}

impl FromStr for LaunchFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(LaunchFailurePolicy::Abort),
            "continue" => Ok(LaunchFailurePolicy::Continue),
            other => Err(format!(
                "invalid on_launch_failure: {other} (expected \"abort\" or \"continue\")"
            )),
        }
    }
}

/// Fate of a single file found in the working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Larger than the threshold: move into the archive directory.
    Archive,
    /// At or below the threshold: remove.
    Delete,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Archive => f.write_str("archive"),
            Disposition::Delete => f.write_str("delete"),
        }
    }
}
