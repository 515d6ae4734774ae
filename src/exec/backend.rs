// src/exec/backend.rs

//! Pluggable acquisition backend.
//!
//! The loop talks to an `AcquisitionBackend` rather than spawning processes
//! itself, so tests can substitute a fake that records invocations and drops
//! files into a mock filesystem.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{Result, SweepError};

use super::command::AcquisitionCommand;

/// How the acquisition process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub success: bool,
}

impl ExitReport {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            success: true,
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            code: Some(code),
            success: false,
        }
    }
}

/// Trait abstracting how one acquisition run is executed.
///
/// Implementations block (asynchronously) until the run is over. Dropping the
/// returned future must stop the run.
pub trait AcquisitionBackend: Send {
    /// Run `command` to completion.
    ///
    /// Returns `Err(SweepError::Launch)` when the process could not be
    /// started. A process that started and exited non-zero is an `Ok`.
    fn invoke(
        &mut self,
        command: AcquisitionCommand,
    ) -> Pin<Box<dyn Future<Output = Result<ExitReport>> + Send + '_>>;
}

/// Backend that spawns the real binary with `tokio::process`.
///
/// Output of the child is forwarded line by line into `tracing`.
#[derive(Debug, Clone, Default)]
pub struct RealAcquisitionBackend;

impl RealAcquisitionBackend {
    pub fn new() -> Self {
        Self
    }
}

impl AcquisitionBackend for RealAcquisitionBackend {
    fn invoke(
        &mut self,
        command: AcquisitionCommand,
    ) -> Pin<Box<dyn Future<Output = Result<ExitReport>> + Send + '_>> {
        Box::pin(async move { run_process(command).await })
    }
}

async fn run_process(command: AcquisitionCommand) -> Result<ExitReport> {
    let mut cmd = command.to_command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| SweepError::Launch {
        binary: command.program().to_path_buf(),
        source,
    })?;

    debug!(pid = child.id(), "acquisition process started");

    let stdout = child.stdout.take().map(|s| forward_lines(s, "stdout"));
    let stderr = child.stderr.take().map(|s| forward_lines(s, "stderr"));

    let status = child.wait().await.map_err(|source| SweepError::Wait {
        binary: command.program().to_path_buf(),
        source,
    })?;

    // Drain whatever the readers still hold so output precedes the sweep logs.
    for handle in [stdout, stderr].into_iter().flatten() {
        let _ = handle.await;
    }

    Ok(ExitReport {
        code: status.code(),
        success: status.success(),
    })
}

fn forward_lines<R>(stream: R, stream_name: &'static str) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if stream_name == "stderr" {
                        warn!(target: "daqsweep::acquisition", "{}", line);
                    } else {
                        info!(target: "daqsweep::acquisition", "{}", line);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(stream = stream_name, error = %e, "stopped reading child output");
                    break;
                }
            }
        }
    })
}
