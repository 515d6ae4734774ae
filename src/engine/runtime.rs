// src/engine/runtime.rs

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::ConfigFile;
use crate::engine::core::LoopCore;
use crate::engine::{LoopControl, LoopOptions, LoopState, StopReason};
use crate::errors::{Result, SweepError};
use crate::exec::{AcquisitionBackend, AcquisitionCommand, ExitReport};
use crate::fs::FileSystem;
use crate::sweep::{SweepReport, Sweeper};
use crate::types::LaunchFailurePolicy;

/// What happened in one invoke-then-sweep cycle.
#[derive(Debug, Clone)]
pub struct IterationReport {
    pub index: u64,
    /// `None` if the binary could not be launched and the policy said continue.
    pub exit: Option<ExitReport>,
    pub sweep: SweepReport,
}

/// Totals over the whole lifetime of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSummary {
    pub iterations: u64,
    pub stop_reason: StopReason,
    pub archived: usize,
    pub deleted: usize,
    pub file_failures: usize,
}

/// The run-and-sweep loop.
///
/// Each iteration:
/// 1. invokes the acquisition backend and waits for it,
/// 2. sweeps the working directory,
/// 3. asks [`LoopCore`] whether to go again.
///
/// Everything is sequential; the sweep never overlaps a running acquisition.
/// The sweep runs on tokio's blocking pool but is awaited before the loop
/// moves on.
pub struct SweepLoop<B: AcquisitionBackend> {
    core: LoopCore,
    backend: B,
    fs: Arc<dyn FileSystem>,
    sweeper: Sweeper,
    command: AcquisitionCommand,
    control_rx: mpsc::Receiver<LoopControl>,
    history: Vec<IterationReport>,
    keep_history: bool,
}

impl<B: AcquisitionBackend> SweepLoop<B> {
    pub fn new(
        options: LoopOptions,
        command: AcquisitionCommand,
        sweeper: Sweeper,
        backend: B,
        fs: Arc<dyn FileSystem>,
        control_rx: mpsc::Receiver<LoopControl>,
    ) -> Self {
        Self {
            core: LoopCore::new(options),
            backend,
            fs,
            sweeper,
            command,
            control_rx,
            history: Vec::new(),
            keep_history: false,
        }
    }

    /// Wire a loop from a validated config.
    pub fn from_config(
        cfg: &ConfigFile,
        backend: B,
        fs: Arc<dyn FileSystem>,
        control_rx: mpsc::Receiver<LoopControl>,
    ) -> Self {
        let options = LoopOptions {
            iteration_limit: cfg.iteration_limit(),
            on_launch_failure: cfg.run_loop.on_launch_failure,
        };
        Self::new(
            options,
            AcquisitionCommand::from_config(cfg),
            Sweeper::from_config(cfg),
            backend,
            fs,
            control_rx,
        )
    }

    /// Keep every [`IterationReport`] (for tests and short runs; the list
    /// grows without bound in continuous mode).
    pub fn with_history(mut self, keep: bool) -> Self {
        self.keep_history = keep;
        self
    }

    pub fn history(&self) -> &[IterationReport] {
        &self.history
    }

    /// Run until the iteration limit, a shutdown request, or a fatal error.
    ///
    /// Fatal errors: the binary cannot be launched (unless the policy is
    /// `continue`), waiting on it fails, or the working directory cannot be
    /// listed. Per-file sweep failures are logged and counted only.
    pub async fn run(&mut self) -> Result<LoopSummary> {
        info!(
            command = %self.command,
            working_dir = ?self.sweeper.working_dir(),
            archive_dir = ?self.sweeper.archive_dir(),
            threshold_mb = self.sweeper.threshold_mb(),
            iteration_limit = ?self.core.options().iteration_limit,
            "daqsweep loop started"
        );

        let mut totals = Totals::default();

        while self.core.state() == LoopState::RunningIteration {
            if self.shutdown_pending() {
                info!("shutdown requested, stopping before next iteration");
                self.core.stop(StopReason::ShutdownRequested);
                break;
            }

            let index = self.core.begin_iteration()?;
            let Some(exit) = self.invoke(index).await? else {
                break;
            };

            let report = match self.sweep().await {
                Ok(report) => report,
                Err(err) => {
                    error!(iteration = index, error = %err, "sweep aborted");
                    self.core.stop(StopReason::Fault);
                    return Err(err);
                }
            };

            log_sweep(index, &report);
            totals.add(&report);

            if self.keep_history {
                self.history.push(IterationReport {
                    index,
                    exit,
                    sweep: report,
                });
            }

            self.core.finish_iteration()?;
        }

        let summary = LoopSummary {
            iterations: self.core.completed(),
            stop_reason: self.core.stop_reason().unwrap_or(StopReason::IterationLimit),
            archived: totals.archived,
            deleted: totals.deleted,
            file_failures: totals.failures,
        };
        info!(?summary, "daqsweep loop stopped");
        Ok(summary)
    }

    /// Run the acquisition once.
    ///
    /// - `Ok(Some(exit))`: the run finished, sweep next. `exit` is `None`
    ///   when the launch failed and the policy says to continue.
    /// - `Ok(None)`: shutdown arrived while waiting; the child was killed.
    async fn invoke(&mut self, index: u64) -> Result<Option<Option<ExitReport>>> {
        info!(iteration = index, command = %self.command, "starting acquisition run");

        let outcome = tokio::select! {
            biased;
            res = self.backend.invoke(self.command.clone()) => Some(res),
            Some(LoopControl::ShutdownRequested) = self.control_rx.recv() => None,
        };

        match outcome {
            None => {
                warn!(iteration = index, "shutdown requested during acquisition run, not sweeping");
                self.core.stop(StopReason::ShutdownRequested);
                Ok(None)
            }
            Some(Ok(exit)) => {
                if exit.success {
                    info!(iteration = index, "acquisition run finished");
                } else {
                    warn!(
                        iteration = index,
                        exit_code = ?exit.code,
                        "acquisition run exited unsuccessfully, sweeping anyway"
                    );
                }
                Ok(Some(Some(exit)))
            }
            Some(Err(err @ SweepError::Launch { .. }))
                if self.core.options().on_launch_failure == LaunchFailurePolicy::Continue =>
            {
                error!(iteration = index, error = %err, "could not launch acquisition binary, sweeping anyway");
                Ok(Some(None))
            }
            Some(Err(err)) => {
                error!(iteration = index, error = %err, "acquisition run failed");
                self.core.stop(StopReason::Fault);
                Err(err)
            }
        }
    }

    /// Sweep on the blocking pool; the filesystem calls are synchronous and
    /// a large move can take a while.
    async fn sweep(&self) -> Result<SweepReport> {
        let sweeper = self.sweeper.clone();
        let fs = Arc::clone(&self.fs);
        tokio::task::spawn_blocking(move || sweeper.sweep(fs.as_ref()))
            .await
            .map_err(|e| SweepError::Other(anyhow::Error::new(e).context("sweep task failed")))?
    }

    fn shutdown_pending(&mut self) -> bool {
        match self.control_rx.try_recv() {
            Ok(LoopControl::ShutdownRequested) => true,
            Err(mpsc::error::TryRecvError::Empty) => false,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                debug!("control channel closed");
                false
            }
        }
    }
}

#[derive(Debug, Default)]
struct Totals {
    archived: usize,
    deleted: usize,
    failures: usize,
}

impl Totals {
    fn add(&mut self, report: &SweepReport) {
        self.archived += report.archived.len();
        self.deleted += report.deleted.len();
        self.failures += report.failures.len();
    }
}

fn log_sweep(index: u64, report: &SweepReport) {
    if report.is_clean() {
        info!(
            iteration = index,
            archived = report.archived.len(),
            deleted = report.deleted.len(),
            skipped = report.skipped.len(),
            "sweep complete"
        );
    } else {
        warn!(
            iteration = index,
            archived = report.archived.len(),
            deleted = report.deleted.len(),
            skipped = report.skipped.len(),
            failures = report.failures.len(),
            "sweep complete with failures; affected files left in place"
        );
    }
}
