// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod sweep;
pub mod types;

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::engine::{LoopControl, SweepLoop};
use crate::exec::{AcquisitionCommand, RealAcquisitionBackend};
use crate::fs::RealFileSystem;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution (file + CLI overrides)
/// - the real acquisition backend and filesystem
/// - the run-and-sweep loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = config::resolve(args.config.as_deref(), args.overrides())?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let (control_tx, control_rx) = mpsc::channel::<LoopControl>(4);

    // Ctrl-C → graceful shutdown.
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = control_tx.send(LoopControl::ShutdownRequested).await;
    });

    let mut sweep_loop = SweepLoop::from_config(
        &cfg,
        RealAcquisitionBackend::new(),
        Arc::new(RealFileSystem),
        control_rx,
    );

    let summary = sweep_loop.run().await?;
    info!(
        iterations = summary.iterations,
        archived = summary.archived,
        deleted = summary.deleted,
        file_failures = summary.file_failures,
        stop_reason = ?summary.stop_reason,
        "done"
    );
    Ok(())
}

/// Simple dry-run output: the resolved configuration and command line.
fn print_dry_run(cfg: &ConfigFile) {
    print!("{}", dry_run_report(cfg));
    debug!("dry-run complete (no execution)");
}

fn dry_run_report(cfg: &ConfigFile) -> String {
    let mut out = String::new();
    // Formatting into a String never fails.
    let _ = write_dry_run(&mut out, cfg);
    out
}

fn write_dry_run(out: &mut String, cfg: &ConfigFile) -> std::fmt::Result {
    writeln!(out, "daqsweep dry-run")?;
    writeln!(out, "  command: {}", AcquisitionCommand::from_config(cfg))?;
    writeln!(out)?;
    writeln!(out, "  sweep.working_dir = {:?}", cfg.sweep.working_dir)?;
    writeln!(out, "  sweep.archive_dir = {:?}", cfg.sweep.archive_dir)?;
    writeln!(out, "  sweep.threshold_mb = {}", cfg.sweep_threshold_mb())?;
    writeln!(
        out,
        "  sweep.create_archive_dir = {}",
        cfg.sweep.create_archive_dir
    )?;
    match cfg.iteration_limit() {
        Some(n) => writeln!(out, "  loop.iterations = {n}")?,
        None => writeln!(out, "  loop.iterations = unbounded")?,
    }
    writeln!(
        out,
        "  loop.on_launch_failure = {:?}",
        cfg.run_loop.on_launch_failure
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfigFile;

    #[test]
    fn dry_run_shows_command_and_unbounded_loop() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        let report = dry_run_report(&cfg);

        assert!(report.contains("  command: ../../bin/run -threshold 170 -duration 300"));
        assert!(report.contains("sweep.threshold_mb = 170"));
        assert!(report.contains("loop.iterations = unbounded"));
    }

    #[test]
    fn dry_run_shows_single_shot_limit() {
        let mut raw = RawConfigFile::default();
        raw.run_loop.single_shot = true;
        raw.sweep.threshold_mb = Some(20.0);
        let cfg = ConfigFile::try_from(raw).unwrap();
        let report = dry_run_report(&cfg);

        assert!(report.contains("loop.iterations = 1"));
        assert!(report.contains("sweep.threshold_mb = 20"));
    }
}
