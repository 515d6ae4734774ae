use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use daqsweep::engine::LoopControl;
use daqsweep::errors::{Result, SweepError};
use daqsweep::exec::{AcquisitionBackend, AcquisitionCommand, ExitReport};
use daqsweep::fs::mock::MockFileSystem;

/// A fake acquisition binary that:
/// - records every command it was asked to run
/// - drops the configured output files into the working directory of a
///   `MockFileSystem`, named `run<N>_<name>`
/// - reports a fixed exit status, or a launch failure.
pub struct FakeBackend {
    fs: MockFileSystem,
    working_dir: PathBuf,
    outputs: Vec<(String, u64)>,
    exit: ExitReport,
    launch_fails: bool,
    shutdown_after: Option<(usize, mpsc::Sender<LoopControl>)>,
    invocations: Arc<Mutex<Vec<AcquisitionCommand>>>,
}

impl FakeBackend {
    pub fn new(fs: MockFileSystem, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            working_dir: working_dir.into(),
            outputs: Vec::new(),
            exit: ExitReport::success(),
            launch_fails: false,
            shutdown_after: None,
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Each invocation writes a file of `bytes` bytes.
    pub fn output(mut self, name: &str, bytes: u64) -> Self {
        self.outputs.push((name.to_string(), bytes));
        self
    }

    pub fn exit(mut self, exit: ExitReport) -> Self {
        self.exit = exit;
        self
    }

    pub fn launch_fails(mut self) -> Self {
        self.launch_fails = true;
        self
    }

    /// Request shutdown from inside the `n`th invocation (1-based), as an
    /// operator pressing Ctrl-C would.
    pub fn shutdown_after(mut self, n: usize, tx: mpsc::Sender<LoopControl>) -> Self {
        self.shutdown_after = Some((n, tx));
        self
    }

    /// Shared handle to the recorded commands.
    pub fn invocations(&self) -> Arc<Mutex<Vec<AcquisitionCommand>>> {
        Arc::clone(&self.invocations)
    }
}

impl AcquisitionBackend for FakeBackend {
    fn invoke(
        &mut self,
        command: AcquisitionCommand,
    ) -> Pin<Box<dyn Future<Output = Result<ExitReport>> + Send + '_>> {
        Box::pin(async move {
            let n = {
                let mut guard = self.invocations.lock().unwrap();
                guard.push(command.clone());
                guard.len()
            };

            if let Some((at, tx)) = &self.shutdown_after {
                if *at == n {
                    tx.send(LoopControl::ShutdownRequested)
                        .await
                        .map_err(anyhow::Error::from)?;
                }
            }

            if self.launch_fails {
                return Err(SweepError::Launch {
                    binary: command.program().to_path_buf(),
                    source: io::Error::new(io::ErrorKind::NotFound, "fake binary missing"),
                });
            }

            for (name, bytes) in &self.outputs {
                let path = self.working_dir.join(format!("run{n}_{name}"));
                self.fs.add_sized_file(path, *bytes);
            }

            Ok(self.exit)
        })
    }
}
