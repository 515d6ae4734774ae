// tests/end_to_end.rs
//
// Drives the loop with the real process backend and a shell script standing
// in for the acquisition binary. Kept as a single test so the scripts are
// fully written before anything in this binary spawns a process.

#![cfg(unix)]

use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use daqsweep::engine::{LoopControl, StopReason, SweepLoop};
use daqsweep::exec::RealAcquisitionBackend;
use daqsweep::fs::RealFileSystem;
use daqsweep_test_utils::builders::ConfigFileBuilder;
use daqsweep_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

// Writes one file above and one below a 1 kB threshold into the `-dir`
// argument, and records its argv.
const WRITER_SCRIPT: &str = r#"#!/bin/sh
echo "$@" > "$(dirname "$0")/argv.txt"
dir=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-dir" ]; then dir="$2"; shift; fi
  shift
done
head -c 2000 /dev/zero > "$dir/big.dat"
head -c 10 /dev/zero > "$dir/small.dat"
echo "acquisition finished"
"#;

const SLEEPER_SCRIPT: &str = "#!/bin/sh\nexec sleep 30\n";

fn install_script(dir: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, body)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

#[tokio::test]
async fn real_process_loop() -> TestResult {
    init_tracing();

    let tmp = tempfile::tempdir()?;
    let bin_dir = tmp.path().join("bin");
    let run = tmp.path().join("run");
    let store = tmp.path().join("storage");
    fs::create_dir_all(&bin_dir)?;
    fs::create_dir_all(&run)?;
    fs::create_dir_all(&store)?;

    let writer = install_script(&bin_dir, "writer.sh", WRITER_SCRIPT)?;
    let sleeper = install_script(&bin_dir, "sleeper.sh", SLEEPER_SCRIPT)?;

    // Single shot: one invocation, then the sweep.
    let cfg = ConfigFileBuilder::new()
        .binary(&writer)
        .sweep_threshold(0.001)
        .dirs(&run, &store)
        .name("e2e")
        .single_shot(true)
        .build();

    let (_tx, rx) = mpsc::channel(1);
    let mut sweep_loop =
        SweepLoop::from_config(&cfg, RealAcquisitionBackend::new(), Arc::new(RealFileSystem), rx);
    let summary = with_timeout(sweep_loop.run()).await?;

    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.stop_reason, StopReason::IterationLimit);
    assert_eq!(summary.archived, 1);
    assert_eq!(summary.deleted, 1);
    assert_eq!(fs::read_dir(&run)?.count(), 0);
    assert_eq!(fs::metadata(store.join("big.dat"))?.len(), 2000);
    assert!(!store.join("small.dat").exists());

    let argv = fs::read_to_string(bin_dir.join("argv.txt"))?;
    assert!(argv.starts_with("-threshold 170 -duration 300 -nrun -1 -coincidence -dir "));
    assert!(argv.trim_end().ends_with("-name e2e"));

    // Continuous mode: shutdown while the binary is still running kills it
    // and skips the sweep.
    let cfg = ConfigFileBuilder::new()
        .binary(&sleeper)
        .dirs(&run, &store)
        .build();

    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        sleep(Duration::from_millis(300)).await;
        let _ = tx.send(LoopControl::ShutdownRequested).await;
    });

    let mut sweep_loop =
        SweepLoop::from_config(&cfg, RealAcquisitionBackend::new(), Arc::new(RealFileSystem), rx);
    let summary = with_timeout(sweep_loop.run()).await?;

    assert_eq!(summary.iterations, 0);
    assert_eq!(summary.stop_reason, StopReason::ShutdownRequested);

    Ok(())
}
