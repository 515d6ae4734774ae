//! Shared helpers for the daqsweep integration tests.

pub mod builders;
pub mod fake_backend;
pub mod fixtures;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for any single loop run in a test.
pub const LOOP_TIMEOUT: Duration = Duration::from_secs(5);

static TRACING: Once = Once::new();

/// Install a test-captured tracing subscriber once per test binary.
///
/// `RUST_LOG` overrides the default `info` filter, e.g.
/// `RUST_LOG=daqsweep=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await a loop (or anything else) and fail the test if it outlives
/// [`LOOP_TIMEOUT`]; a hung acquisition run must not hang the suite.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(LOOP_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("loop did not finish within {LOOP_TIMEOUT:?}"),
    }
}
