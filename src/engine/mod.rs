// src/engine/mod.rs

//! The run-and-sweep loop.
//!
//! The pure state machine lives in [`core`]; the async shell that invokes the
//! acquisition backend and sweeps the working directory is in [`runtime`].

pub mod core;
pub mod runtime;

pub use self::core::LoopCore;
pub use self::runtime::{IterationReport, LoopSummary, SweepLoop};

use crate::types::LaunchFailurePolicy;

/// The two states of the loop. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    RunningIteration,
    Stopped,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `single_shot` or `max_iterations` reached.
    IterationLimit,
    ShutdownRequested,
    /// A fatal error was returned to the caller.
    Fault,
}

/// Messages from outside the loop (e.g. Ctrl-C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    ShutdownRequested,
}

/// Options that influence how the loop behaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopOptions {
    /// `None` runs until shutdown; `Some(1)` is single-shot.
    pub iteration_limit: Option<u64>,
    pub on_launch_failure: LaunchFailurePolicy,
}
