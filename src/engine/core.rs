// src/engine/core.rs

//! Pure loop state machine.
//!
//! Tracks the iteration count and decides, after each completed sweep,
//! whether another iteration follows. It performs no IO.

use crate::engine::{LoopOptions, LoopState, StopReason};
use crate::errors::{Result, SweepError};

#[derive(Debug)]
pub struct LoopCore {
    options: LoopOptions,
    state: LoopState,
    /// Iterations whose sweep finished.
    completed: u64,
    /// Set while an iteration is in flight.
    in_iteration: bool,
    stop_reason: Option<StopReason>,
}

impl LoopCore {
    pub fn new(options: LoopOptions) -> Self {
        Self {
            options,
            state: LoopState::RunningIteration,
            completed: 0,
            in_iteration: false,
            stop_reason: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn options(&self) -> &LoopOptions {
        &self.options
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Enter a new iteration and return its 1-based index.
    pub fn begin_iteration(&mut self) -> Result<u64> {
        if self.state == LoopState::Stopped || self.in_iteration {
            return Err(SweepError::InvalidTransition { from: self.state });
        }
        self.in_iteration = true;
        Ok(self.completed + 1)
    }

    /// Record a completed sweep and return the next state.
    pub fn finish_iteration(&mut self) -> Result<LoopState> {
        if self.state == LoopState::Stopped || !self.in_iteration {
            return Err(SweepError::InvalidTransition { from: self.state });
        }
        self.in_iteration = false;
        self.completed += 1;

        if let Some(limit) = self.options.iteration_limit {
            if self.completed >= limit {
                self.stop(StopReason::IterationLimit);
            }
        }
        Ok(self.state)
    }

    /// Move to `Stopped`. The first reason recorded wins.
    pub fn stop(&mut self, reason: StopReason) {
        self.in_iteration = false;
        self.state = LoopState::Stopped;
        if self.stop_reason.is_none() {
            self.stop_reason = Some(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(limit: Option<u64>) -> LoopCore {
        LoopCore::new(LoopOptions {
            iteration_limit: limit,
            ..Default::default()
        })
    }

    #[test]
    fn single_shot_stops_after_first_sweep() {
        let mut c = core(Some(1));
        assert_eq!(c.begin_iteration().unwrap(), 1);
        assert_eq!(c.finish_iteration().unwrap(), LoopState::Stopped);
        assert_eq!(c.stop_reason(), Some(StopReason::IterationLimit));
        assert!(matches!(
            c.begin_iteration(),
            Err(SweepError::InvalidTransition {
                from: LoopState::Stopped
            })
        ));
    }

    #[test]
    fn unlimited_keeps_running() {
        let mut c = core(None);
        for i in 1..=100 {
            assert_eq!(c.begin_iteration().unwrap(), i);
            assert_eq!(c.finish_iteration().unwrap(), LoopState::RunningIteration);
        }
        assert_eq!(c.completed(), 100);
        assert_eq!(c.stop_reason(), None);
    }

    #[test]
    fn finish_without_begin_is_rejected() {
        let mut c = core(None);
        assert!(c.finish_iteration().is_err());
    }

    #[test]
    fn first_stop_reason_wins() {
        let mut c = core(None);
        c.stop(StopReason::ShutdownRequested);
        c.stop(StopReason::Fault);
        assert_eq!(c.state(), LoopState::Stopped);
        assert_eq!(c.stop_reason(), Some(StopReason::ShutdownRequested));
    }
}
