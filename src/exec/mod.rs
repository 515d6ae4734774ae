// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] builds the acquisition binary's argv from the config.
//! - [`backend`] provides the `AcquisitionBackend` trait and the
//!   `RealAcquisitionBackend` that spawns the process with
//!   `tokio::process::Command`; tests substitute a fake.

pub mod backend;
pub mod command;

pub use backend::{AcquisitionBackend, ExitReport, RealAcquisitionBackend};
pub use command::AcquisitionCommand;
