// src/sweep/mod.rs

//! Post-run triage of the working directory.
//!
//! - [`classify`] decides archive vs delete from a byte size.
//! - [`sweeper`] walks the directory once and applies the decision,
//!   collecting per-file failures in a [`SweepReport`].

pub mod classify;
pub mod sweeper;

pub use classify::{classify, size_in_megabytes};
pub use sweeper::{FileAction, FileFailure, SweepReport, Sweeper};
