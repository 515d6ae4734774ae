// src/config/mod.rs

//! Configuration loading and validation for daqsweep.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and layer CLI overrides on top (`loader.rs`).
//! - Validate basic invariants like non-negative thresholds (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve};
pub use model::{
    AcquisitionSection, ConfigFile, ConfigOverrides, LoopSection, RawConfigFile, SweepSection,
};
