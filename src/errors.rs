// src/errors.rs

//! Crate-wide error type and `Result` alias.
//!
//! Only faults that stop the loop live here. Per-file sweep failures are
//! collected in [`crate::sweep::SweepReport`] instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::LoopState;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("failed to launch acquisition binary {binary:?}: {source}")]
    Launch {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for acquisition binary {binary:?}: {source}")]
    Wait {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list working directory {path:?}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid loop transition from {from:?}")]
    InvalidTransition { from: LoopState },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SweepError>;
