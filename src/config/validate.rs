// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SweepError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SweepError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.acquisition,
            raw.sweep,
            raw.run_loop,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_thresholds(cfg)?;
    validate_acquisition(cfg)?;
    validate_directories(cfg)?;
    validate_loop(cfg)?;
    Ok(())
}

fn validate_thresholds(cfg: &RawConfigFile) -> Result<()> {
    let acq = cfg.acquisition.threshold;
    check_threshold("[acquisition].threshold", acq)?;
    // The binary parses `-threshold` as an integer.
    if acq.fract() != 0.0 {
        return Err(SweepError::ConfigError(format!(
            "[acquisition].threshold must be a whole number of MB (got {acq}); \
             use [sweep].threshold_mb for a fractional sweep cutoff"
        )));
    }
    if let Some(t) = cfg.sweep.threshold_mb {
        check_threshold("[sweep].threshold_mb", t)?;
    }
    Ok(())
}

fn check_threshold(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SweepError::ConfigError(format!(
            "{field} must be a non-negative number (got {value})"
        )));
    }
    Ok(())
}

fn validate_acquisition(cfg: &RawConfigFile) -> Result<()> {
    let acq = &cfg.acquisition;

    if acq.binary.as_os_str().is_empty() {
        return Err(SweepError::ConfigError(
            "[acquisition].binary must not be empty".to_string(),
        ));
    }
    if acq.duration_secs == 0 {
        return Err(SweepError::ConfigError(
            "[acquisition].duration_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    if acq.nrun == 0 {
        return Err(SweepError::ConfigError(
            "[acquisition].nrun must be positive or negative for unbounded (got 0)".to_string(),
        ));
    }
    if let Some(name) = &acq.name {
        if name.trim().is_empty() {
            return Err(SweepError::ConfigError(
                "[acquisition].name must not be blank when set".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_directories(cfg: &RawConfigFile) -> Result<()> {
    let sweep = &cfg.sweep;

    if sweep.working_dir.as_os_str().is_empty() {
        return Err(SweepError::ConfigError(
            "[sweep].working_dir must not be empty".to_string(),
        ));
    }
    if sweep.archive_dir.as_os_str().is_empty() {
        return Err(SweepError::ConfigError(
            "[sweep].archive_dir must not be empty".to_string(),
        ));
    }
    // Component-wise comparison, so "a/b/" and "a/b" are the same directory.
    if sweep.working_dir.components().eq(sweep.archive_dir.components()) {
        return Err(SweepError::ConfigError(format!(
            "[sweep].working_dir and [sweep].archive_dir must differ (both {:?})",
            sweep.working_dir
        )));
    }
    Ok(())
}

fn validate_loop(cfg: &RawConfigFile) -> Result<()> {
    if cfg.run_loop.max_iterations == Some(0) {
        return Err(SweepError::ConfigError(
            "[loop].max_iterations must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
