//! Preset validation.
//!
//! Range checks run before a preset reaches the engine; the graph only
//! clamps. Ranges mirror the automation ranges in
//! [`efflux_modules::AutomationTarget`], so any value automation can produce
//! also validates.
//!
//! # Example
//!
//! ```rust
//! use efflux_config::{InstrumentPreset, validate_preset};
//!
//! let mut preset = InstrumentPreset::new("Check");
//! assert!(validate_preset(&preset).is_ok());
//!
//! preset.delay.feedback = 1.5;
//! assert!(validate_preset(&preset).is_err());
//! ```

use efflux_modules::AutomationTarget;
use efflux_modules::factory::MAX_DELAY_SECONDS;
use thiserror::Error;
use tracing::warn;

use crate::preset::InstrumentPreset;

/// Lowest sample rate a preset may request.
pub const MIN_SAMPLE_RATE: u32 = 8000;
/// Highest sample rate a preset may request.
pub const MAX_SAMPLE_RATE: u32 = 192_000;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted parameter path, e.g. `filter.q`.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// A name that does not resolve.
    #[error("invalid format for parameter '{param}': {reason}")]
    InvalidFormat {
        /// Dotted parameter path.
        param: String,
        /// Description of the format error.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Flattens into the individual findings.
    pub fn errors(&self) -> Vec<&ValidationError> {
        match self {
            ValidationError::Multiple(errors) => errors.iter().collect(),
            single => vec![single],
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks `value` against `[min, max]`. NaN is out of range.
pub fn check_range(param: &str, value: f32, min: f32, max: f32) -> ValidationResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param: param.to_string(),
            value,
            min,
            max,
        })
    }
}

fn check_target(param: &str, value: f32, target: AutomationTarget) -> ValidationResult<()> {
    let (min, max) = target.range();
    check_range(param, value, min, max)
}

/// Validates every field of a preset.
///
/// All findings are collected; a single finding is returned as-is, more
/// than one as [`ValidationError::Multiple`].
pub fn validate_preset(preset: &InstrumentPreset) -> ValidationResult<()> {
    let filter = &preset.filter;
    let delay = &preset.delay;

    let checks = [
        check_range(
            "sample_rate",
            preset.sample_rate as f32,
            MIN_SAMPLE_RATE as f32,
            MAX_SAMPLE_RATE as f32,
        ),
        check_target("volume", preset.volume, AutomationTarget::Volume),
        filter.filter_type().map(drop),
        check_target("filter.frequency", filter.frequency, AutomationTarget::FilterFrequency),
        check_target("filter.q", filter.q, AutomationTarget::FilterQ),
        filter.lfo_waveform().map(drop),
        check_target("filter.lfo_speed", filter.lfo_speed, AutomationTarget::FilterLfoSpeed),
        check_target("filter.lfo_depth", filter.lfo_depth, AutomationTarget::FilterLfoDepth),
        delay.delay_type().map(drop),
        check_range("delay.time", delay.time, 0.0, MAX_DELAY_SECONDS),
        check_target("delay.feedback", delay.feedback, AutomationTarget::DelayFeedback),
        check_target("delay.stereo_offset", delay.stereo_offset, AutomationTarget::DelayOffset),
        check_target("delay.cutoff", delay.cutoff, AutomationTarget::DelayCutoff),
    ];

    let mut errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();
    for error in &errors {
        warn!(preset = %preset.name, %error, "preset validation");
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_preset(&InstrumentPreset::default()), Ok(()));
    }

    #[test]
    fn test_single_error_is_not_wrapped() {
        let mut preset = InstrumentPreset::default();
        preset.filter.q = 0.0;
        let err = validate_preset(&preset).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                param: "filter.q".to_string(),
                value: 0.0,
                min: 0.1,
                max: 40.0,
            }
        );
        assert_eq!(err.errors().len(), 1);
    }

    #[test]
    fn test_every_bad_field_reported() {
        let mut preset = InstrumentPreset::default();
        preset.sample_rate = 1000;
        preset.volume = -1.0;
        preset.filter.frequency = 30000.0;
        preset.filter.lfo = "noise".to_string();
        preset.delay.time = 2.0;
        preset.delay.delay_type = "tape".to_string();

        let err = validate_preset(&preset).unwrap_err();
        let params: Vec<String> = err
            .errors()
            .iter()
            .map(|e| match e {
                ValidationError::OutOfRange { param, .. }
                | ValidationError::InvalidFormat { param, .. } => param.clone(),
                ValidationError::Multiple(_) => unreachable!(),
            })
            .collect();
        assert_eq!(
            params,
            [
                "sample_rate",
                "volume",
                "filter.frequency",
                "filter.lfo",
                "delay.type",
                "delay.time",
            ]
        );
    }

    #[test]
    fn test_nan_rejected() {
        let mut preset = InstrumentPreset::default();
        preset.delay.cutoff = f32::NAN;
        assert!(validate_preset(&preset).is_err());
    }

    #[test]
    fn test_range_bounds_inclusive() {
        assert!(check_range("x", 0.0, 0.0, 1.0).is_ok());
        assert!(check_range("x", 1.0, 0.0, 1.0).is_ok());
        assert!(check_range("x", 1.0001, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_multiple_display_joins() {
        let err = ValidationError::Multiple(vec![
            ValidationError::InvalidFormat {
                param: "a".to_string(),
                reason: "bad".to_string(),
            },
            ValidationError::InvalidFormat {
                param: "b".to_string(),
                reason: "worse".to_string(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("'a': bad; invalid format for parameter 'b'"), "got: {msg}");
    }
}
