//! Configuration validation logic.
//!
//! Each parameter group has its own validator so processing stages can check
//! exactly the parameters they consume. [`validate_config`] runs all of them.

pub mod common;


use std::collections::HashSet;

use crate::config::PipelineConfig;
use crate::error::{ErrorCode, ValidationError, ValidationResult, ValidationWarning, WarningCode};
use crate::params::{BlockParams, NormParams, SourceLayout, StftParams};

pub use common::{
    validate_even, validate_less_than, validate_nonzero, validate_positive, CommonValidationError,
};

/// Validates a complete pipeline configuration.
///
/// # Example
/// ```
/// use convsep_spec::PipelineConfig;
/// use convsep_spec::validation::validate_config;
///
/// let result = validate_config(&PipelineConfig::default());
/// assert!(result.is_ok());
/// ```
pub fn validate_config(config: &PipelineConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    check_stft_params(&config.stft, "stft", &mut result);
    check_block_params(&config.blocks, "blocks", &mut result);
    if let Some(ref norm) = config.input_norm {
        check_norm_params(norm, "input_norm", &mut result);
    }
    check_source_layout(&config.sources, "sources", &mut result);

    result
}

/// Validates spectral analysis parameters on their own.
pub fn validate_stft_params(params: &StftParams) -> ValidationResult {
    let mut result = ValidationResult::default();
    check_stft_params(params, "stft", &mut result);
    result
}

/// Validates window batching parameters on their own.
pub fn validate_block_params(params: &BlockParams) -> ValidationResult {
    let mut result = ValidationResult::default();
    check_block_params(params, "blocks", &mut result);
    result
}

fn check_stft_params(params: &StftParams, prefix: &str, result: &mut ValidationResult) {
    if let Err(e) = validate_even("nfft", params.nfft) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidFftSize,
            e.message,
            format!("{}.nfft", prefix),
        ));
    } else if !params.nfft.is_power_of_two() {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::NonPowerOfTwoFft,
            format!("nfft {} is not a power of two", params.nfft),
            format!("{}.nfft", prefix),
        ));
    }

    if let Err(e) = validate_nonzero("window_length", params.window_length) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidWindowLength,
            e.message,
            format!("{}.window_length", prefix),
        ));
    } else if params.window_length > params.nfft {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidWindowLength,
            format!(
                "window_length ({}) must not exceed nfft ({})",
                params.window_length, params.nfft
            ),
            format!("{}.window_length", prefix),
        ));
    }

    if let Err(e) = validate_nonzero("hop_size", params.hop_size) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidHopSize,
            e.message,
            format!("{}.hop_size", prefix),
        ));
    } else if params.window_length > 0 && params.hop_size > params.window_length {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::HopExceedsWindow,
            format!(
                "hop_size ({}) exceeds window_length ({}); samples between frames are ignored",
                params.hop_size, params.window_length
            ),
            format!("{}.hop_size", prefix),
        ));
    }

    if let Err(e) = validate_positive("sample_rate", params.sample_rate) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidSampleRate,
            e.message,
            format!("{}.sample_rate", prefix),
        ));
    }
}

fn check_block_params(params: &BlockParams, prefix: &str, result: &mut ValidationResult) {
    if let Err(e) = validate_nonzero("time_context", params.time_context) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidTimeContext,
            e.message,
            format!("{}.time_context", prefix),
        ));
    } else if let Err(e) =
        validate_less_than("overlap", params.overlap, "time_context", params.time_context)
    {
        result.add_error(ValidationError::with_path(
            ErrorCode::OverlapTooLarge,
            e.message,
            format!("{}.overlap", prefix),
        ));
    } else if params.overlap == 1 {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::SingleFrameOverlap,
            "an overlap of 1 frame keeps the previous window's frame unblended",
            format!("{}.overlap", prefix),
        ));
    }

    if let Err(e) = validate_nonzero("batch_size", params.batch_size) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidBatchSize,
            e.message,
            format!("{}.batch_size", prefix),
        ));
    }
}

fn check_norm_params(params: &NormParams, prefix: &str, result: &mut ValidationResult) {
    if params.feature.trim().is_empty() {
        result.add_error(ValidationError::with_path(
            ErrorCode::EmptyFeatureName,
            "feature key must not be empty",
            format!("{}.feature", prefix),
        ));
    }
}

fn check_source_layout(layout: &SourceLayout, prefix: &str, result: &mut ValidationResult) {
    if layout.names.is_empty() {
        result.add_error(ValidationError::with_path(
            ErrorCode::NoSources,
            "at least one source must be declared",
            format!("{}.names", prefix),
        ));
    }

    let mut seen = HashSet::new();
    for (i, name) in layout.names.iter().enumerate() {
        if !seen.insert(name.as_str()) {
            result.add_error(ValidationError::with_path(
                ErrorCode::DuplicateSourceName,
                format!("duplicate source name '{}'", name),
                format!("{}.names[{}]", prefix, i),
            ));
        }
    }

    if let Err(e) = validate_nonzero("channels_per_source", layout.channels_per_source) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidChannelsPerSource,
            e.message,
            format!("{}.channels_per_source", prefix),
        ));
    }
}
