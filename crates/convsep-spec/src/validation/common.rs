//! Common validation utilities shared across parameter groups.

use std::fmt;

/// Error type for common validation failures.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonValidationError {
    /// Human-readable error message.
    pub message: String,
}

impl CommonValidationError {
    /// Creates a new validation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommonValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommonValidationError {}

/// Validate that a value is positive (> 0) and finite.
///
/// # Example
/// ```
/// use convsep_spec::validation::common::validate_positive;
///
/// assert!(validate_positive("sample_rate", 44100.0).is_ok());
/// assert!(validate_positive("sample_rate", 0.0).is_err());
/// assert!(validate_positive("sample_rate", f64::NAN).is_err());
/// ```
pub fn validate_positive(name: &str, value: f64) -> Result<(), CommonValidationError> {
    if !value.is_finite() {
        return Err(CommonValidationError::new(format!(
            "{} must be finite, got {}",
            name, value
        )));
    }
    if value <= 0.0 {
        return Err(CommonValidationError::new(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Validate that a count is at least 1.
///
/// # Example
/// ```
/// use convsep_spec::validation::common::validate_nonzero;
///
/// assert!(validate_nonzero("hop_size", 256).is_ok());
/// assert!(validate_nonzero("hop_size", 0).is_err());
/// ```
pub fn validate_nonzero(name: &str, value: usize) -> Result<(), CommonValidationError> {
    if value == 0 {
        return Err(CommonValidationError::new(format!(
            "{} must be at least 1, got 0",
            name
        )));
    }
    Ok(())
}

/// Validate that a count is even and non-zero.
///
/// # Example
/// ```
/// use convsep_spec::validation::common::validate_even;
///
/// assert!(validate_even("nfft", 1024).is_ok());
/// assert!(validate_even("nfft", 1023).is_err());
/// assert!(validate_even("nfft", 0).is_err());
/// ```
pub fn validate_even(name: &str, value: usize) -> Result<(), CommonValidationError> {
    validate_nonzero(name, value)?;
    if value % 2 != 0 {
        return Err(CommonValidationError::new(format!(
            "{} must be even, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Validate that `value < limit`.
///
/// # Example
/// ```
/// use convsep_spec::validation::common::validate_less_than;
///
/// assert!(validate_less_than("overlap", 15, "time_context", 30).is_ok());
/// assert!(validate_less_than("overlap", 30, "time_context", 30).is_err());
/// ```
pub fn validate_less_than(
    name: &str,
    value: usize,
    limit_name: &str,
    limit: usize,
) -> Result<(), CommonValidationError> {
    if value >= limit {
        return Err(CommonValidationError::new(format!(
            "{} must be smaller than {} ({}), got {}",
            name, limit_name, limit, value
        )));
    }
    Ok(())
}
