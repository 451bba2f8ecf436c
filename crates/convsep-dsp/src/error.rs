//! Error types for the numeric core.

use convsep_spec::{BackendError, ConfigError, ValidationError};
use thiserror::Error;

/// Result type for numeric core operations.
pub type DspResult<T> = Result<T, DspError>;

/// Errors raised by framing, batching, reconstruction, and normalization.
#[derive(Debug, Error)]
pub enum DspError {
    /// A parameter violates a precondition (odd FFT size, oversized window, ...).
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// The input signal has no samples.
    #[error("signal is empty")]
    EmptySignal,

    /// There are no windows to reconstruct from.
    #[error("no windows to reconstruct: {message}")]
    NoWindows {
        /// Error message.
        message: String,
    },

    /// Batching and reconstruction disagree on the window layout.
    #[error("window layout mismatch for '{field}': batched with {expected}, got {found}")]
    LayoutMismatch {
        /// Layout field that disagrees.
        field: &'static str,
        /// Value recorded when batching.
        expected: usize,
        /// Value supplied afterwards.
        found: usize,
    },

    /// An array does not have the expected shape.
    #[error("shape mismatch for {what}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// What was being checked.
        what: String,
        /// Expected shape.
        expected: Vec<usize>,
        /// Found shape.
        found: Vec<usize>,
    },

    /// The requested operation is not defined for the given mode.
    #[error("unsupported operation: {message}")]
    UnsupportedOperation {
        /// Error message.
        message: String,
    },

    /// Statistics for a feature are missing.
    #[error("missing statistics '{field}' for feature '{feature}'")]
    MissingStats {
        /// Feature key.
        feature: String,
        /// Missing statistic (e.g. "maximus"), or "*" if the feature is absent.
        field: &'static str,
    },

    /// Statistics would divide by zero or are otherwise unusable.
    #[error("invalid statistics: {message}")]
    InvalidStats {
        /// Error message.
        message: String,
    },

    /// The external block transform failed.
    #[error("block transform failed: {message}")]
    Transform {
        /// Error message.
        message: String,
    },

    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DspError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a shape mismatch error.
    pub fn shape(what: impl Into<String>, expected: &[usize], found: &[usize]) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }

    /// Creates a block transform error.
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
        }
    }

    /// Converts the first validation error of a failed check into an
    /// invalid parameter error.
    pub(crate) fn from_validation(errors: Vec<ValidationError>) -> Self {
        match errors.into_iter().next() {
            Some(err) => {
                let name = err
                    .path
                    .as_deref()
                    .and_then(|p| p.rsplit('.').next())
                    .unwrap_or("parameters")
                    .to_string();
                Self::InvalidParameter {
                    name,
                    message: err.to_string(),
                }
            }
            None => Self::invalid_param("parameters", "validation failed"),
        }
    }
}

impl BackendError for DspError {
    fn code(&self) -> &'static str {
        match self {
            DspError::InvalidParameter { .. } => "DSP_001",
            DspError::EmptySignal => "DSP_002",
            DspError::NoWindows { .. } => "DSP_003",
            DspError::LayoutMismatch { .. } => "DSP_004",
            DspError::ShapeMismatch { .. } => "DSP_005",
            DspError::UnsupportedOperation { .. } => "DSP_006",
            DspError::MissingStats { .. } => "DSP_007",
            DspError::InvalidStats { .. } => "DSP_008",
            DspError::Transform { .. } => "DSP_009",
            DspError::Config(_) => "DSP_010",
        }
    }

    fn category(&self) -> &'static str {
        "dsp"
    }
}
