//! ConvSep Parameter and Configuration Library
//!
//! This crate provides the parameter types, configuration validation, and
//! error codes shared by every ConvSep processing stage. It contains no
//! numeric code; the framing and reconstruction core lives in `convsep-dsp`.
//!
//! # Overview
//!
//! A separation pass is described by a [`PipelineConfig`]:
//!
//! - **stft**: analysis window, hop size, FFT size, sample rate
//! - **blocks**: frames per window (`time_context`), `overlap`, `batch_size`
//! - **input_norm**: optional feature scaling applied before batching
//! - **sources**: how the block transform's output channels map to sources
//!
//! # Example
//!
//! ```
//! use convsep_spec::{PipelineConfig, BlockParams, TailMode, WindowKind};
//! use convsep_spec::validation::validate_config;
//!
//! let config = PipelineConfig::builder()
//!     .window(WindowKind::Hanning, 1024)
//!     .hop_size(256)
//!     .nfft(1024)
//!     .blocks(BlockParams {
//!         time_context: 30,
//!         overlap: 15,
//!         batch_size: 15,
//!         tail: TailMode::Drop,
//!     })
//!     .build();
//!
//! let result = validate_config(&config);
//! assert!(result.is_ok());
//! ```
//!
//! # Modules
//!
//! - [`config`]: Pipeline configuration and builder
//! - [`error`]: Error and warning types for validation
//! - [`params`]: Per-stage parameter types
//! - [`validation`]: Configuration validation functions

pub mod config;
pub mod error;
pub mod params;
pub mod validation;

// Re-export commonly used types at the crate root
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{
    BackendError, ConfigError, ErrorCode, ValidationError, ValidationResult, ValidationWarning,
    WarningCode,
};
pub use params::{BlockParams, NormMode, NormParams, SourceLayout, StftParams, TailMode, WindowKind};
pub use validation::{validate_block_params, validate_config, validate_stft_params};
