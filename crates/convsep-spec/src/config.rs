//! Pipeline configuration and builder.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::params::{BlockParams, NormParams, SourceLayout, StftParams, WindowKind};
use crate::validation::validate_config;

/// Complete configuration for one separation pass.
///
/// Every stage receives its parameters from this value; nothing is read from
/// ambient state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Spectral analysis parameters.
    #[serde(default)]
    pub stft: StftParams,
    /// Window batching parameters.
    #[serde(default)]
    pub blocks: BlockParams,
    /// Optional normalization of the input features before batching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_norm: Option<NormParams>,
    /// Output source layout of the block transform.
    #[serde(default)]
    pub sources: SourceLayout,
}

impl PipelineConfig {
    /// Creates a builder starting from the default configuration.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Parses a configuration from JSON without validating it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a configuration file without validating it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the configuration, discarding warnings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_config(self)
            .into_result()
            .map(|_| ())
            .map_err(ConfigError::ValidationFailed)
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Creates a new builder with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the analysis window shape and length.
    pub fn window(mut self, kind: WindowKind, length: usize) -> Self {
        self.config.stft.window = kind;
        self.config.stft.window_length = length;
        self
    }

    /// Sets the hop size in samples.
    pub fn hop_size(mut self, hop_size: usize) -> Self {
        self.config.stft.hop_size = hop_size;
        self
    }

    /// Sets the FFT size.
    pub fn nfft(mut self, nfft: usize) -> Self {
        self.config.stft.nfft = nfft;
        self
    }

    /// Sets the sample rate in Hz.
    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.config.stft.sample_rate = sample_rate;
        self
    }

    /// Sets the window batching parameters.
    pub fn blocks(mut self, blocks: BlockParams) -> Self {
        self.config.blocks = blocks;
        self
    }

    /// Enables input normalization.
    pub fn input_norm(mut self, norm: NormParams) -> Self {
        self.config.input_norm = Some(norm);
        self
    }

    /// Sets the output source layout.
    pub fn sources(mut self, sources: SourceLayout) -> Self {
        self.config.sources = sources;
        self
    }

    /// Builds the configuration without validating it.
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}
