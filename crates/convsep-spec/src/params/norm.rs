//! Feature normalization parameters.

use serde::{Deserialize, Serialize};

/// Feature scaling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormMode {
    /// Rescale into [0, 1] using per-feature minima and maxima.
    MaxMin,
    /// Z-score using per-feature means and standard deviations.
    Mean,
    /// Clamp into [0, 1]. Not invertible.
    Clip,
}

impl NormMode {
    /// Returns true if `denormalize` is defined for this mode.
    pub fn is_invertible(&self) -> bool {
        !matches!(self, NormMode::Clip)
    }

    /// Returns the mode name as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            NormMode::MaxMin => "max_min",
            NormMode::Mean => "mean",
            NormMode::Clip => "clip",
        }
    }
}

impl std::fmt::Display for NormMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalization applied to a named feature stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormParams {
    /// Scaling mode.
    pub mode: NormMode,
    /// Key of the persisted statistics for this feature (e.g. "mix_stft").
    pub feature: String,
}
