//! Short-time Fourier transform parameters.

use serde::{Deserialize, Serialize};

/// Analysis window shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// Symmetric Hanning window (zero at both ends).
    #[default]
    Hanning,
    /// Periodic Hann window (zero at the first sample only).
    Hann,
    /// Sine window, `sin(pi * (n + 0.5) / L)`.
    Sinebell,
    /// Rectangular window (all ones).
    Rectangular,
}

/// Framing parameters for spectral analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StftParams {
    /// Analysis window shape.
    #[serde(default)]
    pub window: WindowKind,
    /// Window length in samples.
    pub window_length: usize,
    /// Sample advance between consecutive frames.
    pub hop_size: usize,
    /// Number of FFT points (must be even, at least `window_length`).
    pub nfft: usize,
    /// Sample rate in Hz.
    pub sample_rate: f64,
}

impl StftParams {
    /// Default window length in samples.
    pub const DEFAULT_WINDOW_LENGTH: usize = 1024;

    /// Default hop size in samples.
    pub const DEFAULT_HOP_SIZE: usize = 256;

    /// Default FFT size.
    pub const DEFAULT_NFFT: usize = 1024;

    /// Default sample rate in Hz.
    pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

    /// Number of non-negative frequency bins per frame.
    pub fn num_bins(&self) -> usize {
        self.nfft / 2 + 1
    }
}

impl Default for StftParams {
    fn default() -> Self {
        Self {
            window: WindowKind::Hanning,
            window_length: Self::DEFAULT_WINDOW_LENGTH,
            hop_size: Self::DEFAULT_HOP_SIZE,
            nfft: Self::DEFAULT_NFFT,
            sample_rate: Self::DEFAULT_SAMPLE_RATE,
        }
    }
}
