//! Frame analysis: short-time Fourier transform of a sample sequence.
//!
//! The signal is left-padded with `L/2` zeros so the first frame is centered
//! on the first sample, then right-padded so it holds exactly
//! `ceil(len / hop) + 2` frames. Each frame is windowed, zero-extended to
//! `nfft` points, and transformed with an orthonormal FFT. Only the
//! `nfft/2 + 1` non-negative frequency bins are kept.

use log::{debug, warn};
use ndarray::{Array2, Array3, Axis};
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

use convsep_spec::{validate_stft_params, StftParams};

use crate::error::{DspError, DspResult};
use crate::window::window;

/// Complex spectrogram with the framing parameters that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stft {
    /// Spectral frames, shape `[frames, nfft/2 + 1]`.
    pub data: Array2<Complex64>,
    /// Sample advance between frames.
    pub hop_size: usize,
    /// Analysis window length.
    pub window_length: usize,
    /// FFT size.
    pub nfft: usize,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Number of samples in the analyzed signal.
    pub signal_length: usize,
}

impl Stft {
    /// Number of frames.
    pub fn num_frames(&self) -> usize {
        self.data.nrows()
    }

    /// Number of frequency bins per frame.
    pub fn num_bins(&self) -> usize {
        self.data.ncols()
    }

    /// Center frequency of each bin in Hz.
    pub fn frequencies(&self) -> Vec<f64> {
        (0..self.num_bins())
            .map(|k| k as f64 / self.nfft as f64 * self.sample_rate)
            .collect()
    }

    /// Time of each frame in seconds, relative to the first sample.
    pub fn times(&self) -> Vec<f64> {
        (0..self.num_frames())
            .map(|n| (n * self.hop_size) as f64 / self.sample_rate)
            .collect()
    }

    /// Magnitude spectrogram, shape `[frames, bins]`.
    pub fn magnitude(&self) -> Array2<f64> {
        self.data.mapv(|c| c.norm())
    }
}

/// Number of frames `analyze` produces for a signal of `signal_length` samples.
///
/// Returns 0 when `hop_size` is 0.
pub fn expected_frame_count(signal_length: usize, hop_size: usize) -> usize {
    if hop_size == 0 {
        return 0;
    }
    signal_length.div_ceil(hop_size) + 2
}

/// Computes the short-time Fourier transform of `signal`.
///
/// # Arguments
/// * `signal` - Real-valued samples
/// * `window` - Analysis window coefficients (length `L <= nfft`)
/// * `hop_size` - Sample advance between frames
/// * `nfft` - FFT size (must be even)
/// * `sample_rate` - Sample rate in Hz
///
/// # Errors
/// Returns [`DspError::EmptySignal`] for an empty signal and
/// [`DspError::InvalidParameter`] for any framing precondition violation.
pub fn analyze(
    signal: &[f64],
    window: &[f64],
    hop_size: usize,
    nfft: usize,
    sample_rate: f64,
) -> DspResult<Stft> {
    check_framing(window.len(), hop_size, nfft, sample_rate)?;
    if signal.is_empty() {
        return Err(DspError::EmptySignal);
    }
    if signal.len() < hop_size {
        warn!(
            "signal of {} samples is shorter than one hop ({} samples)",
            signal.len(),
            hop_size
        );
    }

    let length_window = window.len();
    let num_frames = expected_frame_count(signal.len(), hop_size);
    let new_length = (num_frames - 1) * hop_size + length_window;

    let left = length_window / 2;
    let mut padded = vec![0.0; new_length];
    padded[left..left + signal.len()].copy_from_slice(signal);

    let num_bins = nfft / 2 + 1;
    let scale = 1.0 / (nfft as f64).sqrt();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(nfft);

    let mut data = Array2::<Complex64>::zeros((num_frames, num_bins));
    let mut buffer = vec![Complex64::new(0.0, 0.0); nfft];

    for (n, mut row) in data.axis_iter_mut(Axis(0)).enumerate() {
        let begin = n * hop_size;
        let frame = &padded[begin..begin + length_window];

        for (slot, (&s, &w)) in buffer.iter_mut().zip(frame.iter().zip(window.iter())) {
            *slot = Complex64::new(s * w, 0.0);
        }
        for slot in buffer[length_window..].iter_mut() {
            *slot = Complex64::new(0.0, 0.0);
        }

        fft.process(&mut buffer);

        for (out, value) in row.iter_mut().zip(buffer.iter()) {
            *out = *value * scale;
        }
    }

    debug!(
        "analyzed {} samples into {} frames x {} bins (hop {}, window {}, nfft {})",
        signal.len(),
        num_frames,
        num_bins,
        hop_size,
        length_window,
        nfft
    );

    Ok(Stft {
        data,
        hop_size,
        window_length: length_window,
        nfft,
        sample_rate,
        signal_length: signal.len(),
    })
}

/// Computes the STFT using parameters from a configuration.
pub fn analyze_with(signal: &[f64], params: &StftParams) -> DspResult<Stft> {
    let coefficients = window(params.window, params.window_length)?;
    analyze(
        signal,
        &coefficients,
        params.hop_size,
        params.nfft,
        params.sample_rate,
    )
}

/// Computes the magnitude spectrogram of each channel.
///
/// Returns a feature tensor of shape `[channels, frames, bins]`. All channels
/// must have the same number of samples.
pub fn analyze_channels(channels: &[&[f64]], params: &StftParams) -> DspResult<Array3<f64>> {
    let length = check_channels(channels)?;
    let frames = expected_frame_count(length, params.hop_size);
    let mut features = Array3::<f64>::zeros((channels.len(), frames, params.num_bins()));
    for (mut plane, channel) in features.axis_iter_mut(Axis(0)).zip(channels.iter()) {
        let stft = analyze_with(channel, params)?;
        plane.assign(&stft.magnitude());
    }

    Ok(features)
}

/// Checks that there is at least one channel and that all channels have
/// the same length, which is returned.
pub(crate) fn check_channels(channels: &[&[f64]]) -> DspResult<usize> {
    let first = channels
        .first()
        .ok_or_else(|| DspError::invalid_param("channels", "at least one channel is required"))?;

    for (i, channel) in channels.iter().enumerate().skip(1) {
        if channel.len() != first.len() {
            return Err(DspError::shape(
                format!("channel {}", i),
                &[first.len()],
                &[channel.len()],
            ));
        }
    }
    Ok(first.len())
}

pub(crate) fn check_framing(
    window_length: usize,
    hop_size: usize,
    nfft: usize,
    sample_rate: f64,
) -> DspResult<()> {
    let params = StftParams {
        window_length,
        hop_size,
        nfft,
        sample_rate,
        ..Default::default()
    };
    validate_stft_params(&params)
        .into_result()
        .map(|_| ())
        .map_err(DspError::from_validation)
}
