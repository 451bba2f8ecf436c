//! Analysis window functions.

use std::f64::consts::PI;

use convsep_spec::WindowKind;

use crate::error::{DspError, DspResult};

/// Builds a window of the given shape and length.
///
/// # Arguments
/// * `kind` - Window shape
/// * `length` - Number of coefficients (must be at least 1)
pub fn window(kind: WindowKind, length: usize) -> DspResult<Vec<f64>> {
    if length == 0 {
        return Err(DspError::invalid_param(
            "window_length",
            "window must have at least one coefficient",
        ));
    }

    Ok(match kind {
        WindowKind::Hanning => hanning(length),
        WindowKind::Hann => hann_periodic(length),
        WindowKind::Sinebell => sinebell(length),
        WindowKind::Rectangular => vec![1.0; length],
    })
}

/// Symmetric Hanning window, zero at both ends.
pub fn hanning(length: usize) -> Vec<f64> {
    if length == 1 {
        return vec![1.0];
    }
    let denom = (length - 1) as f64;
    (0..length)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / denom).cos())
        .collect()
}

/// Periodic Hann window, zero at the first sample only.
pub fn hann_periodic(length: usize) -> Vec<f64> {
    (0..length)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / length as f64).cos())
        .collect()
}

/// Sine window.
pub fn sinebell(length: usize) -> Vec<f64> {
    (0..length)
        .map(|n| (PI * (n as f64 + 0.5) / length as f64).sin())
        .collect()
}
