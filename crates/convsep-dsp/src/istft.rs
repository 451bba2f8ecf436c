//! Frame synthesis: the inverse of [`analyze`](crate::stft::analyze).
//!
//! Each frame is inverted with an orthonormal inverse FFT, the first `L`
//! samples are weighted by the synthesis window and overlap-added at the
//! analysis hop. The sum is divided by the accumulated squared window
//! (weighted overlap-add), which undoes the analysis window exactly wherever
//! at least one frame has a non-zero weight.

use log::debug;
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

use crate::error::{DspError, DspResult};
use crate::stft::{check_framing, Stft};

/// Squared-window sums below this are treated as uncovered samples.
const MIN_WINDOW_SUM: f64 = 1e-10;

/// Reconstructs a time-domain signal from its STFT.
///
/// The returned signal has `stft.signal_length` samples.
///
/// # Arguments
/// * `stft` - Spectrogram produced by `analyze`
/// * `window` - Synthesis window, usually the analysis window
pub fn synthesize(stft: &Stft, window: &[f64]) -> DspResult<Vec<f64>> {
    let length_window = stft.window_length;
    let nfft = stft.nfft;
    let hop = stft.hop_size;
    check_framing(length_window, hop, nfft, stft.sample_rate)?;

    if window.len() != length_window {
        return Err(DspError::shape(
            "synthesis window",
            &[length_window],
            &[window.len()],
        ));
    }
    if stft.num_bins() != nfft / 2 + 1 {
        return Err(DspError::shape(
            "spectral frame",
            &[nfft / 2 + 1],
            &[stft.num_bins()],
        ));
    }
    if stft.num_frames() == 0 {
        return Err(DspError::EmptySignal);
    }

    let num_frames = stft.num_frames();
    let total = (num_frames - 1) * hop + length_window;
    let mut output = vec![0.0; total];
    let mut window_sum = vec![0.0; total];

    let mut planner = FftPlanner::<f64>::new();
    let ifft = planner.plan_fft_inverse(nfft);
    let scale = 1.0 / (nfft as f64).sqrt();
    let half = nfft / 2;

    let mut buffer = vec![Complex64::new(0.0, 0.0); nfft];
    for (n, row) in stft.data.rows().into_iter().enumerate() {
        // Hermitian extension of the non-negative bins.
        for (k, value) in row.iter().enumerate() {
            buffer[k] = *value;
        }
        for k in 1..half {
            buffer[nfft - k] = row[k].conj();
        }

        ifft.process(&mut buffer);

        let start = n * hop;
        for (i, &w) in window.iter().enumerate() {
            let sample = buffer[i].re * scale;
            output[start + i] += sample * w;
            window_sum[start + i] += w * w;
        }
    }

    for (sample, &sum) in output.iter_mut().zip(window_sum.iter()) {
        if sum > MIN_WINDOW_SUM {
            *sample /= sum;
        } else {
            *sample = 0.0;
        }
    }

    let left = length_window / 2;
    let end = (left + stft.signal_length).min(total);
    let signal = output[left..end].to_vec();

    debug!(
        "synthesized {} frames into {} samples",
        num_frames,
        signal.len()
    );

    Ok(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stft::analyze;
    use crate::window::{hanning, sinebell};

    fn test_signal(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let t = i as f64;
                (t * 0.05).sin() + 0.3 * (t * 0.31).cos() + if i % 97 == 0 { 0.5 } else { 0.0 }
            })
            .collect()
    }

    fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_roundtrip_hanning() {
        let signal = test_signal(5000);
        let window = hanning(1024);
        let stft = analyze(&signal, &window, 256, 1024, 44100.0).unwrap();
        let rebuilt = synthesize(&stft, &window).unwrap();

        assert_eq!(rebuilt.len(), signal.len());
        let err = max_abs_diff(&signal, &rebuilt);
        assert!(err < 1e-9, "max error {}", err);
    }

    #[test]
    fn test_roundtrip_zero_padded_fft() {
        let signal = test_signal(3000);
        let window = sinebell(300);
        let stft = analyze(&signal, &window, 100, 512, 16000.0).unwrap();
        let rebuilt = synthesize(&stft, &window).unwrap();

        let err = max_abs_diff(&signal, &rebuilt);
        assert!(err < 1e-9, "max error {}", err);
    }

    #[test]
    fn test_roundtrip_short_signal() {
        let signal = vec![0.25, -0.5, 1.0];
        let window = hanning(16);
        let stft = analyze(&signal, &window, 4, 16, 100.0).unwrap();
        let rebuilt = synthesize(&stft, &window).unwrap();

        assert_eq!(rebuilt.len(), 3);
        assert!(max_abs_diff(&signal, &rebuilt) < 1e-9);
    }

    #[test]
    fn test_window_longer_than_fft_is_rejected() {
        let signal = test_signal(100);
        let stft = analyze(&signal, &hanning(16), 8, 16, 1000.0).unwrap();
        let widened = Stft {
            window_length: 32,
            ..stft.clone()
        };
        assert!(matches!(
            synthesize(&widened, &hanning(32)),
            Err(DspError::InvalidParameter { .. })
        ));

        let no_fft = Stft { nfft: 0, ..stft };
        assert!(synthesize(&no_fft, &hanning(16)).is_err());
    }

    #[test]
    fn test_window_length_must_match() {
        let signal = test_signal(100);
        let stft = analyze(&signal, &hanning(32), 8, 32, 1000.0).unwrap();
        assert!(matches!(
            synthesize(&stft, &hanning(16)),
            Err(DspError::ShapeMismatch { .. })
        ));
    }
}
