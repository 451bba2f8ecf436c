//! Numeric comparison helpers.

use ndarray::{s, ArrayBase, Data, Dimension, Ix3};

/// Largest absolute element-wise difference between two arrays.
///
/// Compares elements in logical order; arrays of different shapes are
/// compared over the shorter element sequence, so callers should check
/// shapes first.
pub fn max_abs_diff<S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> f64
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Largest difference over the first `frames` frames of two
/// `[channels, frames, bins]` tensors.
pub fn covered_error<S1, S2>(
    a: &ArrayBase<S1, Ix3>,
    b: &ArrayBase<S2, Ix3>,
    frames: usize,
) -> f64
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    max_abs_diff(
        &a.slice(s![.., 0..frames, ..]),
        &b.slice(s![.., 0..frames, ..]),
    )
}

/// Largest absolute difference between two sample sequences.
pub fn max_sample_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_max_abs_diff() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![1.0, 2.5, 2.0];
        assert_eq!(max_abs_diff(&a, &b), 1.0);
    }

    #[test]
    fn test_covered_error_ignores_tail() {
        let a = Array3::<f64>::zeros((1, 10, 2));
        let mut b = a.clone();
        b[[0, 9, 1]] = 5.0;
        assert_eq!(covered_error(&a, &b, 9), 0.0);
        assert_eq!(covered_error(&a, &b, 10), 5.0);
    }

    #[test]
    fn test_max_sample_diff() {
        assert_eq!(max_sample_diff(&[0.0, -1.0], &[0.5, -1.0]), 0.5);
    }
}
