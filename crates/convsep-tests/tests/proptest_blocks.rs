//! Property-based tests for window batching and reconstruction.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p convsep-tests --test proptest_blocks
//! ```

use proptest::prelude::*;

use convsep_dsp::{
    batch, chunk_count, crossfade_ramps, denormalize, normalize, reconstruct, window_starts,
    DspError, NormStats, StatsStore, PAD_VALUE,
};
use convsep_spec::{BlockParams, NormMode, NormParams, TailMode};
use convsep_tests::{covered_error, random_spectrogram};
use ndarray::{Array2, Axis};

/// Strategy for valid `(time_context, overlap)` pairs.
fn geometry() -> impl Strategy<Value = (usize, usize)> {
    (1usize..40).prop_flat_map(|tc| (Just(tc), 0..tc))
}

fn tail_mode() -> impl Strategy<Value = TailMode> {
    prop_oneof![Just(TailMode::Drop), Just(TailMode::Pad)]
}

// ============================================================================
// 1. Cursor arithmetic
// ============================================================================

proptest! {
    /// The closed-form count matches the walked cursor.
    #[test]
    fn count_matches_walk(total in 0usize..2000, (tc, ov) in geometry(), tail in tail_mode()) {
        let starts = window_starts(total, tc, ov, tail).unwrap();
        prop_assert_eq!(starts.len(), chunk_count(total, tc, ov, tail).unwrap());
    }

    /// Pad mode matches `ceil((T - tc) / (tc - ov)) + 1`; Drop is one fewer.
    #[test]
    fn count_matches_formula(total in 0usize..2000, (tc, ov) in geometry()) {
        let pad = chunk_count(total, tc, ov, TailMode::Pad).unwrap();
        let drop = chunk_count(total, tc, ov, TailMode::Drop).unwrap();
        if total > tc {
            let formula = (total - tc).div_ceil(tc - ov) + 1;
            prop_assert_eq!(pad, formula);
            prop_assert_eq!(drop, formula - 1);
        } else {
            prop_assert_eq!(pad, 0);
            prop_assert_eq!(drop, 0);
        }
    }

    /// Drop-mode windows never reach the last frame; Pad mode always does.
    #[test]
    fn window_bounds(total in 2usize..500, (tc, ov) in geometry()) {
        for &start in &window_starts(total, tc, ov, TailMode::Drop).unwrap() {
            prop_assert!(start + tc < total);
        }
        if let Some(&last) = window_starts(total, tc, ov, TailMode::Pad).unwrap().last() {
            prop_assert!(last + tc >= total);
        }
    }
}

// ============================================================================
// 2. Crossfade ramps
// ============================================================================

proptest! {
    /// Rising and falling ramps sum to one at every offset.
    #[test]
    fn ramps_sum_to_unity(overlap in 0usize..512) {
        let (rising, falling) = crossfade_ramps(overlap);
        prop_assert_eq!(rising.len(), overlap);
        for (r, f) in rising.iter().zip(falling.iter()) {
            prop_assert!((r + f - 1.0).abs() < 1e-12);
            prop_assert!((0.0..=1.0).contains(r));
        }
    }
}

// ============================================================================
// 3. Batch / reconstruct round trip
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Identity transform reproduces every covered frame.
    #[test]
    fn identity_roundtrip(
        seed in any::<u32>(),
        channels in 1usize..3,
        frames in 0usize..200,
        bins in 1usize..8,
        (tc, ov) in geometry(),
        batch_size in 1usize..20,
        tail in tail_mode(),
    ) {
        let features = random_spectrogram(seed, channels, frames, bins);
        let params = BlockParams { time_context: tc, overlap: ov, batch_size, tail };
        let (batches, n) = batch(features.view(), &params).unwrap();

        if n == 0 {
            let is_no_windows = matches!(
                reconstruct(&batches, n, ov),
                Err(DspError::NoWindows { .. })
            );
            prop_assert!(is_no_windows);
        } else {
            let out = reconstruct(&batches, n, ov).unwrap();
            let layout = batches.layout();
            prop_assert_eq!(out.dim(), (channels, n * (tc - ov) + tc, bins));
            prop_assert!(covered_error(&out, &features, layout.covered_frames()) < 1e-9);
        }
    }

    /// Every slot past the real windows holds exactly the padding value.
    #[test]
    fn padding_slots_are_exact(
        seed in any::<u32>(),
        frames in 1usize..150,
        (tc, ov) in geometry(),
        batch_size in 1usize..10,
    ) {
        let features = random_spectrogram(seed, 1, frames, 3);
        let params = BlockParams {
            time_context: tc,
            overlap: ov,
            batch_size,
            tail: TailMode::Drop,
        };
        let (batches, n) = batch(features.view(), &params).unwrap();

        for index in n..batches.layout().capacity() {
            let (b, slot) = batches.layout().slot(index);
            let view = batches.batches()[b].index_axis(Axis(0), slot);
            prop_assert!(view.iter().all(|&v| v == PAD_VALUE));
        }
    }

    /// Passing a chunk count from another geometry is always rejected.
    #[test]
    fn mismatched_chunk_count_rejected(
        seed in any::<u32>(),
        frames in 50usize..200,
        extra in 1usize..5,
    ) {
        let features = random_spectrogram(seed, 1, frames, 2);
        let params = BlockParams {
            time_context: 10,
            overlap: 3,
            batch_size: 4,
            tail: TailMode::Drop,
        };
        let (batches, n) = batch(features.view(), &params).unwrap();
        let is_layout_mismatch = matches!(
            reconstruct(&batches, n + extra, 3),
            Err(DspError::LayoutMismatch { .. })
        );
        prop_assert!(is_layout_mismatch);
    }
}

// ============================================================================
// 4. Normalization inverse law
// ============================================================================

proptest! {
    /// `denormalize(normalize(x))` recovers `x` for invertible modes.
    #[test]
    fn normalization_roundtrip(
        values in prop::collection::vec(-1e3f64..1e3, 12),
        lows in prop::collection::vec(-10f64..0.0, 4),
        spans in prop::collection::vec(0.5f64..50.0, 4),
        mean_mode in any::<bool>(),
    ) {
        let x = Array2::from_shape_vec((3, 4), values).unwrap();
        let highs: Vec<f64> = lows.iter().zip(spans.iter()).map(|(l, s)| l + s).collect();
        let store = StatsStore::new().with("feats", NormStats {
            minimus: Some(lows.clone()),
            maximus: Some(highs),
            means: Some(lows),
            stds: Some(spans),
        });
        let params = NormParams {
            mode: if mean_mode { NormMode::Mean } else { NormMode::MaxMin },
            feature: "feats".to_string(),
        };

        let y = normalize(&x, &store, &params).unwrap();
        let back = denormalize(&y, &store, &params).unwrap();
        for (a, b) in x.iter().zip(back.iter()) {
            prop_assert!((a - b).abs() <= 1e-9 * (1.0 + a.abs()));
        }
    }

    /// Clip output always lies in [0, 1] and cannot be inverted.
    #[test]
    fn clip_is_bounded(values in prop::collection::vec(-1e3f64..1e3, 1..50)) {
        let x = ndarray::Array1::from(values);
        let params = NormParams { mode: NormMode::Clip, feature: "any".to_string() };
        let y = normalize(&x, &StatsStore::new(), &params).unwrap();
        prop_assert!(y.iter().all(|v| (0.0..=1.0).contains(v)));
        let is_unsupported = matches!(
            denormalize(&y, &StatsStore::new(), &params),
            Err(DspError::UnsupportedOperation { .. })
        );
        prop_assert!(is_unsupported);
    }
}
