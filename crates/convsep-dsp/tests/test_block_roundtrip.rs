//! Batching and reconstruction integration tests.

use convsep_dsp::{
    apply_transform, batch, chunk_count, reconstruct, window_starts, DspError, Identity, PAD_VALUE,
};
use convsep_spec::{BlockParams, TailMode};
use ndarray::{s, Array3, Axis};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

fn random_features(seed: u64, channels: usize, frames: usize, bins: usize) -> Array3<f64> {
    let mut rng = Pcg32::seed_from_u64(seed);
    Array3::from_shape_fn((channels, frames, bins), |_| rng.gen_range(0.0..10.0))
}

fn blocks(time_context: usize, overlap: usize, batch_size: usize, tail: TailMode) -> BlockParams {
    BlockParams {
        time_context,
        overlap,
        batch_size,
        tail,
    }
}

#[test]
fn test_roundtrip_default_geometry() {
    let features = random_features(1, 2, 400, 513);
    let params = BlockParams::default();
    let (batches, n) = batch(features.view(), &params).unwrap();
    let out = reconstruct(&batches, n, params.overlap).unwrap();

    let covered = batches.layout().covered_frames();
    assert_eq!(out.dim(), (2, n * 15 + 30, 513));
    let lhs = out.slice(s![.., 0..covered, ..]);
    let rhs = features.slice(s![.., 0..covered, ..]);
    for (a, b) in lhs.iter().zip(rhs.iter()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn test_roundtrip_many_geometries() {
    let features = random_features(7, 1, 173, 6);
    for time_context in [2, 5, 16, 30] {
        for overlap in 0..time_context {
            for tail in [TailMode::Drop, TailMode::Pad] {
                let params = blocks(time_context, overlap, 4, tail);
                let (batches, n) = batch(features.view(), &params).unwrap();
                let transformed = apply_transform(&batches, &Identity).unwrap();
                let out = reconstruct(&transformed, n, overlap).unwrap();

                let covered = batches.layout().covered_frames();
                let err = out
                    .slice(s![.., 0..covered, ..])
                    .iter()
                    .zip(features.slice(s![.., 0..covered, ..]).iter())
                    .map(|(a, b)| (a - b).abs())
                    .fold(0.0, f64::max);
                assert!(
                    err < 1e-9,
                    "tc {} ov {} {:?}: max error {}",
                    time_context,
                    overlap,
                    tail,
                    err
                );
            }
        }
    }
}

#[test]
fn test_window_count_formula() {
    for total in 0..300 {
        let drop = chunk_count(total, 30, 15, TailMode::Drop).unwrap();
        let pad = chunk_count(total, 30, 15, TailMode::Pad).unwrap();
        if total <= 30 {
            assert_eq!((drop, pad), (0, 0));
        } else {
            let formula = (total - 30).div_ceil(15) + 1;
            assert_eq!(pad, formula, "total {}", total);
            assert_eq!(drop, formula - 1, "total {}", total);
        }
        assert_eq!(
            window_starts(total, 30, 15, TailMode::Drop).unwrap().len(),
            drop
        );
    }
}

#[test]
fn test_batch_padding_is_exact_constant() {
    let features = random_features(3, 2, 100, 4);
    let (batches, n) = batch(features.view(), &blocks(30, 15, 15, TailMode::Drop)).unwrap();
    assert_eq!(n, 5);
    assert_eq!(batches.num_batches(), 1);

    let tensor = &batches.batches()[0];
    for slot in n..15 {
        assert!(batches.is_padding(slot));
        assert!(tensor
            .index_axis(Axis(0), slot)
            .iter()
            .all(|&v| v == PAD_VALUE));
    }
}

#[test]
fn test_mismatched_parameters_fail_loudly() {
    let features = random_features(5, 1, 200, 8);
    let (batches, n) = batch(features.view(), &blocks(30, 15, 15, TailMode::Drop)).unwrap();

    // Chunk count computed with a different overlap.
    let other = chunk_count(200, 30, 10, TailMode::Drop).unwrap();
    assert_ne!(other, n);
    assert!(matches!(
        reconstruct(&batches, other, 15),
        Err(DspError::LayoutMismatch { .. })
    ));
    assert!(matches!(
        reconstruct(&batches, n, 10),
        Err(DspError::LayoutMismatch { .. })
    ));
}
