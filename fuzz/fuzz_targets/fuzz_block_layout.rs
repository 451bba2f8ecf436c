#![no_main]

use convsep_dsp::{batch, chunk_count, reconstruct, window_starts};
use convsep_spec::{BlockParams, TailMode};
use libfuzzer_sys::fuzz_target;
use ndarray::Array3;

fuzz_target!(|data: &[u8]| {
    if data.len() < 5 {
        return;
    }
    let total = data[0] as usize * 4 + data[1] as usize % 4;
    let time_context = data[2] as usize % 64;
    let overlap = data[3] as usize % 64;
    let tail = if data[4] & 1 == 0 {
        TailMode::Drop
    } else {
        TailMode::Pad
    };

    let starts = window_starts(total, time_context, overlap, tail);
    let count = chunk_count(total, time_context, overlap, tail);
    match (starts, count) {
        (Ok(starts), Ok(count)) => assert_eq!(starts.len(), count),
        (Err(_), Err(_)) => return,
        _ => panic!("cursor and closed form disagree on validity"),
    }

    let features = Array3::from_shape_fn((1, total, 2), |(_, t, k)| (t * 2 + k) as f64);
    let params = BlockParams {
        time_context,
        overlap,
        batch_size: (data[4] as usize >> 1) % 8 + 1,
        tail,
    };
    if let Ok((batches, n)) = batch(features.view(), &params) {
        if n > 0 {
            let out = reconstruct(&batches, n, overlap).expect("matching layout reconstructs");
            let covered = batches.layout().covered_frames();
            for t in 0..covered {
                assert!((out[[0, t, 0]] - features[[0, t, 0]]).abs() < 1e-9);
            }
        }
    }
});
