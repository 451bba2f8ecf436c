//! Applying an external block transform to batched windows.
//!
//! The transform sees one real window at a time, shape
//! `[channels, time_context, bins]`, and returns a window with the same
//! `time_context` and `bins`. The output channel count may differ from the
//! input (a separation model typically returns several channels per
//! source) but must be the same for every window. Padding slots are never
//! sent to the transform and stay [`PAD_VALUE`](crate::batch::PAD_VALUE).

use log::debug;
use ndarray::{s, Array3, Array4, ArrayView3, Axis};
use rayon::prelude::*;

use crate::batch::{Batches, PAD_VALUE};
use crate::error::{DspError, DspResult};

/// A per-window transform, such as a trained separation model.
pub trait BlockTransform: Sync {
    /// Transforms one window of shape `[channels, time_context, bins]`.
    fn transform(&self, window: ArrayView3<'_, f64>) -> DspResult<Array3<f64>>;
}

impl<F> BlockTransform for F
where
    F: Fn(ArrayView3<'_, f64>) -> DspResult<Array3<f64>> + Sync,
{
    fn transform(&self, window: ArrayView3<'_, f64>) -> DspResult<Array3<f64>> {
        self(window)
    }
}

/// Pins a closure to the [`BlockTransform`] signature.
///
/// Closures written inline at a call site with a generic
/// `T: BlockTransform` parameter cannot infer their argument and error
/// types; passing them through this function fixes both.
pub fn block_fn<F>(f: F) -> F
where
    F: Fn(ArrayView3<'_, f64>) -> DspResult<Array3<f64>> + Sync,
{
    f
}

/// Passes every window through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl BlockTransform for Identity {
    fn transform(&self, window: ArrayView3<'_, f64>) -> DspResult<Array3<f64>> {
        Ok(window.to_owned())
    }
}

/// Applies `transform` to every real window, one after another.
pub fn apply_transform<T: BlockTransform + ?Sized>(
    batches: &Batches,
    transform: &T,
) -> DspResult<Batches> {
    let outputs = batches
        .windows()
        .map(|window| transform.transform(window))
        .collect::<DspResult<Vec<_>>>()?;
    assemble(batches, outputs)
}

/// Applies `transform` to every real window on the rayon thread pool.
///
/// Produces the same result as [`apply_transform`]; window order is kept.
pub fn apply_transform_parallel<T: BlockTransform + ?Sized>(
    batches: &Batches,
    transform: &T,
) -> DspResult<Batches> {
    let outputs = (0..batches.chunk_count())
        .into_par_iter()
        .map(|i| batches.window(i).and_then(|window| transform.transform(window)))
        .collect::<DspResult<Vec<_>>>()?;
    assemble(batches, outputs)
}

/// Checks transformed windows and packs them back into batches with the
/// source layout.
fn assemble(batches: &Batches, outputs: Vec<Array3<f64>>) -> DspResult<Batches> {
    let layout = *batches.layout();
    if outputs.len() != layout.chunk_count {
        return Err(DspError::LayoutMismatch {
            field: "chunk_count",
            expected: layout.chunk_count,
            found: outputs.len(),
        });
    }

    let Some(first) = outputs.first() else {
        return Batches::from_parts(Vec::new(), layout);
    };
    let out_channels = first.dim().0;
    let bins = batches.input_size();
    let expected = [out_channels, layout.time_context, bins];
    if out_channels == 0 {
        return Err(DspError::transform("transform returned a window with no channels"));
    }

    let mut data: Vec<Array4<f64>> = (0..layout.num_batches())
        .map(|_| {
            Array4::from_elem(
                (layout.batch_size, out_channels, layout.time_context, bins),
                PAD_VALUE,
            )
        })
        .collect();

    for (i, window) in outputs.iter().enumerate() {
        if window.shape() != expected {
            return Err(DspError::shape(
                format!("transformed window {}", i),
                &expected,
                window.shape(),
            ));
        }
        let (b, slot) = layout.slot(i);
        data[b].index_axis_mut(Axis(0), slot).assign(window);
    }

    debug!(
        "transformed {} windows ({} -> {} channels)",
        outputs.len(),
        batches.channels(),
        out_channels
    );

    Batches::from_parts(data, layout)
}

/// Splits multi-source batches into one [`Batches`] per source.
///
/// Source `s` takes channels `s * channels_per_source .. (s + 1) * channels_per_source`.
/// Every result keeps the layout of `batches`.
pub fn split_sources(batches: &Batches, channels_per_source: usize) -> DspResult<Vec<Batches>> {
    if channels_per_source == 0 {
        return Err(DspError::invalid_param(
            "channels_per_source",
            "channels_per_source must be at least 1",
        ));
    }

    let channels = batches.channels();
    if channels % channels_per_source != 0 {
        return Err(DspError::invalid_param(
            "channels_per_source",
            format!(
                "{} channels cannot be split into groups of {}",
                channels, channels_per_source
            ),
        ));
    }

    (0..channels / channels_per_source)
        .map(|source| {
            let lo = source * channels_per_source;
            let hi = lo + channels_per_source;
            let data = batches
                .batches()
                .iter()
                .map(|b| b.slice(s![.., lo..hi, .., ..]).to_owned())
                .collect();
            Batches::from_parts(data, *batches.layout())
        })
        .collect()
}
