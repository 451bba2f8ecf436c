//! Block batching: slicing a feature tensor into fixed-size windows.
//!
//! A feature tensor of shape `[channels, frames, bins]` is cut into windows
//! of `time_context` frames advancing by `time_context - overlap`. Windows
//! are grouped into batches of shape
//! `[batch_size, channels, time_context, bins]`. Slots not filled by a real
//! window, and frames past the end of the source in a padded trailing
//! window, hold [`PAD_VALUE`].

use log::{debug, warn};
use ndarray::{s, Array4, ArrayView2, ArrayView3, Axis};

use convsep_spec::{BlockParams, TailMode};

use crate::cursor::{self, check_geometry};
use crate::error::{DspError, DspResult};

/// Fill value for padding slots and frames.
///
/// Never exactly zero so downstream log or ratio operations stay finite.
pub const PAD_VALUE: f64 = 1e-10;

/// Window geometry recorded when a feature tensor is batched.
///
/// Reconstruction checks its arguments against this record so a parameter
/// mismatch between the two stages is an error instead of a misaligned
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    /// Frames in the source tensor.
    pub total_frames: usize,
    /// Frames per window.
    pub time_context: usize,
    /// Frames shared by adjacent windows.
    pub overlap: usize,
    /// Windows per batch.
    pub batch_size: usize,
    /// Trailing-frame policy.
    pub tail: TailMode,
    /// Number of real (non-padding) windows.
    pub chunk_count: usize,
}

impl BlockLayout {
    /// Computes the layout for a source of `total_frames` frames.
    pub fn new(total_frames: usize, params: &BlockParams) -> DspResult<Self> {
        check_geometry(params.time_context, params.overlap)?;
        if params.batch_size == 0 {
            return Err(DspError::invalid_param(
                "batch_size",
                "batch_size must be at least 1",
            ));
        }

        let chunk_count = cursor::chunk_count(
            total_frames,
            params.time_context,
            params.overlap,
            params.tail,
        )?;

        Ok(Self {
            total_frames,
            time_context: params.time_context,
            overlap: params.overlap,
            batch_size: params.batch_size,
            tail: params.tail,
            chunk_count,
        })
    }

    /// Checks that a layout assembled by hand is one [`BlockLayout::new`]
    /// could have produced.
    pub fn validate(&self) -> DspResult<()> {
        let rebuilt = Self::new(self.total_frames, &self.params())?;
        if rebuilt.chunk_count != self.chunk_count {
            return Err(DspError::LayoutMismatch {
                field: "chunk_count",
                expected: rebuilt.chunk_count,
                found: self.chunk_count,
            });
        }
        Ok(())
    }

    /// Frame advance between consecutive windows.
    pub fn stride(&self) -> usize {
        self.time_context - self.overlap
    }

    /// Number of batches needed to hold every window.
    pub fn num_batches(&self) -> usize {
        self.chunk_count.div_ceil(self.batch_size)
    }

    /// Number of window slots across all batches, padding included.
    pub fn capacity(&self) -> usize {
        self.num_batches() * self.batch_size
    }

    /// Start frame of every real window.
    pub fn starts(&self) -> Vec<usize> {
        (0..self.chunk_count)
            .map(|i| cursor::window_start(i, self.time_context, self.overlap))
            .collect()
    }

    /// Batch index and slot of window `index`.
    pub fn slot(&self, index: usize) -> (usize, usize) {
        (index / self.batch_size, index % self.batch_size)
    }

    /// Length of the reconstructed tensor along the frame axis.
    pub fn output_length(&self) -> usize {
        cursor::output_length(self.chunk_count, self.time_context, self.overlap)
    }

    /// Number of leading source frames carried by at least one window.
    pub fn covered_frames(&self) -> usize {
        match self.chunk_count {
            0 => 0,
            n => {
                let last = cursor::window_start(n - 1, self.time_context, self.overlap);
                (last + self.time_context).min(self.total_frames)
            }
        }
    }

    /// Block parameters equivalent to this layout.
    pub fn params(&self) -> BlockParams {
        BlockParams {
            time_context: self.time_context,
            overlap: self.overlap,
            batch_size: self.batch_size,
            tail: self.tail,
        }
    }
}

/// Batched windows together with the layout that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Batches {
    data: Vec<Array4<f64>>,
    layout: BlockLayout,
}

impl Batches {
    /// Assembles batches from raw tensors, checking them against `layout`.
    ///
    /// Every tensor must have shape `[batch_size, channels, time_context, bins]`
    /// with the same `channels` and `bins`, and there must be exactly
    /// `layout.num_batches()` of them. The layout itself must match what
    /// [`BlockLayout::new`] computes for its frame count and parameters.
    pub fn from_parts(data: Vec<Array4<f64>>, layout: BlockLayout) -> DspResult<Self> {
        layout.validate()?;
        if data.len() != layout.num_batches() {
            return Err(DspError::LayoutMismatch {
                field: "num_batches",
                expected: layout.num_batches(),
                found: data.len(),
            });
        }

        if let Some(first) = data.first() {
            let (_, channels, _, bins) = first.dim();
            let expected = [layout.batch_size, channels, layout.time_context, bins];
            for (i, tensor) in data.iter().enumerate() {
                if tensor.shape() != expected {
                    return Err(DspError::shape(
                        format!("batch {}", i),
                        &expected,
                        tensor.shape(),
                    ));
                }
            }
        }

        Ok(Self { data, layout })
    }

    /// Splits into raw tensors and layout.
    pub fn into_parts(self) -> (Vec<Array4<f64>>, BlockLayout) {
        (self.data, self.layout)
    }

    /// Batch tensors, each `[batch_size, channels, time_context, bins]`.
    pub fn batches(&self) -> &[Array4<f64>] {
        &self.data
    }

    /// The recorded window layout.
    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    /// Number of batches.
    pub fn num_batches(&self) -> usize {
        self.data.len()
    }

    /// Number of real windows.
    pub fn chunk_count(&self) -> usize {
        self.layout.chunk_count
    }

    /// Channels per window (0 when there are no batches).
    pub fn channels(&self) -> usize {
        self.data.first().map_or(0, |b| b.dim().1)
    }

    /// Bins per frame (0 when there are no batches).
    pub fn input_size(&self) -> usize {
        self.data.first().map_or(0, |b| b.dim().3)
    }

    /// Returns true if slot `index` holds padding rather than a real window.
    pub fn is_padding(&self, index: usize) -> bool {
        index >= self.layout.chunk_count
    }

    /// View of real window `index`, shape `[channels, time_context, bins]`.
    pub fn window(&self, index: usize) -> DspResult<ArrayView3<'_, f64>> {
        if index >= self.layout.chunk_count {
            return Err(DspError::invalid_param(
                "index",
                format!(
                    "window {} out of range ({} windows)",
                    index, self.layout.chunk_count
                ),
            ));
        }
        let (b, slot) = self.layout.slot(index);
        Ok(self.data[b].index_axis(Axis(0), slot))
    }

    /// Iterates over the real windows in order.
    pub fn windows(&self) -> impl Iterator<Item = ArrayView3<'_, f64>> + '_ {
        (0..self.layout.chunk_count).map(move |i| {
            let (b, slot) = self.layout.slot(i);
            self.data[b].index_axis(Axis(0), slot)
        })
    }
}

/// Slices a feature tensor into batched windows.
///
/// # Arguments
/// * `features` - Tensor of shape `[channels, frames, bins]`
/// * `params` - Window geometry and batch size
///
/// # Returns
/// The batches and the number of real windows (`chunk_count`). When the
/// source has no more frames than `time_context` there are no windows and
/// no batches; reconstruction rejects that case.
pub fn batch(
    features: ArrayView3<'_, f64>,
    params: &BlockParams,
) -> DspResult<(Batches, usize)> {
    let (channels, total_frames, bins) = features.dim();
    if channels == 0 || bins == 0 {
        return Err(DspError::invalid_param(
            "features",
            format!(
                "feature tensor needs at least one channel and one bin, got shape {:?}",
                features.shape()
            ),
        ));
    }

    let layout = BlockLayout::new(total_frames, params)?;
    let starts = cursor::window_starts(
        total_frames,
        params.time_context,
        params.overlap,
        params.tail,
    )?;

    let mut data: Vec<Array4<f64>> = (0..layout.num_batches())
        .map(|_| {
            Array4::from_elem(
                (layout.batch_size, channels, layout.time_context, bins),
                PAD_VALUE,
            )
        })
        .collect();

    for (i, &start) in starts.iter().enumerate() {
        let (b, slot) = layout.slot(i);
        let end = (start + layout.time_context).min(total_frames);
        data[b]
            .slice_mut(s![slot, .., 0..end - start, ..])
            .assign(&features.slice(s![.., start..end, ..]));
    }

    debug!(
        "batched {} frames into {} windows across {} batches (time_context {}, overlap {}, batch_size {})",
        total_frames,
        layout.chunk_count,
        data.len(),
        layout.time_context,
        layout.overlap,
        layout.batch_size
    );
    if layout.tail == TailMode::Drop && layout.covered_frames() < total_frames {
        warn!(
            "{} trailing frames are not carried by any window",
            total_frames - layout.covered_frames()
        );
    }

    let chunk_count = layout.chunk_count;
    Ok((Batches { data, layout }, chunk_count))
}

/// Batches a single-channel spectrogram of shape `[frames, bins]`.
pub fn batch_frames(
    frames: ArrayView2<'_, f64>,
    params: &BlockParams,
) -> DspResult<(Batches, usize)> {
    batch(frames.insert_axis(Axis(0)), params)
}

/// Builds a feature tensor filled with a per-frame ramp, handy for tracing
/// where each frame ends up.
#[cfg(test)]
pub(crate) fn frame_ramp(channels: usize, frames: usize, bins: usize) -> ndarray::Array3<f64> {
    ndarray::Array3::from_shape_fn((channels, frames, bins), |(c, t, k)| {
        1.0 + t as f64 + 1000.0 * c as f64 + 0.001 * k as f64
    })
}
