//! Overlap-add reconstruction with a linear crossfade.
//!
//! Windows are laid back down at the same start frames the batcher cut them
//! from. The first window is copied verbatim. Every later window is copied
//! verbatim after its first `overlap` frames, and those leading frames are
//! blended with what the previous window left there:
//!
//! ```text
//! out[start + k] = falling[k] * out[start + k] + rising[k] * window[k]
//! ```
//!
//! `rising[k] + falling[k] == 1` at every offset, so identical content on
//! both sides of a seam passes through unchanged.

use log::debug;
use ndarray::{s, Array3, ArrayView3, Axis};

use crate::batch::Batches;
use crate::cursor::{self, check_geometry};
use crate::error::{DspError, DspResult};

/// Builds the complementary crossfade ramps for an overlap of `overlap` frames.
///
/// `rising[k] = k / (overlap - 1)` and `falling[k] = 1 - rising[k]`. An
/// overlap of 1 yields `rising = [0.0]`, keeping the earlier window's frame.
/// An overlap of 0 yields two empty ramps.
///
/// # Example
/// ```
/// use convsep_dsp::overlap_add::crossfade_ramps;
///
/// let (rising, falling) = crossfade_ramps(3);
/// assert_eq!(rising, vec![0.0, 0.5, 1.0]);
/// assert_eq!(falling, vec![1.0, 0.5, 0.0]);
/// ```
pub fn crossfade_ramps(overlap: usize) -> (Vec<f64>, Vec<f64>) {
    let rising: Vec<f64> = match overlap {
        0 => Vec::new(),
        1 => vec![0.0],
        n => {
            let denom = (n - 1) as f64;
            (0..n).map(|k| k as f64 / denom).collect()
        }
    };
    let falling = rising.iter().map(|r| 1.0 - r).collect();
    (rising, falling)
}

/// Incremental overlap-add accumulator.
///
/// Owns the output tensor for the duration of one reconstruction. Windows
/// must be pushed in order; [`finish`](Self::finish) returns the tensor once
/// every expected window has been folded in.
#[derive(Debug)]
pub struct OverlapAdd {
    output: Array3<f64>,
    time_context: usize,
    overlap: usize,
    chunk_count: usize,
    pushed: usize,
    rising: Vec<f64>,
    falling: Vec<f64>,
}

impl OverlapAdd {
    /// Creates an accumulator for `chunk_count` windows of shape
    /// `[channels, time_context, bins]`.
    pub fn new(
        chunk_count: usize,
        channels: usize,
        time_context: usize,
        overlap: usize,
        bins: usize,
    ) -> DspResult<Self> {
        check_geometry(time_context, overlap)?;
        if chunk_count == 0 {
            return Err(DspError::NoWindows {
                message: "chunk_count is 0; the source had no more frames than time_context"
                    .to_string(),
            });
        }

        let length = cursor::output_length(chunk_count, time_context, overlap);
        let (rising, falling) = crossfade_ramps(overlap);

        Ok(Self {
            output: Array3::zeros((channels, length, bins)),
            time_context,
            overlap,
            chunk_count,
            pushed: 0,
            rising,
            falling,
        })
    }

    /// Number of windows folded in so far.
    pub fn pushed(&self) -> usize {
        self.pushed
    }

    /// Folds the next window into the output.
    pub fn push(&mut self, window: ArrayView3<'_, f64>) -> DspResult<()> {
        if self.pushed == self.chunk_count {
            return Err(DspError::LayoutMismatch {
                field: "chunk_count",
                expected: self.chunk_count,
                found: self.pushed + 1,
            });
        }

        let (channels, _, bins) = self.output.dim();
        let expected = [channels, self.time_context, bins];
        if window.shape() != expected {
            return Err(DspError::shape(
                format!("window {}", self.pushed),
                &expected,
                window.shape(),
            ));
        }
        let start = cursor::window_start(self.pushed, self.time_context, self.overlap);

        if self.pushed == 0 {
            self.output
                .slice_mut(s![.., 0..self.time_context, ..])
                .assign(&window);
        } else {
            let mut region = self
                .output
                .slice_mut(s![.., start..start + self.overlap, ..]);
            for (k, (&rise, &fall)) in self.rising.iter().zip(self.falling.iter()).enumerate() {
                region
                    .index_axis_mut(Axis(1), k)
                    .zip_mut_with(&window.index_axis(Axis(1), k), |out, &cur| {
                        *out = fall * *out + rise * cur;
                    });
            }

            self.output
                .slice_mut(s![.., start + self.overlap..start + self.time_context, ..])
                .assign(&window.slice(s![.., self.overlap.., ..]));
        }

        self.pushed += 1;
        Ok(())
    }

    /// Returns the reconstructed tensor, shape
    /// `[channels, chunk_count * (time_context - overlap) + time_context, bins]`.
    pub fn finish(self) -> DspResult<Array3<f64>> {
        if self.pushed != self.chunk_count {
            return Err(DspError::LayoutMismatch {
                field: "chunk_count",
                expected: self.chunk_count,
                found: self.pushed,
            });
        }
        Ok(self.output)
    }
}

/// Reconstructs a continuous feature tensor from batched windows.
///
/// `chunk_count` and `overlap` must match the values the batches were cut
/// with; any disagreement with the recorded layout is reported as
/// [`DspError::LayoutMismatch`] instead of producing a misaligned result.
///
/// # Returns
/// Tensor of shape `[channels, chunk_count * (time_context - overlap) + time_context, bins]`.
/// Frames past the last window's end are zero.
pub fn reconstruct(
    batches: &Batches,
    chunk_count: usize,
    overlap: usize,
) -> DspResult<Array3<f64>> {
    let layout = batches.layout();

    if chunk_count == 0 {
        return Err(DspError::NoWindows {
            message: "chunk_count is 0; the source had no more frames than time_context"
                .to_string(),
        });
    }
    if chunk_count != layout.chunk_count {
        return Err(DspError::LayoutMismatch {
            field: "chunk_count",
            expected: layout.chunk_count,
            found: chunk_count,
        });
    }
    if overlap != layout.overlap {
        return Err(DspError::LayoutMismatch {
            field: "overlap",
            expected: layout.overlap,
            found: overlap,
        });
    }
    if batches.num_batches() != layout.num_batches() {
        return Err(DspError::LayoutMismatch {
            field: "num_batches",
            expected: layout.num_batches(),
            found: batches.num_batches(),
        });
    }

    let mut acc = OverlapAdd::new(
        chunk_count,
        batches.channels(),
        layout.time_context,
        overlap,
        batches.input_size(),
    )?;
    for window in batches.windows() {
        acc.push(window)?;
    }

    debug!(
        "reconstructed {} windows into {} frames",
        chunk_count,
        layout.output_length()
    );

    acc.finish()
}
