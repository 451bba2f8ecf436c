//! ConvSep Numeric Core
//!
//! This crate implements the framing and reconstruction machinery of a
//! block-based source separation system:
//! - spectral analysis and synthesis of sample sequences
//! - slicing a spectrogram into fixed-length overlapping windows
//! - stitching independently processed windows back together
//!
//! # Overview
//!
//! ```text
//! samples -> analyze -> spectrogram -> batch -> windows
//!         -> [block transform] -> reconstruct -> spectrogram
//! ```
//!
//! Batching and reconstruction share a single window cursor (see
//! [`cursor`]), and every [`Batches`] value records the layout it was cut
//! with, so a parameter mismatch between the two stages is reported as
//! [`DspError::LayoutMismatch`] rather than producing misaligned output.
//!
//! # Determinism
//!
//! Every operation is a pure function of its inputs. The parallel block
//! transform preserves window order and produces the same result as the
//! serial one.
//!
//! # Example
//!
//! ```
//! use convsep_dsp::{analyze, batch, reconstruct, window};
//! use convsep_spec::{BlockParams, TailMode, WindowKind};
//!
//! let signal: Vec<f64> = (0..16000).map(|i| (i as f64 * 0.01).sin()).collect();
//! let w = window(WindowKind::Hanning, 1024).unwrap();
//! let stft = analyze(&signal, &w, 256, 1024, 44100.0).unwrap();
//!
//! let features = stft.magnitude().insert_axis(ndarray::Axis(0));
//! let params = BlockParams { time_context: 30, overlap: 15, batch_size: 15, tail: TailMode::Drop };
//! let (batches, chunk_count) = batch(features.view(), &params).unwrap();
//!
//! let rebuilt = reconstruct(&batches, chunk_count, params.overlap).unwrap();
//! assert_eq!(rebuilt.dim().1, batches.layout().output_length());
//! ```
//!
//! # Crate Structure
//!
//! - [`stft`] - Frame analysis (short-time Fourier transform)
//! - [`istft`] - Frame synthesis (weighted overlap-add)
//! - [`window`] - Analysis window functions
//! - [`cursor`] - Window start positions shared by batching and reconstruction
//! - [`batch`] - Block batching
//! - [`overlap_add`] - Crossfaded overlap-add reconstruction
//! - [`transform`] - Applying a block transform to batched windows
//! - [`normalize`] - Feature scaling with stored statistics
//! - [`pipeline`] - End-to-end separation pass

pub mod batch;
pub mod cursor;
pub mod error;
pub mod istft;
pub mod normalize;
pub mod overlap_add;
pub mod pipeline;
pub mod stft;
pub mod transform;
pub mod window;

// Re-export main types at crate root
pub use batch::{batch, batch_frames, Batches, BlockLayout, PAD_VALUE};
pub use cursor::{chunk_count, window_starts};
pub use error::{DspError, DspResult};
pub use istft::synthesize;
pub use normalize::{denormalize, normalize, NormStats, StatsStore};
pub use overlap_add::{crossfade_ramps, reconstruct, OverlapAdd};
pub use pipeline::{Mixture, Separator, SourceEstimate};
pub use stft::{analyze, analyze_channels, analyze_with, expected_frame_count, Stft};
pub use transform::{
    apply_transform, apply_transform_parallel, block_fn, split_sources, BlockTransform, Identity,
};
pub use window::window;
