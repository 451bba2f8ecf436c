//! End-to-end separation pass.
//!
//! ```text
//! channels -> analyze -> [normalize] -> batch -> transform
//!          -> split per source -> reconstruct -> SourceEstimate
//! ```
//!
//! The block transform stands in for a trained model. Its output channels
//! are grouped per source according to the configured [`SourceLayout`].
//!
//! [`SourceLayout`]: convsep_spec::SourceLayout

use log::{debug, info};
use ndarray::{s, Array2, Array3, Axis, Zip};
use rustfft::num_complex::Complex64;

use convsep_spec::PipelineConfig;

use crate::batch::batch;
use crate::error::{DspError, DspResult};
use crate::istft::synthesize;
use crate::normalize::{normalize, StatsStore};
use crate::overlap_add::reconstruct;
use crate::stft::{analyze_with, check_channels, Stft};
use crate::transform::{apply_transform, apply_transform_parallel, split_sources, BlockTransform};
use crate::window::window;

/// Complex spectrograms of every input channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Mixture {
    /// One spectrogram per channel.
    pub stfts: Vec<Stft>,
}

impl Mixture {
    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.stfts.len()
    }

    /// Number of frames per channel.
    pub fn num_frames(&self) -> usize {
        self.stfts.first().map_or(0, Stft::num_frames)
    }

    /// Magnitude feature tensor, shape `[channels, frames, bins]`.
    pub fn magnitudes(&self) -> Array3<f64> {
        let frames = self.num_frames();
        let bins = self.stfts.first().map_or(0, Stft::num_bins);
        let mut out = Array3::zeros((self.channels(), frames, bins));
        for (mut plane, stft) in out.axis_iter_mut(Axis(0)).zip(self.stfts.iter()) {
            plane.assign(&stft.magnitude());
        }
        out
    }
}

/// Estimated magnitudes of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEstimate {
    /// Source name from the configured layout.
    pub name: String,
    /// Reconstructed magnitudes, shape `[channels, frames, bins]`.
    pub magnitudes: Array3<f64>,
}

/// Runs separation passes for one configuration.
#[derive(Debug, Clone)]
pub struct Separator {
    config: PipelineConfig,
    stats: StatsStore,
    parallel: bool,
}

impl Separator {
    /// Creates a separator, validating the configuration.
    pub fn new(config: PipelineConfig) -> DspResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stats: StatsStore::default(),
            parallel: false,
        })
    }

    /// Sets the statistics used for input normalization.
    pub fn with_stats(mut self, stats: StatsStore) -> Self {
        self.stats = stats;
        self
    }

    /// Runs the block transform on the rayon thread pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Computes the spectrogram of every channel.
    pub fn analyze(&self, channels: &[&[f64]]) -> DspResult<Mixture> {
        check_channels(channels)?;
        let stfts = channels
            .iter()
            .map(|channel| analyze_with(channel, &self.config.stft))
            .collect::<DspResult<Vec<_>>>()?;
        Ok(Mixture { stfts })
    }

    /// Separates a multi-channel signal into per-source magnitude estimates.
    pub fn separate<T: BlockTransform + ?Sized>(
        &self,
        channels: &[&[f64]],
        transform: &T,
    ) -> DspResult<Vec<SourceEstimate>> {
        let mixture = self.analyze(channels)?;
        self.separate_features(&mixture.magnitudes(), transform)
    }

    /// Separates a precomputed feature tensor `[channels, frames, bins]`.
    pub fn separate_features<T: BlockTransform + ?Sized>(
        &self,
        features: &Array3<f64>,
        transform: &T,
    ) -> DspResult<Vec<SourceEstimate>> {
        let blocks = &self.config.blocks;
        let layout = &self.config.sources;

        let scaled;
        let features = match &self.config.input_norm {
            Some(norm) => {
                debug!("normalizing input features with '{}' ({})", norm.feature, norm.mode);
                scaled = normalize(features, &self.stats, norm)?;
                &scaled
            }
            None => features,
        };

        let (batches, chunk_count) = batch(features.view(), blocks)?;
        if chunk_count == 0 {
            return Err(DspError::NoWindows {
                message: format!(
                    "{} frames do not exceed time_context {}",
                    features.dim().1,
                    blocks.time_context
                ),
            });
        }

        let output = if self.parallel {
            apply_transform_parallel(&batches, transform)?
        } else {
            apply_transform(&batches, transform)?
        };
        if output.channels() != layout.total_channels() {
            return Err(DspError::shape(
                "transform output channels",
                &[layout.total_channels()],
                &[output.channels()],
            ));
        }

        let per_source = split_sources(&output, layout.channels_per_source)?;
        let estimates = layout
            .names
            .iter()
            .zip(per_source.iter())
            .map(|(name, source)| {
                Ok(SourceEstimate {
                    name: name.clone(),
                    magnitudes: reconstruct(source, chunk_count, blocks.overlap)?,
                })
            })
            .collect::<DspResult<Vec<_>>>()?;

        info!(
            "separated {} frames into {} sources ({} windows)",
            features.dim().1,
            estimates.len(),
            chunk_count
        );

        Ok(estimates)
    }

    /// Converts an estimate back to samples using the mixture's phase.
    ///
    /// Estimated frames past the mixture's length are dropped, and mixture
    /// frames the estimate does not reach are silent. Returns one sample
    /// vector per channel.
    pub fn resynthesize(
        &self,
        estimate: &SourceEstimate,
        mixture: &Mixture,
    ) -> DspResult<Vec<Vec<f64>>> {
        let (channels, est_frames, bins) = estimate.magnitudes.dim();
        if channels != mixture.channels() {
            return Err(DspError::shape(
                format!("source '{}' channels", estimate.name),
                &[mixture.channels()],
                &[channels],
            ));
        }

        let coefficients = window(self.config.stft.window, self.config.stft.window_length)?;
        let frames = est_frames.min(mixture.num_frames());

        estimate
            .magnitudes
            .axis_iter(Axis(0))
            .zip(mixture.stfts.iter())
            .map(|(magnitude, mix)| {
                if mix.num_bins() != bins {
                    return Err(DspError::shape(
                        format!("source '{}' bins", estimate.name),
                        &[mix.num_bins()],
                        &[bins],
                    ));
                }
                let mut data = Array2::<Complex64>::zeros(mix.data.raw_dim());
                data.slice_mut(s![0..frames, ..]).assign(
                    &Zip::from(magnitude.slice(s![0..frames, ..]))
                        .and(mix.data.slice(s![0..frames, ..]))
                        .map_collect(|&m, c| Complex64::from_polar(m, c.arg())),
                );
                let stft = Stft {
                    data,
                    ..mix.clone()
                };
                synthesize(&stft, &coefficients)
            })
            .collect()
    }
}
