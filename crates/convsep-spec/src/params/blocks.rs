//! Block batching parameters.

use serde::{Deserialize, Serialize};

/// How frames past the last full window are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailMode {
    /// Only windows that end strictly before the last frame are emitted.
    /// Trailing frames that do not fill a window are not carried.
    #[default]
    Drop,
    /// One extra trailing window is emitted so every frame is carried;
    /// its missing frames are padding.
    Pad,
}

/// Parameters for slicing a spectrogram into fixed-size windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockParams {
    /// Number of consecutive frames per window.
    pub time_context: usize,
    /// Number of frames shared by two adjacent windows.
    pub overlap: usize,
    /// Number of windows per batch.
    pub batch_size: usize,
    /// Trailing-frame policy.
    #[serde(default)]
    pub tail: TailMode,
}

impl BlockParams {
    /// Default number of frames per window.
    pub const DEFAULT_TIME_CONTEXT: usize = 30;

    /// Default number of windows per batch.
    pub const DEFAULT_BATCH_SIZE: usize = 15;

    /// Frame advance between two consecutive windows.
    pub fn stride(&self) -> usize {
        self.time_context.saturating_sub(self.overlap)
    }
}

impl Default for BlockParams {
    fn default() -> Self {
        Self {
            time_context: Self::DEFAULT_TIME_CONTEXT,
            overlap: Self::DEFAULT_TIME_CONTEXT / 2,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            tail: TailMode::Drop,
        }
    }
}
