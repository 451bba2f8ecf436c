//! Output source layout of a block transform.

use serde::{Deserialize, Serialize};

/// Describes how a transform's output channels map onto named sources.
///
/// Output channels are grouped contiguously: source `k` owns channels
/// `[k * channels_per_source, (k + 1) * channels_per_source)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLayout {
    /// Source names, in output channel order.
    pub names: Vec<String>,
    /// Channels owned by each source (2 for stereo).
    pub channels_per_source: usize,
}

impl SourceLayout {
    /// Total number of output channels the transform must produce.
    pub fn total_channels(&self) -> usize {
        self.names.len() * self.channels_per_source
    }
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            names: ["voice", "drums", "bass", "other"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            channels_per_source: 2,
        }
    }
}
