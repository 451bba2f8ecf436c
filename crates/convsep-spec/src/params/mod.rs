//! Parameter types for every processing stage.

pub mod blocks;
pub mod norm;
pub mod sources;
pub mod stft;

pub use blocks::{BlockParams, TailMode};
pub use norm::{NormMode, NormParams};
pub use sources::SourceLayout;
pub use stft::{StftParams, WindowKind};
