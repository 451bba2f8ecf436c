//! ConvSep End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the framing and reconstruction
//! flows:
//!
//! - Round trip: signal -> spectrogram -> windows -> spectrogram
//! - Separation: signal -> per-source estimates through a block transform
//! - **Determinism**: identical output across runs and between the serial
//!   and parallel transform paths
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p convsep-tests
//! ```
//!
//! ## Determinism Testing
//!
//! The `determinism` module hashes `f64` tensors bit for bit:
//!
//! ```rust,ignore
//! use convsep_tests::determinism::verify_determinism;
//!
//! let result = verify_determinism(|| reconstruct_fixture(), 3);
//! result.assert_deterministic();
//! ```

pub mod analysis;
pub mod determinism;
pub mod fixtures;

// Re-export commonly used items
pub use analysis::{covered_error, max_abs_diff, max_sample_diff};
pub use determinism::{
    compute_hash, f64_bytes, verify_determinism, verify_hash_determinism, DeterminismResult,
    DiffInfo,
};
pub use fixtures::{create_rng, random_spectrogram, stereo_mixture, tone};
