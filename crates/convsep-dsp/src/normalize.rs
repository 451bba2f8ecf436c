//! Feature scaling with externally supplied statistics.
//!
//! Statistics are stored per feature name and hold one value per bin. They
//! broadcast along the last axis of the scaled array, so the same stats
//! apply to a `[frames, bins]` spectrogram or a
//! `[channels, frames, bins]` feature tensor.

use std::collections::BTreeMap;
use std::path::Path;

use ndarray::{Array, ArrayBase, Axis, Data, Dimension};
use serde::{Deserialize, Serialize};

use convsep_spec::{ConfigError, NormMode, NormParams};

use crate::error::{DspError, DspResult};

/// Per-bin statistics for one feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormStats {
    /// Per-bin minimum, used by `max_min`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimus: Option<Vec<f64>>,
    /// Per-bin maximum, used by `max_min`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximus: Option<Vec<f64>>,
    /// Per-bin mean, used by `mean`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub means: Option<Vec<f64>>,
    /// Per-bin standard deviation, used by `mean`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stds: Option<Vec<f64>>,
}

impl NormStats {
    /// Statistics for `max_min` scaling.
    pub fn max_min(minimus: Vec<f64>, maximus: Vec<f64>) -> Self {
        Self {
            minimus: Some(minimus),
            maximus: Some(maximus),
            ..Default::default()
        }
    }

    /// Statistics for `mean` scaling.
    pub fn mean(means: Vec<f64>, stds: Vec<f64>) -> Self {
        Self {
            means: Some(means),
            stds: Some(stds),
            ..Default::default()
        }
    }

    fn require<'a>(
        field: &'a Option<Vec<f64>>,
        feature: &str,
        name: &'static str,
    ) -> DspResult<&'a [f64]> {
        field.as_deref().ok_or_else(|| DspError::MissingStats {
            feature: feature.to_string(),
            field: name,
        })
    }
}

/// Statistics for every known feature, keyed by feature name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsStore {
    features: BTreeMap<String, NormStats>,
}

impl StatsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds statistics for `feature`, replacing any previous entry.
    pub fn with(mut self, feature: impl Into<String>, stats: NormStats) -> Self {
        self.insert(feature, stats);
        self
    }

    /// Inserts statistics for `feature`, returning the previous entry.
    pub fn insert(&mut self, feature: impl Into<String>, stats: NormStats) -> Option<NormStats> {
        self.features.insert(feature.into(), stats)
    }

    /// Looks up the statistics for `feature`.
    pub fn get(&self, feature: &str) -> DspResult<&NormStats> {
        self.features
            .get(feature)
            .ok_or_else(|| DspError::MissingStats {
                feature: feature.to_string(),
                field: "*",
            })
    }

    /// Returns true if the store has statistics for `feature`.
    pub fn contains(&self, feature: &str) -> bool {
        self.features.contains_key(feature)
    }

    /// Feature names in sorted order.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Parses a store from JSON of the form
    /// `{"feature": {"minimus": [...], "maximus": [...]}}`.
    pub fn from_json_str(json: &str) -> DspResult<Self> {
        serde_json::from_str(json).map_err(|e| DspError::Config(ConfigError::from(e)))
    }

    /// Loads a store from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> DspResult<Self> {
        let json =
            std::fs::read_to_string(path.as_ref()).map_err(|e| DspError::Config(e.into()))?;
        Self::from_json_str(&json)
    }
}

/// Scales `values` with the statistics stored for `params.feature`.
///
/// * `max_min`: `(x - min) / (max - min)`
/// * `mean`: `(x - mean) / std`
/// * `clip`: clamp into `[0, 1]` (no statistics needed)
///
/// # Errors
/// [`DspError::MissingStats`] if the feature or a statistic the mode needs
/// is absent, [`DspError::ShapeMismatch`] if a statistic's length differs
/// from the last axis, and [`DspError::InvalidStats`] if a denominator is
/// zero.
pub fn normalize<S, D>(
    values: &ArrayBase<S, D>,
    store: &StatsStore,
    params: &NormParams,
) -> DspResult<Array<f64, D>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let feature = params.feature.as_str();
    match params.mode {
        NormMode::Clip => Ok(values.mapv(|v| v.clamp(0.0, 1.0))),
        NormMode::MaxMin => {
            let stats = store.get(feature)?;
            let minimus = NormStats::require(&stats.minimus, feature, "minimus")?;
            let maximus = NormStats::require(&stats.maximus, feature, "maximus")?;
            let range = ranges(minimus, maximus)?;
            check_denominator(&range, feature, "maximus - minimus")?;
            along_last_axis(values, minimus, &range, |x, lo, r| (x - lo) / r)
        }
        NormMode::Mean => {
            let stats = store.get(feature)?;
            let means = NormStats::require(&stats.means, feature, "means")?;
            let stds = NormStats::require(&stats.stds, feature, "stds")?;
            check_denominator(stds, feature, "stds")?;
            along_last_axis(values, means, stds, |x, mean, std| (x - mean) / std)
        }
    }
}

/// Inverts [`normalize`] for `max_min` and `mean`.
///
/// # Errors
/// [`DspError::UnsupportedOperation`] for `clip`, which discards
/// information. Otherwise the same errors as [`normalize`], except that a
/// zero range is accepted.
pub fn denormalize<S, D>(
    values: &ArrayBase<S, D>,
    store: &StatsStore,
    params: &NormParams,
) -> DspResult<Array<f64, D>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let feature = params.feature.as_str();
    match params.mode {
        NormMode::Clip => Err(DspError::UnsupportedOperation {
            message: format!(
                "'{}' normalization of feature '{}' cannot be inverted",
                params.mode, feature
            ),
        }),
        NormMode::MaxMin => {
            let stats = store.get(feature)?;
            let minimus = NormStats::require(&stats.minimus, feature, "minimus")?;
            let maximus = NormStats::require(&stats.maximus, feature, "maximus")?;
            let range = ranges(minimus, maximus)?;
            along_last_axis(values, minimus, &range, |y, lo, r| y * r + lo)
        }
        NormMode::Mean => {
            let stats = store.get(feature)?;
            let means = NormStats::require(&stats.means, feature, "means")?;
            let stds = NormStats::require(&stats.stds, feature, "stds")?;
            along_last_axis(values, means, stds, |y, mean, std| y * std + mean)
        }
    }
}

fn ranges(minimus: &[f64], maximus: &[f64]) -> DspResult<Vec<f64>> {
    if minimus.len() != maximus.len() {
        return Err(DspError::shape(
            "maximus",
            &[minimus.len()],
            &[maximus.len()],
        ));
    }
    Ok(maximus
        .iter()
        .zip(minimus.iter())
        .map(|(hi, lo)| hi - lo)
        .collect())
}

fn check_denominator(values: &[f64], feature: &str, what: &str) -> DspResult<()> {
    match values.iter().position(|&v| v == 0.0) {
        Some(bin) => Err(DspError::InvalidStats {
            message: format!("{} is zero at bin {} for feature '{}'", what, bin, feature),
        }),
        None => Ok(()),
    }
}

/// Applies `f(x, a[k], b[k])` to every element whose last-axis index is `k`.
fn along_last_axis<S, D, F>(
    values: &ArrayBase<S, D>,
    a: &[f64],
    b: &[f64],
    f: F,
) -> DspResult<Array<f64, D>>
where
    S: Data<Elem = f64>,
    D: Dimension,
    F: Fn(f64, f64, f64) -> f64,
{
    let ndim = values.ndim();
    if ndim == 0 {
        return Err(DspError::shape("normalized values", &[a.len()], &[]));
    }
    let last = values.shape()[ndim - 1];
    for stat in [a, b] {
        if stat.len() != last {
            return Err(DspError::shape("statistics", &[last], &[stat.len()]));
        }
    }

    let mut out = values.to_owned();
    for mut lane in out.lanes_mut(Axis(ndim - 1)) {
        for ((x, &p), &q) in lane.iter_mut().zip(a.iter()).zip(b.iter()) {
            *x = f(*x, p, q);
        }
    }
    Ok(out)
}
