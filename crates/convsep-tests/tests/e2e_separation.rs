//! End-to-end separation through a stand-in block transform.

use convsep_dsp::{block_fn, normalize, DspError, NormStats, Separator, SourceEstimate, StatsStore};
use convsep_spec::{BlockParams, NormMode, NormParams, PipelineConfig, TailMode};
use convsep_tests::{max_sample_diff, stereo_mixture};
use ndarray::{s, Array3, ArrayView3};
use pretty_assertions::assert_eq;
use std::io::Write;

/// Four stereo sources, each a quarter of the mixture magnitude.
fn quarter_mask(window: ArrayView3<'_, f64>) -> convsep_dsp::DspResult<Array3<f64>> {
    let (c, t, k) = window.dim();
    let mut out = Array3::zeros((4 * c, t, k));
    for source in 0..4 {
        out.slice_mut(s![source * c..(source + 1) * c, .., ..])
            .assign(&window.mapv(|v| v * 0.25));
    }
    Ok(out)
}

fn config() -> PipelineConfig {
    PipelineConfig::builder()
        .sample_rate(22050.0)
        .blocks(BlockParams {
            time_context: 30,
            overlap: 15,
            batch_size: 15,
            tail: TailMode::Pad,
        })
        .build()
}

fn sum_sources(estimates: &[SourceEstimate]) -> Array3<f64> {
    let mut total = Array3::zeros(estimates[0].magnitudes.raw_dim());
    for est in estimates {
        total += &est.magnitudes;
    }
    total
}

#[test]
fn test_default_layout_separates_four_stereo_sources() {
    let [left, right] = stereo_mixture(1, 22050.0, 2.0);
    let channels = [left.as_slice(), right.as_slice()];
    let separator = Separator::new(config()).unwrap();
    let estimates = separator.separate(&channels, &quarter_mask).unwrap();

    let names: Vec<&str> = estimates.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["voice", "drums", "bass", "other"]);
    for est in &estimates {
        assert_eq!(est.magnitudes.dim().0, 2);
        assert_eq!(est.magnitudes.dim().2, 513);
    }

    let mixture = separator.analyze(&channels).unwrap();
    let mags = mixture.magnitudes();
    let frames = mags.dim().1;
    let total = sum_sources(&estimates);
    let err = convsep_tests::covered_error(&total, &mags, frames);
    assert!(err < 1e-9, "max error {}", err);
}

#[test]
fn test_recombined_sources_resynthesize_to_mixture() {
    let [left, right] = stereo_mixture(2, 22050.0, 1.0);
    let channels = [left.as_slice(), right.as_slice()];
    let separator = Separator::new(config()).unwrap().with_parallel(true);
    let estimates = separator.separate(&channels, &quarter_mask).unwrap();
    let mixture = separator.analyze(&channels).unwrap();

    let full = SourceEstimate {
        name: "sum".to_string(),
        magnitudes: sum_sources(&estimates),
    };
    let rebuilt = separator.resynthesize(&full, &mixture).unwrap();
    assert_eq!(rebuilt.len(), 2);
    assert!(max_sample_diff(&rebuilt[0], &left) < 1e-6);
    assert!(max_sample_diff(&rebuilt[1], &right) < 1e-6);
}

#[test]
fn test_input_normalization_from_stats_file() {
    let [left, right] = stereo_mixture(3, 22050.0, 1.0);
    let channels = [left.as_slice(), right.as_slice()];
    let mut cfg = config();
    cfg.input_norm = Some(NormParams {
        mode: NormMode::MaxMin,
        feature: "mix_stft".to_string(),
    });

    let store = StatsStore::new().with(
        "mix_stft",
        NormStats::max_min(vec![0.0; 513], vec![2.0; 513]),
    );
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&store).unwrap().as_bytes())
        .unwrap();
    let loaded = StatsStore::from_path(file.path()).unwrap();

    let separator = Separator::new(cfg.clone()).unwrap().with_stats(loaded);
    let identity_sources = block_fn(|w| {
        let (c, t, k) = w.dim();
        let mut out = Array3::zeros((4 * c, t, k));
        out.slice_mut(s![0..c, .., ..]).assign(&w);
        Ok(out)
    });
    let estimates = separator.separate(&channels, &identity_sources).unwrap();

    // The voice estimate carries the normalized mixture.
    let mixture = separator.analyze(&channels).unwrap();
    let norm = cfg.input_norm.as_ref().unwrap();
    let expected = normalize(&mixture.magnitudes(), &store, norm).unwrap();
    let frames = expected.dim().1;
    let err = convsep_tests::covered_error(&estimates[0].magnitudes, &expected, frames);
    assert!(err < 1e-12, "max error {}", err);
    assert!(estimates[1].magnitudes.iter().all(|&v| v == 0.0));
}

#[test]
fn test_config_file_drives_separator() {
    let json = r#"{
        "stft": { "window": "hanning", "window_length": 512, "hop_size": 128, "nfft": 512, "sample_rate": 22050.0 },
        "blocks": { "time_context": 20, "overlap": 5, "batch_size": 8 },
        "sources": { "names": ["a", "b"], "channels_per_source": 1 }
    }"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let cfg = PipelineConfig::from_path(file.path()).unwrap();
    assert_eq!(cfg.blocks.tail, TailMode::Drop);
    let separator = Separator::new(cfg).unwrap();

    let [left, _] = stereo_mixture(4, 22050.0, 0.5);
    let split = block_fn(|w| {
        let (c, t, k) = w.dim();
        let mut out = Array3::zeros((2 * c, t, k));
        out.slice_mut(s![0..c, .., ..]).assign(&w);
        out.slice_mut(s![c.., .., ..]).assign(&w);
        Ok(out)
    });
    let estimates = separator.separate(&[left.as_slice()], &split).unwrap();
    assert_eq!(estimates.len(), 2);
    assert_eq!(estimates[0].name, "a");
    assert_eq!(estimates[1].name, "b");
    assert_eq!(estimates[0].magnitudes, estimates[1].magnitudes);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let cfg = PipelineConfig::from_json(
        r#"{ "blocks": { "time_context": 10, "overlap": 10, "batch_size": 1 } }"#,
    )
    .unwrap();
    assert!(matches!(Separator::new(cfg), Err(DspError::Config(_))));
}
