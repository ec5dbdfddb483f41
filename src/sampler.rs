//! Sample pipeline: turns a `SamplingConfig` into index-aligned series.
//!
//! For each grid point `x[i]` both expressions are evaluated at the
//! complex value `(x[i], 0)`, producing two waveform series (x, re, im)
//! and two magnitude series. A point that fails to evaluate, or whose
//! result has a non-finite component, becomes a NaN sentinel in all of
//! that expression's series for that index; the batch itself never
//! aborts on a bad point. All four series always have exactly
//! `sample_count` entries, so consumers can rely on index alignment.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::config::SamplingConfig;
use crate::error::ConfigError;
use crate::eval::CompiledExpression;

/// How often the cancellable sampler polls for cancellation.
const CANCEL_CHECK_INTERVAL: usize = 64;

/// One evaluation of one expression at one grid point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComplexSample {
    /// The real input bound to `x`.
    pub x: f64,
    /// Real part of the result.
    pub re: f64,
    /// Imaginary part of the result.
    pub im: f64,
}

impl ComplexSample {
    /// Sentinel for a point that could not be evaluated.
    pub fn sentinel(x: f64) -> Self {
        ComplexSample {
            x,
            re: f64::NAN,
            im: f64::NAN,
        }
    }

    /// `sqrt(re^2 + im^2)`, NaN for a sentinel.
    pub fn magnitude(&self) -> f64 {
        Complex64::new(self.re, self.im).norm()
    }

    /// Argument of the result in radians, NaN for a sentinel.
    pub fn phase(&self) -> f64 {
        Complex64::new(self.re, self.im).arg()
    }

    /// Did evaluation fail at this point?
    pub fn is_degraded(&self) -> bool {
        !self.re.is_finite() || !self.im.is_finite()
    }
}

/// The atomic reply of one sampling run: four index-aligned series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleBatch {
    pub waveform1: Vec<ComplexSample>,
    pub waveform2: Vec<ComplexSample>,
    pub magnitude1: Vec<f64>,
    pub magnitude2: Vec<f64>,
}

impl SampleBatch {
    /// Number of grid points in every series.
    pub fn sample_count(&self) -> usize {
        self.waveform1.len()
    }
}

/// The input grid: `x[i] = domainMin + i * step` for `i` in
/// `[0, sampleCount)`, with `step = (domainMax - domainMin) / sampleCount`.
/// Left-inclusive; `domainMax` itself is never sampled.
pub fn sample_grid(config: &SamplingConfig) -> Vec<f64> {
    let step = config.step();
    (0..config.sample_count)
        .map(|i| config.domain_min + i as f64 * step)
        .collect()
}

/// Run the full pipeline for one config.
///
/// Fails only on a degenerate config; bad expressions and bad points
/// degrade to sentinels instead (see the module docs).
pub fn generate_samples(config: &SamplingConfig) -> Result<SampleBatch, ConfigError> {
    Ok(generate_samples_cancellable(config, || false)?.unwrap_or_default())
}

/// Like [`generate_samples`], but polls `cancelled` every
/// `CANCEL_CHECK_INTERVAL` points and returns `Ok(None)` if the run was
/// abandoned. Used by the sampling worker to let a newer request
/// supersede the one in flight.
pub fn generate_samples_cancellable<F>(
    config: &SamplingConfig,
    mut cancelled: F,
) -> Result<Option<SampleBatch>, ConfigError>
where
    F: FnMut() -> bool,
{
    config.validate()?;
    let grid = sample_grid(config);

    let Some((waveform1, magnitude1)) =
        sample_expression(&config.expression1, &grid, &mut cancelled)
    else {
        return Ok(None);
    };
    let Some((waveform2, magnitude2)) =
        sample_expression(&config.expression2, &grid, &mut cancelled)
    else {
        return Ok(None);
    };

    Ok(Some(SampleBatch {
        waveform1,
        waveform2,
        magnitude1,
        magnitude2,
    }))
}

/// Evaluate one expression across the grid. Returns `None` only when
/// cancelled. A compile failure degrades the whole series to sentinels;
/// the run carries on so the other expression still gets sampled.
fn sample_expression<F>(
    source: &str,
    grid: &[f64],
    cancelled: &mut F,
) -> Option<(Vec<ComplexSample>, Vec<f64>)>
where
    F: FnMut() -> bool,
{
    let compiled = match CompiledExpression::compile(source) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("expression '{source}' failed to compile: {e}");
            let waveform: Vec<ComplexSample> =
                grid.iter().map(|&x| ComplexSample::sentinel(x)).collect();
            let magnitudes = vec![f64::NAN; grid.len()];
            return Some((waveform, magnitudes));
        }
    };

    let mut waveform = Vec::with_capacity(grid.len());
    let mut magnitudes = Vec::with_capacity(grid.len());

    for (i, &x) in grid.iter().enumerate() {
        if i % CANCEL_CHECK_INTERVAL == 0 && cancelled() {
            return None;
        }

        match compiled.eval(Complex64::new(x, 0.0)) {
            Ok(v) if v.re.is_finite() && v.im.is_finite() => {
                waveform.push(ComplexSample {
                    x,
                    re: v.re,
                    im: v.im,
                });
                magnitudes.push(v.norm());
            }
            Ok(v) => {
                log::debug!("expression '{source}' non-finite at x={x}: {v}");
                waveform.push(ComplexSample::sentinel(x));
                magnitudes.push(f64::NAN);
            }
            Err(e) => {
                log::debug!("expression '{source}' failed at x={x}: {e}");
                waveform.push(ComplexSample::sentinel(x));
                magnitudes.push(f64::NAN);
            }
        }
    }

    Some((waveform, magnitudes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(expr1: &str, expr2: &str, min: f64, max: f64, count: usize) -> SamplingConfig {
        SamplingConfig::new(expr1, expr2, min, max, count)
    }

    #[test]
    fn all_series_have_sample_count_entries() {
        let batch = generate_samples(&config("sin(x)", "cos(x)", -5.0, 5.0, 37)).unwrap();
        assert_eq!(batch.waveform1.len(), 37);
        assert_eq!(batch.waveform2.len(), 37);
        assert_eq!(batch.magnitude1.len(), 37);
        assert_eq!(batch.magnitude2.len(), 37);
        assert_eq!(batch.sample_count(), 37);
    }

    #[test]
    fn grid_is_left_inclusive_and_evenly_spaced() {
        let cfg = config("x", "x", -10.0, 10.0, 5);
        let grid = sample_grid(&cfg);
        let step = cfg.step();

        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0], -10.0, "grid must start at domainMin");
        for w in grid.windows(2) {
            assert!(w[1] > w[0], "grid must be strictly increasing");
            assert!(
                ((w[1] - w[0]) - step).abs() < 1e-12,
                "grid must be evenly spaced"
            );
        }
        assert!(
            (grid[4] - (-10.0 + 4.0 * step)).abs() < 1e-12,
            "last point is domainMin + (n-1)*step"
        );
        assert!(grid[4] < 10.0, "domainMax itself is never sampled");
    }

    #[test]
    fn magnitude_matches_waveform_components() {
        let batch = generate_samples(&config("x^2 + i*x", "x", 1.0, 4.0, 30)).unwrap();
        for (sample, &mag) in batch.waveform1.iter().zip(&batch.magnitude1) {
            let expected = (sample.re * sample.re + sample.im * sample.im).sqrt();
            assert!(
                (mag - expected).abs() <= 1e-9 * expected.max(1.0),
                "magnitude {mag} does not match components at x={}",
                sample.x
            );
        }
    }

    #[test]
    fn identity_expression_follows_the_grid() {
        let batch = generate_samples(&config("x", "x", -10.0, 10.0, 5)).unwrap();
        let expected_x = [-10.0, -6.0, -2.0, 2.0, 6.0];
        for (sample, &x) in batch.waveform1.iter().zip(&expected_x) {
            assert!((sample.x - x).abs() < 1e-12);
            assert!((sample.re - x).abs() < 1e-12, "re must equal x");
            assert!(sample.im.abs() < 1e-12, "im must be zero on the real axis");
        }
        for (&mag, &x) in batch.magnitude1.iter().zip(&expected_x) {
            assert!((mag - x.abs()).abs() < 1e-12, "magnitude must be |x|");
        }
    }

    #[test]
    fn division_by_zero_degrades_one_point_only() {
        // Grid [-10, -5, 0, 5] hits x = 0 exactly.
        let batch = generate_samples(&config("1/x", "x", -10.0, 10.0, 4)).unwrap();

        assert!(batch.waveform1[2].is_degraded(), "1/0 must be a sentinel");
        assert!(batch.magnitude1[2].is_nan());
        for i in [0usize, 1, 3] {
            assert!(
                !batch.waveform1[i].is_degraded(),
                "finite point {i} must survive"
            );
            assert!(batch.magnitude1[i].is_finite());
        }
        // The other expression is untouched.
        assert!(batch.waveform2.iter().all(|s| !s.is_degraded()));
    }

    #[test]
    fn compile_failure_degrades_whole_series_not_the_run() {
        let batch = generate_samples(&config("sin(", "x", -1.0, 1.0, 8)).unwrap();
        assert_eq!(batch.waveform1.len(), 8);
        assert!(batch.waveform1.iter().all(|s| s.is_degraded()));
        assert!(batch.magnitude1.iter().all(|m| m.is_nan()));
        assert!(batch.waveform2.iter().all(|s| !s.is_degraded()));
    }

    #[test]
    fn sentinel_keeps_grid_x() {
        let batch = generate_samples(&config("1/x", "x", -10.0, 10.0, 4)).unwrap();
        assert_eq!(batch.waveform1[2].x, 0.0, "sentinel keeps its grid x");
    }

    #[test]
    fn invalid_config_rejected_before_evaluation() {
        assert!(matches!(
            generate_samples(&config("x", "x", -1.0, 1.0, 0)),
            Err(ConfigError::InvalidSampleCount { .. })
        ));
        assert!(matches!(
            generate_samples(&config("x", "x", 3.0, 3.0, 10)),
            Err(ConfigError::InvalidDomain { .. })
        ));
    }

    #[test]
    fn cancellation_abandons_the_run() {
        let cfg = config("sin(x)", "cos(x)", -10.0, 10.0, 1000);
        let result = generate_samples_cancellable(&cfg, || true).unwrap();
        assert!(result.is_none(), "cancelled run must not produce a batch");
    }

    #[test]
    fn pipeline_is_deterministic() {
        let cfg = config("sin(x) + i*cos(x)", "1/x", -3.0, 3.0, 50);
        let a = generate_samples(&cfg).unwrap();
        let b = generate_samples(&cfg).unwrap();
        let bits = |m: &[f64]| m.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a.magnitude1), bits(&b.magnitude1));
        assert_eq!(bits(&a.magnitude2), bits(&b.magnitude2));
    }
}
