//! Sampling configuration for one play invocation.
//!
//! A `SamplingConfig` is constructed once per run and never mutated; the
//! sampler validates it before any expression is evaluated.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Everything the sample pipeline needs for one run: two expression
/// strings over the free variable `x`, the real-axis domain to sweep,
/// and how many points to take.
///
/// Field names serialize in camelCase to match the JS worker message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingConfig {
    /// First expression, e.g. `"sin(x)"`.
    pub expression1: String,
    /// Second expression, e.g. `"1/x"`.
    pub expression2: String,
    /// Inclusive lower end of the input grid.
    pub domain_min: f64,
    /// Upper end of the input grid (exclusive; see `step`).
    pub domain_max: f64,
    /// Number of grid points. Must be positive.
    pub sample_count: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            expression1: "x".to_string(),
            expression2: "x".to_string(),
            domain_min: -10.0,
            domain_max: 10.0,
            sample_count: 200,
        }
    }
}

impl SamplingConfig {
    pub fn new(
        expression1: &str,
        expression2: &str,
        domain_min: f64,
        domain_max: f64,
        sample_count: usize,
    ) -> Self {
        SamplingConfig {
            expression1: expression1.to_string(),
            expression2: expression2.to_string(),
            domain_min,
            domain_max,
            sample_count,
        }
    }

    /// Reject degenerate configs before any evaluation starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_count == 0 {
            return Err(ConfigError::InvalidSampleCount {
                count: self.sample_count,
            });
        }
        if !self.domain_min.is_finite()
            || !self.domain_max.is_finite()
            || self.domain_min >= self.domain_max
        {
            return Err(ConfigError::InvalidDomain {
                min: self.domain_min,
                max: self.domain_max,
            });
        }
        Ok(())
    }

    /// Grid spacing: `(domainMax - domainMin) / sampleCount`.
    ///
    /// The divisor is the sample count itself, so the grid is
    /// left-inclusive and stops one step short of `domain_max`.
    pub fn step(&self) -> f64 {
        (self.domain_max - self.domain_min) / self.sample_count as f64
    }
}
