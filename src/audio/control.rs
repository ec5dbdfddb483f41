//! Mapping from sampled magnitudes and phases to audio control values.
//!
//! Frequency comes from magnitude through a fixed linear map clamped to
//! the audible band; gain comes either from phase or from a fixed level,
//! depending on the variant. Degraded samples are skipped, not emitted
//! as glitches.

use serde::{Deserialize, Serialize};

use crate::sampler::{ComplexSample, SampleBatch};

/// Lower clamp of the tone frequency band, Hz.
pub const MIN_FREQUENCY_HZ: f64 = 20.0;
/// Upper clamp of the tone frequency band, Hz.
pub const MAX_FREQUENCY_HZ: f64 = 2000.0;
/// Hz added per unit of magnitude.
pub const FREQUENCY_PER_MAGNITUDE: f64 = 200.0;
/// Gain used by the magnitude-only variant.
pub const FIXED_GAIN: f64 = 0.1;

/// `clamp(magnitude * 200 + 20, 20, 2000)`.
pub fn frequency_for_magnitude(magnitude: f64) -> f64 {
    (magnitude * FREQUENCY_PER_MAGNITUDE + MIN_FREQUENCY_HZ)
        .clamp(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ)
}

/// `(cos(phase) + 1) / 4`, a gain in `[0, 0.5]`.
pub fn gain_for_phase(phase: f64) -> f64 {
    (phase.cos() + 1.0) / 4.0
}

/// How a sample's gain is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GainMapping {
    /// Gain follows the phase angle of the sample.
    PhaseAware,
    /// Constant gain, ignoring phase.
    Fixed(f64),
}

impl Default for GainMapping {
    fn default() -> Self {
        GainMapping::PhaseAware
    }
}

impl GainMapping {
    fn gain_for(&self, sample: &ComplexSample) -> f64 {
        match self {
            GainMapping::PhaseAware => gain_for_phase(sample.phase()),
            GainMapping::Fixed(gain) => *gain,
        }
    }
}

/// A timestamped instruction for one tone: at `time` seconds into
/// playback, move to this frequency and gain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ControlPoint {
    pub time: f64,
    pub frequency: f64,
    pub gain: f64,
}

/// Control schedules for both tones of a batch, one atomic reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SonificationControls {
    pub controls1: Vec<ControlPoint>,
    pub controls2: Vec<ControlPoint>,
}

/// Map one waveform series onto control points spread across
/// `duration` seconds. Point `i` lands at `i * duration / sampleCount`;
/// degraded samples emit nothing, so the tone simply holds its previous
/// value through the gap.
pub fn control_points(
    waveform: &[ComplexSample],
    duration: f64,
    mapping: GainMapping,
) -> Vec<ControlPoint> {
    let count = waveform.len();
    waveform
        .iter()
        .enumerate()
        .filter(|(_, sample)| !sample.is_degraded())
        .map(|(i, sample)| ControlPoint {
            time: i as f64 * duration / count as f64,
            frequency: frequency_for_magnitude(sample.magnitude()),
            gain: mapping.gain_for(sample),
        })
        .collect()
}

/// Derive the control schedules for both expressions of a batch.
pub fn schedule_for_batch(
    batch: &SampleBatch,
    duration: f64,
    mapping: GainMapping,
) -> SonificationControls {
    SonificationControls {
        controls1: control_points(&batch.waveform1, duration, mapping),
        controls2: control_points(&batch.waveform2, duration, mapping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn frequency_band_edges() {
        assert_eq!(frequency_for_magnitude(0.0), 20.0);
        assert_eq!(frequency_for_magnitude(9.9), 2000.0);
        assert_eq!(frequency_for_magnitude(100.0), 2000.0, "clamped above the band");
    }

    #[test]
    fn frequency_is_monotone_and_bounded() {
        let mut last = 0.0;
        for i in 0..1000 {
            let m = i as f64 * 0.05;
            let f = frequency_for_magnitude(m);
            assert!(
                (20.0..=2000.0).contains(&f),
                "frequency {f} outside the band for magnitude {m}"
            );
            assert!(f >= last, "frequency must not decrease with magnitude");
            last = f;
        }
    }

    #[test]
    fn gain_range_and_fixed_points() {
        assert!((gain_for_phase(0.0) - 0.5).abs() < 1e-12);
        assert!(gain_for_phase(PI).abs() < 1e-12);
        for i in 0..1000 {
            let phase = -10.0 + i as f64 * 0.02;
            let g = gain_for_phase(phase);
            assert!((0.0..=0.5).contains(&g), "gain {g} out of range at {phase}");
        }
    }

    #[test]
    fn degraded_samples_are_skipped() {
        let waveform = vec![
            ComplexSample { x: 0.0, re: 1.0, im: 0.0 },
            ComplexSample::sentinel(1.0),
            ComplexSample { x: 2.0, re: 0.0, im: 2.0 },
        ];
        let points = control_points(&waveform, 3.0, GainMapping::PhaseAware);

        assert_eq!(points.len(), 2, "sentinel must not become a control point");
        assert!((points[0].time - 0.0).abs() < 1e-12);
        assert!((points[1].time - 2.0).abs() < 1e-12, "time keeps its grid slot");
        assert!(points[1].time > points[0].time, "times strictly increase");
    }

    #[test]
    fn fixed_mapping_ignores_phase() {
        let waveform = vec![
            ComplexSample { x: 0.0, re: -1.0, im: 0.0 },
            ComplexSample { x: 1.0, re: 1.0, im: 1.0 },
        ];
        let points = control_points(&waveform, 2.0, GainMapping::Fixed(FIXED_GAIN));
        assert!(points.iter().all(|p| p.gain == FIXED_GAIN));
    }

    #[test]
    fn phase_aware_mapping_follows_phase() {
        // re > 0, im = 0 has phase 0, so gain is at its 0.5 peak.
        let waveform = vec![ComplexSample { x: 0.0, re: 2.0, im: 0.0 }];
        let points = control_points(&waveform, 1.0, GainMapping::PhaseAware);
        assert!((points[0].gain - 0.5).abs() < 1e-12);
        // Negative real axis has phase pi, silencing the tone.
        let waveform = vec![ComplexSample { x: 0.0, re: -2.0, im: 0.0 }];
        let points = control_points(&waveform, 1.0, GainMapping::PhaseAware);
        assert!(points[0].gain.abs() < 1e-12);
    }

    #[test]
    fn schedule_covers_both_expressions() {
        let batch = SampleBatch {
            waveform1: vec![ComplexSample { x: 0.0, re: 1.0, im: 0.0 }],
            waveform2: vec![ComplexSample::sentinel(0.0)],
            magnitude1: vec![1.0],
            magnitude2: vec![f64::NAN],
        };
        let schedule = schedule_for_batch(&batch, 1.0, GainMapping::default());
        assert_eq!(schedule.controls1.len(), 1);
        assert!(schedule.controls2.is_empty());
    }
}
