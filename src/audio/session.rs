//! One play invocation's audio state.
//!
//! An `AudioSession` is the explicit context object that owns the tone
//! pair for a batch: created on play, dropped on stop. Rendering mixes
//! the two tones into a mono buffer with master gain and a soft clip,
//! so no state about the current playback lives outside the session.

use serde::{Deserialize, Serialize};

use crate::audio::control::{GainMapping, schedule_for_batch};
use crate::audio::tone::Tone;
use crate::error::ConfigError;
use crate::sampler::SampleBatch;

/// Playback parameters for a sonification run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneSettings {
    /// Playback length in seconds; the batch's control points are
    /// spread evenly across it.
    pub duration: f64,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Gain applied to the summed tone pair.
    pub master_gain: f64,
    /// How per-sample gain is derived.
    pub mapping: GainMapping,
}

impl Default for ToneSettings {
    fn default() -> Self {
        ToneSettings {
            duration: 5.0,
            sample_rate: 44100,
            master_gain: 0.5,
            mapping: GainMapping::PhaseAware,
        }
    }
}

impl ToneSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ConfigError::InvalidDuration {
                duration: self.duration,
            });
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate {
                sample_rate: self.sample_rate,
            });
        }
        Ok(())
    }
}

/// The audio context for one play invocation: two scheduled tones and a
/// master gain. Dropping the session is "stop".
#[derive(Debug, Clone)]
pub struct AudioSession {
    tones: Vec<Tone>,
    master_gain: f64,
    sample_rate: f64,
}

impl AudioSession {
    /// Build a session from a sampled batch: derive both control
    /// schedules and hand each to its own tone.
    pub fn start(batch: &SampleBatch, settings: &ToneSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let schedule = schedule_for_batch(batch, settings.duration, settings.mapping);
        let sample_rate = settings.sample_rate as f64;

        let mut tone1 = Tone::new(sample_rate);
        tone1.schedule(&schedule.controls1);
        let mut tone2 = Tone::new(sample_rate);
        tone2.schedule(&schedule.controls2);

        Ok(AudioSession {
            tones: vec![tone1, tone2],
            master_gain: settings.master_gain,
            sample_rate,
        })
    }

    /// Render `duration` seconds of the mono mix.
    pub fn render(&mut self, duration: f64) -> Vec<f64> {
        let num_samples = (duration * self.sample_rate) as usize;
        let mut out = Vec::with_capacity(num_samples);
        for _ in 0..num_samples {
            let sum: f64 = self.tones.iter_mut().map(|t| t.next_sample()).sum();
            out.push(soft_clip(sum * self.master_gain));
        }
        out
    }
}

/// Soft clipper using tanh to prevent harsh digital clipping.
fn soft_clip(x: f64) -> f64 {
    x.tanh()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplingConfig;
    use crate::sampler::generate_samples;

    fn batch() -> SampleBatch {
        let config = SamplingConfig::new("sin(x)", "cos(x)", -5.0, 5.0, 50);
        generate_samples(&config).expect("sampling failed")
    }

    #[test]
    fn renders_requested_length() {
        let settings = ToneSettings {
            duration: 1.0,
            sample_rate: 8000,
            ..ToneSettings::default()
        };
        let mut session = AudioSession::start(&batch(), &settings).unwrap();
        let samples = session.render(settings.duration);
        assert_eq!(samples.len(), 8000);
    }

    #[test]
    fn renders_audible_output() {
        let settings = ToneSettings {
            duration: 1.0,
            sample_rate: 8000,
            ..ToneSettings::default()
        };
        let mut session = AudioSession::start(&batch(), &settings).unwrap();
        let samples = session.render(settings.duration);
        assert!(
            samples.iter().any(|s| s.abs() > 0.001),
            "session should produce non-silent audio"
        );
    }

    #[test]
    fn output_is_soft_clipped() {
        let settings = ToneSettings {
            duration: 0.5,
            sample_rate: 8000,
            master_gain: 10.0,
            ..ToneSettings::default()
        };
        let mut session = AudioSession::start(&batch(), &settings).unwrap();
        for s in session.render(settings.duration) {
            assert!(s.abs() <= 1.0, "soft clip must keep output in [-1, 1], got {s}");
        }
    }

    #[test]
    fn degraded_batch_renders_silence() {
        let config = SamplingConfig::new("sin(", "cos(", -1.0, 1.0, 10);
        let degraded = generate_samples(&config).unwrap();
        let settings = ToneSettings {
            duration: 0.25,
            sample_rate: 8000,
            ..ToneSettings::default()
        };
        let mut session = AudioSession::start(&degraded, &settings).unwrap();
        assert!(
            session.render(settings.duration).iter().all(|&s| s == 0.0),
            "no control points means both tones stay silent"
        );
    }

    #[test]
    fn bad_settings_rejected() {
        let settings = ToneSettings {
            duration: 0.0,
            ..ToneSettings::default()
        };
        assert!(matches!(
            AudioSession::start(&batch(), &settings),
            Err(ConfigError::InvalidDuration { .. })
        ));

        let settings = ToneSettings {
            sample_rate: 0,
            ..ToneSettings::default()
        };
        assert!(matches!(
            AudioSession::start(&batch(), &settings),
            Err(ConfigError::InvalidSampleRate { .. })
        ));
    }
}
