//! A sine tone driven by a schedule of control points.
//!
//! The tone keeps its own sample clock. Each control point takes effect
//! at the first sample whose clock time reaches the point's timestamp
//! and holds until the next point, the offline equivalent of
//! `setValueAtTime` against an audio-context clock.

use std::f64::consts::PI;

use crate::audio::control::ControlPoint;

/// A single oscillator voice with frequency/gain automation.
#[derive(Debug, Clone)]
pub struct Tone {
    /// Current frequency in Hz. Zero until the first control point.
    pub frequency: f64,
    /// Current gain. Zero until the first control point.
    pub gain: f64,
    phase: f64,
    sample_rate: f64,
    schedule: Vec<ControlPoint>,
    next_event: usize,
    /// Samples generated so far; the tone's clock.
    position: usize,
}

impl Tone {
    pub fn new(sample_rate: f64) -> Self {
        Tone {
            frequency: 0.0,
            gain: 0.0,
            phase: 0.0,
            sample_rate,
            schedule: Vec::new(),
            next_event: 0,
            position: 0,
        }
    }

    /// Append control points to the schedule. Points are kept in time
    /// order regardless of the order they arrive in.
    pub fn schedule(&mut self, points: &[ControlPoint]) {
        self.schedule.extend_from_slice(points);
        self.schedule
            .sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));
    }

    /// Generate the next sample, applying any control points that are
    /// due at the current clock time first.
    pub fn next_sample(&mut self) -> f64 {
        let now = self.position as f64 / self.sample_rate;
        while self.next_event < self.schedule.len() && self.schedule[self.next_event].time <= now {
            let point = self.schedule[self.next_event];
            self.frequency = point.frequency;
            self.gain = point.gain;
            self.next_event += 1;
        }

        let sample = (2.0 * PI * self.phase).sin() * self.gain;

        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        self.position += 1;

        sample
    }

    /// Rewind the clock and phase, keeping the schedule.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.position = 0;
        self.next_event = 0;
        self.frequency = 0.0;
        self.gain = 0.0;
    }
}
