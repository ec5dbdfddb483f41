//! WAV renderer: renders a batch's sonification to a WAV byte buffer.

use crate::audio::session::{AudioSession, ToneSettings};
use crate::error::ConfigError;
use crate::sampler::SampleBatch;

/// Render the tone pair for a batch to a WAV file as bytes
/// (16-bit mono PCM).
pub fn render_wav(batch: &SampleBatch, settings: &ToneSettings) -> Result<Vec<u8>, ConfigError> {
    let samples = render_samples(batch, settings)?;
    let pcm: Vec<i16> = samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f64) as i16)
        .collect();
    Ok(encode_wav_mono(&pcm, settings.sample_rate))
}

/// Render the tone pair to raw mono f64 samples.
pub fn render_samples(batch: &SampleBatch, settings: &ToneSettings) -> Result<Vec<f64>, ConfigError> {
    let mut session = AudioSession::start(batch, settings)?;
    Ok(session.render(settings.duration))
}

/// Encode mono i16 PCM samples to a WAV byte buffer.
fn encode_wav_mono(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    const CHANNELS: u16 = 1;
    const BITS_PER_SAMPLE: u16 = 16;
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate * block_align as u32;
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&CHANNELS.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
