pub mod audio;
pub mod config;
pub mod error;
pub mod eval;
pub mod sampler;
pub mod worker;

use wasm_bindgen::prelude::*;

use crate::audio::control::{GainMapping, schedule_for_batch};
use crate::audio::renderer;
use crate::audio::session::ToneSettings;
use crate::config::SamplingConfig;
use crate::error::{ConfigError, SoniGraphError};
use crate::eval::CompiledExpression;
use crate::sampler::SampleBatch;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the sonigraph-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Sample both expressions of a config into four index-aligned series.
pub fn sample(config: &SamplingConfig) -> Result<SampleBatch, ConfigError> {
    sampler::generate_samples(config)
}

/// Validate a config and compile both expressions without sampling.
///
/// During sampling a bad expression only degrades its own series; this
/// check lets a UI reject bad input outright, before any loading
/// indicator is shown.
pub fn preflight(config: &SamplingConfig) -> Result<(), SoniGraphError> {
    config.validate()?;
    CompiledExpression::compile(&config.expression1)?;
    CompiledExpression::compile(&config.expression2)?;
    Ok(())
}

/// WASM-exposed: preflight a config object, throwing a single error
/// string when the config or either expression is unusable.
#[wasm_bindgen]
pub fn check_config(config: JsValue) -> Result<(), JsValue> {
    let config: SamplingConfig =
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    preflight(&config).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: run the sample pipeline for a config object
/// (`{expression1, expression2, domainMin, domainMax, sampleCount}`)
/// and return `{waveform1, waveform2, magnitude1, magnitude2}`.
/// This is the whole body of the browser worker's message handler.
#[wasm_bindgen]
pub fn sample_expressions(config: JsValue) -> Result<JsValue, JsValue> {
    let config: SamplingConfig =
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    let batch = sampler::generate_samples(&config).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    serde_wasm_bindgen::to_value(&batch).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: sample a config and derive the control schedules for
/// both tones, spread across `duration` seconds. The caller feeds these
/// straight into `setValueAtTime` on its oscillator/gain nodes.
#[wasm_bindgen]
pub fn sonification_controls(config: JsValue, duration: f64) -> Result<JsValue, JsValue> {
    let config: SamplingConfig =
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    let batch = sampler::generate_samples(&config).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    let controls = schedule_for_batch(&batch, duration, GainMapping::default());
    serde_wasm_bindgen::to_value(&controls).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: sample a config and render its tone pair to a WAV
/// byte array (16-bit mono PCM).
#[wasm_bindgen]
pub fn render_tones_wav(config: JsValue, duration: f64, sample_rate: u32) -> Result<Vec<u8>, JsValue> {
    let batch = batch_from_js(config)?;
    let settings = ToneSettings {
        duration,
        sample_rate,
        ..ToneSettings::default()
    };
    renderer::render_wav(&batch, &settings).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: sample a config and render its tone pair to mono f32
/// samples. Returns the raw audio buffer for AudioWorklet playback.
#[wasm_bindgen]
pub fn render_tone_samples(
    config: JsValue,
    duration: f64,
    sample_rate: u32,
) -> Result<Vec<f32>, JsValue> {
    let batch = batch_from_js(config)?;
    let settings = ToneSettings {
        duration,
        sample_rate,
        ..ToneSettings::default()
    };
    let samples_f64 =
        renderer::render_samples(&batch, &settings).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(samples_f64.iter().map(|&s| s as f32).collect())
}

fn batch_from_js(config: JsValue) -> Result<SampleBatch, JsValue> {
    let config: SamplingConfig =
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    sampler::generate_samples(&config).map_err(|e| JsValue::from_str(&format!("{e}")))
}
