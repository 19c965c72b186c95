use crate::{error::AnalysisError, signal::RawSignal};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Width of one signed integer sample in the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    #[default]
    I16,
    I32,
}

impl SampleFormat {
    pub fn width(self) -> usize {
        match self {
            SampleFormat::I16 => 2,
            SampleFormat::I32 => 4,
        }
    }
}

/// How a raw sample buffer is decoded into a [`RawSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Sampling frequency of the buffer (Hz).
    pub sample_rate: f64,
    pub byte_order: ByteOrder,
    pub sample_format: SampleFormat,
    /// ADC units per amplitude unit; samples are divided by this.
    pub gain: f64,
    /// ADC value subtracted before applying the gain.
    pub baseline: f64,
    /// Recordings shorter than this (seconds) are rejected.
    pub min_duration_s: f64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 250.0,
            byte_order: ByteOrder::Little,
            sample_format: SampleFormat::I16,
            gain: 1.0,
            baseline: 0.0,
            min_duration_s: 1.0,
        }
    }
}

/// Decode raw integer samples without normalization or validation.
pub fn decode_samples(bytes: &[u8], format: SampleFormat, order: ByteOrder) -> Vec<i32> {
    let width = format.width();
    let remainder = bytes.len() % width;
    if remainder != 0 {
        warn!("ignoring {} trailing byte(s) of a partial sample", remainder);
    }
    bytes
        .chunks_exact(width)
        .map(|chunk| match (format, order) {
            (SampleFormat::I16, ByteOrder::Little) => {
                i16::from_le_bytes([chunk[0], chunk[1]]) as i32
            }
            (SampleFormat::I16, ByteOrder::Big) => i16::from_be_bytes([chunk[0], chunk[1]]) as i32,
            (SampleFormat::I32, ByteOrder::Little) => {
                i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
            }
            (SampleFormat::I32, ByteOrder::Big) => {
                i32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
            }
        })
        .collect()
}

/// Decode a sample buffer and validate it into a [`RawSignal`].
pub fn load_signal(bytes: &[u8], cfg: &LoaderConfig) -> Result<RawSignal, AnalysisError> {
    let raw = decode_samples(bytes, cfg.sample_format, cfg.byte_order);
    let gain = if cfg.gain == 0.0 { 1.0 } else { cfg.gain };
    let data = raw
        .into_iter()
        .map(|sample| (sample as f64 - cfg.baseline) / gain)
        .collect();
    signal_from_samples(data, cfg)
}

/// Validate already-decoded samples (text or CSV sources) into a [`RawSignal`].
pub fn signal_from_samples(data: Vec<f64>, cfg: &LoaderConfig) -> Result<RawSignal, AnalysisError> {
    if !(cfg.sample_rate.is_finite() && cfg.sample_rate > 0.0) {
        return Err(AnalysisError::InvalidSampleRate(cfg.sample_rate));
    }
    if data.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    let signal = RawSignal::new(cfg.sample_rate, data);
    let duration_s = signal.duration();
    if duration_s < cfg.min_duration_s {
        return Err(AnalysisError::InsufficientDuration {
            duration_s,
            min_s: cfg.min_duration_s,
        });
    }
    debug!(
        "loaded {} samples ({:.2}s at {} Hz)",
        signal.len(),
        duration_s,
        signal.fs
    );
    Ok(signal)
}

/// Encode samples back into a buffer; used to build fixtures.
pub fn encode_samples(samples: &[i32], format: SampleFormat, order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * format.width());
    for &sample in samples {
        match (format, order) {
            (SampleFormat::I16, ByteOrder::Little) => out.extend((sample as i16).to_le_bytes()),
            (SampleFormat::I16, ByteOrder::Big) => out.extend((sample as i16).to_be_bytes()),
            (SampleFormat::I32, ByteOrder::Little) => out.extend(sample.to_le_bytes()),
            (SampleFormat::I32, ByteOrder::Big) => out.extend(sample.to_be_bytes()),
        }
    }
    out
}
