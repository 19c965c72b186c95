use crate::signal::{mean, std_dev, Events, RawSignal};
use log::debug;
use serde::{Deserialize, Serialize};

/// Configurable parameters for statistical R-peak detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Number of standard deviations above the mean a peak must reach.
    pub threshold_k: f64,
    /// Minimum distance between accepted peaks / refractory period (seconds).
    pub refractory_s: f64,
    /// Required prominence in units of the local standard deviation.
    pub min_prominence: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold_k: 4.0,
            refractory_s: 0.25,
            min_prominence: 1.5,
        }
    }
}

impl DetectorConfig {
    /// Refractory distance in samples for the given sampling rate.
    pub fn refractory_samples(&self, fs: f64) -> usize {
        ((self.refractory_s * fs).round() as usize).max(1)
    }
}

/// Detect R-peaks with a threshold derived from the recording's own distribution.
pub fn detect_r_peaks(signal: &RawSignal, cfg: &DetectorConfig) -> Events {
    let data = &signal.data;
    if data.len() < 3 {
        return Events::default();
    }
    let threshold = dynamic_threshold(data, cfg.threshold_k);
    let refractory = cfg.refractory_samples(signal.fs);

    let candidates: Vec<usize> = (1..data.len() - 1)
        .filter(|&i| data[i] > threshold && data[i] >= data[i - 1] && data[i] > data[i + 1])
        .filter(|&i| is_prominent(data, i, refractory, cfg.min_prominence))
        .collect();
    let picked = pick_with_refractory(data, &candidates, refractory);
    let peaks = enforce_min_distance(&picked, refractory);
    debug!(
        "threshold {:.4}: {} candidates, {} peaks",
        threshold,
        candidates.len(),
        peaks.len()
    );
    Events::from_indices(peaks)
}

fn dynamic_threshold(data: &[f64], k: f64) -> f64 {
    let m = mean(data).unwrap_or(0.0);
    let sd = std_dev(data).unwrap_or(0.0);
    m + k * sd
}

fn is_prominent(data: &[f64], idx: usize, half_width: usize, factor: f64) -> bool {
    let start = idx.saturating_sub(half_width);
    let end = (idx + half_width + 1).min(data.len());
    let window = &data[start..end];
    let floor = window.iter().copied().fold(f64::INFINITY, f64::min);
    let local_sd = std_dev(window).unwrap_or(0.0);
    data[idx] - floor >= factor * local_sd
}

/// Within one refractory period keep the tallest candidate.
fn pick_with_refractory(data: &[f64], candidates: &[usize], refractory: usize) -> Vec<usize> {
    let mut peaks: Vec<usize> = Vec::with_capacity(candidates.len());
    for &idx in candidates {
        match peaks.last_mut() {
            Some(last) if idx - *last < refractory => {
                if data[idx] > data[*last] {
                    *last = idx;
                }
            }
            _ => peaks.push(idx),
        }
    }
    peaks
}

/// Second pass: drop any peak closer than `min_distance` to the previously kept one.
pub fn enforce_min_distance(peaks: &[usize], min_distance: usize) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(peaks.len());
    for &idx in peaks {
        match kept.last() {
            Some(&last) if idx <= last || idx - last < min_distance => continue,
            _ => kept.push(idx),
        }
    }
    kept
}
