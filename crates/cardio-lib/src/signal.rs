use serde::{Deserialize, Serialize};

/// Uniformly sampled single-lead recording after decoding and normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSignal {
    /// Sampling frequency in Hz
    pub fs: f64,
    /// Normalized amplitudes
    pub data: Vec<f64>,
}

impl RawSignal {
    pub fn new(fs: f64, data: Vec<f64>) -> Self {
        Self { fs, data }
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn duration(&self) -> f64 {
        self.data.len() as f64 / self.fs
    }

    /// Converts a signed offset in seconds to samples, truncating toward zero.
    pub fn offset_samples(&self, seconds: f64) -> isize {
        (seconds * self.fs) as isize
    }

    /// Half-open sample range `[r + start_s, r + end_s)` clipped to the signal.
    pub fn window(&self, r: usize, start_s: f64, end_s: f64) -> Option<(usize, usize)> {
        let r = r as isize;
        let start = (r + self.offset_samples(start_s)).max(0) as usize;
        let end = (r + self.offset_samples(end_s)).clamp(0, self.len() as isize) as usize;
        (start < end).then_some((start, end))
    }
}

/// R-peak positions as strictly increasing sample indices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Events {
    pub indices: Vec<usize>,
}

impl Events {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// RR intervals (milliseconds)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RRSeries {
    pub rr: Vec<f64>,
}

impl RRSeries {
    pub fn from_events(events: &Events, fs: f64) -> Self {
        let rr = events
            .indices
            .windows(2)
            .map(|w| (w[1] as f64 - w[0] as f64) / fs * 1000.0)
            .collect();
        Self { rr }
    }

    pub fn len(&self) -> usize {
        self.rr.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rr.is_empty()
    }

    pub fn mean(&self) -> Option<f64> {
        mean(&self.rr)
    }

    pub fn median(&self) -> Option<f64> {
        if self.rr.is_empty() {
            return None;
        }
        let mut sorted = self.rr.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }
}

pub(crate) fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        None
    } else {
        Some(data.iter().sum::<f64>() / data.len() as f64)
    }
}

/// Population standard deviation.
pub(crate) fn std_dev(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let var = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / data.len() as f64;
    Some(var.sqrt())
}
