use crate::{
    metrics::ranges::{self, RangeStatus},
    signal::{mean, std_dev, RRSeries},
};
use serde::{Deserialize, Serialize};

/// RR intervals outside this fraction of the median are treated as detection artifacts.
pub const RR_FILTER_BAND: (f64, f64) = (0.7, 1.3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HrvAssessment {
    AutonomicImbalance,
    MildStress,
    Balanced,
}

impl HrvAssessment {
    pub fn from_rmssd(rmssd: f64) -> Self {
        if rmssd < 20.0 {
            HrvAssessment::AutonomicImbalance
        } else if rmssd < 30.0 {
            HrvAssessment::MildStress
        } else {
            HrvAssessment::Balanced
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            HrvAssessment::AutonomicImbalance => "autonomic imbalance",
            HrvAssessment::MildStress => "mild stress",
            HrvAssessment::Balanced => "autonomic balance",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HrvMetrics {
    /// Intervals kept after outlier filtering.
    pub n: usize,
    /// Intervals removed by the filter.
    pub rejected: usize,
    pub mean_rr_ms: f64,
    pub rmssd_ms: f64,
    pub sdnn_ms: f64,
    pub rmssd_status: RangeStatus,
    pub assessment: HrvAssessment,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HrvAnalysis {
    Available(HrvMetrics),
    InsufficientData { valid_intervals: usize },
}

impl HrvAnalysis {
    pub fn metrics(&self) -> Option<&HrvMetrics> {
        match self {
            HrvAnalysis::Available(m) => Some(m),
            HrvAnalysis::InsufficientData { .. } => None,
        }
    }

    pub fn rmssd(&self) -> Option<f64> {
        self.metrics().map(|m| m.rmssd_ms)
    }
}

/// Keep RR intervals within 70–130% of the series median.
pub fn filter_rr_outliers(rr: &RRSeries) -> RRSeries {
    let Some(median) = rr.median() else {
        return RRSeries::default();
    };
    let (lo, hi) = (RR_FILTER_BAND.0 * median, RR_FILTER_BAND.1 * median);
    RRSeries {
        rr: rr
            .rr
            .iter()
            .copied()
            .filter(|x| (lo..=hi).contains(x))
            .collect(),
    }
}

fn rmssd(rr: &[f64]) -> f64 {
    let diffs: Vec<f64> = rr.windows(2).map(|w| (w[1] - w[0]).powi(2)).collect();
    mean(&diffs).unwrap_or(0.0).sqrt()
}

/// Time-domain HRV over the outlier-filtered RR series.
pub fn hrv_time(rr: &RRSeries) -> HrvAnalysis {
    let filtered = filter_rr_outliers(rr);
    let n = filtered.len();
    if n < 2 {
        return HrvAnalysis::InsufficientData { valid_intervals: n };
    }
    let rmssd_ms = rmssd(&filtered.rr);
    HrvAnalysis::Available(HrvMetrics {
        n,
        rejected: rr.len() - n,
        mean_rr_ms: filtered.mean().unwrap_or(0.0),
        rmssd_ms,
        sdnn_ms: std_dev(&filtered.rr).unwrap_or(0.0),
        rmssd_status: ranges::HRV_RMSSD.classify(rmssd_ms),
        assessment: HrvAssessment::from_rmssd(rmssd_ms),
    })
}
