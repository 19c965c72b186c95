use crate::{
    detectors::morphology::Morphology,
    metrics::ranges::{self, RangeStatus},
    signal::RRSeries,
};
use serde::{Deserialize, Serialize};

/// Bazett's correction: QT / sqrt(RR in seconds). A non-positive rate uses RR = 1 s.
pub fn bazett_qtc(qt_ms: f64, heart_rate_bpm: f64) -> f64 {
    let rr_s = if heart_rate_bpm > 0.0 {
        60.0 / heart_rate_bpm
    } else {
        1.0
    };
    qt_ms / rr_s.sqrt()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartRate {
    pub bpm: Option<f64>,
    pub status: RangeStatus,
}

/// Conduction and repolarization intervals derived from the wave summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalSummary {
    pub heart_rate: HeartRate,
    pub pr_interval_ms: Option<f64>,
    pub pr_status: RangeStatus,
    pub qt_interval_ms: Option<f64>,
    pub qt_status: RangeStatus,
    pub qtc_ms: Option<f64>,
    pub qtc_status: RangeStatus,
}

pub fn summarize_intervals(rr: &RRSeries, morphology: &Morphology) -> IntervalSummary {
    let bpm = rr.mean().filter(|&m| m > 0.0).map(|m| 60_000.0 / m);
    let pr_interval_ms = morphology.p_waves.mean_interval_ms.map(f64::abs);
    let qt_interval_ms = morphology.t_waves.mean_interval_ms;
    let qtc_ms = qt_interval_ms
        .zip(bpm)
        .map(|(qt, hr)| bazett_qtc(qt, hr));
    IntervalSummary {
        heart_rate: HeartRate {
            bpm,
            status: ranges::HEART_RATE.classify_opt(bpm),
        },
        pr_interval_ms,
        pr_status: ranges::PR_INTERVAL.classify_opt(pr_interval_ms),
        qt_interval_ms,
        qt_status: ranges::QT_INTERVAL.classify_opt(qt_interval_ms),
        qtc_ms,
        qtc_status: ranges::QTC.classify_opt(qtc_ms),
    }
}
