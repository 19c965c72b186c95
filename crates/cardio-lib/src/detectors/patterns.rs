//! Morphology pattern detectors that feed trigger conditions in risk scoring.
//!
//! None of these patterns has a reference algorithm yet. Every method of
//! [`PatternDetector`] therefore defaults to "not detected", and [`NoPatterns`]
//! is the stock implementation. A real detector overrides only the patterns it
//! understands and is installed with `Analyzer::with_patterns`.

use crate::{
    detectors::morphology::Beat,
    signal::{RRSeries, RawSignal},
};
use serde::{Deserialize, Serialize};

/// Everything a pattern detector may look at for one recording.
#[derive(Debug, Clone, Copy)]
pub struct PatternContext<'a> {
    pub signal: &'a RawSignal,
    pub beats: &'a [Beat],
    pub rr: &'a RRSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternStatus {
    Detected,
    #[default]
    NotDetected,
}

impl PatternStatus {
    pub fn is_detected(self) -> bool {
        matches!(self, PatternStatus::Detected)
    }
}

pub trait PatternDetector: Send + Sync {
    /// Sawtooth atrial flutter waves.
    fn flutter_waves(&self, _ctx: &PatternContext<'_>) -> PatternStatus {
        PatternStatus::NotDetected
    }
    /// Three or more consecutive wide-QRS beats.
    fn consecutive_wide_qrs(&self, _ctx: &PatternContext<'_>) -> PatternStatus {
        PatternStatus::NotDetected
    }
    /// Coved ST elevation in the right precordial leads.
    fn brugada(&self, _ctx: &PatternContext<'_>) -> PatternStatus {
        PatternStatus::NotDetected
    }
    /// Periodic heart-rate oscillation typical of apnea episodes.
    fn cyclic_heart_rate_variation(&self, _ctx: &PatternContext<'_>) -> PatternStatus {
        PatternStatus::NotDetected
    }
    /// S wave in lead I, Q wave and inverted T in lead III.
    fn s1q3t3(&self, _ctx: &PatternContext<'_>) -> PatternStatus {
        PatternStatus::NotDetected
    }
    /// U waves taller than the adjacent T wave.
    fn prominent_u_waves(&self, _ctx: &PatternContext<'_>) -> PatternStatus {
        PatternStatus::NotDetected
    }
}

/// Reports every pattern as not detected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPatterns;

impl PatternDetector for NoPatterns {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_detector_reports_nothing() {
        let signal = RawSignal::new(250.0, vec![0.0; 500]);
        let rr = RRSeries::default();
        let ctx = PatternContext {
            signal: &signal,
            beats: &[],
            rr: &rr,
        };
        let detector = NoPatterns;
        assert!(!detector.flutter_waves(&ctx).is_detected());
        assert!(!detector.consecutive_wide_qrs(&ctx).is_detected());
        assert!(!detector.brugada(&ctx).is_detected());
        assert!(!detector.cyclic_heart_rate_variation(&ctx).is_detected());
        assert!(!detector.s1q3t3(&ctx).is_detected());
        assert!(!detector.prominent_u_waves(&ctx).is_detected());
    }
}
