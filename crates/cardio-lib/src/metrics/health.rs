use crate::{
    detectors::morphology::QrsSummary,
    metrics::{hrv::HrvAnalysis, ranges::RangeStatus, rhythm::RhythmAnalysis},
};

const BASE_SCORE: i32 = 70;

/// Linear composite of HRV, QRS width and rhythm flags, clamped to 0..=100.
pub fn health_index(hrv: &HrvAnalysis, qrs: &QrsSummary, rhythm: &RhythmAnalysis) -> u8 {
    let mut score = BASE_SCORE;
    match hrv.rmssd() {
        Some(rmssd) if rmssd > 50.0 => score += 10,
        Some(rmssd) if rmssd > 30.0 => score += 5,
        _ => {}
    }
    if qrs.width_status == RangeStatus::Within {
        score += 5;
    }
    score -= 10 * rhythm.flag_count() as i32;
    score.clamp(0, 100) as u8
}
