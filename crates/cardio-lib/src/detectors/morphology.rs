use crate::{
    metrics::ranges::{self, RangeStatus},
    signal::{mean, Events, RawSignal},
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-width of the QRS window around the R-peak (seconds).
const QRS_HALF_WIDTH_S: f64 = 0.05;
/// P-wave search window relative to the R-peak (seconds).
const P_WINDOW_S: (f64, f64) = (-0.2, -0.12);
/// T-wave search window relative to the R-peak (seconds).
const T_WINDOW_S: (f64, f64) = (0.2, 0.4);
const J_POINT_S: f64 = 0.08;
const ST_END_S: f64 = 0.16;
/// TP-segment proxy used as the ST and wave baseline, in samples before the R-peak.
const ST_BASELINE_SAMPLES: (usize, usize) = (100, 20);
const ST_DEPRESSED_BELOW: f64 = -0.05;
const ST_ELEVATED_ABOVE: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveKind {
    P,
    T,
}

impl WaveKind {
    fn window(self) -> (f64, f64) {
        match self {
            WaveKind::P => P_WINDOW_S,
            WaveKind::T => T_WINDOW_S,
        }
    }

    /// Normal amplitude band and normal |interval| band (ms).
    pub fn thresholds(self) -> ((f64, f64), (f64, f64)) {
        match self {
            WaveKind::P => ((0.05, 0.25), (120.0, 200.0)),
            WaveKind::T => ((0.1, 0.5), (160.0, 350.0)),
        }
    }

    pub fn assess(self, amplitude: f64, interval_ms: f64) -> WaveAssessment {
        let ((amp_lo, amp_hi), (int_lo, int_hi)) = self.thresholds();
        let amp_ok = (amp_lo..=amp_hi).contains(&amplitude);
        let int_ok = (int_lo..=int_hi).contains(&interval_ms.abs());
        match (amp_ok, int_ok) {
            (true, true) => WaveAssessment::Normal,
            (false, true) => WaveAssessment::AmplitudeAbnormal,
            (true, false) => WaveAssessment::IntervalAbnormal,
            (false, false) => WaveAssessment::BothAbnormal,
        }
    }
}

impl fmt::Display for WaveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveKind::P => f.write_str("P"),
            WaveKind::T => f.write_str("T"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveAssessment {
    Normal,
    AmplitudeAbnormal,
    IntervalAbnormal,
    BothAbnormal,
}

impl WaveAssessment {
    pub fn describe(self, kind: WaveKind) -> String {
        match self {
            WaveAssessment::Normal => format!("{kind} wave morphology normal"),
            WaveAssessment::AmplitudeAbnormal => format!("{kind} wave amplitude abnormal"),
            WaveAssessment::IntervalAbnormal => format!("{kind} wave interval abnormal"),
            WaveAssessment::BothAbnormal => {
                format!("{kind} wave amplitude and interval abnormal")
            }
        }
    }
}

/// Representative point of a P or T wave for one beat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveFeature {
    pub position: usize,
    pub amplitude: f64,
    /// Signed distance from the R-peak; negative for P waves.
    pub interval_ms: f64,
    pub assessment: WaveAssessment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StStatus {
    Normal,
    Elevated,
    Depressed,
    Undetected,
}

impl StStatus {
    pub fn classify(level: f64) -> Self {
        if level > ST_ELEVATED_ABOVE {
            StStatus::Elevated
        } else if level < ST_DEPRESSED_BELOW {
            StStatus::Depressed
        } else {
            StStatus::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StStatus::Normal => "normal",
            StStatus::Elevated => "elevated",
            StStatus::Depressed => "depressed",
            StStatus::Undetected => "undetected",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StMeasurement {
    /// Mean J..ST-end level minus the pre-beat baseline.
    pub level: f64,
    pub status: StStatus,
}

/// One detected heartbeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beat {
    pub r_index: usize,
    pub qrs_width_ms: f64,
    pub qrs_amplitude: f64,
    pub p_wave: Option<WaveFeature>,
    pub t_wave: Option<WaveFeature>,
    pub st_segment: Option<StMeasurement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrsSummary {
    pub count: usize,
    pub mean_width_ms: Option<f64>,
    pub mean_amplitude: Option<f64>,
    pub width_status: RangeStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveSummary {
    pub kind: WaveKind,
    pub detected: bool,
    pub count: usize,
    pub mean_amplitude: Option<f64>,
    pub mean_interval_ms: Option<f64>,
    pub assessment: Option<WaveAssessment>,
    pub description: String,
}

/// Recording-level ST-segment result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StSegment {
    pub status: StStatus,
    pub average_elevation: Option<f64>,
    pub description: String,
}

/// Per-beat features plus recording-level summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Morphology {
    pub beats: Vec<Beat>,
    pub qrs: QrsSummary,
    pub p_waves: WaveSummary,
    pub t_waves: WaveSummary,
    pub st_segment: StSegment,
}

pub fn extract_morphology(signal: &RawSignal, events: &Events) -> Morphology {
    let beats: Vec<Beat> = events
        .indices
        .iter()
        .filter(|&&r| r < signal.len())
        .map(|&r| extract_beat(signal, r))
        .collect();
    let morphology = Morphology {
        qrs: summarize_qrs(&beats),
        p_waves: summarize_waves(&beats, WaveKind::P),
        t_waves: summarize_waves(&beats, WaveKind::T),
        st_segment: summarize_st(&beats),
        beats,
    };
    debug!(
        "morphology: {} beats, {} P, {} T, ST {}",
        morphology.qrs.count,
        morphology.p_waves.count,
        morphology.t_waves.count,
        morphology.st_segment.status.label()
    );
    morphology
}

fn extract_beat(signal: &RawSignal, r: usize) -> Beat {
    let (q_start, s_end) = signal
        .window(r, -QRS_HALF_WIDTH_S, QRS_HALF_WIDTH_S)
        .unwrap_or((r, r));
    Beat {
        r_index: r,
        qrs_width_ms: (s_end - q_start) as f64 / signal.fs * 1000.0,
        qrs_amplitude: signal.data[r],
        p_wave: locate_wave(signal, r, WaveKind::P),
        t_wave: locate_wave(signal, r, WaveKind::T),
        st_segment: measure_st(signal, r),
    }
}

/// Largest deviation from the pre-beat baseline inside the wave's window.
/// The amplitude is signed, so an inverted wave comes out negative.
fn locate_wave(signal: &RawSignal, r: usize, kind: WaveKind) -> Option<WaveFeature> {
    let (start_s, end_s) = kind.window();
    let (start, end) = signal.window(r, start_s, end_s)?;
    let baseline = pre_beat_baseline(signal, r)?;
    let (offset, amplitude) = signal.data[start..end]
        .iter()
        .map(|&v| v - baseline)
        .enumerate()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))?;
    let position = start + offset;
    let interval_ms = (position as f64 - r as f64) / signal.fs * 1000.0;
    Some(WaveFeature {
        position,
        amplitude,
        interval_ms,
        assessment: kind.assess(amplitude, interval_ms),
    })
}

/// Mean level of the TP-segment proxy before `r`.
fn pre_beat_baseline(signal: &RawSignal, r: usize) -> Option<f64> {
    let (before, until) = ST_BASELINE_SAMPLES;
    let base_end = r.checked_sub(until)?;
    let base_start = r.saturating_sub(before);
    mean(&signal.data[base_start..base_end])
}

fn measure_st(signal: &RawSignal, r: usize) -> Option<StMeasurement> {
    let j_point = (r + signal.offset_samples(J_POINT_S).max(0) as usize).min(signal.len());
    let st_end = (r + signal.offset_samples(ST_END_S).max(0) as usize).min(signal.len());
    if st_end >= signal.len() {
        return None;
    }
    let baseline = pre_beat_baseline(signal, r)?;
    let level = mean(&signal.data[j_point..st_end])? - baseline;
    Some(StMeasurement {
        level,
        status: StStatus::classify(level),
    })
}

fn summarize_qrs(beats: &[Beat]) -> QrsSummary {
    let widths: Vec<f64> = beats.iter().map(|b| b.qrs_width_ms).collect();
    let amplitudes: Vec<f64> = beats.iter().map(|b| b.qrs_amplitude).collect();
    let mean_width_ms = mean(&widths);
    QrsSummary {
        count: beats.len(),
        mean_width_ms,
        mean_amplitude: mean(&amplitudes),
        width_status: ranges::QRS_WIDTH.classify_opt(mean_width_ms),
    }
}

fn summarize_waves(beats: &[Beat], kind: WaveKind) -> WaveSummary {
    let waves: Vec<&WaveFeature> = beats
        .iter()
        .filter_map(|b| match kind {
            WaveKind::P => b.p_wave.as_ref(),
            WaveKind::T => b.t_wave.as_ref(),
        })
        .collect();
    let amplitudes: Vec<f64> = waves.iter().map(|w| w.amplitude).collect();
    let intervals: Vec<f64> = waves.iter().map(|w| w.interval_ms).collect();
    let mean_amplitude = mean(&amplitudes);
    let mean_interval_ms = mean(&intervals);
    let assessment = mean_amplitude
        .zip(mean_interval_ms)
        .map(|(amp, interval)| kind.assess(amp, interval));
    let description = match assessment {
        Some(a) => a.describe(kind),
        None => format!("{kind} wave not detected"),
    };
    WaveSummary {
        kind,
        detected: !waves.is_empty(),
        count: waves.len(),
        mean_amplitude,
        mean_interval_ms,
        assessment,
        description,
    }
}

fn summarize_st(beats: &[Beat]) -> StSegment {
    let levels: Vec<f64> = beats
        .iter()
        .filter_map(|b| b.st_segment.map(|st| st.level))
        .collect();
    match mean(&levels) {
        Some(avg) => {
            let status = StStatus::classify(avg);
            StSegment {
                status,
                average_elevation: Some(avg),
                description: format!("ST segment {} ({:.2})", status.label(), avg),
            }
        }
        None => StSegment {
            status: StStatus::Undetected,
            average_elevation: None,
            description: "ST segment undetected".into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::rpeak::tests::{periodic_peaks, synthetic_signal};

    fn flat_with_r(fs: f64, len: usize, r: usize) -> RawSignal {
        let mut data = vec![0.0; len];
        data[r] = 1.0;
        RawSignal::new(fs, data)
    }

    #[test]
    fn qrs_width_from_fixed_window() {
        let signal = flat_with_r(250.0, 1000, 500);
        let m = extract_morphology(&signal, &Events::from_indices(vec![500]));
        let beat = &m.beats[0];
        // 2 * trunc(0.05 * 250) samples
        assert!((beat.qrs_width_ms - 96.0).abs() < 1e-9);
        assert_eq!(beat.qrs_amplitude, 1.0);
        assert_eq!(m.qrs.count, 1);
        assert_eq!(m.qrs.width_status, RangeStatus::Within);
    }

    #[test]
    fn picks_wave_maxima_inside_windows() {
        let mut signal = flat_with_r(250.0, 1000, 500);
        signal.data[460] = 0.15; // 160 ms before R
        signal.data[570] = 0.3; // 280 ms after R
        let m = extract_morphology(&signal, &Events::from_indices(vec![500]));
        let p = m.beats[0].p_wave.as_ref().expect("p wave");
        assert_eq!(p.position, 460);
        assert!((p.interval_ms + 160.0).abs() < 1e-9);
        assert_eq!(p.assessment, WaveAssessment::Normal);
        let t = m.beats[0].t_wave.as_ref().expect("t wave");
        assert_eq!(t.position, 570);
        assert!((t.interval_ms - 280.0).abs() < 1e-9);
        assert_eq!(t.assessment, WaveAssessment::Normal);
        assert_eq!(m.t_waves.description, "T wave morphology normal");
    }

    #[test]
    fn out_of_bounds_windows_are_not_detected() {
        let signal = flat_with_r(250.0, 300, 25);
        let m = extract_morphology(&signal, &Events::from_indices(vec![25]));
        assert!(m.beats[0].p_wave.is_none());
        assert!(!m.p_waves.detected);
        assert_eq!(m.p_waves.mean_amplitude, None);
        assert_eq!(m.p_waves.description, "P wave not detected");
        assert!(m.beats[0].t_wave.is_some());
    }

    #[test]
    fn wave_amplitude_is_relative_to_pre_beat_baseline() {
        let mut signal = flat_with_r(250.0, 1000, 500);
        signal.data[570] = 0.3;
        for v in signal.data.iter_mut() {
            *v += 0.8;
        }
        let m = extract_morphology(&signal, &Events::from_indices(vec![500]));
        let t = m.beats[0].t_wave.as_ref().expect("t wave");
        assert_eq!(t.position, 570);
        assert!((t.amplitude - 0.3).abs() < 1e-9);
        assert_eq!(t.assessment, WaveAssessment::Normal);
    }

    #[test]
    fn inverted_t_wave_has_negative_amplitude() {
        let mut signal = flat_with_r(250.0, 1000, 500);
        signal.data[575] = -0.25;
        signal.data[590] = 0.05;
        let m = extract_morphology(&signal, &Events::from_indices(vec![500]));
        let t = m.beats[0].t_wave.as_ref().expect("t wave");
        assert_eq!(t.position, 575);
        assert!((t.amplitude + 0.25).abs() < 1e-9);
        assert_eq!(t.assessment, WaveAssessment::AmplitudeAbnormal);
        assert_eq!(m.t_waves.mean_amplitude, Some(-0.25));
    }

    #[test]
    fn wave_assessment_outcomes() {
        assert_eq!(WaveKind::T.assess(0.3, 250.0), WaveAssessment::Normal);
        assert_eq!(
            WaveKind::T.assess(0.9, 250.0),
            WaveAssessment::AmplitudeAbnormal
        );
        assert_eq!(
            WaveKind::T.assess(0.3, 380.0),
            WaveAssessment::IntervalAbnormal
        );
        assert_eq!(WaveKind::P.assess(0.0, -60.0), WaveAssessment::BothAbnormal);
    }

    #[test]
    fn st_elevation_is_measured_against_pre_beat_baseline() {
        let mut signal = flat_with_r(250.0, 1000, 500);
        for v in &mut signal.data[520..540] {
            *v = 0.2;
        }
        let m = extract_morphology(&signal, &Events::from_indices(vec![500]));
        let st = m.beats[0].st_segment.expect("st measured");
        assert!((st.level - 0.2).abs() < 1e-9);
        assert_eq!(st.status, StStatus::Elevated);
        assert_eq!(m.st_segment.status, StStatus::Elevated);
        assert_eq!(m.st_segment.description, "ST segment elevated (0.20)");
    }

    #[test]
    fn st_classification_bounds() {
        assert_eq!(StStatus::classify(0.10), StStatus::Normal);
        assert_eq!(StStatus::classify(-0.05), StStatus::Normal);
        assert_eq!(StStatus::classify(0.11), StStatus::Elevated);
        assert_eq!(StStatus::classify(-0.06), StStatus::Depressed);
    }

    #[test]
    fn st_undetected_near_signal_end() {
        let signal = flat_with_r(250.0, 530, 500);
        let m = extract_morphology(&signal, &Events::from_indices(vec![500]));
        assert!(m.beats[0].st_segment.is_none());
        assert_eq!(m.st_segment.status, StStatus::Undetected);
        assert_eq!(m.st_segment.average_elevation, None);
    }

    #[test]
    fn empty_event_list_yields_undetected_summaries() {
        let signal = synthetic_signal(250.0, 1000, &[]);
        let m = extract_morphology(&signal, &Events::default());
        assert!(m.beats.is_empty());
        assert_eq!(m.qrs.width_status, RangeStatus::Undetected);
        assert_eq!(m.qrs.mean_width_ms, None);
    }

    #[test]
    fn one_beat_per_event() {
        let peaks = periodic_peaks(125, 250, 8);
        let signal = synthetic_signal(250.0, 2000, &peaks);
        let m = extract_morphology(&signal, &Events::from_indices(peaks.clone()));
        let found: Vec<usize> = m.beats.iter().map(|b| b.r_index).collect();
        assert_eq!(found, peaks);
    }
}
