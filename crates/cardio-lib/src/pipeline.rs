//! End-to-end analysis of one recording.
//!
//! Input validation → R-peak detection → morphology → intervals and HRV →
//! rhythm → disease risks → health index. Each stage is a pure function of
//! the previous ones; [`Analyzer`] only holds configuration and the pattern
//! detector, so one instance can serve concurrent analyses.

use crate::{
    config::AnalysisConfig,
    detectors::{
        morphology::{extract_morphology, Beat, QrsSummary, StSegment, WaveSummary},
        patterns::{NoPatterns, PatternContext, PatternDetector},
        rpeak::detect_r_peaks,
    },
    error::AnalysisError,
    io::binary::{load_signal, signal_from_samples},
    metrics::{
        health,
        hrv::{hrv_time, HrvAnalysis},
        intervals::{summarize_intervals, IntervalSummary},
        rhythm::{classify_rhythm, RhythmAnalysis},
    },
    risk::{
        recording_features,
        scorer::{assess_disease_risks, DiseaseRiskAssessment, DiseaseRiskEntry, RiskInputs},
    },
    signal::{RRSeries, RawSignal},
};
use chrono::Local;
use log::{info, warn};
use serde::Serialize;
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize)]
pub struct BasicInfo {
    pub filename: String,
    pub duration_s: f64,
    pub sample_count: usize,
    pub sample_rate: f64,
    /// Local time the analysis finished.
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub basic_info: BasicInfo,
    pub beats: Vec<Beat>,
    pub qrs: QrsSummary,
    pub p_waves: WaveSummary,
    pub t_waves: WaveSummary,
    pub st_segment: StSegment,
    pub intervals: IntervalSummary,
    pub hrv: HrvAnalysis,
    pub rhythm: RhythmAnalysis,
    pub disease_risks: DiseaseRiskAssessment,
    pub health_index: u8,
}

impl AnalysisResult {
    /// The `n` highest-scoring reported conditions.
    pub fn top_risks(&self, n: usize) -> Vec<(&str, &DiseaseRiskEntry)> {
        self.disease_risks.top(n)
    }
}

/// Serialized form of one analysis attempt.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Success(Box<AnalysisResult>),
    Error { kind: String, message: String },
}

impl From<Result<AnalysisResult, AnalysisError>> for AnalysisOutcome {
    fn from(result: Result<AnalysisResult, AnalysisError>) -> Self {
        match result {
            Ok(r) => AnalysisOutcome::Success(Box::new(r)),
            Err(e) => AnalysisOutcome::Error {
                kind: e.kind().to_string(),
                message: e.to_string(),
            },
        }
    }
}

pub struct Analyzer {
    config: AnalysisConfig,
    patterns: Box<dyn PatternDetector>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            patterns: Box::new(NoPatterns),
        }
    }

    /// Replace the stock pattern detector used by the risk triggers.
    pub fn with_patterns(mut self, patterns: Box<dyn PatternDetector>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Decode `bytes` with the loader configuration and analyze the result.
    pub fn analyze(&self, filename: &str, bytes: &[u8]) -> Result<AnalysisResult, AnalysisError> {
        let signal = load_signal(bytes, &self.config.loader)?;
        self.run_guarded(filename, &signal)
    }

    /// Analyze samples that were already decoded (text or CSV sources).
    pub fn analyze_samples(
        &self,
        filename: &str,
        samples: Vec<f64>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let signal = signal_from_samples(samples, &self.config.loader)?;
        self.run_guarded(filename, &signal)
    }

    fn run_guarded(&self, filename: &str, signal: &RawSignal) -> Result<AnalysisResult, AnalysisError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.run(filename, signal))).map_err(|payload| {
            let message = panic_message(&*payload);
            warn!("{filename}: analysis aborted: {message}");
            AnalysisError::Internal(message)
        })
    }

    fn run(&self, filename: &str, signal: &RawSignal) -> AnalysisResult {
        let events = detect_r_peaks(signal, &self.config.detector);
        let morphology = extract_morphology(signal, &events);
        let rr = RRSeries::from_events(&events, signal.fs);
        let intervals = summarize_intervals(&rr, &morphology);
        let hrv = hrv_time(&rr);
        let rhythm = classify_rhythm(&rr);

        let disease_risks = if morphology.beats.len() < 2 {
            warn!(
                "{filename}: {} beat(s) detected, skipping risk assessment",
                morphology.beats.len()
            );
            DiseaseRiskAssessment::InsufficientData
        } else {
            let features =
                recording_features(&morphology, &intervals, &rhythm, signal.duration());
            let inputs = RiskInputs {
                morphology: &morphology,
                intervals: &intervals,
                patterns: self.patterns.as_ref(),
                context: PatternContext {
                    signal,
                    beats: &morphology.beats,
                    rr: &rr,
                },
            };
            DiseaseRiskAssessment::Assessed {
                risks: assess_disease_risks(&features, &inputs),
            }
        };
        let health_index = health::health_index(&hrv, &morphology.qrs, &rhythm);
        info!(
            "{filename}: {} beats, health index {health_index}, {} risk(s)",
            morphology.beats.len(),
            disease_risks.risks().map_or(0, |r| r.len())
        );

        AnalysisResult {
            basic_info: BasicInfo {
                filename: filename.to_string(),
                duration_s: signal.duration(),
                sample_count: signal.len(),
                sample_rate: signal.fs,
                timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            },
            beats: morphology.beats,
            qrs: morphology.qrs,
            p_waves: morphology.p_waves,
            t_waves: morphology.t_waves,
            st_segment: morphology.st_segment,
            intervals,
            hrv,
            rhythm,
            disease_risks,
            health_index,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        detectors::{
            patterns::PatternStatus,
            rpeak::tests::{periodic_peaks, synthetic_signal},
        },
        io::binary::{encode_samples, ByteOrder, LoaderConfig, SampleFormat},
        metrics::rhythm::RhythmFlag,
        risk::knowledge,
    };
    use chrono::NaiveDateTime;

    fn sixty_bpm() -> RawSignal {
        synthetic_signal(250.0, 5000, &periodic_peaks(125, 250, 20))
    }

    #[test]
    fn steady_sixty_bpm_recording() {
        let result = Analyzer::default()
            .analyze_samples("steady.dat", sixty_bpm().data)
            .expect("analysis");
        assert_eq!(result.beats.len(), 20);
        let bpm = result.intervals.heart_rate.bpm.expect("heart rate");
        assert!((bpm - 60.0).abs() < 1e-9);
        let hrv = result.hrv.metrics().expect("hrv");
        assert!(hrv.rmssd_ms < 1e-9);
        assert!(hrv.sdnn_ms < 1e-9);
        assert!(result.rhythm.assessment().expect("rhythm").flags.is_empty());
        // no HRV bonus, QRS within range, no rhythm flags
        assert_eq!(result.health_index, 75);
        let risks = result.disease_risks.risks().expect("assessed");
        assert!(risks.values().all(|e| (0.0..=10.0).contains(&e.score)));
    }

    #[test]
    fn binary_buffer_is_decoded_with_gain() {
        let signal = synthetic_signal(250.0, 2500, &periodic_peaks(125, 250, 10));
        let raw: Vec<i32> = signal
            .data
            .iter()
            .map(|v| (v * 1000.0).round() as i32)
            .collect();
        let bytes = encode_samples(&raw, SampleFormat::I16, ByteOrder::Big);
        let config = AnalysisConfig {
            loader: LoaderConfig {
                byte_order: ByteOrder::Big,
                gain: 1000.0,
                ..LoaderConfig::default()
            },
            ..AnalysisConfig::default()
        };
        let result = Analyzer::new(config).analyze("rec.dat", &bytes).expect("analysis");
        assert_eq!(result.basic_info.sample_count, 2500);
        assert_eq!(result.basic_info.filename, "rec.dat");
        assert!((result.basic_info.duration_s - 10.0).abs() < 1e-12);
        assert_eq!(result.beats.len(), 10);
        assert!(NaiveDateTime::parse_from_str(&result.basic_info.timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn single_beat_is_explicitly_insufficient() {
        let signal = synthetic_signal(250.0, 500, &[250]);
        let result = Analyzer::default()
            .analyze_samples("one.dat", signal.data)
            .expect("analysis");
        assert_eq!(result.beats.len(), 1);
        assert!(matches!(result.hrv, HrvAnalysis::InsufficientData { .. }));
        assert!(matches!(result.rhythm, RhythmAnalysis::InsufficientData));
        assert!(result.disease_risks.risks().is_none());
        assert!(result.top_risks(3).is_empty());
        assert_eq!(result.health_index, 75);

        let json = serde_json::to_value(AnalysisOutcome::from(Ok(result))).expect("json");
        assert_eq!(json["status"], "success");
        assert_eq!(json["hrv"]["status"], "insufficient_data");
        assert_eq!(json["disease_risks"]["status"], "insufficient_data");
    }

    #[test]
    fn clean_recordings_report_no_ischemia() {
        let short = synthetic_signal(250.0, 1000, &[300, 550]);
        for (name, signal) in [("short.dat", short), ("steady.dat", sixty_bpm())] {
            let result = Analyzer::default()
                .analyze_samples(name, signal.data)
                .expect("analysis");
            let t = result.t_waves.mean_amplitude.expect("t waves");
            assert!(t.abs() < 0.1, "{name}: T amplitude {t}");
            let risks = result.disease_risks.risks().expect("assessed");
            for condition in [
                knowledge::SUBENDOCARDIAL_ISCHEMIA,
                knowledge::MYOCARDIAL_ISCHEMIA,
                knowledge::ACUTE_MYOCARDIAL_INFARCTION,
            ] {
                assert!(!risks.contains_key(condition), "{name}: {condition}");
            }
        }
    }

    #[test]
    fn too_few_valid_intervals_still_assess_rhythm() {
        // RR 800 ms then 2400 ms: both fall outside 70-130% of the median
        let signal = synthetic_signal(250.0, 1250, &[200, 400, 1000]);
        let result = Analyzer::default()
            .analyze_samples("uneven.dat", signal.data)
            .expect("analysis");
        assert_eq!(result.beats.len(), 3);
        match result.hrv {
            HrvAnalysis::InsufficientData { valid_intervals } => assert_eq!(valid_intervals, 0),
            ref other => panic!("expected insufficient HRV, got {other:?}"),
        }
        let rhythm = result.rhythm.assessment().expect("rhythm");
        assert_eq!(
            rhythm.flags,
            vec![RhythmFlag::Irregular, RhythmFlag::BradycardicBeat]
        );
        assert!(result.disease_risks.risks().is_some());
        // QRS within range, two rhythm flags
        assert_eq!(result.health_index, 55);
    }

    #[test]
    fn invalid_input_fails_before_any_stage() {
        let analyzer = Analyzer::default();
        assert_eq!(analyzer.analyze("empty.dat", &[]).unwrap_err(), AnalysisError::EmptyInput);
        let short = encode_samples(&[0; 100], SampleFormat::I16, ByteOrder::Little);
        assert!(matches!(
            analyzer.analyze("short.dat", &short),
            Err(AnalysisError::InsufficientDuration { .. })
        ));

        let outcome = AnalysisOutcome::from(analyzer.analyze("empty.dat", &[]));
        let json = serde_json::to_value(outcome).expect("json");
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "empty_input");
    }

    struct FaultyPatterns;

    impl PatternDetector for FaultyPatterns {
        fn flutter_waves(&self, _ctx: &PatternContext<'_>) -> PatternStatus {
            panic!("flutter detector fault")
        }
    }

    #[test]
    fn stage_panics_become_internal_errors() {
        let analyzer = Analyzer::default().with_patterns(Box::new(FaultyPatterns));
        match analyzer.analyze_samples("faulty.dat", sixty_bpm().data) {
            Err(AnalysisError::Internal(message)) => {
                assert!(message.contains("flutter detector fault"))
            }
            other => panic!("expected internal error, got {other:?}"),
        }
    }

    #[test]
    fn one_analyzer_serves_concurrent_analyses() {
        let analyzer = Analyzer::default();
        let signal = sixty_bpm();
        let indices: Vec<Vec<usize>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let analyzer = &analyzer;
                    let data = signal.data.clone();
                    s.spawn(move || {
                        let result = analyzer
                            .analyze_samples(&format!("thread-{i}.dat"), data)
                            .expect("analysis");
                        result.beats.iter().map(|b| b.r_index).collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("thread"))
                .collect()
        });
        assert!(indices.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(indices[0], periodic_peaks(125, 250, 20));
    }
}
