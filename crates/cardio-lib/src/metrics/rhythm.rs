use crate::signal::{std_dev, RRSeries};
use serde::{Deserialize, Serialize};

const IRREGULAR_CV: f64 = 0.25;
const BRADYCARDIC_RR_MS: f64 = 1200.0;
const TACHYCARDIC_RR_MS: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RhythmFlag {
    Irregular,
    BradycardicBeat,
    TachycardicBeat,
}

impl RhythmFlag {
    pub fn describe(self) -> &'static str {
        match self {
            RhythmFlag::Irregular => "irregular rhythm",
            RhythmFlag::BradycardicBeat => "bradycardic beat",
            RhythmFlag::TachycardicBeat => "tachycardic beat",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RhythmAssessment {
    /// Coefficient of variation of the unfiltered RR series.
    pub rr_cv: f64,
    pub flags: Vec<RhythmFlag>,
    pub conclusion: String,
}

impl RhythmAssessment {
    pub fn has(&self, flag: RhythmFlag) -> bool {
        self.flags.contains(&flag)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RhythmAnalysis {
    Assessed(RhythmAssessment),
    InsufficientData,
}

impl RhythmAnalysis {
    pub fn assessment(&self) -> Option<&RhythmAssessment> {
        match self {
            RhythmAnalysis::Assessed(a) => Some(a),
            RhythmAnalysis::InsufficientData => None,
        }
    }

    pub fn flag_count(&self) -> usize {
        self.assessment().map_or(0, |a| a.flags.len())
    }
}

/// Flag irregularity and out-of-range beats on the raw RR series.
pub fn classify_rhythm(rr: &RRSeries) -> RhythmAnalysis {
    let Some(mean_rr) = rr.mean() else {
        return RhythmAnalysis::InsufficientData;
    };
    let rr_cv = if mean_rr > 0.0 {
        std_dev(&rr.rr).unwrap_or(0.0) / mean_rr
    } else {
        0.0
    };
    let mut flags = Vec::new();
    if rr_cv > IRREGULAR_CV {
        flags.push(RhythmFlag::Irregular);
    }
    if rr.rr.iter().any(|&x| x > BRADYCARDIC_RR_MS) {
        flags.push(RhythmFlag::BradycardicBeat);
    }
    if rr.rr.iter().any(|&x| x < TACHYCARDIC_RR_MS) {
        flags.push(RhythmFlag::TachycardicBeat);
    }
    let conclusion = if flags.is_empty() {
        "normal rhythm".to_string()
    } else {
        flags
            .iter()
            .map(|f| f.describe())
            .collect::<Vec<_>>()
            .join(", ")
    };
    RhythmAnalysis::Assessed(RhythmAssessment {
        rr_cv,
        flags,
        conclusion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assess(rr: &[f64]) -> RhythmAssessment {
        classify_rhythm(&RRSeries { rr: rr.to_vec() })
            .assessment()
            .cloned()
            .expect("assessed")
    }

    #[test]
    fn steady_rhythm_is_normal() {
        let a = assess(&[1000.0, 980.0, 1010.0, 990.0]);
        assert!(a.flags.is_empty());
        assert_eq!(a.conclusion, "normal rhythm");
    }

    #[test]
    fn flags_are_independent() {
        let a = assess(&[700.0, 1500.0, 650.0, 1400.0]);
        assert_eq!(
            a.flags,
            vec![RhythmFlag::Irregular, RhythmFlag::BradycardicBeat]
        );
        assert_eq!(a.conclusion, "irregular rhythm, bradycardic beat");
    }

    #[test]
    fn fast_beats_without_irregularity() {
        let a = assess(&[550.0, 560.0, 555.0]);
        assert_eq!(a.flags, vec![RhythmFlag::TachycardicBeat]);
        assert!(a.has(RhythmFlag::TachycardicBeat));
        assert!(!a.has(RhythmFlag::Irregular));
    }

    #[test]
    fn all_three_flags() {
        let a = assess(&[400.0, 1300.0, 500.0, 1250.0]);
        assert_eq!(a.flags.len(), 3);
    }

    #[test]
    fn no_intervals_is_insufficient() {
        let analysis = classify_rhythm(&RRSeries::default());
        assert!(analysis.assessment().is_none());
        assert_eq!(analysis.flag_count(), 0);
        let json = serde_json::to_value(&analysis).expect("json");
        assert_eq!(json["status"], "insufficient_data");
    }

    #[test]
    fn flags_serialize_kebab_case() {
        let json = serde_json::to_value(RhythmFlag::BradycardicBeat).expect("json");
        assert_eq!(json, "bradycardic-beat");
    }
}
