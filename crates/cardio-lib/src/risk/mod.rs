//! Knowledge-base disease risk scoring.
//!
//! A recording is reduced to a flat [`FeatureMap`] of named values. Trigger
//! rules in [`scorer`] decide which conditions are reported; each reported
//! condition is then scored against its [`knowledge`] definition.

pub mod knowledge;
pub mod scorer;

use crate::{
    detectors::morphology::{Morphology, WaveKind},
    metrics::{intervals::IntervalSummary, ranges::RangeStatus, rhythm::{RhythmAnalysis, RhythmFlag}},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

pub use knowledge::{Category, DiseaseDefinition, Severity};
pub use scorer::{assess_disease_risks, score_disease, DiseaseRiskAssessment, DiseaseRiskEntry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Flag(bool),
    Number(f64),
    Label(String),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Flag(b) => write!(f, "{b}"),
            FeatureValue::Number(x) => write!(f, "{x:.1}"),
            FeatureValue::Label(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FeatureValue {
    fn from(b: bool) -> Self {
        FeatureValue::Flag(b)
    }
}

impl From<f64> for FeatureValue {
    fn from(x: f64) -> Self {
        FeatureValue::Number(x)
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Label(s.to_string())
    }
}

pub type FeatureMap = BTreeMap<String, FeatureValue>;

/// Build a feature map from literal pairs.
pub fn features<I, V>(pairs: I) -> FeatureMap
where
    I: IntoIterator<Item = (&'static str, V)>,
    V: Into<FeatureValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.into()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TWaveShape {
    Inverted,
    Flat,
    Peaked,
    Normal,
}

impl TWaveShape {
    /// Classify from the mean baseline-relative T amplitude against the normal
    /// T amplitude band. Deviations within the band's lower edge either side of
    /// the baseline read as flat.
    pub fn from_amplitude(amplitude: f64) -> Self {
        let ((low, high), _) = WaveKind::T.thresholds();
        if amplitude < -low {
            TWaveShape::Inverted
        } else if amplitude < low {
            TWaveShape::Flat
        } else if amplitude > high {
            TWaveShape::Peaked
        } else {
            TWaveShape::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TWaveShape::Inverted => "inverted",
            TWaveShape::Flat => "flat",
            TWaveShape::Peaked => "peaked",
            TWaveShape::Normal => "normal",
        }
    }
}

fn range_label(status: RangeStatus) -> &'static str {
    match status {
        RangeStatus::Below => "below",
        RangeStatus::Within => "within",
        RangeStatus::Above => "above",
        RangeStatus::Undetected => "undetected",
    }
}

/// Flatten the recording-level measurements into the feature map the
/// knowledge base is scored against. Unavailable measurements are omitted.
pub fn recording_features(
    morphology: &Morphology,
    intervals: &IntervalSummary,
    rhythm: &RhythmAnalysis,
    duration_s: f64,
) -> FeatureMap {
    let mut map = FeatureMap::new();
    let mut put = |key: &str, value: FeatureValue| {
        map.insert(key.to_string(), value);
    };

    if let Some(hr) = intervals.heart_rate.bpm {
        put("hr", hr.into());
    }
    put("hr_status", range_label(intervals.heart_rate.status).into());

    let irregular = rhythm
        .assessment()
        .is_some_and(|a| a.has(RhythmFlag::Irregular));
    put("irregular", irregular.into());
    put(
        "regularity",
        if irregular { "irregular" } else { "regular" }.into(),
    );

    put(
        "p_waves",
        if morphology.p_waves.detected {
            "present"
        } else {
            "absent"
        }
        .into(),
    );
    if let Some(width) = morphology.qrs.mean_width_ms {
        put("qrs_width", width.into());
    }
    if let Some(pr) = intervals.pr_interval_ms {
        put("pr_interval", pr.into());
    }
    if let Some(qt) = intervals.qt_interval_ms {
        put("qt_interval", qt.into());
    }
    if let Some(qtc) = intervals.qtc_ms {
        put("qtc", qtc.into());
    }
    put("st_segment", morphology.st_segment.status.label().into());
    if let Some(amplitude) = morphology.t_waves.mean_amplitude {
        put("t_waves", TWaveShape::from_amplitude(amplitude).label().into());
    }
    put("duration", duration_s.into());
    map
}
