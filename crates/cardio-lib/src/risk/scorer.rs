use crate::{
    detectors::{
        morphology::{Morphology, StStatus},
        patterns::{PatternContext, PatternDetector},
    },
    metrics::{intervals::IntervalSummary, ranges::RangeStatus},
    risk::{
        features,
        knowledge::{self, Category, DiseaseDefinition, Severity},
        FeatureMap, FeatureValue, TWaveShape,
    },
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MATCH_BONUS: f64 = 2.0;
const MAX_SCORE: f64 = 10.0;
/// First-degree AV block threshold on the PR interval (ms).
const PROLONGED_PR_MS: f64 = 200.0;
const HYPERKALEMIA_QRS_MS: f64 = 120.0;
const LONG_QTC_MS: f64 = 450.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRiskEntry {
    pub name: String,
    pub category: Category,
    /// 0.0..=10.0, one decimal.
    pub score: f64,
    pub severity: Severity,
    pub description: String,
    /// `feature=value` for every predicate satisfied by the evidence.
    pub matched_features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiseaseRiskAssessment {
    Assessed { risks: BTreeMap<String, DiseaseRiskEntry> },
    InsufficientData,
}

impl DiseaseRiskAssessment {
    pub fn risks(&self) -> Option<&BTreeMap<String, DiseaseRiskEntry>> {
        match self {
            DiseaseRiskAssessment::Assessed { risks } => Some(risks),
            DiseaseRiskAssessment::InsufficientData => None,
        }
    }

    /// Reported conditions by descending score; ties keep name order.
    pub fn top(&self, n: usize) -> Vec<(&str, &DiseaseRiskEntry)> {
        let mut ranked: Vec<_> = self
            .risks()
            .into_iter()
            .flatten()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        ranked.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));
        ranked.truncate(n);
        ranked
    }
}

/// Base severity plus a bonus per satisfied predicate, clamped to 0..=10.
pub fn score_disease(def: &DiseaseDefinition, evidence: &FeatureMap) -> DiseaseRiskEntry {
    let matched_features: Vec<String> = def
        .features
        .iter()
        .filter_map(|(name, predicate)| {
            let value = evidence.get(*name)?;
            predicate.matches(value).then(|| format!("{name}={value}"))
        })
        .collect();
    let raw = def.severity.base_score() + MATCH_BONUS * matched_features.len() as f64;
    let score = (raw.clamp(0.0, MAX_SCORE) * 10.0).round() / 10.0;
    DiseaseRiskEntry {
        name: def.name.to_string(),
        category: def.category,
        score,
        severity: def.severity,
        description: def.description.to_string(),
        matched_features,
    }
}

/// Collects reported conditions; the first report of a name wins.
struct RiskReport<'a> {
    features: &'a FeatureMap,
    risks: BTreeMap<String, DiseaseRiskEntry>,
}

impl RiskReport<'_> {
    /// Score `name` against `evidence`, or the full feature map when none is given.
    fn report(&mut self, name: &str, evidence: Option<FeatureMap>) {
        let Some(def) = knowledge::lookup(name) else {
            warn!("no knowledge-base entry for {name}");
            return;
        };
        if self.risks.contains_key(name) {
            return;
        }
        let entry = match &evidence {
            Some(ev) => score_disease(def, ev),
            None => score_disease(def, self.features),
        };
        debug!("{name}: score {:.1} ({:?})", entry.score, entry.matched_features);
        self.risks.entry(name.to_string()).or_insert(entry);
    }

    fn number(&self, key: &str) -> Option<f64> {
        match self.features.get(key) {
            Some(FeatureValue::Number(x)) => Some(*x),
            _ => None,
        }
    }

    fn label(&self, key: &str) -> Option<&str> {
        match self.features.get(key) {
            Some(FeatureValue::Label(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Recording value for `key`, zero when the recording lacks it.
    fn number_or_zero(&self, key: &'static str) -> FeatureMap {
        features([(key, self.number(key).unwrap_or(0.0))])
    }

    fn flag(&self, key: &str) -> bool {
        matches!(self.features.get(key), Some(FeatureValue::Flag(true)))
    }

    /// Evidence map holding `key` copied from the recording features, if present.
    fn carry(&self, key: &'static str) -> FeatureMap {
        self.features
            .get(key)
            .map(|v| features([(key, v.clone())]))
            .unwrap_or_default()
    }
}

/// Everything a trigger rule may consult besides the feature map.
pub struct RiskInputs<'a> {
    pub morphology: &'a Morphology,
    pub intervals: &'a IntervalSummary,
    pub patterns: &'a dyn PatternDetector,
    pub context: PatternContext<'a>,
}

fn assess_arrhythmias(report: &mut RiskReport<'_>, inputs: &RiskInputs<'_>) {
    let ctx = &inputs.context;
    if inputs.patterns.flutter_waves(ctx).is_detected() {
        let mut evidence = report.carry("hr");
        evidence.insert("f_waves".into(), true.into());
        report.report(knowledge::ATRIAL_FLUTTER, Some(evidence));
    } else if report.flag("irregular") && report.label("p_waves") == Some("absent") {
        let evidence = report.carry("hr");
        report.report(knowledge::ATRIAL_FIBRILLATION, Some(evidence));
    }

    if inputs.morphology.qrs.width_status == RangeStatus::Above {
        let evidence = report.carry("qrs_width");
        report.report(knowledge::PREMATURE_VENTRICULAR_CONTRACTION, Some(evidence));
        if inputs.patterns.consecutive_wide_qrs(ctx).is_detected() {
            let evidence = report.carry("hr");
            report.report(knowledge::VENTRICULAR_TACHYCARDIA, Some(evidence));
        }
    }

    if report.number("pr_interval").is_some_and(|pr| pr > PROLONGED_PR_MS) {
        let evidence = report.carry("pr_interval");
        report.report(knowledge::AV_BLOCK_FIRST_DEGREE, Some(evidence));
    }
}

fn assess_ischemia(report: &mut RiskReport<'_>, inputs: &RiskInputs<'_>) {
    let st = &inputs.morphology.st_segment;
    let level = st.average_elevation.unwrap_or(0.0);
    match st.status {
        StStatus::Elevated => report.report(
            knowledge::ACUTE_MYOCARDIAL_INFARCTION,
            Some(features([("st_elevation", level)])),
        ),
        StStatus::Depressed => report.report(
            knowledge::MYOCARDIAL_ISCHEMIA,
            Some(features([("st_depression", level)])),
        ),
        StStatus::Normal | StStatus::Undetected => {}
    }
    if report.label("t_waves") == Some(TWaveShape::Inverted.label()) {
        report.report(
            knowledge::SUBENDOCARDIAL_ISCHEMIA,
            Some(features([("t_inversion", true)])),
        );
    }
}

fn assess_electrolytes(report: &mut RiskReport<'_>, inputs: &RiskInputs<'_>) {
    if inputs.patterns.prominent_u_waves(&inputs.context).is_detected() {
        let evidence = report.number_or_zero("u_wave_ratio");
        report.report(knowledge::HYPOKALEMIA, Some(evidence));
    }
    let peaked = report.label("t_waves") == Some(TWaveShape::Peaked.label());
    let wide = report
        .number("qrs_width")
        .is_some_and(|w| w > HYPERKALEMIA_QRS_MS);
    if peaked && wide {
        let evidence = report.carry("qrs_width");
        report.report(knowledge::HYPERKALEMIA, Some(evidence));
    }
}

fn assess_genetic(report: &mut RiskReport<'_>, inputs: &RiskInputs<'_>) {
    if inputs.intervals.qtc_ms.is_some_and(|q| q > LONG_QTC_MS) {
        let evidence = report.carry("qtc");
        report.report(knowledge::LONG_QT_SYNDROME, Some(evidence));
    }
    if inputs.patterns.brugada(&inputs.context).is_detected() {
        report.report(knowledge::BRUGADA_SYNDROME, None);
    }
}

fn assess_systemic(report: &mut RiskReport<'_>, inputs: &RiskInputs<'_>) {
    let ctx = &inputs.context;
    if inputs.patterns.cyclic_heart_rate_variation(ctx).is_detected() {
        report.report(knowledge::SLEEP_APNEA, None);
    }
    if inputs.patterns.s1q3t3(ctx).is_detected() {
        report.report(knowledge::PULMONARY_EMBOLISM, None);
    }
}

/// Run the trigger rules category by category and score every reported condition.
pub fn assess_disease_risks(
    features: &FeatureMap,
    inputs: &RiskInputs<'_>,
) -> BTreeMap<String, DiseaseRiskEntry> {
    let mut report = RiskReport {
        features,
        risks: BTreeMap::new(),
    };
    assess_arrhythmias(&mut report, inputs);
    assess_ischemia(&mut report, inputs);
    assess_electrolytes(&mut report, inputs);
    assess_genetic(&mut report, inputs);
    assess_systemic(&mut report, inputs);
    report.risks
}
