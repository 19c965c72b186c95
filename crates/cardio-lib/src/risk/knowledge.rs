//! Static condition table consulted by the risk scorer.
//!
//! Entries are plain `'static` data: nothing mutates the table after the
//! binary is built, so any number of analyses can read it concurrently.

use crate::risk::FeatureValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Arrhythmia,
    Ischemia,
    Electrolyte,
    Genetic,
    Systemic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Lowest,
    Low,
    Medium,
    MediumHigh,
    High,
    Highest,
}

impl Severity {
    pub fn base_score(self) -> f64 {
        match self {
            Severity::Lowest => 1.0,
            Severity::Low => 2.0,
            Severity::Medium => 4.0,
            Severity::MediumHigh => 6.0,
            Severity::High => 8.0,
            Severity::Highest => 10.0,
        }
    }
}

/// One comparison against a feature value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Flag(bool),
    Label(&'static str),
    Above(f64),
    Below(f64),
}

impl Condition {
    /// Mismatched kinds (a label against a number) never match.
    pub fn matches(&self, value: &FeatureValue) -> bool {
        match (self, value) {
            (Condition::Flag(want), FeatureValue::Flag(got)) => want == got,
            (Condition::Label(want), FeatureValue::Label(got)) => want == got,
            (Condition::Above(limit), FeatureValue::Number(got)) => got > limit,
            (Condition::Below(limit), FeatureValue::Number(got)) => got < limit,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Single(Condition),
    /// Satisfied when any alternative matches; counts once.
    AnyOf(&'static [Condition]),
}

impl Predicate {
    pub fn matches(&self, value: &FeatureValue) -> bool {
        match self {
            Predicate::Single(c) => c.matches(value),
            Predicate::AnyOf(alternatives) => alternatives.iter().any(|c| c.matches(value)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiseaseDefinition {
    pub name: &'static str,
    pub category: Category,
    pub features: &'static [(&'static str, Predicate)],
    pub severity: Severity,
    pub description: &'static str,
}

pub const ATRIAL_FLUTTER: &str = "Atrial flutter";
pub const ATRIAL_FIBRILLATION: &str = "Atrial fibrillation";
pub const PREMATURE_VENTRICULAR_CONTRACTION: &str = "Premature ventricular contraction";
pub const VENTRICULAR_TACHYCARDIA: &str = "Ventricular tachycardia";
pub const AV_BLOCK_FIRST_DEGREE: &str = "First-degree AV block";
pub const AV_BLOCK_MOBITZ_I: &str = "Second-degree AV block (Mobitz I)";
pub const WOLFF_PARKINSON_WHITE: &str = "Wolff-Parkinson-White syndrome";
pub const JUNCTIONAL_RHYTHM: &str = "Junctional rhythm";
pub const MYOCARDIAL_ISCHEMIA: &str = "Myocardial ischemia";
pub const ACUTE_MYOCARDIAL_INFARCTION: &str = "Acute myocardial infarction";
pub const SUBENDOCARDIAL_ISCHEMIA: &str = "Subendocardial ischemia";
pub const HYPOKALEMIA: &str = "Hypokalemia";
pub const HYPERKALEMIA: &str = "Hyperkalemia";
pub const DIGITALIS_EFFECT: &str = "Digitalis effect";
pub const LONG_QT_SYNDROME: &str = "Long QT syndrome";
pub const BRUGADA_SYNDROME: &str = "Brugada syndrome";
pub const EARLY_REPOLARIZATION: &str = "Early repolarization syndrome";
pub const PULMONARY_EMBOLISM: &str = "Pulmonary embolism";
pub const RAISED_INTRACRANIAL_PRESSURE: &str = "Raised intracranial pressure";
pub const HYPERTHYROIDISM: &str = "Hyperthyroidism";
pub const VAGAL_HYPERTONIA: &str = "Vagal hypertonia";
pub const POSTURAL_TACHYCARDIA: &str = "Postural orthostatic tachycardia";
pub const SLEEP_APNEA: &str = "Sleep apnea";
pub const COPD: &str = "Chronic obstructive pulmonary disease";

use Condition::{Above, Below, Flag, Label};
use Predicate::{AnyOf, Single};

static KNOWLEDGE_BASE: [DiseaseDefinition; 24] = [
    // arrhythmias and conduction disorders
    DiseaseDefinition {
        name: ATRIAL_FLUTTER,
        category: Category::Arrhythmia,
        features: &[
            ("hr", Single(Above(250.0))),
            ("f_waves", Single(Flag(true))),
            ("regularity", Single(Label("regular"))),
        ],
        severity: Severity::MediumHigh,
        description: "Rapid regular atrial activity; ventricular response usually regular",
    },
    DiseaseDefinition {
        name: ATRIAL_FIBRILLATION,
        category: Category::Arrhythmia,
        features: &[
            ("irregular", Single(Flag(true))),
            ("p_waves", Single(Label("absent"))),
            ("fibrillatory_waves", Single(Flag(true))),
        ],
        severity: Severity::High,
        description: "Disorganized atrial activity with an irregularly irregular ventricular rate",
    },
    DiseaseDefinition {
        name: PREMATURE_VENTRICULAR_CONTRACTION,
        category: Category::Arrhythmia,
        features: &[
            ("qrs_width", Single(Above(120.0))),
            ("compensatory_pause", Single(Label("complete"))),
            ("p_waves", Single(Label("dissociated"))),
        ],
        severity: Severity::Medium,
        description: "Early ventricular depolarization producing an abnormal beat",
    },
    DiseaseDefinition {
        name: VENTRICULAR_TACHYCARDIA,
        category: Category::Arrhythmia,
        features: &[
            ("hr", Single(Above(100.0))),
            ("qrs_width", Single(Above(120.0))),
            ("consecutive_wide_qrs", Single(Above(2.0))),
        ],
        severity: Severity::Highest,
        description: "Three or more consecutive premature ventricular beats",
    },
    DiseaseDefinition {
        name: AV_BLOCK_FIRST_DEGREE,
        category: Category::Arrhythmia,
        features: &[
            ("pr_interval", Single(Above(200.0))),
            ("qrs_width", Single(Below(120.0))),
        ],
        severity: Severity::Medium,
        description: "Prolonged PR interval with every P wave conducted",
    },
    DiseaseDefinition {
        name: AV_BLOCK_MOBITZ_I,
        category: Category::Arrhythmia,
        features: &[
            ("pr_prolongation", Single(Flag(true))),
            ("dropped_beats", Single(Flag(true))),
        ],
        severity: Severity::MediumHigh,
        description: "PR interval lengthens progressively until a QRS is dropped",
    },
    DiseaseDefinition {
        name: WOLFF_PARKINSON_WHITE,
        category: Category::Arrhythmia,
        features: &[
            ("pr_interval", Single(Below(120.0))),
            ("delta_wave", Single(Flag(true))),
            ("qrs_width", Single(Above(110.0))),
        ],
        severity: Severity::MediumHigh,
        description: "Accessory pathway causing ventricular pre-excitation",
    },
    DiseaseDefinition {
        name: JUNCTIONAL_RHYTHM,
        category: Category::Arrhythmia,
        features: &[
            ("qrs_width", Single(Below(120.0))),
            ("p_waves", AnyOf(&[Label("retrograde"), Label("absent")])),
        ],
        severity: Severity::Low,
        description: "Rhythm originating in the atrioventricular junction",
    },
    // ischemia and infarction
    DiseaseDefinition {
        name: MYOCARDIAL_ISCHEMIA,
        category: Category::Ischemia,
        features: &[
            ("st_segment", AnyOf(&[Label("depressed"), Label("horizontal")])),
            ("t_waves", AnyOf(&[Label("inverted"), Label("flat")])),
            ("duration", Single(Above(60.0))),
        ],
        severity: Severity::MediumHigh,
        description: "Insufficient subendocardial blood supply",
    },
    DiseaseDefinition {
        name: ACUTE_MYOCARDIAL_INFARCTION,
        category: Category::Ischemia,
        features: &[
            ("st_segment", Single(Label("elevated"))),
            ("q_waves", Single(Label("pathological"))),
            ("t_waves", Single(Label("evolving"))),
        ],
        severity: Severity::Highest,
        description: "Acute coronary occlusion causing myocardial necrosis",
    },
    DiseaseDefinition {
        name: SUBENDOCARDIAL_ISCHEMIA,
        category: Category::Ischemia,
        features: &[
            ("t_waves", Single(Label("deeply_inverted"))),
            ("st_segment", Single(Label("mildly_depressed"))),
        ],
        severity: Severity::Medium,
        description: "Widespread subendocardial ischemia",
    },
    // electrolyte and metabolic
    DiseaseDefinition {
        name: HYPOKALEMIA,
        category: Category::Electrolyte,
        features: &[
            ("u_waves", Single(Label("prominent"))),
            ("t_waves", Single(Label("flat"))),
            ("st_segment", Single(Label("depressed"))),
        ],
        severity: Severity::Medium,
        description: "Serum potassium below 3.5 mmol/L",
    },
    DiseaseDefinition {
        name: HYPERKALEMIA,
        category: Category::Electrolyte,
        features: &[
            ("t_waves", Single(Label("peaked"))),
            ("qrs_width", Single(Above(120.0))),
            ("p_waves", Single(Label("diminished"))),
        ],
        severity: Severity::High,
        description: "Serum potassium above 5.5 mmol/L",
    },
    DiseaseDefinition {
        name: DIGITALIS_EFFECT,
        category: Category::Electrolyte,
        features: &[
            ("st_segment", Single(Label("downsloping"))),
            ("t_waves", Single(Label("scooped"))),
        ],
        severity: Severity::Medium,
        description: "Characteristic changes caused by digitalis glycosides",
    },
    // genetic and primary
    DiseaseDefinition {
        name: LONG_QT_SYNDROME,
        category: Category::Genetic,
        features: &[
            ("qtc", Single(Above(450.0))),
            ("t_waves", AnyOf(&[Label("notched"), Label("alternans")])),
            ("torsades", Single(Label("possible"))),
        ],
        severity: Severity::High,
        description: "Delayed repolarization with risk of malignant arrhythmia",
    },
    DiseaseDefinition {
        name: BRUGADA_SYNDROME,
        category: Category::Genetic,
        features: &[
            ("st_segment", Single(Label("saddleback"))),
            ("leads", AnyOf(&[Label("V1"), Label("V2")])),
            ("hr_status", Single(Label("within"))),
        ],
        severity: Severity::Highest,
        description: "Sodium channelopathy with high risk of sudden death",
    },
    DiseaseDefinition {
        name: EARLY_REPOLARIZATION,
        category: Category::Genetic,
        features: &[
            ("j_point", Single(Label("elevated"))),
            ("st_segment", Single(Label("concave"))),
        ],
        severity: Severity::Low,
        description: "Benign J-point elevation",
    },
    // systemic
    DiseaseDefinition {
        name: PULMONARY_EMBOLISM,
        category: Category::Systemic,
        features: &[
            ("pattern", Single(Label("S1Q3T3"))),
            ("sinus_tachycardia", Single(Flag(true))),
            ("t_waves", Single(Label("inverted"))),
        ],
        severity: Severity::High,
        description: "Pulmonary arterial thrombus increasing right-heart load",
    },
    DiseaseDefinition {
        name: RAISED_INTRACRANIAL_PRESSURE,
        category: Category::Systemic,
        features: &[
            ("t_waves", Single(Label("deeply_inverted"))),
            ("qt_interval", Single(Above(440.0))),
        ],
        severity: Severity::High,
        description: "Characteristic changes secondary to cerebral lesions",
    },
    DiseaseDefinition {
        name: HYPERTHYROIDISM,
        category: Category::Systemic,
        features: &[
            ("hr", Single(Above(100.0))),
            ("st_t_changes", Single(Label("nonspecific"))),
        ],
        severity: Severity::Medium,
        description: "Tachycardia driven by excess thyroid hormone",
    },
    DiseaseDefinition {
        name: VAGAL_HYPERTONIA,
        category: Category::Systemic,
        features: &[
            ("hr", Single(Below(60.0))),
            ("respiratory_variation", Single(Flag(true))),
        ],
        severity: Severity::Low,
        description: "Bradycardia from vagal predominance",
    },
    DiseaseDefinition {
        name: POSTURAL_TACHYCARDIA,
        category: Category::Systemic,
        features: &[
            ("hr_increase", Single(Above(30.0))),
            ("postural_change", Single(Flag(true))),
        ],
        severity: Severity::Medium,
        description: "Excessive heart-rate rise on change of posture",
    },
    DiseaseDefinition {
        name: SLEEP_APNEA,
        category: Category::Systemic,
        features: &[
            ("hr_variation", Single(Label("cyclic"))),
            ("bradycardia", Single(Label("nocturnal"))),
            ("qt_interval", Single(Above(440.0))),
        ],
        severity: Severity::Medium,
        description: "Recurrent apnea during sleep causing hypoxia",
    },
    DiseaseDefinition {
        name: COPD,
        category: Category::Systemic,
        features: &[
            ("p_pulmonale", Single(Flag(true))),
            ("right_axis_deviation", Single(Flag(true))),
        ],
        severity: Severity::Medium,
        description: "Chronic lung disease increasing right-heart load",
    },
];

pub fn knowledge_base() -> &'static [DiseaseDefinition] {
    &KNOWLEDGE_BASE
}

pub fn lookup(name: &str) -> Option<&'static DiseaseDefinition> {
    KNOWLEDGE_BASE.iter().find(|d| d.name == name)
}
