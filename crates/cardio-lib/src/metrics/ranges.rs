use serde::{Deserialize, Serialize};

/// Inclusive reference interval for one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthyRange {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    Below,
    Within,
    Above,
    Undetected,
}

impl HealthyRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn classify(&self, value: f64) -> RangeStatus {
        if value < self.low {
            RangeStatus::Below
        } else if value > self.high {
            RangeStatus::Above
        } else {
            RangeStatus::Within
        }
    }

    pub fn classify_opt(&self, value: Option<f64>) -> RangeStatus {
        value.map_or(RangeStatus::Undetected, |v| self.classify(v))
    }
}

/// Heart rate (bpm)
pub const HEART_RATE: HealthyRange = HealthyRange::new(60.0, 100.0);
/// RMSSD (ms)
pub const HRV_RMSSD: HealthyRange = HealthyRange::new(20.0, 60.0);
/// QRS width (ms)
pub const QRS_WIDTH: HealthyRange = HealthyRange::new(80.0, 120.0);
/// PR interval (ms)
pub const PR_INTERVAL: HealthyRange = HealthyRange::new(120.0, 200.0);
/// QT interval (ms)
pub const QT_INTERVAL: HealthyRange = HealthyRange::new(350.0, 440.0);
/// Corrected QT (ms)
pub const QTC: HealthyRange = HealthyRange::new(340.0, 450.0);
