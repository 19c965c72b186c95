use crate::{detectors::rpeak::DetectorConfig, io::binary::LoaderConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Tunables for one analysis, usually read from a TOML file.
///
/// ```toml
/// [loader]
/// sample_rate = 500
/// byte_order = "big"
///
/// [detector]
/// threshold_k = 3.5
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub loader: LoaderConfig,
    pub detector: DetectorConfig,
}

pub fn read_config(path: &Path) -> Result<AnalysisConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: AnalysisConfig =
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}
