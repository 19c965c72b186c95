//! Single-lead ECG analysis: R-peak detection, waveform morphology, heart-rate
//! variability, rhythm classification, knowledge-base disease risk scoring and
//! a composite health index.

pub mod config;
pub mod detectors;
pub mod error;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod risk;
pub mod signal;

pub use config::{read_config, AnalysisConfig};
pub use error::AnalysisError;
pub use pipeline::{AnalysisOutcome, AnalysisResult, Analyzer};
pub use signal::*;
