#![allow(dead_code)]

use std::{f64::consts::PI, path::PathBuf};

pub const FS: f64 = 250.0;

/// Gaussian R-waves every second on a slow baseline, in mV.
pub fn synthetic_ecg(seconds: usize) -> Vec<f64> {
    let samples = seconds * FS as usize;
    let peaks: Vec<usize> = (0..seconds).map(|i| 125 + i * FS as usize).collect();
    let width = 0.02 * FS;
    (0..samples)
        .map(|i| {
            let mut v = 0.02 * (2.0 * PI * 0.3 * i as f64 / FS).sin();
            for &p in &peaks {
                let d = (i as f64 - p as f64) / width;
                if d.abs() < 6.0 {
                    v += 1.2 * (-0.5 * d * d).exp();
                }
            }
            v
        })
        .collect()
}

pub fn to_adc(samples: &[f64]) -> Vec<i32> {
    samples.iter().map(|v| (v * 1000.0).round() as i32).collect()
}

pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .expect("crates dir")
        .parent()
        .expect("workspace root")
        .to_path_buf()
}

pub fn sample_path(relative: &str) -> String {
    workspace_root()
        .join(relative)
        .to_string_lossy()
        .to_string()
}
