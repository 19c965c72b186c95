mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use cardio_lib::io::binary::{encode_samples, ByteOrder, SampleFormat};
use common::{synthetic_ecg, to_adc};
use serde_json::Value;
use std::{error::Error, fs};
use tempfile::tempdir;

fn expected_peaks(count: usize) -> Vec<u64> {
    (0..count as u64).map(|i| 125 + i * 250).collect()
}

fn indices(js: &Value) -> Vec<u64> {
    js["indices"]
        .as_array()
        .expect("indices")
        .iter()
        .filter_map(Value::as_u64)
        .collect()
}

#[test]
fn detect_rpeaks_from_csv_column() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("lead.csv");
    let mut body = String::from("time, ECG\n");
    for (i, v) in synthetic_ecg(8).iter().enumerate() {
        body.push_str(&format!("{:.3},{v:.5}\n", i as f64 / 250.0));
    }
    fs::write(&path, body)?;

    let mut cmd = cargo_bin_cmd!("cardio");
    cmd.args(["detect-rpeaks", "--input", path.to_str().expect("utf8 path")]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let js: Value = serde_json::from_slice(&output)?;
    assert_eq!(indices(&js), expected_peaks(8));
    Ok(())
}

#[test]
fn detect_rpeaks_binary_with_flag_overrides() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("lead.raw");
    let raw = to_adc(&synthetic_ecg(6));
    fs::write(&path, encode_samples(&raw, SampleFormat::I32, ByteOrder::Big))?;

    let mut cmd = cargo_bin_cmd!("cardio");
    cmd.args([
        "detect-rpeaks",
        "--input",
        path.to_str().expect("utf8 path"),
        "--sample-format",
        "i32",
        "--byte-order",
        "big",
        "--gain",
        "1000",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let js: Value = serde_json::from_slice(&output)?;
    assert_eq!(indices(&js), expected_peaks(6));
    Ok(())
}

#[test]
fn hrv_reads_rr_from_stdin() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("cardio");
    cmd.arg("hrv")
        .write_stdin("820\n780\n800\n790\n830\n770\n840\n880\n860\n810\n");
    let output = cmd.assert().success().get_output().stdout.clone();
    let js: Value = serde_json::from_slice(&output)?;
    assert_eq!(js["status"], "available");
    assert_eq!(js["n"], 10);
    let rmssd = js["rmssd_ms"].as_f64().expect("rmssd");
    assert!((rmssd - 43.0761599).abs() < 1e-6);
    Ok(())
}

#[test]
fn hrv_marks_short_series_insufficient() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("cardio");
    cmd.arg("hrv").write_stdin("# one interval\n800\n");
    let output = cmd.assert().success().get_output().stdout.clone();
    let js: Value = serde_json::from_slice(&output)?;
    assert_eq!(js["status"], "insufficient_data");
    assert_eq!(js["valid_intervals"], 1);
    Ok(())
}

#[test]
fn knowledge_base_lists_every_condition() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("cardio");
    cmd.arg("knowledge-base");
    let output = cmd.assert().success().get_output().stdout.clone();
    let js: Value = serde_json::from_slice(&output)?;
    let entries = js.as_array().expect("array");
    assert_eq!(entries.len(), 24);
    assert!(entries
        .iter()
        .any(|e| e["name"] == "Brugada syndrome" && e["severity"] == "highest"));
    Ok(())
}
