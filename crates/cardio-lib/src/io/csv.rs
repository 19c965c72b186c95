use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use std::path::Path;

/// Read one numeric column (by header name, case-insensitive) from a CSV file.
pub fn read_sample_column(path: &Path, column: &str) -> Result<Vec<f64>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(column))
        .with_context(|| format!("missing sample column '{}'", column))?;
    let mut values = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading row {}", row + 1))?;
        let raw = record
            .get(idx)
            .ok_or_else(|| anyhow::anyhow!("row {} has no column '{}'", row + 1, column))?;
        let value = raw
            .parse::<f64>()
            .with_context(|| format!("parsing sample '{}' in row {}", raw, row + 1))?;
        values.push(value);
    }
    if values.is_empty() {
        anyhow::bail!("no samples found in column '{}'", column);
    }
    Ok(values)
}
