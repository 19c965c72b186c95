use anyhow::{Context, Result};
use std::path::Path;

/// Parse one value per line, skipping blank lines and `#` comments.
pub fn parse_values(text: &str) -> Result<Vec<f64>> {
    let values = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(idx, line)| {
            line.parse::<f64>()
                .with_context(|| format!("line {} is not a number: {}", idx + 1, line))
        })
        .collect::<Result<Vec<_>>>()?;
    if values.is_empty() {
        anyhow::bail!("no numeric values found");
    }
    Ok(values)
}

/// Read newline-delimited values from disk.
pub fn read_values(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_values(&text)
}
