use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Trim};
use std::path::Path;

/// Read a two-column, headerless ECG CSV (column 0 = time in seconds,
/// column 1 = voltage in millivolts).
///
/// Blank or non-numeric cells decode to `NaN` so the sanitization step can
/// apply its missing-value policy; rows with a missing voltage cell do the
/// same. The path must exist and carry a `.csv` extension.
pub fn read_two_column_csv(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => {}
        _ => bail!("{} is not a .csv file", path.display()),
    }
    if !path.exists() {
        bail!("{} does not exist", path.display());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut time = Vec::new();
    let mut voltage = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading row {}", idx + 1))?;
        time.push(parse_cell(record.get(0)));
        voltage.push(parse_cell(record.get(1)));
    }
    if time.is_empty() {
        bail!("no data rows in {}", path.display());
    }
    Ok((time, voltage))
}

/// Decode one cell, preserving blank/non-numeric source values as `NaN`
/// markers for the missing-value policy.
fn parse_cell(cell: Option<&str>) -> f64 {
    cell.filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}
