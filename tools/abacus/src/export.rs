//! History CSV export/import
//!
//! Columns: `operation,operand1,operand2,result`. Results are rounded to the
//! configured precision with ties away from zero (`0.125` is written as `0.13`
//! at precision 2); an unexecuted calculation has an empty result cell.

use std::fs;
use std::path::Path;

use abacus_core::{round_to, Calculation, SharedCalculation};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const HEADER: [&str; 4] = ["operation", "operand1", "operand2", "result"];

/// One row of the history file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub operation: String,
    pub operand1: f64,
    pub operand2: f64,
    pub result: Option<f64>,
}

impl HistoryRecord {
    pub fn from_calculation(calc: &Calculation, precision: u32) -> Self {
        Self {
            operation: calc.name().to_string(),
            operand1: calc.operand_a(),
            operand2: calc.operand_b(),
            result: calc.result().map(|r| round_to(r, precision)),
        }
    }
}

/// Write the whole history to `path`, replacing any previous file
///
/// The header row is written even when `entries` is empty.
pub fn write_history(path: &Path, entries: &[SharedCalculation], precision: u32) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    wtr.write_record(HEADER)?;
    for calc in entries {
        wtr.serialize(HistoryRecord::from_calculation(calc, precision))?;
    }
    wtr.flush()?;

    debug!("Wrote {} history rows to {}", entries.len(), path.display());
    Ok(())
}

/// Read every row of a history file
pub fn read_history(path: &Path) -> Result<Vec<HistoryRecord>> {
    if !path.exists() {
        anyhow::bail!("No saved history at {}", path.display());
    }

    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for (idx, row) in rdr.deserialize().enumerate() {
        let record: HistoryRecord =
            row.with_context(|| format!("Malformed history row {} in {}", idx + 1, path.display()))?;
        records.push(record);
    }
    Ok(records)
}
