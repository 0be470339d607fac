//! # Result Snapshot
//! One JSON file per run period recording every computed result, keyed by
//! employee code. Read back by reporting tools; the run itself never reads
//! it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analyzer::OvertimeResult;

#[derive(Debug, Serialize)]
struct SnapshotEntry<'a> {
    name: String,
    division: &'a str,
    current: i64,
    last: i64,
    target: i64,
    percent_vs_last: i64,
    percent_target: i64,
}

/// Write `overtime_result_{period}.json` (period = `YYYYMM`) under
/// `output_dir`, overwriting any earlier snapshot for the same period.
pub fn save_results(
    results: &[OvertimeResult<'_>],
    output_dir: &Path,
    period: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating snapshot dir {}", output_dir.display()))?;
    let path = output_dir.join(format!("overtime_result_{period}.json"));

    let entries: BTreeMap<&str, SnapshotEntry<'_>> = results
        .iter()
        .map(|r| {
            (
                r.employee.code.as_str(),
                SnapshotEntry {
                    name: r.employee.full_name(),
                    division: &r.employee.division_code,
                    current: r.current_overtime,
                    last: r.last_overtime,
                    target: r.target_overtime,
                    percent_vs_last: r.percent_vs_last(),
                    percent_target: r.percent_target(),
                },
            )
        })
        .collect();

    let json = serde_json::to_string_pretty(&entries).context("serializing snapshot")?;
    fs::write(&path, json).with_context(|| format!("writing snapshot {}", path.display()))?;
    tracing::info!(path = %path.display(), results = results.len(), "saved run snapshot");
    Ok(path)
}
