//! Result dump files.

use anyhow::{Context, Result};
use cekbpom_scanner::TimedEnvelope;
use std::fs;
use std::path::{Path, PathBuf};

/// File name for a run that started at the envelope's `started_at`.
pub fn dump_file_name(timed: &TimedEnvelope) -> String {
    format!(
        "cekbpom-{}.json",
        timed.timing.started_at.format("%Y%m%d-%H%M%S")
    )
}

/// Write the envelope and its timing as pretty JSON under `dir`.
pub fn write_dump(dir: &Path, timed: &TimedEnvelope) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create dump directory {}", dir.display()))?;

    let path = dir.join(dump_file_name(timed));
    let json = serde_json::to_string_pretty(timed).context("failed to serialize dump")?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!("Wrote result dump to {}", path.display());
    Ok(path)
}
