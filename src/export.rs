use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

/// Appends rows to a CSV file. A missing (or empty) file is created with a
/// header line; an existing one only receives data rows, so repeated runs
/// never interleave a second header.
pub fn append_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<usize> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let has_content = fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(!has_content)
        .from_writer(file);
    for row in rows {
        writer.serialize(row).context("serialize csv row")?;
    }
    writer.flush().context("flush csv writer")?;
    info!(
        path = %path.display(),
        rows = rows.len(),
        header = !has_content,
        "rows appended"
    );
    Ok(rows.len())
}
