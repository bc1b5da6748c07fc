use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::compare::{DataComparison, RowFingerprint};
use crate::db::types::Column;

/// Write the three diff row sets next to `base_path` as
/// `<stem>-added.csv`, `<stem>-deleted.csv` and `<stem>-updated.csv`.
/// Empty sets still produce a header-only file so consumers can rely on
/// all three existing.
pub fn write_comparison(base_path: &Path, comparison: &DataComparison) -> Result<Vec<PathBuf>> {
    let sets: [(&str, &[RowFingerprint], &[Column]); 3] = [
        ("added", &comparison.added, &comparison.target_columns),
        ("deleted", &comparison.deleted, &comparison.source_columns),
        ("updated", &comparison.updated, &comparison.target_columns),
    ];

    let mut paths = Vec::new();
    for (label, rows, columns) in sets {
        let target = suffixed_path(base_path, label);
        write_row_set(&target, columns, rows)?;
        paths.push(target);
    }
    Ok(paths)
}

fn write_row_set(path: &Path, columns: &[Column], rows: &[RowFingerprint]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut headers = vec!["row_key".to_string(), "row_fingerprint".to_string()];
    headers.extend(columns.iter().map(|col| col.name.clone()));
    writer.write_record(&headers)?;

    for row in rows {
        let mut record = vec![row.key.clone(), row.fingerprint.to_string()];
        if let Some(values) = &row.values {
            record.extend(values.iter().map(|value| value.as_csv()));
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn suffixed_path(base_path: &Path, label: &str) -> PathBuf {
    let stem = base_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("comparison");
    let ext = base_path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("csv");
    let mut path = base_path.to_path_buf();
    path.set_file_name(format!("{}-{}.{}", stem, label, ext));
    path
}
