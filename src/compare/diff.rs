//! Pure in-memory diff over two fingerprint row sets. No ordering is
//! guaranteed by the inputs; outputs are key-sorted for stable display.

use std::collections::HashMap;

use anyhow::Result;

use crate::compare::types::RowFingerprint;
use crate::error::{AppError, ErrorKind};

/// Rows of `a` whose key does not appear in `b`.
///
/// Duplicate key values on either side violate the unique-key precondition
/// the join is built on and are reported as an error, never deduplicated.
pub fn rows_only_in(a: &[RowFingerprint], b: &[RowFingerprint]) -> Result<Vec<RowFingerprint>> {
    let b_index = index(b)?;
    let mut seen = HashMap::with_capacity(a.len());
    let mut out = Vec::new();
    for row in a {
        if seen.insert(row.key.as_str(), ()).is_some() {
            return Err(duplicate_key(&row.key));
        }
        if !b_index.contains_key(row.key.as_str()) {
            out.push(row.clone());
        }
    }
    out.sort_by(|x, y| x.key.cmp(&y.key));
    Ok(out)
}

/// Rows present in both sets whose fingerprints differ. The returned rows
/// come from `b`, so callers see the newer side's digest and values.
pub fn rows_updated(a: &[RowFingerprint], b: &[RowFingerprint]) -> Result<Vec<RowFingerprint>> {
    let a_index = index(a)?;
    let mut seen = HashMap::with_capacity(b.len());
    let mut out = Vec::new();
    for row in b {
        if seen.insert(row.key.as_str(), ()).is_some() {
            return Err(duplicate_key(&row.key));
        }
        if let Some(other) = a_index.get(row.key.as_str()) {
            if other.fingerprint != row.fingerprint {
                out.push(row.clone());
            }
        }
    }
    out.sort_by(|x, y| x.key.cmp(&y.key));
    Ok(out)
}

fn index<'a>(rows: &'a [RowFingerprint]) -> Result<HashMap<&'a str, &'a RowFingerprint>> {
    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        if map.insert(row.key.as_str(), row).is_some() {
            return Err(duplicate_key(&row.key));
        }
    }
    Ok(map)
}

fn duplicate_key(key: &str) -> anyhow::Error {
    AppError::new(
        ErrorKind::Precondition,
        format!(
            "Duplicate primary key value '{}' encountered; row comparison requires unique keys",
            key
        ),
    )
    .into()
}
