//! Materializes the per-row `{key, fingerprint}` records for one table in a
//! single round trip. The whole result set is held in memory; table size is
//! bounded by available memory by design.

use anyhow::Result;

use crate::compare::projection;
use crate::compare::types::{FingerprintSet, RowFingerprint, Table};
use crate::compare::QueryExecutor;
use crate::db::types::ResultSet;
use crate::error::{AppError, ErrorKind};

pub const KEY_COLUMN: &str = "row_key";
pub const FINGERPRINT_COLUMN: &str = "row_fingerprint";

/// The SELECT that yields one `{row_key, row_fingerprint}` record per row,
/// plus every column value when `details` is set.
pub fn fingerprint_query(table: &Table, details: bool) -> Result<String> {
    let key = projection::key_expression(table).ok_or_else(|| {
        AppError::new(
            ErrorKind::Precondition,
            format!(
                "{} has no primary key; row-level comparison is undefined without one",
                table.table
            ),
        )
    })?;
    let fingerprint = match projection::fingerprint_expression(table, true) {
        Some(list) => format!("CHECKSUM({})", list),
        None => "0".to_string(),
    };
    let mut sql = format!(
        "SELECT {key} AS {KEY_COLUMN}, {fingerprint} AS {FINGERPRINT_COLUMN}"
    );
    if details {
        sql.push_str(", *");
    }
    sql.push_str(&format!(" FROM {}", table.table.qualified()));
    Ok(sql)
}

pub async fn fetch_fingerprints<E: QueryExecutor>(
    executor: &mut E,
    table: &Table,
    details: bool,
) -> Result<FingerprintSet> {
    let sql = fingerprint_query(table, details)?;
    let result_sets = executor.execute(&sql).await?;
    let result_set = result_sets.into_iter().next().unwrap_or_default();
    parse_fingerprints(table, result_set, details)
}

fn parse_fingerprints(
    table: &Table,
    result_set: ResultSet,
    details: bool,
) -> Result<FingerprintSet> {
    if result_set.rows.is_empty() {
        return Ok(FingerprintSet {
            table: table.table.clone(),
            columns: Vec::new(),
            rows: Vec::new(),
        });
    }

    let key_idx = result_set.column_index(KEY_COLUMN).ok_or_else(|| {
        AppError::new(
            ErrorKind::Query,
            format!("Result for {} is missing the {} column", table.table, KEY_COLUMN),
        )
    })?;
    let fingerprint_idx = result_set.column_index(FINGERPRINT_COLUMN).ok_or_else(|| {
        AppError::new(
            ErrorKind::Query,
            format!(
                "Result for {} is missing the {} column",
                table.table, FINGERPRINT_COLUMN
            ),
        )
    })?;
    let value_start = fingerprint_idx + 1;

    let columns = if details {
        result_set.columns[value_start..].to_vec()
    } else {
        Vec::new()
    };

    let mut rows = Vec::with_capacity(result_set.rows.len());
    for row in result_set.rows {
        let key = row
            .get(key_idx)
            .map(|value| value.as_display())
            .unwrap_or_default();
        let fingerprint = row
            .get(fingerprint_idx)
            .and_then(|value| value.as_i64())
            .unwrap_or(0);
        let values = details.then(|| row[value_start..].to_vec());
        rows.push(RowFingerprint {
            key,
            fingerprint,
            values,
        });
    }

    Ok(FingerprintSet {
        table: table.table.clone(),
        columns,
        rows,
    })
}
