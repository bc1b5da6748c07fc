use anyhow::Result;
use tokio::net::TcpStream;
use tokio_util::compat::Compat;

use crate::compare::{Column, Table, TableRef};
use crate::db::executor;
use crate::db::types::{ResultSet, Value};
use crate::error::{AppError, ErrorKind};

const TABLE_COLUMNS: &str = r#"
SELECT c.name AS column_name,
       c.column_id,
       TYPE_NAME(c.user_type_id) AS data_type,
       c.max_length,
       c.precision,
       c.scale,
       c.is_nullable,
       c.is_identity,
       c.is_computed,
       CASE WHEN pk.column_id IS NOT NULL THEN 1 ELSE 0 END AS in_primary_key
FROM sys.columns c
JOIN sys.tables t ON t.object_id = c.object_id
JOIN sys.schemas s ON s.schema_id = t.schema_id
LEFT JOIN (
    SELECT ic.object_id, ic.column_id
    FROM sys.index_columns ic
    JOIN sys.indexes i ON i.object_id = ic.object_id AND i.index_id = ic.index_id
    WHERE i.is_primary_key = 1
) pk ON pk.object_id = c.object_id AND pk.column_id = c.column_id
WHERE s.name = @P1 AND t.name = @P2
ORDER BY c.column_id;
"#;

/// Fetch one table's column metadata from the system catalog.
pub async fn load_table(
    client: &mut tiberius::Client<Compat<TcpStream>>,
    table: &TableRef,
) -> Result<Table> {
    tracing::debug!(table = %table, "loading column metadata");
    let mut query = tiberius::Query::new(TABLE_COLUMNS);
    query.bind(table.schema.as_str());
    query.bind(table.name.as_str());
    let stream = query
        .query(client)
        .await
        .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;
    let result_sets = executor::collect_result_sets(stream).await?;
    let result_set = result_sets.into_iter().next().unwrap_or_default();

    if result_set.rows.is_empty() {
        return Err(AppError::new(
            ErrorKind::Query,
            format!("Table '{}' not found", table),
        )
        .into());
    }

    Ok(Table::new(table.clone(), map_columns(&result_set)))
}

fn map_columns(result_set: &ResultSet) -> Vec<Column> {
    let idx_name = result_set.column_index("column_name");
    let idx_ordinal = result_set.column_index("column_id");
    let idx_type = result_set.column_index("data_type");
    let idx_len = result_set.column_index("max_length");
    let idx_precision = result_set.column_index("precision");
    let idx_scale = result_set.column_index("scale");
    let idx_nullable = result_set.column_index("is_nullable");
    let idx_identity = result_set.column_index("is_identity");
    let idx_computed = result_set.column_index("is_computed");
    let idx_pk = result_set.column_index("in_primary_key");

    result_set
        .rows
        .iter()
        .map(|row| Column {
            name: get_text(row, idx_name),
            ordinal: get_int(row, idx_ordinal),
            data_type: get_text(row, idx_type),
            max_length: get_int(row, idx_len),
            precision: get_int(row, idx_precision),
            scale: get_int(row, idx_scale),
            is_nullable: get_bool(row, idx_nullable),
            is_identity: get_bool(row, idx_identity),
            is_computed: get_bool(row, idx_computed),
            in_primary_key: get_bool(row, idx_pk),
        })
        .collect()
}

fn get_text(row: &[Value], idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i))
        .map(|value| value.as_display())
        .unwrap_or_default()
}

fn get_int(row: &[Value], idx: Option<usize>) -> i64 {
    idx.and_then(|i| row.get(i))
        .and_then(|value| value.as_i64())
        .unwrap_or(0)
}

fn get_bool(row: &[Value], idx: Option<usize>) -> bool {
    idx.and_then(|i| row.get(i))
        .map(|value| value.as_bool())
        .unwrap_or(false)
}
