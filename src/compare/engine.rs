//! Top-level comparison entry points: the cheap whole-table checksum check
//! and the row-level diff that names which rows were added, deleted or
//! updated.

use anyhow::Result;

use crate::compare::types::{DataComparison, Table, TableRef};
use crate::compare::{SchemaCatalog, QueryExecutor, diff, fetch, projection};
use crate::error::{AppError, ErrorKind};

pub const CHECKSUM_COLUMN: &str = "table_checksum";

/// The single-statement aggregate checksum over an entire table, keys
/// included.
pub fn checksum_query(table: &Table) -> String {
    let term = match projection::fingerprint_expression(table, false) {
        Some(list) => format!("CHECKSUM({})", list),
        None => "0".to_string(),
    };
    format!(
        "SELECT CHECKSUM_AGG({term}) AS {CHECKSUM_COLUMN} FROM {}",
        table.table.qualified()
    )
}

/// One aggregate checksum for a whole table. An empty table (or one whose
/// every column is excluded from checksumming) reports 0.
pub async fn table_checksum<E>(executor: &mut E, table: &TableRef) -> Result<i64>
where
    E: QueryExecutor + SchemaCatalog,
{
    let meta = executor.table(table).await?;
    let sql = checksum_query(&meta);
    let result_sets = executor.execute(&sql).await?;
    let value = result_sets
        .first()
        .and_then(|rs| rs.rows.first())
        .and_then(|row| row.first())
        .and_then(|value| value.as_i64())
        .unwrap_or(0);
    Ok(value)
}

/// Cheapest possible equality check: one aggregate checksum per side, one
/// round trip each. Detects any difference but cannot say which rows moved.
pub async fn compare_data_light<S, T>(
    source: &mut S,
    source_table: &TableRef,
    target: &mut T,
    target_table: &TableRef,
) -> Result<bool>
where
    S: QueryExecutor + SchemaCatalog,
    T: QueryExecutor + SchemaCatalog,
{
    let (a, b) = tokio::try_join!(
        table_checksum(source, source_table),
        table_checksum(target, target_table),
    )?;
    Ok(a == b)
}

/// Row-level comparison. Fetches both fingerprint sets (concurrently; the
/// two fetches share nothing) and diffs them in memory. `added` holds keys
/// only present in the target table, `deleted` keys only present in the
/// source table, `updated` keys present in both with differing content.
///
/// Both tables must have a primary key; without one, row alignment is
/// undefined and the whole-table checksum is the only available check.
pub async fn compare_data<S, T>(
    source: &mut S,
    source_table: &TableRef,
    target: &mut T,
    target_table: &TableRef,
    details: bool,
) -> Result<DataComparison>
where
    S: QueryExecutor + SchemaCatalog,
    T: QueryExecutor + SchemaCatalog,
{
    let source_meta = source.table(source_table).await?;
    let target_meta = target.table(target_table).await?;
    require_primary_key(&source_meta)?;
    require_primary_key(&target_meta)?;

    let (source_set, target_set) = tokio::try_join!(
        fetch::fetch_fingerprints(source, &source_meta, details),
        fetch::fetch_fingerprints(target, &target_meta, details),
    )?;

    let added = diff::rows_only_in(&target_set.rows, &source_set.rows)?;
    let deleted = diff::rows_only_in(&source_set.rows, &target_set.rows)?;
    let updated = diff::rows_updated(&source_set.rows, &target_set.rows)?;

    Ok(DataComparison {
        is_identical: added.is_empty() && deleted.is_empty() && updated.is_empty(),
        added,
        deleted,
        updated,
        source_columns: source_set.columns,
        target_columns: target_set.columns,
    })
}

fn require_primary_key(table: &Table) -> Result<()> {
    if table.has_primary_key() {
        return Ok(());
    }
    Err(AppError::new(
        ErrorKind::Precondition,
        format!(
            "{} has no primary key; use the whole-table checksum comparison instead",
            table.table
        ),
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::types::Column;
    use crate::db::types::{Column as ResultColumn, ResultSet, Value};
    use anyhow::anyhow;
    use std::collections::HashMap;

    /// In-memory stand-in for a connected server: canned metadata plus
    /// canned responses keyed by the exact generated SQL.
    struct FakeDb {
        tables: HashMap<String, Table>,
        responses: HashMap<String, ResultSet>,
    }

    impl FakeDb {
        fn new() -> Self {
            Self {
                tables: HashMap::new(),
                responses: HashMap::new(),
            }
        }

        fn with_table(mut self, table: Table) -> Self {
            self.tables.insert(table.table.to_string(), table);
            self
        }

        fn with_fingerprints(mut self, table: &Table, rows: &[(&str, i64)]) -> Self {
            let sql = fetch::fingerprint_query(table, false).unwrap();
            let rs = ResultSet {
                columns: vec![
                    ResultColumn::named(fetch::KEY_COLUMN),
                    ResultColumn::named(fetch::FINGERPRINT_COLUMN),
                ],
                rows: rows
                    .iter()
                    .map(|(key, fp)| vec![Value::Text(key.to_string()), Value::Int(*fp)])
                    .collect(),
            };
            self.responses.insert(sql, rs);
            self
        }

        fn with_checksum(mut self, table: &Table, checksum: Value) -> Self {
            let rs = ResultSet {
                columns: vec![ResultColumn::named(CHECKSUM_COLUMN)],
                rows: vec![vec![checksum]],
            };
            self.responses.insert(checksum_query(table), rs);
            self
        }
    }

    impl QueryExecutor for FakeDb {
        async fn execute(&mut self, sql: &str) -> Result<Vec<ResultSet>> {
            self.responses
                .get(sql)
                .cloned()
                .map(|rs| vec![rs])
                .ok_or_else(|| anyhow!("unexpected query: {}", sql))
        }
    }

    impl SchemaCatalog for FakeDb {
        async fn table(&mut self, table: &TableRef) -> Result<Table> {
            self.tables
                .get(&table.to_string())
                .cloned()
                .ok_or_else(|| anyhow!("unknown table: {}", table))
        }
    }

    fn column(name: &str, data_type: &str, ordinal: i64, pk: bool) -> Column {
        Column {
            name: name.to_string(),
            ordinal,
            data_type: data_type.to_string(),
            max_length: 50,
            precision: 0,
            scale: 0,
            is_nullable: false,
            is_identity: false,
            is_computed: false,
            in_primary_key: pk,
        }
    }

    fn employees(schema: &str) -> Table {
        Table::new(
            TableRef::new(schema, "Employees"),
            vec![
                column("id", "int", 1, true),
                column("name", "varchar", 2, false),
                column("salary", "int", 3, false),
            ],
        )
    }

    #[tokio::test]
    async fn identical_tables_compare_identical() {
        let left = employees("dbo");
        let right = employees("staging");
        let rows: &[(&str, i64)] = &[("1:1", 982), ("1:2", -41)];
        let mut source = FakeDb::new()
            .with_table(left.clone())
            .with_fingerprints(&left, rows);
        let mut target = FakeDb::new()
            .with_table(right.clone())
            .with_fingerprints(&right, rows);

        let outcome = compare_data(&mut source, &left.table, &mut target, &right.table, false)
            .await
            .unwrap();
        assert!(outcome.is_identical);
        assert!(outcome.added.is_empty());
        assert!(outcome.deleted.is_empty());
        assert!(outcome.updated.is_empty());
    }

    #[tokio::test]
    async fn finds_added_deleted_and_updated_rows() {
        // source: (1, Ann, 100), (2, Bo, 200)
        // target: (1, Ann, 150), (3, Cy, 300)
        let left = employees("dbo");
        let right = employees("staging");
        let mut source = FakeDb::new()
            .with_table(left.clone())
            .with_fingerprints(&left, &[("1:1", 100), ("1:2", 200)]);
        let mut target = FakeDb::new()
            .with_table(right.clone())
            .with_fingerprints(&right, &[("1:1", 150), ("1:3", 300)]);

        let outcome = compare_data(&mut source, &left.table, &mut target, &right.table, false)
            .await
            .unwrap();
        assert!(!outcome.is_identical);
        let added: Vec<&str> = outcome.added.iter().map(|r| r.key.as_str()).collect();
        let deleted: Vec<&str> = outcome.deleted.iter().map(|r| r.key.as_str()).collect();
        let updated: Vec<&str> = outcome.updated.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(added, vec!["1:3"]);
        assert_eq!(deleted, vec!["1:2"]);
        assert_eq!(updated, vec!["1:1"]);
    }

    #[tokio::test]
    async fn added_and_deleted_swap_when_sides_swap() {
        let left = employees("dbo");
        let right = employees("staging");
        let source_rows: &[(&str, i64)] = &[("1:1", 100), ("1:2", 200)];
        let target_rows: &[(&str, i64)] = &[("1:1", 100), ("1:3", 300)];
        let make = |table: &Table, rows: &[(&str, i64)]| {
            FakeDb::new()
                .with_table(table.clone())
                .with_fingerprints(table, rows)
        };

        let mut source = make(&left, source_rows);
        let mut target = make(&right, target_rows);
        let forward = compare_data(&mut source, &left.table, &mut target, &right.table, false)
            .await
            .unwrap();

        let mut source = make(&right, target_rows);
        let mut target = make(&left, source_rows);
        let reverse = compare_data(&mut source, &right.table, &mut target, &left.table, false)
            .await
            .unwrap();

        let keys = |rows: &[crate::compare::types::RowFingerprint]| {
            rows.iter().map(|r| r.key.clone()).collect::<Vec<_>>()
        };
        assert_eq!(keys(&forward.added), keys(&reverse.deleted));
        assert_eq!(keys(&forward.deleted), keys(&reverse.added));
    }

    #[tokio::test]
    async fn tables_without_primary_keys_are_rejected() {
        let heap = Table::new(
            TableRef::new("dbo", "Heap"),
            vec![column("qty", "int", 1, false)],
        );
        let other = employees("dbo");
        let mut source = FakeDb::new().with_table(heap.clone());
        let mut target = FakeDb::new().with_table(other.clone());
        let err = compare_data(&mut source, &heap.table, &mut target, &other.table, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no primary key"));
    }

    #[tokio::test]
    async fn light_comparison_uses_one_aggregate_per_side() {
        let left = employees("dbo");
        let right = employees("staging");
        let mut source = FakeDb::new()
            .with_table(left.clone())
            .with_checksum(&left, Value::Int(771_204));
        let mut target = FakeDb::new()
            .with_table(right.clone())
            .with_checksum(&right, Value::Int(771_204));
        assert!(
            compare_data_light(&mut source, &left.table, &mut target, &right.table)
                .await
                .unwrap()
        );

        let mut target = FakeDb::new()
            .with_table(right.clone())
            .with_checksum(&right, Value::Int(13));
        assert!(
            !compare_data_light(&mut source, &left.table, &mut target, &right.table)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn empty_table_checksum_is_zero() {
        // CHECKSUM_AGG over no rows comes back NULL.
        let left = employees("dbo");
        let mut source = FakeDb::new()
            .with_table(left.clone())
            .with_checksum(&left, Value::Null);
        assert_eq!(table_checksum(&mut source, &left.table).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn excluded_only_content_reports_identical_despite_differences() {
        // Every non-key column is a large object, so each row fingerprints
        // to the same constant and content changes there stay invisible.
        let blobs = Table::new(
            TableRef::new("dbo", "Blobs"),
            vec![column("id", "int", 1, true), column("payload", "image", 2, false)],
        );
        let other = Table::new(
            TableRef::new("staging", "Blobs"),
            vec![column("id", "int", 1, true), column("payload", "image", 2, false)],
        );
        let mut source = FakeDb::new()
            .with_table(blobs.clone())
            .with_fingerprints(&blobs, &[("1:1", 0), ("1:2", 0)]);
        let mut target = FakeDb::new()
            .with_table(other.clone())
            .with_fingerprints(&other, &[("1:1", 0), ("1:2", 0)]);
        let outcome = compare_data(&mut source, &blobs.table, &mut target, &other.table, false)
            .await
            .unwrap();
        assert!(outcome.is_identical);
    }
}
