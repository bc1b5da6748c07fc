//! Builds the deterministic T-SQL projection expressions the comparison
//! queries are made of: a composite key string per row and a CHECKSUM
//! argument list over the row's content columns.

use crate::compare::types::{ChecksumRole, Column, Table, quote_ident};

/// Expression yielding one text key per row from the primary-key columns,
/// in ordinal order. Each component is length-prefixed before joining so a
/// separator character inside a key value cannot collide with the join
/// separator. Returns `None` when the table has no primary key.
pub fn key_expression(table: &Table) -> Option<String> {
    let keys = table.primary_key();
    if keys.is_empty() {
        return None;
    }
    let parts = keys
        .iter()
        .map(|col| key_component(col))
        .collect::<Vec<_>>();
    Some(parts.join(" + N'|' + "))
}

fn key_component(column: &Column) -> String {
    let cast = format!("CAST({} AS NVARCHAR(MAX))", quote_ident(&column.name));
    format!("CONCAT(LEN({cast}), N':', {cast})")
}

/// Argument list for `CHECKSUM(...)` over the table's content columns, in
/// ordinal order. Character columns are digested with MD5 before entering
/// the fold; large-object, xml and spatial columns are omitted with no
/// substitute. Returns `None` when every candidate column is excluded;
/// callers fall back to a constant term, so all rows fingerprint alike.
pub fn fingerprint_expression(table: &Table, exclude_keys: bool) -> Option<String> {
    let mut terms = Vec::new();
    for column in &table.columns {
        if exclude_keys && column.in_primary_key {
            continue;
        }
        match column.checksum_role() {
            ChecksumRole::Excluded => continue,
            ChecksumRole::Direct => terms.push(quote_ident(&column.name)),
            ChecksumRole::Digest => {
                terms.push(format!("HASHBYTES('MD5', {})", quote_ident(&column.name)))
            }
        }
    }
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::types::{TableRef, Table};

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

    fn table(columns: Vec<Column>) -> Table {
        Table::new(TableRef::new("dbo", "Orders"), columns)
    }

    #[test]
    fn builds_single_key_expression() {
        let t = table(vec![column("id", "int", 1, true), column("qty", "int", 2, false)]);
        let expr = key_expression(&t).unwrap();
        assert_eq!(
            expr,
            "CONCAT(LEN(CAST([id] AS NVARCHAR(MAX))), N':', CAST([id] AS NVARCHAR(MAX)))"
        );
    }

    #[test]
    fn joins_composite_keys_in_ordinal_order() {
        let t = table(vec![
            column("line", "int", 2, true),
            column("order_id", "int", 1, true),
        ]);
        let expr = key_expression(&t).unwrap();
        let order_pos = expr.find("[order_id]").unwrap();
        let line_pos = expr.find("[line]").unwrap();
        assert!(order_pos < line_pos);
        assert!(expr.contains(" + N'|' + "));
    }

    #[test]
    fn no_primary_key_means_no_key_expression() {
        let t = table(vec![column("qty", "int", 1, false)]);
        assert_eq!(key_expression(&t), None);
    }

    #[test]
    fn partitions_fingerprint_terms_by_role() {
        let mut lob = column("notes", "nvarchar", 4, false);
        lob.max_length = -1;
        let t = table(vec![
            column("id", "int", 1, true),
            column("name", "varchar", 2, false),
            column("qty", "int", 3, false),
            lob,
        ]);
        let expr = fingerprint_expression(&t, true).unwrap();
        assert_eq!(expr, "HASHBYTES('MD5', [name]), [qty]");
    }

    #[test]
    fn includes_keys_when_not_excluded() {
        let t = table(vec![column("id", "int", 1, true), column("qty", "int", 2, false)]);
        assert_eq!(fingerprint_expression(&t, false).unwrap(), "[id], [qty]");
        assert_eq!(fingerprint_expression(&t, true).unwrap(), "[qty]");
    }

    #[test]
    fn all_excluded_yields_none() {
        let t = table(vec![column("id", "int", 1, true), column("doc", "xml", 2, false)]);
        assert_eq!(fingerprint_expression(&t, true), None);
    }
}
