//! CREATE PROCEDURE scaffolding for the standard per-table CRUD set:
//! `_List`, `_Select`, `_Insert`, `_Update`, `_Delete`. Identity and
//! computed columns are never inserted or updated; single-row operations
//! key on the primary key and refuse tables without one.

use anyhow::Result;

use crate::compare::{Column, Table, quote_ident};
use crate::error::{AppError, ErrorKind};
use crate::scripting::sql_type::render_sql_type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    List,
    Select,
    Insert,
    Update,
    Delete,
}

impl ProcedureKind {
    pub const ALL: [ProcedureKind; 5] = [
        ProcedureKind::List,
        ProcedureKind::Select,
        ProcedureKind::Insert,
        ProcedureKind::Update,
        ProcedureKind::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcedureKind::List => "list",
            ProcedureKind::Select => "select",
            ProcedureKind::Insert => "insert",
            ProcedureKind::Update => "update",
            ProcedureKind::Delete => "delete",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            ProcedureKind::List => "List",
            ProcedureKind::Select => "Select",
            ProcedureKind::Insert => "Insert",
            ProcedureKind::Update => "Update",
            ProcedureKind::Delete => "Delete",
        }
    }
}

pub fn script_procedure(table: &Table, kind: ProcedureKind, header: Option<&str>) -> Result<String> {
    match kind {
        ProcedureKind::List => Ok(script_list(table, header)),
        ProcedureKind::Select => script_select(table, header),
        ProcedureKind::Insert => script_insert(table, header),
        ProcedureKind::Update => script_update(table, header),
        ProcedureKind::Delete => script_delete(table, header),
    }
}

fn script_list(table: &Table, header: Option<&str>) -> String {
    let mut out = String::new();
    push_header(&mut out, header);
    out.push_str(&format!("CREATE PROCEDURE {}\nAS\n", proc_name(table, ProcedureKind::List)));
    out.push_str(&format!("SELECT {}\n", column_list(&table.columns)));
    out.push_str(&format!("FROM {}\n", table.table.qualified()));
    out.push_str("GO\n");
    out
}

fn script_select(table: &Table, header: Option<&str>) -> Result<String> {
    let keys = require_primary_key(table)?;
    let mut out = String::new();
    push_header(&mut out, header);
    out.push_str(&format!("CREATE PROCEDURE {}\n", proc_name(table, ProcedureKind::Select)));
    out.push_str(&format!("{}\nAS\n", param_list(&keys)));
    out.push_str(&format!("SELECT {}\n", column_list(&table.columns)));
    out.push_str(&format!("FROM {}\n", table.table.qualified()));
    out.push_str(&format!("WHERE {}\n", key_predicate(&keys)));
    out.push_str("GO\n");
    Ok(out)
}

fn script_insert(table: &Table, header: Option<&str>) -> Result<String> {
    let writable = writable_columns(table);
    if writable.is_empty() {
        return Err(no_columns_error(table));
    }
    let values = writable
        .iter()
        .map(|col| format!("@{}", param_name(col)))
        .collect::<Vec<_>>()
        .join("\n\t, ");
    let mut out = String::new();
    push_header(&mut out, header);
    out.push_str(&format!("CREATE PROCEDURE {}\n", proc_name(table, ProcedureKind::Insert)));
    out.push_str(&format!("{}\nAS\n", param_list(&writable)));
    out.push_str(&format!("INSERT INTO {}\n", table.table.qualified()));
    out.push_str(&format!("({})\n", column_list(writable.iter().copied())));
    out.push_str(&format!("VALUES({})\n", values));
    out.push_str("GO\n");
    Ok(out)
}

fn script_update(table: &Table, header: Option<&str>) -> Result<String> {
    let keys = require_primary_key(table)?;
    let updatable = writable_columns(table)
        .into_iter()
        .filter(|col| !col.in_primary_key)
        .collect::<Vec<_>>();
    if updatable.is_empty() {
        return Err(no_columns_error(table));
    }
    let assignments = updatable
        .iter()
        .map(|col| format!("{} = @{}", quote_ident(&col.name), param_name(col)))
        .collect::<Vec<_>>()
        .join("\n\t, ");
    let params = table.columns.iter().collect::<Vec<_>>();
    let mut out = String::new();
    push_header(&mut out, header);
    out.push_str(&format!("CREATE PROCEDURE {}\n", proc_name(table, ProcedureKind::Update)));
    out.push_str(&format!("{}\nAS\n", param_list(&params)));
    out.push_str(&format!("UPDATE {}\n", table.table.qualified()));
    out.push_str(&format!("SET {}\n", assignments));
    out.push_str(&format!("WHERE {}\n", key_predicate(&keys)));
    out.push_str("GO\n");
    Ok(out)
}

fn script_delete(table: &Table, header: Option<&str>) -> Result<String> {
    let keys = require_primary_key(table)?;
    let mut out = String::new();
    push_header(&mut out, header);
    out.push_str(&format!("CREATE PROCEDURE {}\n", proc_name(table, ProcedureKind::Delete)));
    out.push_str(&format!("{}\nAS\n", param_list(&keys)));
    out.push_str(&format!("DELETE FROM {}\n", table.table.qualified()));
    out.push_str(&format!("WHERE {}\n", key_predicate(&keys)));
    out.push_str("GO\n");
    Ok(out)
}

fn proc_name(table: &Table, kind: ProcedureKind) -> String {
    format!(
        "{}.{}",
        quote_ident(&table.table.schema),
        quote_ident(&format!("{}_{}", table.table.name, kind.suffix()))
    )
}

fn push_header(out: &mut String, header: Option<&str>) {
    if let Some(header) = header {
        if !header.is_empty() {
            out.push_str(header);
            out.push('\n');
        }
    }
}

fn column_list<'a, I>(columns: I) -> String
where
    I: IntoIterator<Item = &'a Column>,
{
    columns
        .into_iter()
        .map(|col| quote_ident(&col.name))
        .collect::<Vec<_>>()
        .join("\n\t, ")
}

fn param_list(columns: &[&Column]) -> String {
    columns
        .iter()
        .map(|col| format!("\t@{} {}", param_name(col), render_sql_type(col)))
        .collect::<Vec<_>>()
        .join("\n\t, ")
}

fn key_predicate(keys: &[&Column]) -> String {
    keys.iter()
        .map(|col| format!("{} = @{}", quote_ident(&col.name), param_name(col)))
        .collect::<Vec<_>>()
        .join("\n\tAND ")
}

fn param_name(column: &Column) -> String {
    column.name.replace(' ', "_")
}

fn writable_columns(table: &Table) -> Vec<&Column> {
    table
        .columns
        .iter()
        .filter(|col| !col.is_identity && !col.is_computed)
        .collect()
}

fn require_primary_key(table: &Table) -> Result<Vec<&Column>> {
    let keys = table.primary_key();
    if keys.is_empty() {
        return Err(AppError::new(
            ErrorKind::Precondition,
            format!("{} has no primary key", table.table),
        )
        .into());
    }
    Ok(keys)
}

fn no_columns_error(table: &Table) -> anyhow::Error {
    AppError::new(
        ErrorKind::Precondition,
        format!("{} has no insertable or updatable column", table.table),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::TableRef;

    fn column(name: &str, data_type: &str, ordinal: i64) -> Column {
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
            in_primary_key: false,
        }
    }

    fn orders() -> Table {
        let mut id = column("id", "int", 1);
        id.in_primary_key = true;
        id.is_identity = true;
        let code = column("code", "varchar", 2);
        let mut total = column("total", "decimal", 3);
        total.precision = 18;
        total.scale = 2;
        Table::new(TableRef::new("dbo", "Orders"), vec![id, code, total])
    }

    #[test]
    fn list_selects_every_column() {
        let script = script_procedure(&orders(), ProcedureKind::List, None).unwrap();
        assert!(script.starts_with("CREATE PROCEDURE [dbo].[Orders_List]\nAS\n"));
        assert!(script.contains("SELECT [id]\n\t, [code]\n\t, [total]"));
        assert!(script.contains("FROM [dbo].[Orders]"));
        assert!(script.ends_with("GO\n"));
    }

    #[test]
    fn select_keys_on_the_primary_key() {
        let script = script_procedure(&orders(), ProcedureKind::Select, None).unwrap();
        assert!(script.contains("CREATE PROCEDURE [dbo].[Orders_Select]\n\t@id int\nAS"));
        assert!(script.contains("WHERE [id] = @id"));
    }

    #[test]
    fn insert_skips_identity_columns() {
        let script = script_procedure(&orders(), ProcedureKind::Insert, None).unwrap();
        assert!(!script.contains("@id"));
        assert!(script.contains("([code]\n\t, [total])"));
        assert!(script.contains("@total decimal(18, 2)"));
    }

    #[test]
    fn update_sets_non_key_columns_only() {
        let script = script_procedure(&orders(), ProcedureKind::Update, None).unwrap();
        assert!(script.contains("SET [code] = @code\n\t, [total] = @total"));
        assert!(script.contains("WHERE [id] = @id"));
    }

    #[test]
    fn delete_keys_on_the_primary_key() {
        let script = script_procedure(&orders(), ProcedureKind::Delete, None).unwrap();
        assert!(script.contains("DELETE FROM [dbo].[Orders]"));
        assert!(script.contains("WHERE [id] = @id"));
    }

    #[test]
    fn header_is_prepended_when_given() {
        let script =
            script_procedure(&orders(), ProcedureKind::List, Some("-- generated by ssdiff"))
                .unwrap();
        assert!(script.starts_with("-- generated by ssdiff\nCREATE PROCEDURE"));
    }

    #[test]
    fn single_row_procs_require_a_primary_key() {
        let heap = Table::new(
            TableRef::new("dbo", "Heap"),
            vec![column("qty", "int", 1)],
        );
        for kind in [ProcedureKind::Select, ProcedureKind::Update, ProcedureKind::Delete] {
            let err = script_procedure(&heap, kind, None).unwrap_err();
            assert!(err.to_string().contains("no primary key"));
        }
        assert!(script_procedure(&heap, ProcedureKind::List, None).is_ok());
    }

    #[test]
    fn spaces_in_column_names_become_underscores_in_params() {
        let mut id = column("order id", "int", 1);
        id.in_primary_key = true;
        let table = Table::new(TableRef::new("dbo", "Legacy"), vec![id, column("v", "int", 2)]);
        let script = script_procedure(&table, ProcedureKind::Select, None).unwrap();
        assert!(script.contains("@order_id int"));
        assert!(script.contains("WHERE [order id] = @order_id"));
    }
}
