use anyhow::{Result, anyhow};
use serde_json::json;

use crate::cli::{CliArgs, ColumnsArgs};
use crate::commands::common;
use crate::compare::{ChecksumRole, SchemaCatalog};
use crate::config::OutputFormat;
use crate::db::SqlClient;
use crate::db::types::{Column, ResultSet, Value};
use crate::output::{TableOptions, json as json_out, table};
use crate::scripting::render_sql_type;

/// Show how a table will be compared: which columns form the key, which
/// feed the fingerprint (and how), and which are excluded outright.
pub fn run(args: &CliArgs, cmd: &ColumnsArgs) -> Result<()> {
    let table_name = cmd
        .table
        .as_deref()
        .ok_or_else(|| anyhow!("Missing required TABLE argument"))?;

    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);
    let table_ref = common::resolve_table(cmd.schema.as_deref(), table_name, &resolved);

    let meta = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = SqlClient::connect(&resolved.connection).await?;
        client.table(&table_ref).await
    })?;

    let mut rows = Vec::with_capacity(meta.columns.len());
    for col in &meta.columns {
        rows.push(vec![
            Value::Text(col.name.clone()),
            Value::Text(render_sql_type(col)),
            Value::Text(col.type_class().as_str().to_string()),
            Value::Text(col.checksum_role().as_str().to_string()),
            Value::Bool(col.in_primary_key),
            Value::Bool(col.is_identity),
            Value::Bool(col.is_computed),
            Value::Bool(col.is_nullable),
        ]);
    }

    let result_set = ResultSet {
        columns: vec![
            Column::named("name"),
            Column::named("type"),
            Column::named("class"),
            Column::named("role"),
            Column::named("primaryKey"),
            Column::named("identity"),
            Column::named("computed"),
            Column::named("nullable"),
        ],
        rows,
    };

    let key_count = meta.primary_key().len();
    let excluded_count = meta
        .columns
        .iter()
        .filter(|col| col.checksum_role() == ChecksumRole::Excluded)
        .count();

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "table": meta.table,
            "columnCount": meta.columns.len(),
            "keyColumnCount": key_count,
            "excludedColumnCount": excluded_count,
            "columns": json_out::result_set_rows_to_objects(&result_set),
        });
        let body = json_out::emit_json_value(&payload, common::json_pretty(&resolved))?;
        if !args.quiet {
            println!("{}", body);
        }
        return Ok(());
    }

    if args.quiet {
        return Ok(());
    }

    let rendered = table::render_result_set_table(&result_set, format, &TableOptions::default());
    println!("{}", rendered);
    println!(
        "{}: {} columns, {} in primary key, {} excluded from fingerprint",
        meta.table,
        meta.columns.len(),
        key_count,
        excluded_count
    );

    Ok(())
}
