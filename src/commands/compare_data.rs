use anyhow::{Result, anyhow};
use serde_json::json;

use crate::cli::{CliArgs, CompareArgs};
use crate::commands::common;
use crate::compare::{self, RowFingerprint, TableRef};
use crate::config::{OutputFormat, ResolvedConfig};
use crate::db::SqlClient;
use crate::db::types::{Column, ResultSet, Value};
use crate::output::{TableOptions, csv, json as json_out, table};

/// Row-level comparison between two tables, optionally on different
/// servers. Exits with code 3 when the tables differ, mirroring the
/// checksum command, so scripts can branch on drift.
pub fn run(args: &CliArgs, cmd: &CompareArgs) -> Result<()> {
    let table_name = cmd
        .table
        .as_deref()
        .ok_or_else(|| anyhow!("Missing required TABLE argument"))?;

    let base = common::overrides_from_args(args);
    let source_profile = cmd.source.clone().or_else(|| args.profile.clone());
    let source_cfg = common::apply_connection_override(
        common::resolve_profile(&base, source_profile.as_deref())?,
        &cmd.source_connection,
    )?;
    let target_cfg = common::apply_connection_override(
        common::resolve_profile(
            &base,
            cmd.target.as_deref().or(source_profile.as_deref()),
        )?,
        &cmd.target_connection,
    )?;

    let format = common::output_format(args, &source_cfg);
    let json_pretty = common::json_pretty(&source_cfg);
    let source_table = common::resolve_table(cmd.schema.as_deref(), table_name, &source_cfg);
    let target_table = resolve_target_table(cmd, &source_table, &target_cfg);

    tracing::info!(source = %source_table, target = %target_table, "comparing table data");

    let comparison = tokio::runtime::Runtime::new()?.block_on(async {
        let mut source = SqlClient::connect(&source_cfg.connection).await?;
        let mut target = SqlClient::connect(&target_cfg.connection).await?;
        compare::compare_data(
            &mut source,
            &source_table,
            &mut target,
            &target_table,
            cmd.details,
        )
        .await
    })?;

    let csv_paths = match cmd.csv.as_deref() {
        Some(path) => Some(csv::write_comparison(path, &comparison)?),
        None => None,
    };

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "source": { "profile": source_cfg.profile_name, "table": source_table },
            "target": { "profile": target_cfg.profile_name, "table": target_table },
            "isIdentical": comparison.is_identical,
            "counts": {
                "added": comparison.added.len(),
                "deleted": comparison.deleted.len(),
                "updated": comparison.updated.len(),
            },
            "added": comparison.added,
            "deleted": comparison.deleted,
            "updated": comparison.updated,
            "csvPaths": csv_paths.as_ref().map(|paths| {
                paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>()
            }),
        });
        let body = json_out::emit_json_value(&payload, json_pretty)?;
        if !args.quiet {
            println!("{}", body);
        }
    } else if !args.quiet {
        print_pretty(format, &source_table, &target_table, &comparison);
        if let Some(paths) = &csv_paths {
            println!("\nCSV written:");
            for path in paths {
                println!("- {}", path.display());
            }
        }
    }

    if !comparison.is_identical {
        std::process::exit(3);
    }
    Ok(())
}

fn resolve_target_table(
    cmd: &CompareArgs,
    source_table: &TableRef,
    target_cfg: &ResolvedConfig,
) -> TableRef {
    match cmd.target_table.as_deref() {
        Some(name) => TableRef::parse(name, &target_cfg.connection.default_schema),
        None => source_table.clone(),
    }
}

fn print_pretty(
    format: OutputFormat,
    source_table: &TableRef,
    target_table: &TableRef,
    comparison: &compare::DataComparison,
) {
    if comparison.is_identical {
        println!("{} and {} hold the same data.", source_table, target_table);
        return;
    }

    println!(
        "{} -> {}: {} added, {} deleted, {} updated",
        source_table,
        target_table,
        comparison.added.len(),
        comparison.deleted.len(),
        comparison.updated.len()
    );

    let sections = [
        ("Added (only in target)", &comparison.added, &comparison.target_columns),
        ("Deleted (only in source)", &comparison.deleted, &comparison.source_columns),
        ("Updated", &comparison.updated, &comparison.target_columns),
    ];
    for (label, rows, columns) in sections {
        if rows.is_empty() {
            continue;
        }
        println!("\n{}", label);
        let rendered = table::render_result_set_table(
            &row_set_table(rows, columns),
            format,
            &TableOptions::default(),
        );
        println!("{}", rendered);
    }
}

fn row_set_table(rows: &[RowFingerprint], value_columns: &[Column]) -> ResultSet {
    let mut columns = vec![Column::named("row_key"), Column::named("row_fingerprint")];
    columns.extend(value_columns.iter().cloned());

    let rows = rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                Value::Text(row.key.clone()),
                Value::Int(row.fingerprint),
            ];
            if let Some(values) = &row.values {
                cells.extend(values.iter().cloned());
            }
            cells
        })
        .collect();

    ResultSet { columns, rows }
}
