use anyhow::{Result, anyhow};
use serde_json::json;

use crate::cli::{ChecksumArgs, CliArgs};
use crate::commands::common;
use crate::compare::{self, TableRef};
use crate::config::ResolvedConfig;
use crate::config::OutputFormat;
use crate::db::SqlClient;
use crate::output::{TableOptions, json as json_out, table};

/// Whole-table checksum. With a target side configured this is the cheap
/// yes/no comparison: one aggregate per side, no row data transferred.
pub fn run(args: &CliArgs, cmd: &ChecksumArgs) -> Result<()> {
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
    let format = common::output_format(args, &source_cfg);
    let json_pretty = common::json_pretty(&source_cfg);
    let source_table = common::resolve_table(cmd.schema.as_deref(), table_name, &source_cfg);

    let rt = tokio::runtime::Runtime::new()?;

    let has_target = cmd.target.is_some() || cmd.target_connection.is_some();
    if !has_target {
        let checksum = rt.block_on(async {
            let mut client = SqlClient::connect(&source_cfg.connection).await?;
            compare::table_checksum(&mut client, &source_table).await
        })?;

        if matches!(format, OutputFormat::Json) {
            let payload = json!({
                "table": source_table,
                "profile": source_cfg.profile_name,
                "checksum": checksum,
            });
            let body = json_out::emit_json_value(&payload, json_pretty)?;
            if !args.quiet {
                println!("{}", body);
            }
            return Ok(());
        }
        if !args.quiet {
            let rows = vec![
                ("Table".to_string(), source_table.to_string()),
                ("Checksum".to_string(), checksum.to_string()),
            ];
            let rendered =
                table::render_key_value_table("Checksum", &rows, format, &TableOptions::default());
            println!("{}", rendered);
        }
        return Ok(());
    }

    let target_cfg = common::apply_connection_override(
        common::resolve_profile(
            &base,
            cmd.target.as_deref().or(source_profile.as_deref()),
        )?,
        &cmd.target_connection,
    )?;
    let target_table = resolve_target_table(cmd, &source_table, &target_cfg);

    let (source_sum, target_sum) = rt.block_on(async {
        let mut source = SqlClient::connect(&source_cfg.connection).await?;
        let mut target = SqlClient::connect(&target_cfg.connection).await?;
        tokio::try_join!(
            compare::table_checksum(&mut source, &source_table),
            compare::table_checksum(&mut target, &target_table),
        )
    })?;
    let is_identical = source_sum == target_sum;

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "source": { "profile": source_cfg.profile_name, "table": source_table, "checksum": source_sum },
            "target": { "profile": target_cfg.profile_name, "table": target_table, "checksum": target_sum },
            "isIdentical": is_identical,
        });
        let body = json_out::emit_json_value(&payload, json_pretty)?;
        if !args.quiet {
            println!("{}", body);
        }
    } else if !args.quiet {
        let rows = vec![
            (
                format!("{} ({})", source_table, source_cfg.profile_name),
                source_sum.to_string(),
            ),
            (
                format!("{} ({})", target_table, target_cfg.profile_name),
                target_sum.to_string(),
            ),
            (
                "Identical".to_string(),
                if is_identical { "yes" } else { "no" }.to_string(),
            ),
        ];
        let rendered =
            table::render_key_value_table("Checksum", &rows, format, &TableOptions::default());
        println!("{}", rendered);
    }

    if !is_identical {
        std::process::exit(3);
    }
    Ok(())
}

fn resolve_target_table(
    cmd: &ChecksumArgs,
    source_table: &TableRef,
    target_cfg: &ResolvedConfig,
) -> TableRef {
    match cmd.target_table.as_deref() {
        Some(name) => TableRef::parse(name, &target_cfg.connection.default_schema),
        None => source_table.clone(),
    }
}
