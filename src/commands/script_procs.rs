use std::fs;

use anyhow::{Result, anyhow};
use serde_json::json;

use crate::cli::{CliArgs, ScriptProcsArgs};
use crate::commands::common;
use crate::compare::SchemaCatalog;
use crate::config::OutputFormat;
use crate::db::SqlClient;
use crate::output::json as json_out;
use crate::scripting::{ProcedureKind, script_procedure};

pub fn run(args: &CliArgs, cmd: &ScriptProcsArgs) -> Result<()> {
    let table_name = cmd
        .table
        .as_deref()
        .ok_or_else(|| anyhow!("Missing required TABLE argument"))?;

    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);
    let table_ref = common::resolve_table(cmd.schema.as_deref(), table_name, &resolved);
    let kinds = resolve_ops(&cmd.ops)?;

    let meta = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = SqlClient::connect(&resolved.connection).await?;
        client.table(&table_ref).await
    })?;

    let mut scripts = Vec::with_capacity(kinds.len());
    for kind in &kinds {
        let script = script_procedure(&meta, *kind, cmd.header.as_deref())?;
        scripts.push((*kind, script));
    }

    if let Some(path) = cmd.out.as_deref() {
        let body = scripts
            .iter()
            .map(|(_, script)| script.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(path, body)?;
        if !args.quiet {
            println!("Wrote script to {}", path.display());
        }
        return Ok(());
    }

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "table": meta.table,
            "procedures": scripts
                .iter()
                .map(|(kind, script)| json!({ "op": kind.as_str(), "script": script }))
                .collect::<Vec<_>>(),
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

    for (idx, (_, script)) in scripts.iter().enumerate() {
        print!("{}", script);
        if idx + 1 < scripts.len() {
            println!();
        }
    }

    Ok(())
}

fn resolve_ops(raw: &[String]) -> Result<Vec<ProcedureKind>> {
    if raw.is_empty() || raw.iter().any(|op| op == "all") {
        return Ok(ProcedureKind::ALL.to_vec());
    }
    let mut kinds = Vec::with_capacity(raw.len());
    for op in raw {
        let kind = ProcedureKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == op)
            .ok_or_else(|| anyhow!("Unknown procedure kind '{}'", op))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}
