use std::time::Instant;

use anyhow::Result;
use serde_json::json;

use crate::cli::{CliArgs, StatusArgs};
use crate::commands::common;
use crate::compare::QueryExecutor;
use crate::config::OutputFormat;
use crate::db::SqlClient;
use crate::db::types::ResultSet;
use crate::output::{TableOptions, json as json_out, table};

const PROBE: &str = "SELECT @@SERVERNAME AS serverName, @@VERSION AS serverVersion, \
     DB_NAME() AS currentDatabase, CONVERT(varchar(33), SYSDATETIMEOFFSET(), 127) AS currentTime";

pub fn run(args: &CliArgs, _cmd: &StatusArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let started = Instant::now();
    let result_sets = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = SqlClient::connect(&resolved.connection).await?;
        client.execute(PROBE).await
    })?;
    let latency_ms = started.elapsed().as_millis();

    let probe = result_sets.into_iter().next().unwrap_or_default();
    let server_name = probe_field(&probe, "serverName");
    let server_version = probe_field(&probe, "serverVersion");
    let current_database = probe_field(&probe, "currentDatabase");
    let timestamp = probe_field(&probe, "currentTime");

    if args.quiet {
        return Ok(());
    }

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "status": "ok",
            "latencyMs": latency_ms,
            "serverName": server_name,
            "serverVersion": server_version,
            "currentDatabase": current_database,
            "timestamp": timestamp,
        });
        println!("{}", json_out::emit_json_value(&payload, common::json_pretty(&resolved))?);
        return Ok(());
    }

    let rows = vec![
        ("Status".to_string(), "ok".to_string()),
        ("LatencyMs".to_string(), latency_ms.to_string()),
        ("Server".to_string(), server_name),
        ("Version".to_string(), server_version),
        ("CurrentDatabase".to_string(), current_database),
        ("Timestamp".to_string(), timestamp),
    ];
    let rendered = table::render_key_value_table("Status", &rows, format, &TableOptions::default());
    println!("{}", rendered);

    Ok(())
}

fn probe_field(result_set: &ResultSet, name: &str) -> String {
    result_set
        .column_index(name)
        .and_then(|idx| result_set.rows.first().and_then(|row| row.get(idx)))
        .filter(|value| !matches!(value, crate::db::types::Value::Null))
        .map(|value| value.as_display())
        .unwrap_or_else(|| "unknown".to_string())
}
