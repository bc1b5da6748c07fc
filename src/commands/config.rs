use anyhow::Result;

use crate::cli::CliArgs;
use crate::commands::common;
use crate::config::OutputFormat;
use crate::output::{TableOptions, json as json_out, table};

pub fn run(args: &CliArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    if matches!(format, OutputFormat::Json) {
        let payload = json_out::config_to_json(&resolved);
        let body = json_out::emit_json_value(&payload, common::json_pretty(&resolved))?;
        if !args.quiet {
            println!("{}", body);
        }
        return Ok(());
    }

    if args.quiet {
        return Ok(());
    }

    let rows = vec![
        (
            "ConfigPath".to_string(),
            resolved
                .config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string()),
        ),
        ("Profile".to_string(), resolved.profile_name.clone()),
        ("Server".to_string(), resolved.connection.server.clone()),
        ("Port".to_string(), resolved.connection.port.to_string()),
        ("Database".to_string(), resolved.connection.database.clone()),
        (
            "User".to_string(),
            resolved
                .connection
                .user
                .clone()
                .unwrap_or_else(|| "(integrated)".to_string()),
        ),
        ("Encrypt".to_string(), resolved.connection.encrypt.to_string()),
        (
            "TrustCert".to_string(),
            resolved.connection.trust_cert.to_string(),
        ),
        (
            "TimeoutMs".to_string(),
            resolved.connection.timeout_ms.to_string(),
        ),
        (
            "DefaultSchema".to_string(),
            resolved.connection.default_schema.clone(),
        ),
        (
            "DefaultFormat".to_string(),
            resolved.settings.output.default_format.as_str().to_string(),
        ),
    ];

    let rendered = table::render_key_value_table("Config", &rows, format, &TableOptions::default());
    println!("{}", rendered);

    Ok(())
}
