use anyhow::Result;

use crate::cli::CliArgs;
use crate::compare::TableRef;
use crate::config::OutputFormat;
use crate::config::{self, CliOverrides, ResolvedConfig};
use crate::error::{AppError, ErrorKind};
use crate::output;

pub fn overrides_from_args(args: &CliArgs) -> CliOverrides {
    CliOverrides {
        config_path: args.config_path.clone(),
        env_file: args.env_file.clone(),
        profile: args.profile.clone(),
        server: args.server.clone(),
        port: args.port,
        database: args.database.clone(),
        user: args.user.clone(),
        password: args.password.clone(),
        timeout_ms: args.timeout_ms,
        encrypt: args.encrypt,
        trust_cert: args.trust_cert,
    }
}

pub fn load_config(args: &CliArgs) -> Result<ResolvedConfig> {
    let overrides = overrides_from_args(args);
    config::load_from_system(&overrides)
        .map_err(|err| AppError::new(ErrorKind::Config, err.to_string()).into())
}

/// Resolve config for a specific profile name, keeping all other CLI
/// overrides in place. Used by the two-sided comparison commands.
pub fn resolve_profile(base: &CliOverrides, profile: Option<&str>) -> Result<ResolvedConfig> {
    let mut overrides = base.clone();
    overrides.profile = profile.map(str::to_string);
    config::load_from_system(&overrides)
        .map_err(|err| AppError::new(ErrorKind::Config, err.to_string()).into())
}

pub fn apply_connection_override(
    resolved: ResolvedConfig,
    connection_override: &Option<String>,
) -> Result<ResolvedConfig> {
    if let Some(raw) = connection_override {
        let connection = config::connection_from_url(raw)
            .map_err(|err| AppError::new(ErrorKind::Config, err.to_string()))?;
        return Ok(ResolvedConfig {
            connection,
            ..resolved
        });
    }
    Ok(resolved)
}

pub fn resolve_table(schema: Option<&str>, table: &str, resolved: &ResolvedConfig) -> TableRef {
    match schema {
        Some(schema) => TableRef::new(schema, table),
        None => TableRef::parse(table, &resolved.connection.default_schema),
    }
}

pub fn output_format(args: &CliArgs, resolved: &ResolvedConfig) -> OutputFormat {
    output::select_format(&args.output, &resolved.settings)
}

pub fn json_pretty(resolved: &ResolvedConfig) -> bool {
    resolved.settings.output.json_pretty
}
