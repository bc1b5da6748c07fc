use serde_json::{Map, Value as JsonValue, json};

use crate::config::ResolvedConfig;
use crate::db::types::ResultSet;

pub fn emit_json_value(value: &JsonValue, pretty: bool) -> anyhow::Result<String> {
    let body = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(body)
}

pub fn error_json(message: &str, kind: &str) -> JsonValue {
    json!({
        "error": {
            "message": message,
            "kind": kind,
        }
    })
}

/// One JSON object per row, keyed by column name.
pub fn result_set_rows_to_objects(result_set: &ResultSet) -> Vec<JsonValue> {
    result_set
        .rows
        .iter()
        .map(|row| {
            let entries: Map<String, JsonValue> = result_set
                .columns
                .iter()
                .zip(row)
                .map(|(col, value)| {
                    (
                        col.name.clone(),
                        serde_json::to_value(value).unwrap_or(JsonValue::Null),
                    )
                })
                .collect();
            JsonValue::Object(entries)
        })
        .collect()
}

pub fn config_to_json(resolved: &ResolvedConfig) -> JsonValue {
    let connection = &resolved.connection;
    json!({
        "configPath": resolved.config_path.as_ref().map(|p| p.display().to_string()),
        "profileName": resolved.profile_name,
        "connection": {
            "server": connection.server,
            "port": connection.port,
            "database": connection.database,
            "user": connection.user,
            "password": connection.password,
            "encrypt": connection.encrypt,
            "trustCert": connection.trust_cert,
            "timeoutMs": connection.timeout_ms,
            "defaultSchema": connection.default_schema,
        },
        "settings": {
            "output": {
                "defaultFormat": resolved.settings.output.default_format.as_str(),
                "json": {
                    "pretty": resolved.settings.output.json_pretty,
                }
            }
        }
    })
}
