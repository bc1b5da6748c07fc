use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde_json::json;

use crate::cli::{CliArgs, InitArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::output::json as json_out;

pub fn run(args: &CliArgs, cmd: &InitArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let profile_name = cmd.profile.as_deref().unwrap_or("default");
    let target = resolve_target_path(cmd.path.as_deref());

    if target.exists() && !cmd.force {
        return Err(anyhow!("Config already exists: {}", target.display()));
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, render_config_template(profile_name))?;

    if args.quiet {
        return Ok(());
    }
    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "path": target.display().to_string(),
            "created": true,
            "overwritten": cmd.force,
        });
        println!("{}", json_out::emit_json_value(&payload, common::json_pretty(&resolved))?);
    } else {
        println!("Wrote config to {}", target.display());
    }
    Ok(())
}

/// A path ending in a config extension is taken verbatim; anything else is
/// treated as a directory to scaffold `.ssdiff/config.yaml` under.
fn resolve_target_path(path: Option<&Path>) -> PathBuf {
    let default_tail = || Path::new(".ssdiff").join("config.yaml");
    match path {
        Some(path)
            if path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| matches!(ext, "yaml" | "yml" | "json")) =>
        {
            path.to_path_buf()
        }
        Some(dir) => dir.join(default_tail()),
        None => default_tail(),
    }
}

fn render_config_template(profile: &str) -> String {
    format!(
        r#"# ssdiff configuration
# Comparison commands only ever issue read-only SELECT statements.

defaultProfile: {profile}
settings:
  output:
    # defaultFormat controls output when no explicit flag is used.
    # Values: pretty | markdown | json
    defaultFormat: pretty
    json:
      # pretty controls indentation when emitting JSON.
      pretty: true

profiles:
  {profile}:
    server: localhost
    port: 1433
    database: master
    user: sa
    passwordEnv: SQL_PASSWORD
    password: null
    encrypt: true
    trustCert: true
    timeout: 30000
    defaultSchema: dbo
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_as_yaml() {
        let parsed: crate::config::ConfigFile =
            serde_yaml::from_str(&render_config_template("staging")).expect("valid template");
        assert_eq!(parsed.default_profile.as_deref(), Some("staging"));
        assert!(parsed.profiles.contains_key("staging"));
    }

    #[test]
    fn explicit_file_paths_are_kept() {
        assert_eq!(
            resolve_target_path(Some(Path::new("custom.yml"))),
            PathBuf::from("custom.yml")
        );
        assert_eq!(
            resolve_target_path(Some(Path::new("some/dir"))),
            Path::new("some/dir").join(".ssdiff").join("config.yaml")
        );
        assert_eq!(
            resolve_target_path(None),
            Path::new(".ssdiff").join("config.yaml")
        );
    }
}
