mod env;
mod loader;
mod schema;

pub use env::{Env, parse_bool};
pub use loader::{
    CliOverrides, ConnectionSettings, LoadOptions, OutputSettingsResolved, ResolvedConfig,
    SettingsResolved, connection_from_url, load_config,
};
pub use schema::{ConfigFile, JsonSettings, OutputFormat, OutputSettings, Profile, Settings};

/// Resolve config against the real process environment and filesystem.
pub fn load_from_system(cli: &CliOverrides) -> anyhow::Result<ResolvedConfig> {
    let env = Env::from_system(cli.env_file.as_deref());
    let options = LoadOptions {
        cli: cli.clone(),
        cwd: std::env::current_dir()?,
        home_dir: dirs::home_dir(),
        xdg_config_dir: dirs::config_dir(),
    };
    load_config(&options, &env)
}
