use std::io;

use anyhow::{Result, anyhow};
use clap_complete::Shell;

use crate::cli::{CliArgs, CompletionsArgs, build_cli};

pub fn run(_args: &CliArgs, cmd: &CompletionsArgs) -> Result<()> {
    let shell = match cmd.shell.as_deref() {
        Some("bash") => Shell::Bash,
        Some("zsh") => Shell::Zsh,
        Some("fish") => Shell::Fish,
        Some("powershell") => Shell::PowerShell,
        Some("elvish") => Shell::Elvish,
        Some(other) => return Err(anyhow!("Unsupported shell '{}'", other)),
        None => return Err(anyhow!("Missing required --shell")),
    };

    let mut cli = build_cli(true);
    clap_complete::generate(shell, &mut cli, "ssdiff", &mut io::stdout());
    Ok(())
}
