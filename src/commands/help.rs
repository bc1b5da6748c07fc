use anyhow::Result;

use crate::cli::build_cli;

pub fn run(all: bool, command: Option<&str>) -> Result<()> {
    let mut cli = build_cli(all);
    if let Some(name) = command {
        if let Some(sub) = cli.find_subcommand_mut(name) {
            sub.print_help()?;
            return Ok(());
        }
    }
    cli.print_help()?;
    Ok(())
}
