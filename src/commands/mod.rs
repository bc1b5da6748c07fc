mod checksum;
mod columns;
mod common;
mod compare_data;
mod completions;
mod config;
mod help;
mod init;
mod script_procs;
mod status;

use anyhow::Result;

use crate::cli::{CliArgs, CommandKind};

pub fn dispatch(args: &CliArgs) -> Result<()> {
    match &args.command {
        CommandKind::Help { all, command } => help::run(*all, command.as_deref()),
        CommandKind::Status(cmd) => status::run(args, cmd),
        CommandKind::Columns(cmd) => columns::run(args, cmd),
        CommandKind::Checksum(cmd) => checksum::run(args, cmd),
        CommandKind::Compare(cmd) => compare_data::run(args, cmd),
        CommandKind::ScriptProcs(cmd) => script_procs::run(args, cmd),
        CommandKind::Init(cmd) => init::run(args, cmd),
        CommandKind::Config(_) => config::run(args),
        CommandKind::Completions(cmd) => completions::run(args, cmd),
    }
}
