mod args;

pub use args::{
    ChecksumArgs, CliArgs, ColumnsArgs, CommandKind, CompareArgs, CompletionsArgs, ConfigArgs,
    InitArgs, OutputFlags, ScriptProcsArgs, StatusArgs, build_cli,
};

pub fn parse() -> CliArgs {
    args::parse_args()
}
