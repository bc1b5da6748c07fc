pub mod csv;
pub mod json;
pub mod table;

use std::io::{IsTerminal, stdout};

use crate::cli::OutputFlags;
use crate::config::{OutputFormat, SettingsResolved};

pub use table::TableOptions;

/// Explicit flags win; otherwise pretty tables on a terminal and markdown
/// when piped, keeping scripted transcripts compact.
pub fn select_format(flags: &OutputFlags, settings: &SettingsResolved) -> OutputFormat {
    match (flags.json, flags.markdown, flags.pretty) {
        (true, _, _) => OutputFormat::Json,
        (_, true, _) => OutputFormat::Markdown,
        (_, _, true) => OutputFormat::Pretty,
        _ if stdout().is_terminal() => settings.output.default_format,
        _ => OutputFormat::Markdown,
    }
}
