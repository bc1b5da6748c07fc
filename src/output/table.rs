use comfy_table::{ContentArrangement, Table, presets};

use crate::config::OutputFormat;
use crate::db::types::{ResultSet, Value};

const NULL_DISPLAY: &str = "—";
const ELLIPSIS: &str = "…";

#[derive(Debug, Clone)]
pub struct TableOptions {
    pub max_cell_width: usize,
    pub max_output_chars: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            max_cell_width: 140,
            max_output_chars: 25_000,
        }
    }
}

fn new_table(format: OutputFormat) -> Table {
    let mut table = Table::new();
    table.load_preset(match format {
        OutputFormat::Markdown => presets::ASCII_MARKDOWN,
        _ => presets::UTF8_FULL,
    });
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_result_set_table(
    result_set: &ResultSet,
    format: OutputFormat,
    options: &TableOptions,
) -> String {
    let mut table = new_table(format);
    table.set_header(result_set.columns.iter().map(|col| col.name.clone()));
    for row in &result_set.rows {
        table.add_row(row.iter().map(|value| format_cell(value, options.max_cell_width)));
    }
    clamp_output(table.to_string(), options.max_output_chars)
}

pub fn render_key_value_table(
    title: &str,
    rows: &[(String, String)],
    format: OutputFormat,
    options: &TableOptions,
) -> String {
    let mut table = new_table(format);
    table.set_header([title, "Value"]);
    for (key, value) in rows {
        table.add_row([
            clamp_cell(key, options.max_cell_width),
            clamp_cell(value, options.max_cell_width),
        ]);
    }
    clamp_output(table.to_string(), options.max_output_chars)
}

fn format_cell(value: &Value, max_cell_width: usize) -> String {
    match value {
        Value::Null => NULL_DISPLAY.to_string(),
        _ => clamp_cell(&value.as_display(), max_cell_width),
    }
}

fn clamp_cell(input: &str, max_len: usize) -> String {
    if input.chars().count() <= max_len {
        return input.to_string();
    }
    if max_len <= 1 {
        return ELLIPSIS.to_string();
    }
    let mut out: String = input.chars().take(max_len - 1).collect();
    out.push_str(ELLIPSIS);
    out
}

fn clamp_output(output: String, max_len: usize) -> String {
    if output.len() <= max_len {
        return output;
    }
    let mut clamped: String = output.chars().take(max_len).collect();
    clamped.push_str("\n[output truncated]");
    clamped
}
