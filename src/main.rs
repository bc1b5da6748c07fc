use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use ssdiff::cli;
use ssdiff::commands;
use ssdiff::error;
use ssdiff::output::json;

fn main() {
    let args = cli::parse();
    init_logging(args.verbose);
    if let Err(err) = commands::dispatch(&args) {
        report_failure(&err, args.output.json);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn,tiberius=error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

fn report_failure(err: &anyhow::Error, as_json: bool) {
    let message = err.to_string();
    if as_json {
        let payload = json::error_json(&message, error::classify_error(err).as_str());
        if let Ok(body) = json::emit_json_value(&payload, true) {
            let _ = writeln!(io::stderr(), "{}", body);
        }
        return;
    }

    let line = format!("Error: {}", message);
    if io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none() {
        let _ = writeln!(io::stderr(), "{}", line.red());
    } else {
        let _ = writeln!(io::stderr(), "{}", line);
    }
}
