use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use ssgrep::cli;
use ssgrep::commands;
use ssgrep::error;
use ssgrep::output::json;

fn main() {
    let args = cli::parse();
    init_logging(args.verbose);

    if let Err(err) = commands::dispatch(&args) {
        report_error(&err, args.output.json);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    // RUST_LOG wins when set; -v only widens the fallback filter.
    let fallback = match verbose {
        0 => "warn,tiberius=error",
        1 => "warn,ssgrep=info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Errors land on stderr so stdout stays parseable; under `--json` the error
/// itself is a JSON object carrying the classified kind.
fn report_error(err: &anyhow::Error, as_json: bool) {
    let kind = error::classify_error(err);
    if as_json {
        let payload = json::error_json(&err.to_string(), kind.as_str());
        if let Ok(body) = json::render(&payload, true) {
            let _ = writeln!(io::stderr(), "{}", body);
        }
    } else if color_stderr() {
        let line = format!("Error: {}", err);
        let _ = writeln!(io::stderr(), "{}", line.red());
    } else {
        let _ = writeln!(io::stderr(), "Error: {}", err);
    }
}

fn color_stderr() -> bool {
    std::env::var_os("NO_COLOR").is_none() && io::stderr().is_terminal()
}
