use std::io::{self, Write};

use anyhow::Result;

use crate::cli::CliArgs;
use crate::commands::common;
use crate::config::OutputFormat;
use crate::output::{self, json, table, TableOptions};

/// Prints the fully resolved configuration so layering surprises are easy to
/// track down. Secrets never appear; only whether a password resolved.
pub fn run(args: &CliArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = output::select_format(&args.output, &resolved.settings);

    if args.quiet {
        return Ok(());
    }

    if matches!(format, OutputFormat::Json) {
        let payload = json::config_to_json(&resolved);
        let body = json::render(&payload, resolved.settings.output.json_pretty)?;
        println!("{}", body);
        return Ok(());
    }

    let conn = &resolved.connection;
    let mut rows: Vec<(String, String)> = Vec::new();
    let mut push = |key: &str, value: String| rows.push((key.to_string(), value));

    push(
        "configPath",
        resolved
            .config_path
            .as_ref()
            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string()),
    );
    push("profileName", resolved.profile_name.clone());
    push("server", format!("{}:{}", conn.server, conn.port));
    push("database", conn.database.clone());
    if let Some(user) = &conn.user {
        push("user", user.clone());
    }
    push("passwordSet", conn.password.is_some().to_string());
    push("encrypt", conn.encrypt.to_string());
    push("trustCert", conn.trust_cert.to_string());
    push("timeoutMs", conn.timeout_ms.to_string());
    push("defaultSchemas", conn.default_schemas.join(", "));
    push(
        "outputFormat",
        resolved.settings.output.default_format.as_str().to_string(),
    );

    let rendered = table::render_key_value_table("Config", &rows, format, &TableOptions::default());
    writeln!(io::stdout(), "{}", rendered)?;

    Ok(())
}
