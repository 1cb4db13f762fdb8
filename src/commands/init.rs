use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde_json::json;

use crate::cli::{CliArgs, InitArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::output::json as json_out;

pub fn run(args: &CliArgs, cmd: &InitArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let profile_name = cmd.profile.as_deref().unwrap_or("default");
    let target = resolve_target_path(cmd.path.as_ref());

    let existed = target.exists();
    if existed && !cmd.force {
        return Err(anyhow!(
            "refusing to overwrite {} (pass --force to replace it)",
            target.display()
        ));
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&target, render_config_template(profile_name))?;

    if args.quiet {
        return Ok(());
    }

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "path": target.display().to_string(),
            "created": true,
            "overwritten": existed,
        });
        let body = json_out::render(&payload, common::json_pretty(&resolved))?;
        println!("{}", body);
    } else {
        println!("Config written to {}", target.display());
    }

    Ok(())
}

fn resolve_target_path(path: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = path {
        if path
            .extension()
            .and_then(|s| s.to_str())
            .map_or(false, |ext| matches!(ext, "yaml" | "yml" | "json"))
        {
            return path.clone();
        }
        return path.join(".ssgrep").join("config.yaml");
    }

    Path::new(".ssgrep").join("config.yaml")
}

fn render_config_template(profile: &str) -> String {
    format!(
        r#"# ssgrep configuration
# Connections are read-only; ssgrep never issues writes.

defaultProfile: {profile}
settings:
  output:
    # Used when no --json/--markdown/--pretty flag is given.
    # One of: pretty | markdown | json
    defaultFormat: pretty
    json:
      # Indent JSON bodies for human eyes; pipelines may prefer false.
      pretty: true

profiles:
  {profile}:
    server: localhost
    port: 1433
    database: master
    user: sa
    passwordEnv: SQL_PASSWORD
    password: null
    encrypt: true
    trustCert: true
    timeout: 30000
    # The first entry is the schema assumed for an unqualified --table.
    defaultSchemas: [dbo]
"#
    )
}
