use std::io;

use anyhow::{anyhow, bail, Result};
use clap_complete::{generate, Shell};

use crate::cli::{build_cli, CliArgs, CompletionsArgs};

const SHELLS: &str = "bash, zsh, fish, powershell, elvish";

pub fn run(_args: &CliArgs, cmd: &CompletionsArgs) -> Result<()> {
    let name = cmd
        .shell
        .as_deref()
        .ok_or_else(|| anyhow!("--shell is required ({})", SHELLS))?;

    // "pwsh" is the spelling PowerShell users actually type.
    let shell = match name.to_ascii_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "powershell" | "pwsh" => Shell::PowerShell,
        "elvish" => Shell::Elvish,
        other => bail!("unsupported shell '{}' (expected one of: {})", other, SHELLS),
    };

    // Completions cover the full surface, hidden advanced commands included.
    let mut root = build_cli(true);
    generate(shell, &mut root, "ssgrep", &mut io::stdout());
    Ok(())
}
