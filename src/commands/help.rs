use std::io::{self, Write};

use crate::cli::build_cli;

pub fn run(show_all: bool, command: Option<&str>) -> anyhow::Result<()> {
    let mut cli = build_cli(show_all);

    // Accept aliases too, so `help search` lands on `find`.
    let resolved = command.and_then(|name| {
        cli.get_subcommands()
            .find(|sub| {
                sub.get_name() == name || sub.get_all_aliases().any(|alias| alias == name)
            })
            .map(|sub| sub.get_name().to_string())
    });

    if let Some(name) = resolved {
        if let Some(sub) = cli.find_subcommand_mut(&name) {
            sub.print_long_help()?;
            io::stdout().flush()?;
            return Ok(());
        }
    }

    cli.print_long_help()?;
    io::stdout().flush()?;
    Ok(())
}
