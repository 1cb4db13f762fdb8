pub mod csv;
pub mod json;
pub mod table;

use std::io::IsTerminal;

use crate::cli::OutputFlags;
use crate::config::{OutputFormat, SettingsResolved};

pub use table::{Pagination, TableOptions};

pub fn select_format(flags: &OutputFlags, settings: &SettingsResolved) -> OutputFormat {
    if flags.json {
        return OutputFormat::Json;
    }
    if flags.markdown {
        return OutputFormat::Markdown;
    }
    if flags.pretty {
        return OutputFormat::Pretty;
    }

    let is_tty = std::io::stdout().is_terminal();
    if is_tty {
        settings.output.default_format
    } else {
        OutputFormat::Markdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flags_beat_configured_default() {
        let settings = SettingsResolved::default();
        let json = OutputFlags {
            json: true,
            markdown: true,
            pretty: false,
        };
        assert_eq!(select_format(&json, &settings), OutputFormat::Json);

        let markdown = OutputFlags {
            json: false,
            markdown: true,
            pretty: true,
        };
        assert_eq!(select_format(&markdown, &settings), OutputFormat::Markdown);

        let pretty = OutputFlags {
            json: false,
            markdown: false,
            pretty: true,
        };
        assert_eq!(select_format(&pretty, &settings), OutputFormat::Pretty);
    }
}
